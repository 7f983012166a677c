//! Records of a grounded COCO dataset and the COCO JSON codec.
//!
//! A dataset is a list of captioned images, the boxes annotated on them and
//! the categories those boxes are labeled with. A box can point back into
//! its image's caption through token spans, linking a phrase to a region.
//!
//! # Example
//!
//! ```
//! use harlequin::ir::{Annotation, BBox, Category, Dataset, Image};
//!
//! let dataset = Dataset {
//!     images: vec![Image::new(1u64, "1.jpg", 640, 480, "a dog on a sofa .")],
//!     categories: vec![Category::new(1u64, "dog")],
//!     annotations: vec![
//!         Annotation::new(1u64, 1u64, 1u64, BBox::from_xywh(10.0, 20.0, 90.0, 60.0))
//!             .with_span(0, 5),
//!     ],
//! };
//!
//! let span = dataset.annotations[0].primary_span().unwrap();
//! assert_eq!(span.extract(&dataset.images[0].caption), Some("a dog"));
//! ```

mod bbox;
mod ids;
pub mod io_coco_json;
mod model;
mod span;

pub use bbox::BBox;
pub use ids::{AnnotationId, CategoryId, ImageId};
pub use model::{Annotation, Category, Dataset, Image};
pub use span::TokenSpan;
