//! In-memory records of a grounded COCO dataset.
//!
//! These are plain data: the COCO reader produces them, the annotation
//! store indexes them, and nothing mutates them after loading.

use std::collections::BTreeMap;

use super::bbox::BBox;
use super::ids::{AnnotationId, CategoryId, ImageId};
use super::span::TokenSpan;

/// Every record parsed from one annotation file, in file order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Dataset {
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

/// An image record together with its caption.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub id: ImageId,

    /// Path of the image file, relative to the dataset's image root.
    pub file_name: String,

    pub width: u32,
    pub height: u32,

    /// Free-text caption the annotations of this image are grounded in.
    pub caption: String,

    pub license: Option<u64>,
    pub date_captured: Option<String>,

    /// Fields the reader does not interpret, kept for faithful export.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
        caption: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
            caption: caption.into(),
            license: None,
            date_captured: None,
            extra: BTreeMap::new(),
        }
    }

    /// Number of characters in the caption, the upper bound for token spans.
    pub fn caption_len(&self) -> usize {
        self.caption.chars().count()
    }
}

/// A labeled region of an image, optionally grounded to caption text.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub id: AnnotationId,

    /// Back-reference to the owning image.
    pub image_id: ImageId,

    pub category_id: CategoryId,
    pub bbox: BBox,
    pub area: f64,
    pub iscrowd: bool,

    /// Caption ranges describing this region. Usually one.
    pub tokens_positive: Vec<TokenSpan>,

    pub extra: BTreeMap<String, serde_json::Value>,
}

impl Annotation {
    /// Creates an annotation whose area is the box area.
    pub fn new(
        id: impl Into<AnnotationId>,
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBox,
    ) -> Self {
        Self {
            id: id.into(),
            image_id: image_id.into(),
            category_id: category_id.into(),
            area: bbox.area(),
            bbox,
            iscrowd: false,
            tokens_positive: Vec::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with_span(mut self, start: usize, end: usize) -> Self {
        self.tokens_positive.push(TokenSpan::new(start, end));
        self
    }

    pub fn with_iscrowd(mut self, iscrowd: bool) -> Self {
        self.iscrowd = iscrowd;
        self
    }

    /// The span used to name this region: the first one listed.
    pub fn primary_span(&self) -> Option<TokenSpan> {
        self.tokens_positive.first().copied()
    }
}

/// A category (class label).
#[derive(Clone, Debug, PartialEq)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub supercategory: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
        }
    }
}
