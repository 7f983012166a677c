//! COCO JSON reader and writer for grounded caption datasets.
//!
//! Besides the standard `images` / `annotations` / `categories` arrays this
//! format carries a `caption` on every image and an optional
//! `tokens_positive` list on every annotation, each entry a `[start, end]`
//! character range into the caption.
//!
//! # Field handling
//!
//! - `images` is required; `annotations` and `categories` default to empty.
//! - On images `id`, `file_name`, `width`, `height` and `caption` are
//!   required. On annotations `id`, `image_id`, `category_id` and `bbox`
//!   are required; `area` defaults to the box area, `iscrowd` to 0.
//! - Fields not listed here are kept verbatim on the record and written
//!   back out, so an export re-parses to the same records.
//!
//! # Ordering
//!
//! Records are written in the order they are held. Annotation order is
//! meaningful (it is the order targets are returned in), so the writer
//! never re-sorts.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::model::{Annotation, Category, Dataset, Image};
use super::{AnnotationId, BBox, CategoryId, ImageId, TokenSpan};
use crate::error::HarlequinError;

// ============================================================================
// COCO Schema Types (internal to this module)
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct CocoDataset {
    images: Vec<CocoImage>,

    #[serde(default)]
    annotations: Vec<CocoAnnotation>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoImage {
    id: u64,
    file_name: String,
    height: u32,
    width: u32,
    caption: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    license: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    date_captured: Option<String>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    supercategory: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct CocoAnnotation {
    id: u64,
    image_id: u64,

    /// `[x, y, width, height]`, origin top-left.
    bbox: BBox,

    #[serde(default)]
    area: Option<f64>,

    category_id: u64,

    #[serde(default)]
    iscrowd: Option<u8>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tokens_positive: Vec<TokenSpan>,

    #[serde(flatten)]
    extra: BTreeMap<String, serde_json::Value>,
}

// ============================================================================
// Public API
// ============================================================================

/// Reads a dataset from a COCO JSON file.
///
/// # Errors
/// Returns [`HarlequinError::Io`] if the file cannot be opened and
/// [`HarlequinError::AnnotationParse`] if it is not valid JSON or misses a
/// required field.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use harlequin::ir::io_coco_json::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("annotations/instances_test.json"))?;
/// # Ok::<(), harlequin::HarlequinError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<Dataset, HarlequinError> {
    let file = File::open(path).map_err(HarlequinError::Io)?;
    let reader = BufReader::new(file);

    let coco: CocoDataset =
        serde_json::from_reader(reader).map_err(|source| HarlequinError::AnnotationParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(coco_to_ir(coco))
}

/// Writes a dataset to a COCO JSON file, keeping record order.
pub fn write_coco_json(path: &Path, dataset: &Dataset) -> Result<(), HarlequinError> {
    let images: Vec<&Image> = dataset.images.iter().collect();
    let annotations: Vec<&Annotation> = dataset.annotations.iter().collect();
    let categories: Vec<&Category> = dataset.categories.iter().collect();
    write_records(path, &images, &annotations, &categories)
}

/// Writes a subset of records (typically one sample) to a COCO JSON file.
///
/// The output has an `images` and an `annotations` array and no
/// `categories`.
pub fn write_subset_json(
    path: &Path,
    images: &[&Image],
    annotations: &[&Annotation],
) -> Result<(), HarlequinError> {
    write_records(path, images, annotations, &[])
}

/// Reads a dataset from a COCO JSON string.
///
/// Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDataset = serde_json::from_str(json)?;
    Ok(coco_to_ir(coco))
}

/// Reads a dataset from a COCO JSON byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDataset = serde_json::from_slice(bytes)?;
    Ok(coco_to_ir(coco))
}

/// Writes a dataset to a COCO JSON string.
pub fn to_coco_string(dataset: &Dataset) -> Result<String, serde_json::Error> {
    let coco = CocoDataset {
        images: dataset.images.iter().map(image_to_coco).collect(),
        annotations: dataset.annotations.iter().map(annotation_to_coco).collect(),
        categories: dataset.categories.iter().map(category_to_coco).collect(),
    };
    serde_json::to_string_pretty(&coco)
}

/// Writes a subset of records to a COCO JSON string.
pub fn subset_to_string(
    images: &[&Image],
    annotations: &[&Annotation],
) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&subset_to_coco(images, annotations, &[]))
}

fn write_records(
    path: &Path,
    images: &[&Image],
    annotations: &[&Annotation],
    categories: &[&Category],
) -> Result<(), HarlequinError> {
    let file = File::create(path).map_err(HarlequinError::Io)?;
    let writer = BufWriter::new(file);

    let coco = subset_to_coco(images, annotations, categories);

    serde_json::to_writer_pretty(writer, &coco).map_err(|source| HarlequinError::DataWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn subset_to_coco(
    images: &[&Image],
    annotations: &[&Annotation],
    categories: &[&Category],
) -> CocoDataset {
    CocoDataset {
        images: images.iter().map(|img| image_to_coco(img)).collect(),
        annotations: annotations.iter().map(|ann| annotation_to_coco(ann)).collect(),
        categories: categories.iter().map(|cat| category_to_coco(cat)).collect(),
    }
}

// ============================================================================
// Conversion: COCO -> IR
// ============================================================================

fn coco_to_ir(coco: CocoDataset) -> Dataset {
    let images = coco
        .images
        .into_iter()
        .map(|img| Image {
            id: ImageId::new(img.id),
            file_name: img.file_name,
            width: img.width,
            height: img.height,
            caption: img.caption,
            license: img.license,
            date_captured: img.date_captured,
            extra: img.extra,
        })
        .collect();

    let categories = coco
        .categories
        .into_iter()
        .map(|cat| Category {
            id: CategoryId::new(cat.id),
            name: cat.name,
            supercategory: cat.supercategory,
        })
        .collect();

    let annotations = coco
        .annotations
        .into_iter()
        .map(|ann| Annotation {
            id: AnnotationId::new(ann.id),
            image_id: ImageId::new(ann.image_id),
            category_id: CategoryId::new(ann.category_id),
            area: ann.area.unwrap_or_else(|| ann.bbox.area()),
            bbox: ann.bbox,
            iscrowd: ann.iscrowd.unwrap_or(0) != 0,
            tokens_positive: ann.tokens_positive,
            extra: ann.extra,
        })
        .collect();

    Dataset {
        images,
        annotations,
        categories,
    }
}

// ============================================================================
// Conversion: IR -> COCO
// ============================================================================

fn image_to_coco(img: &Image) -> CocoImage {
    CocoImage {
        id: img.id.as_u64(),
        file_name: img.file_name.clone(),
        height: img.height,
        width: img.width,
        caption: img.caption.clone(),
        license: img.license,
        date_captured: img.date_captured.clone(),
        extra: img.extra.clone(),
    }
}

fn annotation_to_coco(ann: &Annotation) -> CocoAnnotation {
    CocoAnnotation {
        id: ann.id.as_u64(),
        image_id: ann.image_id.as_u64(),
        bbox: ann.bbox,
        area: Some(ann.area),
        category_id: ann.category_id.as_u64(),
        iscrowd: Some(u8::from(ann.iscrowd)),
        tokens_positive: ann.tokens_positive.clone(),
        extra: ann.extra.clone(),
    }
}

fn category_to_coco(cat: &Category) -> CocoCategory {
    CocoCategory {
        id: cat.id.as_u64(),
        name: cat.name.clone(),
        supercategory: cat.supercategory.clone(),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_coco_json() -> &'static str {
        r#"{
            "info": {"description": "grounded captions"},
            "images": [
                {
                    "id": 7,
                    "file_name": "7.jpg",
                    "height": 375,
                    "width": 500,
                    "caption": "The man with a gray jacket is holding cameras .",
                    "dataset_name": "flickr",
                    "tokens_negative": [[0, 7]]
                }
            ],
            "categories": [
                {"id": 1, "name": "object", "supercategory": "object"}
            ],
            "annotations": [
                {
                    "id": 11,
                    "image_id": 7,
                    "category_id": 1,
                    "bbox": [56, 70, 432, 441],
                    "area": 190512,
                    "iscrowd": 0,
                    "tokens_positive": [[0, 7]]
                },
                {
                    "id": 10,
                    "image_id": 7,
                    "category_id": 1,
                    "bbox": [53.5, 164, 438, 292],
                    "iscrowd": 1,
                    "tokens_positive": [[13, 26], [38, 45]]
                }
            ]
        }"#
    }

    #[test]
    fn test_coco_to_ir_basic() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");

        assert_eq!(dataset.images.len(), 1);
        assert_eq!(dataset.categories.len(), 1);
        assert_eq!(dataset.annotations.len(), 2);

        let img = &dataset.images[0];
        assert_eq!(img.id, ImageId::new(7));
        assert_eq!(img.file_name, "7.jpg");
        assert_eq!((img.width, img.height), (500, 375));
        assert!(img.caption.starts_with("The man"));
        assert_eq!(img.extra["dataset_name"], "flickr");

        let first = &dataset.annotations[0];
        assert_eq!(first.id, AnnotationId::new(11));
        assert_eq!(first.bbox, BBox::from_xywh(56.0, 70.0, 432.0, 441.0));
        assert_eq!(first.area, 190512.0);
        assert!(!first.iscrowd);
        assert_eq!(first.tokens_positive, vec![TokenSpan::new(0, 7)]);
    }

    #[test]
    fn test_annotation_order_is_file_order() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");
        let ids: Vec<u64> = dataset.annotations.iter().map(|a| a.id.as_u64()).collect();
        assert_eq!(ids, vec![11, 10]);

        let json = to_coco_string(&dataset).expect("serialize failed");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["annotations"][0]["id"], 11);
        assert_eq!(parsed["annotations"][1]["id"], 10);
    }

    #[test]
    fn test_missing_area_defaults_to_box_area() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");
        let second = &dataset.annotations[1];
        assert_eq!(second.area, 438.0 * 292.0);
        assert!(second.iscrowd);
    }

    #[test]
    fn test_roundtrip_preserves_records() {
        let original = from_coco_str(sample_coco_json()).expect("parse failed");
        let json = to_coco_string(&original).expect("serialize failed");
        let restored = from_coco_str(&json).expect("parse failed");

        assert_eq!(original, restored);
    }

    #[test]
    fn test_subset_export_has_no_categories() {
        let dataset = from_coco_str(sample_coco_json()).expect("parse failed");
        let image = &dataset.images[0];
        let anns: Vec<&Annotation> = dataset.annotations.iter().collect();

        let json = subset_to_string(&[image], &anns).expect("serialize failed");
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(parsed.get("categories").is_none());
        assert_eq!(parsed["images"][0]["caption"], image.caption.as_str());
        assert_eq!(parsed["annotations"][1]["tokens_positive"][1][0], 38);
    }

    #[test]
    fn test_missing_caption_is_an_error() {
        let json = r#"{
            "images": [{"id": 1, "file_name": "a.jpg", "height": 1, "width": 1}]
        }"#;
        assert!(from_coco_str(json).is_err());
    }

    #[test]
    fn test_missing_bbox_is_an_error() {
        let json = r#"{
            "images": [{"id": 1, "file_name": "a.jpg", "height": 1, "width": 1, "caption": ""}],
            "annotations": [{"id": 1, "image_id": 1, "category_id": 1}]
        }"#;
        assert!(from_coco_str(json).is_err());
    }

    #[test]
    fn test_annotations_and_categories_are_optional() {
        let json = r#"{
            "images": [{"id": 1, "file_name": "a.jpg", "height": 1, "width": 1, "caption": "x"}]
        }"#;
        let dataset = from_coco_str(json).expect("parse failed");
        assert!(dataset.annotations.is_empty());
        assert!(dataset.categories.is_empty());
    }
}
