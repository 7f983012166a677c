use std::path::PathBuf;
use thiserror::Error;

use crate::ir::{AnnotationId, CategoryId, ImageId};
use crate::validation::ValidationReport;

/// The main error type for harlequin operations.
#[derive(Debug, Error)]
pub enum HarlequinError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse annotation file {path}: {source}")]
    AnnotationParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Malformed annotations: {message}")]
    MalformedAnnotations { message: String },

    #[error("Failed to write JSON to {path}: {source}")]
    DataWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Index {index} out of range for dataset of {len} sample(s)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Sample {0} not found")]
    SampleNotFound(ImageId),

    #[error("Category {0} not found")]
    CategoryNotFound(CategoryId),

    #[error("Image file not found: {path}")]
    ImageNotFound { path: PathBuf },

    #[error("Failed to read image {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write image {path}: {source}")]
    ImageWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid output template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(
        "Token span [{start}, {end}) of annotation {annotation} is outside its caption ({caption_len} chars)"
    )]
    InvalidTokenSpan {
        annotation: AnnotationId,
        start: usize,
        end: usize,
        caption_len: usize,
    },

    #[error("Validation failed with {error_count} error(s) and {warning_count} warning(s)")]
    ValidationFailed {
        error_count: usize,
        warning_count: usize,
        report: ValidationReport,
    },
}
