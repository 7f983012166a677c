//! Dataset validation.
//!
//! Checks a parsed dataset for problems the accessor would otherwise
//! surface one sample at a time:
//! - structural integrity (unique ids, valid references)
//! - record quality (dimensions, file names, captions, category names)
//! - box geometry (finite, positive size, inside the image)
//! - grounding (every token span lies inside its image's caption)
//! - optionally, that image files exist under the image root and match
//!   their recorded size

mod report;

pub use report::{IssueCode, IssueContext, Severity, ValidationIssue, ValidationReport};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::ir::{Annotation, Category, CategoryId, Dataset, Image, ImageId};

/// Pixels a box may extend past the image edge before it is reported.
const BOUNDS_TOLERANCE_PX: f64 = 0.5;

#[derive(Clone, Debug, Default)]
pub struct ValidateOptions {
    /// If true, treat warnings as errors.
    pub strict: bool,
    /// When set, image files are checked under this directory.
    pub image_root: Option<PathBuf>,
}

/// Runs every check over `dataset`.
pub fn validate_dataset(dataset: &Dataset, opts: &ValidateOptions) -> ValidationReport {
    let mut report = ValidationReport::new();

    let images: HashMap<ImageId, &Image> = dataset.images.iter().map(|i| (i.id, i)).collect();
    let category_ids: HashSet<CategoryId> = dataset.categories.iter().map(|c| c.id).collect();

    check_images(&dataset.images, &mut report);
    check_categories(&dataset.categories, &mut report);
    for ann in &dataset.annotations {
        check_annotation(ann, &images, &category_ids, &mut report);
    }
    check_duplicates(
        dataset.annotations.iter().map(|a| a.id),
        IssueCode::DuplicateAnnotationId,
        IssueContext::Annotation,
        &mut report,
    );

    if let Some(root) = &opts.image_root {
        for image in dataset.images.iter().filter(|i| !i.file_name.is_empty()) {
            check_image_file(image, &root.join(&image.file_name), &mut report);
        }
    }

    report
}

/// Reports every id after its first occurrence.
fn check_duplicates<Id>(
    ids: impl Iterator<Item = Id>,
    code: IssueCode,
    context: fn(Id) -> IssueContext,
    report: &mut ValidationReport,
) where
    Id: Copy + Eq + std::hash::Hash + std::fmt::Display,
{
    let mut first_seen: HashMap<Id, usize> = HashMap::new();
    for (idx, id) in ids.enumerate() {
        if let Some(first) = first_seen.get(&id) {
            report.error(
                code,
                context(id),
                format!("Id {} repeated at record {} (first at {})", id, idx, first),
            );
        } else {
            first_seen.insert(id, idx);
        }
    }
}

fn check_images(images: &[Image], report: &mut ValidationReport) {
    check_duplicates(
        images.iter().map(|i| i.id),
        IssueCode::DuplicateImageId,
        IssueContext::Image,
        report,
    );

    for image in images {
        let context = || IssueContext::Image(image.id);

        if image.width == 0 || image.height == 0 {
            report.error(
                IssueCode::InvalidImageDimensions,
                context(),
                format!("Image is {}x{}", image.width, image.height),
            );
        }
        if image.file_name.is_empty() {
            report.error(IssueCode::EmptyFileName, context(), "No file name");
        }
        if image.caption.trim().is_empty() {
            report.warning(IssueCode::EmptyCaption, context(), "Caption is blank");
        }
    }
}

fn check_categories(categories: &[Category], report: &mut ValidationReport) {
    check_duplicates(
        categories.iter().map(|c| c.id),
        IssueCode::DuplicateCategoryId,
        IssueContext::Category,
        report,
    );

    let mut names: HashMap<&str, CategoryId> = HashMap::new();
    for category in categories {
        let context = IssueContext::Category(category.id);
        if category.name.is_empty() {
            report.warning(IssueCode::EmptyCategoryName, context, "No category name");
        } else if let Some(owner) = names.get(category.name.as_str()) {
            report.warning(
                IssueCode::DuplicateCategoryName,
                context,
                format!("Name '{}' already used by category {}", category.name, owner),
            );
        } else {
            names.insert(&category.name, category.id);
        }
    }
}

fn check_annotation(
    ann: &Annotation,
    images: &HashMap<ImageId, &Image>,
    category_ids: &HashSet<CategoryId>,
    report: &mut ValidationReport,
) {
    let context = || IssueContext::Annotation(ann.id);
    let image = images.get(&ann.image_id).copied();

    if image.is_none() {
        report.error(
            IssueCode::MissingImageRef,
            context(),
            format!("Image {} does not exist", ann.image_id),
        );
    }
    if !category_ids.contains(&ann.category_id) {
        report.error(
            IssueCode::MissingCategoryRef,
            context(),
            format!("Category {} does not exist", ann.category_id),
        );
    }

    // Spans can only be checked against a known caption.
    if let Some(image) = image {
        let caption_len = image.caption_len();
        for span in &ann.tokens_positive {
            if span.start > span.end {
                report.error(
                    IssueCode::ReversedTokenSpan,
                    context(),
                    format!("Span [{}, {}) starts after it ends", span.start, span.end),
                );
            } else if !span.is_within(caption_len) {
                report.error(
                    IssueCode::TokenSpanOutOfRange,
                    context(),
                    format!(
                        "Span [{}, {}) runs past a caption of {} chars",
                        span.start, span.end, caption_len
                    ),
                );
            }
        }
    }

    let bbox = &ann.bbox;
    if !bbox.is_finite() {
        report.error(IssueCode::BBoxNotFinite, context(), format!("Box {:?}", bbox));
        return;
    }
    if !bbox.has_positive_size() {
        report.warning(
            IssueCode::InvalidBBoxSize,
            context(),
            format!("Box is {}x{}", bbox.width, bbox.height),
        );
    }
    if let Some(image) = image {
        if !bbox.fits_within(image.width, image.height, BOUNDS_TOLERANCE_PX) {
            report.warning(
                IssueCode::BBoxOutOfBounds,
                context(),
                format!("Box {:?} leaves the {}x{} image", bbox, image.width, image.height),
            );
        }
    }
}

/// Checks that `path` exists and that its header matches the record size.
///
/// Only the header is read, through `imagesize`.
fn check_image_file(image: &Image, path: &Path, report: &mut ValidationReport) {
    let context = || IssueContext::ImageFile(path.to_path_buf());

    if !path.is_file() {
        report.error(
            IssueCode::MissingImageFile,
            context(),
            format!("Missing for image {}", image.id),
        );
        return;
    }

    match imagesize::size(path) {
        Ok(size) if size.width != image.width as usize || size.height != image.height as usize => {
            report.warning(
                IssueCode::ImageSizeMismatch,
                context(),
                format!(
                    "File is {}x{}, image {} says {}x{}",
                    size.width, size.height, image.id, image.width, image.height
                ),
            );
        }
        Ok(_) => {}
        Err(err) => {
            report.error(IssueCode::UnreadableImageFile, context(), err.to_string());
        }
    }
}
