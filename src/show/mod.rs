//! Saving individual samples to disk.
//!
//! Three modes are available:
//! - [`VisualizeMode::Image`]: the decoded image, untouched.
//! - [`VisualizeMode::Annotation`]: the image with every target box drawn on it.
//! - [`VisualizeMode::Data`]: the image record and its target annotations as
//!   COCO JSON, readable by [`crate::ir::io_coco_json`].
//!
//! Output paths come from a filename template in which `{i}` (or
//! `{index}`) is replaced by the sample position and `{id}` by the sample
//! id; see [`render_output_path`].

pub mod overlay;

use std::path::{Path, PathBuf};

use image::DynamicImage;
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::dataset::HarlequinDataset;
use crate::error::HarlequinError;
use crate::ir::io_coco_json::write_subset_json;
use crate::ir::ImageId;
use overlay::{draw_box, BoxStyle};

pub const IMAGE_FMT: &str = "image_{i}.png";
pub const ANNOTATION_FMT: &str = "annotation_{i}.png";
pub const DATA_FMT: &str = "data_{i}.json";

/// What to write for each sample.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum VisualizeMode {
    /// The raw image without annotations.
    Image,
    /// The image with target boxes drawn on it.
    Annotation,
    /// The image record and target annotations as JSON.
    Data,
}

impl VisualizeMode {
    pub fn default_template(self) -> &'static str {
        match self {
            VisualizeMode::Image => IMAGE_FMT,
            VisualizeMode::Annotation => ANNOTATION_FMT,
            VisualizeMode::Data => DATA_FMT,
        }
    }
}

/// Fills `template` with a sample's position and id.
///
/// Placeholders are `{i}` / `{index}` (sample position) and `{id}` (sample
/// id), optionally with a width: `{i:04d}` zero-pads to four digits,
/// `{id:6}` right-aligns to six columns. `{{` and `}}` are literal braces.
/// Any other placeholder is an [`HarlequinError::InvalidTemplate`].
pub fn render_output_path(
    template: &str,
    index: usize,
    id: ImageId,
) -> Result<PathBuf, HarlequinError> {
    let invalid = |message: String| HarlequinError::InvalidTemplate {
        template: template.to_string(),
        message,
    };

    let mut rendered = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                rendered.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                rendered.push('}');
            }
            '{' => {
                let mut field = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => field.push(ch),
                        None => return Err(invalid("unclosed '{'".to_string())),
                    }
                }

                let (name, spec) = field.split_once(':').unwrap_or((field.as_str(), ""));
                let value = match name {
                    "i" | "index" => index as u64,
                    "id" => id.as_u64(),
                    other => return Err(invalid(format!("unknown placeholder '{{{}}}'", other))),
                };
                let formatted = format_number(value, spec)
                    .ok_or_else(|| invalid(format!("unsupported format spec '{}'", spec)))?;
                rendered.push_str(&formatted);
            }
            '}' => return Err(invalid("unmatched '}'".to_string())),
            c => rendered.push(c),
        }
    }

    Ok(PathBuf::from(rendered))
}

/// Formats `value` per a `[0][width][d]` spec.
fn format_number(value: u64, spec: &str) -> Option<String> {
    let spec = spec.strip_suffix('d').unwrap_or(spec);
    if spec.is_empty() {
        return Some(value.to_string());
    }
    if !spec.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let width: usize = spec.parse().ok()?;
    if spec.starts_with('0') {
        Some(format!("{:0width$}", value, width = width))
    } else {
        Some(format!("{:>width$}", value, width = width))
    }
}

/// Saves the image of the sample at `index`.
pub fn save_image(
    dataset: &HarlequinDataset,
    index: usize,
    template: Option<&str>,
) -> Result<PathBuf, HarlequinError> {
    let id = dataset.get_id(index)?;
    let output = render_output_path(template.unwrap_or(IMAGE_FMT), index, id)?;

    let img = dataset.get_image(id)?;
    write_image(&img, &output)?;
    Ok(output)
}

/// Saves the image of the sample at `index` with its target boxes drawn.
///
/// The grounded phrase of each box is logged at debug level.
pub fn save_annotation(
    dataset: &HarlequinDataset,
    index: usize,
    template: Option<&str>,
) -> Result<PathBuf, HarlequinError> {
    let id = dataset.get_id(index)?;
    let output = render_output_path(template.unwrap_or(ANNOTATION_FMT), index, id)?;

    let record = dataset.get_image_annotation(id)?;
    let targets = dataset.get_target_annotations(id)?;
    let mut canvas = dataset.get_image(id)?.into_rgb8();

    let style = BoxStyle::default();
    for ann in &targets {
        draw_box(&mut canvas, &ann.bbox, &style);
        if let Some(query) = ann.primary_span().and_then(|s| s.extract(&record.caption)) {
            debug!("sample {} annotation {}: '{}'", id, ann.id, query);
        }
    }

    write_image(&DynamicImage::ImageRgb8(canvas), &output)?;
    Ok(output)
}

/// Writes the image record and target annotations of the sample at `index`
/// as JSON.
pub fn export_data(
    dataset: &HarlequinDataset,
    index: usize,
    template: Option<&str>,
) -> Result<PathBuf, HarlequinError> {
    let id = dataset.get_id(index)?;
    let output = render_output_path(template.unwrap_or(DATA_FMT), index, id)?;

    let record = dataset.get_image_annotation(id)?;
    let targets = dataset.get_target_annotations(id)?;
    write_subset_json(&output, &[record], &targets)?;
    debug!("wrote {}", output.display());
    Ok(output)
}

type SaveFn = fn(&HarlequinDataset, usize, Option<&str>) -> Result<PathBuf, HarlequinError>;

/// Runs `mode` over every index, returning the written paths in order.
///
/// Stops at the first failure.
pub fn show(
    dataset: &HarlequinDataset,
    indices: &[usize],
    mode: VisualizeMode,
    template: Option<&str>,
) -> Result<Vec<PathBuf>, HarlequinError> {
    let save: SaveFn = match mode {
        VisualizeMode::Image => save_image,
        VisualizeMode::Annotation => save_annotation,
        VisualizeMode::Data => export_data,
    };

    let pb = ProgressBar::new(indices.len() as u64).with_style(pb_style());
    let mut written = Vec::with_capacity(indices.len());
    for &index in indices {
        let path = save(dataset, index, template)?;
        pb.set_message(path.display().to_string());
        pb.inc(1);
        written.push(path);
    }
    pb.finish_and_clear();

    Ok(written)
}

fn write_image(img: &DynamicImage, path: &Path) -> Result<(), HarlequinError> {
    img.save(path).map_err(|source| HarlequinError::ImageWrite {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("wrote {}", path.display());
    Ok(())
}

fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}
