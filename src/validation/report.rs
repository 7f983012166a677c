//! Validation findings and their text / JSON renderings.

use std::fmt;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::ir::{AnnotationId, CategoryId, ImageId};

/// Findings in the order the checks produced them.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, code: IssueCode, context: IssueContext, message: impl Into<String>) {
        self.push(Severity::Error, code, context, message.into());
    }

    pub fn warning(&mut self, code: IssueCode, context: IssueContext, message: impl Into<String>) {
        self.push(Severity::Warning, code, context, message.into());
    }

    fn push(&mut self, severity: Severity, code: IssueCode, context: IssueContext, message: String) {
        self.issues.push(ValidationIssue {
            severity,
            code,
            context,
            message,
        });
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// No errors; warnings allowed.
    pub fn is_ok(&self) -> bool {
        self.error_count() == 0
    }

    /// No findings at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|i| i.code == code)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error_count": self.error_count(),
            "warning_count": self.warning_count(),
            "issues": self.issues,
        })
    }
}

/// Errors first, then warnings, each indented under a heading.
impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_clean() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Found {} error(s) and {} warning(s)",
            self.error_count(),
            self.warning_count()
        )?;

        for (heading, severity) in [("errors", Severity::Error), ("warnings", Severity::Warning)] {
            let mut group = self.with_severity(severity).peekable();
            if group.peek().is_none() {
                continue;
            }
            writeln!(f)?;
            writeln!(f, "{}:", heading)?;
            for issue in group {
                writeln!(f, "  {}", issue)?;
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub code: IssueCode,
    #[serde(serialize_with = "as_display")]
    pub context: IssueContext,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({}): {}", self.code, self.context, self.message)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Severity {
    /// The file loads, but something looks off.
    Warning,
    /// The accessor would fail or return wrong data for this record.
    Error,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    DuplicateImageId,
    DuplicateAnnotationId,
    DuplicateCategoryId,

    /// An annotation points at an image that does not exist.
    MissingImageRef,
    /// An annotation points at a category that does not exist.
    MissingCategoryRef,

    InvalidImageDimensions,
    EmptyFileName,
    EmptyCaption,

    EmptyCategoryName,
    DuplicateCategoryName,

    BBoxNotFinite,
    /// Width or height is zero or negative.
    InvalidBBoxSize,
    BBoxOutOfBounds,

    /// A token span starts after it ends.
    ReversedTokenSpan,
    /// A token span runs past the end of the caption.
    TokenSpanOutOfRange,

    MissingImageFile,
    UnreadableImageFile,
    /// Header dimensions differ from the recorded width/height.
    ImageSizeMismatch,
}

/// The record (or file) a finding is about.
#[derive(Clone, Debug, PartialEq)]
pub enum IssueContext {
    Image(ImageId),
    Annotation(AnnotationId),
    Category(CategoryId),
    ImageFile(PathBuf),
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Image(id) => write!(f, "image {}", id),
            IssueContext::Annotation(id) => write!(f, "annotation {}", id),
            IssueContext::Category(id) => write!(f, "category {}", id),
            IssueContext::ImageFile(path) => write!(f, "file {}", path.display()),
        }
    }
}

fn as_display<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
