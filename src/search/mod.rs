//! Caption search.
//!
//! Searching is a linear scan over the samples in position order, testing
//! each caption against a compiled [`Pattern`]. Results come back in
//! ascending position order, each sample at most once.

mod report;

pub use report::{SearchReport, SearchRow};

use regex::{Regex, RegexBuilder};

use crate::dataset::HarlequinDataset;
use crate::error::HarlequinError;
use crate::ir::ImageId;

/// How a search string is turned into a [`Pattern`].
#[derive(Clone, Debug, Default)]
pub struct SearchOptions {
    /// Match regardless of letter case.
    pub ignore_case: bool,
    /// Treat the string as plain text instead of a regular expression.
    pub literal: bool,
}

/// A compiled caption pattern.
///
/// Patterns match anywhere inside a caption; anchor with `^` / `$` to
/// require a whole-caption match.
#[derive(Clone, Debug)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    /// Compiles `pattern` according to `opts`.
    ///
    /// # Errors
    /// Returns [`HarlequinError::InvalidPattern`] if the regular expression
    /// does not parse.
    pub fn new(pattern: &str, opts: &SearchOptions) -> Result<Self, HarlequinError> {
        let source = if opts.literal {
            regex::escape(pattern)
        } else {
            pattern.to_string()
        };

        let regex = RegexBuilder::new(&source)
            .case_insensitive(opts.ignore_case)
            .build()
            .map_err(|source| HarlequinError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self { regex })
    }

    pub fn is_match(&self, caption: &str) -> bool {
        self.regex.is_match(caption)
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self { regex }
    }
}

/// Positions and ids of the samples whose caption matched.
///
/// `indices[k]` and `ids[k]` describe the same sample.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchMatches {
    pub indices: Vec<usize>,
    pub ids: Vec<ImageId>,
}

impl SearchMatches {
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// `(index, id)` pairs in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ImageId)> + '_ {
        self.indices.iter().copied().zip(self.ids.iter().copied())
    }
}

/// Returns every sample of `dataset` whose caption matches `pattern`.
pub fn search(dataset: &HarlequinDataset, pattern: &Pattern) -> Result<SearchMatches, HarlequinError> {
    let mut matches = SearchMatches::default();

    for index in 0..dataset.len() {
        let id = dataset.get_id(index)?;
        let caption = &dataset.get_image_annotation(id)?.caption;

        if pattern.is_match(caption) {
            matches.indices.push(index);
            matches.ids.push(id);
        }
    }

    log::debug!(
        "pattern '{}' matched {} of {} captions",
        pattern.as_str(),
        matches.len(),
        dataset.len()
    );

    Ok(matches)
}
