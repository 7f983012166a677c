//! Grounding links between caption text and annotated regions.

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range into an image caption.
///
/// Offsets count characters (Unicode scalar values), not bytes, so they
/// stay meaningful for captions outside ASCII. In COCO JSON a span is the
/// two-element array `[start, end]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TokenSpan {
    pub start: usize,
    pub end: usize,
}

impl TokenSpan {
    #[inline]
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns true if the span is ordered and ends inside a caption of
    /// `caption_len` characters.
    #[inline]
    pub fn is_within(&self, caption_len: usize) -> bool {
        self.start <= self.end && self.end <= caption_len
    }

    /// Extracts the spanned text from `caption`.
    ///
    /// Returns `None` when the span is reversed or runs past the caption.
    pub fn extract<'a>(&self, caption: &'a str) -> Option<&'a str> {
        if self.start > self.end {
            return None;
        }
        let start = char_to_byte(caption, self.start)?;
        let end = char_to_byte(caption, self.end)?;
        Some(&caption[start..end])
    }
}

/// Byte offset of the `n`th character, or `caption.len()` for `n == chars`.
fn char_to_byte(caption: &str, n: usize) -> Option<usize> {
    caption
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(caption.len()))
        .nth(n)
}

impl Serialize for TokenSpan {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.start, self.end].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TokenSpan {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [start, end] = <[usize; 2]>::deserialize(deserializer)?;
        Ok(TokenSpan::new(start, end))
    }
}
