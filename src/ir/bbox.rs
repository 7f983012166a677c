//! Pixel-space bounding boxes in COCO `[x, y, width, height]` layout.

use serde::{Deserialize, Serialize};

/// An axis-aligned box with its origin at the top-left corner.
///
/// The box is kept exactly as the annotation file states it. Negative or
/// non-finite sizes are representable so validation can report them
/// instead of the parser rejecting the whole file.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    #[inline]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns `(xmin, ymin, xmax, ymax)`.
    #[inline]
    pub fn to_xyxy(&self) -> (f64, f64, f64, f64) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// May be negative if the box is malformed.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Returns true if both sides are strictly positive.
    #[inline]
    pub fn has_positive_size(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Returns true if the box lies inside a `width` x `height` image,
    /// allowing `tolerance` pixels of slack on every side.
    pub fn fits_within(&self, width: u32, height: u32, tolerance: f64) -> bool {
        let (xmin, ymin, xmax, ymax) = self.to_xyxy();
        xmin >= -tolerance
            && ymin >= -tolerance
            && xmax <= width as f64 + tolerance
            && ymax <= height as f64 + tolerance
    }
}

impl std::fmt::Debug for BBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "BBox[{}, {}, {}, {}]",
            self.x, self.y, self.width, self.height
        )
    }
}

impl Serialize for BBox {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.x, self.y, self.width, self.height].serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for BBox {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let [x, y, w, h] = <[f64; 4]>::deserialize(deserializer)?;
        Ok(BBox::from_xywh(x, y, w, h))
    }
}
