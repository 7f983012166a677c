//! Box overlays drawn straight into RGB buffers.

use image::{Rgb, RgbImage};

use crate::ir::BBox;

/// Outline style for target boxes.
#[derive(Clone, Copy, Debug)]
pub struct BoxStyle {
    pub color: Rgb<u8>,
    pub thickness: u32,
    /// Opacity of the outline, `0.0..=1.0`.
    pub alpha: f32,
}

impl Default for BoxStyle {
    fn default() -> Self {
        Self {
            color: Rgb([0, 0, 255]),
            thickness: 3,
            alpha: 0.5,
        }
    }
}

/// Converts a box to inclusive pixel bounds `[x0, y0, x1, y1]`, clamped to
/// a `w` x `h` image.
///
/// Returns `None` for non-finite boxes, empty boxes and boxes entirely
/// outside the image.
pub fn box_to_pixels(bbox: &BBox, (w, h): (u32, u32)) -> Option<[u32; 4]> {
    if !bbox.is_finite() || !bbox.has_positive_size() || w == 0 || h == 0 {
        return None;
    }
    let (xmin, ymin, xmax, ymax) = bbox.to_xyxy();
    if xmax <= 0.0 || ymax <= 0.0 || xmin >= w as f64 || ymin >= h as f64 {
        return None;
    }

    let clamp = |v: f64, max: u32| -> u32 { v.max(0.0).min((max - 1) as f64) as u32 };
    Some([
        clamp(xmin.floor(), w),
        clamp(ymin.floor(), h),
        clamp(xmax.ceil() - 1.0, w),
        clamp(ymax.ceil() - 1.0, h),
    ])
}

/// Draws the outline of `bbox` onto `img`, blending every border pixel once.
pub fn draw_box(img: &mut RgbImage, bbox: &BBox, style: &BoxStyle) {
    let Some([x0, y0, x1, y1]) = box_to_pixels(bbox, img.dimensions()) else {
        return;
    };
    let t = style.thickness.max(1);

    for y in y0..=y1 {
        let on_edge_row = y - y0 < t || y1 - y < t;
        for x in x0..=x1 {
            if on_edge_row || x - x0 < t || x1 - x < t {
                let pixel = img.get_pixel_mut(x, y);
                *pixel = blend(*pixel, style.color, style.alpha);
            }
        }
    }
}

fn blend(under: Rgb<u8>, over: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    let alpha = alpha.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| -> u8 { (a as f32 * (1.0 - alpha) + b as f32 * alpha).round() as u8 };
    Rgb([
        mix(under.0[0], over.0[0]),
        mix(under.0[1], over.0[1]),
        mix(under.0[2], over.0[2]),
    ])
}
