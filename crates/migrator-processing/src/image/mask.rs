//! Anti-aliased alpha masks and border strokes.
//!
//! Coverage is computed analytically per pixel from a signed distance
//! (negative inside), sampled at the pixel centre. Fills ramp over the one
//! pixel just inside the edge, so a pixel whose centre lies outside the shape
//! is fully transparent.

use crate::recipe::{Border, Mask};
use image::RgbaImage;

/// Signed distance from `(px, py)` to a rounded rectangle with top-left
/// `(x, y)`, size `width`×`height` and corner `radius`.
pub fn rounded_rect_distance(
    px: f32,
    py: f32,
    (x, y, width, height): (f32, f32, f32, f32),
    radius: f32,
) -> f32 {
    let half_w = width / 2.0;
    let half_h = height / 2.0;
    let radius = radius.clamp(0.0, half_w.min(half_h));
    let qx = (px - (x + half_w)).abs() - (half_w - radius);
    let qy = (py - (y + half_h)).abs() - (half_h - radius);
    let outside = qx.max(0.0).hypot(qy.max(0.0));
    let inside = qx.max(qy).min(0.0);
    outside + inside - radius
}

fn fill_coverage(distance: f32) -> f32 {
    (-distance).clamp(0.0, 1.0)
}

fn stroke_coverage(distance: f32, width: f32) -> f32 {
    (width / 2.0 - distance.abs() + 0.5).clamp(0.0, 1.0)
}

/// Coverage of `mask` at pixel `(x, y)` of a `width`×`height` image.
pub fn mask_coverage(mask: Mask, x: u32, y: u32, width: u32, height: u32) -> f32 {
    let px = x as f32 + 0.5;
    let py = y as f32 + 0.5;
    let (w, h) = (width as f32, height as f32);
    match mask {
        Mask::None => 1.0,
        Mask::Circle => {
            let radius = w.min(h) / 2.0;
            let distance = (px - w / 2.0).hypot(py - h / 2.0) - radius;
            fill_coverage(distance)
        }
        Mask::RoundedRect { radius } => {
            fill_coverage(rounded_rect_distance(px, py, (0.0, 0.0, w, h), radius))
        }
    }
}

/// Destination-in: scale every pixel's alpha by the mask coverage.
pub fn apply_mask(img: &mut RgbaImage, mask: Mask) {
    if mask == Mask::None {
        return;
    }
    let (width, height) = img.dimensions();
    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let coverage = mask_coverage(mask, x, y, width, height);
        pixel[3] = (pixel[3] as f32 * coverage).round() as u8;
    }
}

/// Source-over a stroke of `border.color` along the border's rounded rectangle.
pub fn draw_border(img: &mut RgbaImage, border: &Border) {
    if border.width <= 0.0 {
        return;
    }
    let (width, height) = img.dimensions();
    let rect = (
        border.inset,
        border.inset,
        width as f32 - 2.0 * border.inset,
        height as f32 - 2.0 * border.inset,
    );
    let color_alpha = border.color[3] as f32 / 255.0;

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let distance = rounded_rect_distance(x as f32 + 0.5, y as f32 + 0.5, rect, border.radius);
        let src_a = stroke_coverage(distance, border.width) * color_alpha;
        if src_a <= 0.0 {
            continue;
        }
        let dst_a = pixel[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        for channel in 0..3 {
            let src = border.color[channel] as f32;
            let dst = pixel[channel] as f32;
            let blended = (src * src_a + dst * dst_a * (1.0 - src_a)) / out_a;
            pixel[channel] = blended.round().clamp(0.0, 255.0) as u8;
        }
        pixel[3] = (out_a * 255.0).round() as u8;
    }
}
