//! Resize geometry.

use crate::error::ProcessingError;
use crate::recipe::Geometry;
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

const FILTER: FilterType = FilterType::Lanczos3;

/// Output size of `ScaleShortestSide`: both sides multiplied by
/// `target / min(width, height)` and rounded.
pub fn shortest_side_dimensions(width: u32, height: u32, target: u32) -> (u32, u32) {
    let shortest = width.min(height).max(1) as f64;
    let scale = target as f64 / shortest;
    let scaled = |side: u32| ((side as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

/// Resize per `geometry`, returning RGBA pixels.
pub fn apply(img: &DynamicImage, geometry: Geometry) -> Result<RgbaImage, ProcessingError> {
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(ProcessingError::InvalidDimensions(format!(
            "{}x{}",
            width, height
        )));
    }

    let out = match geometry {
        Geometry::CoverSquare { size } => img.resize_to_fill(size, size, FILTER).to_rgba8(),
        Geometry::ContainSquare { size, background } => {
            let fitted = img.resize(size, size, FILTER).to_rgba8();
            let mut canvas = RgbaImage::from_pixel(size, size, Rgba(background));
            let x = (size - fitted.width()) / 2;
            let y = (size - fitted.height()) / 2;
            imageops::overlay(&mut canvas, &fitted, x as i64, y as i64);
            canvas
        }
        Geometry::ScaleShortestSide { target } => {
            let (w, h) = shortest_side_dimensions(width, height, target);
            img.resize_exact(w, h, FILTER).to_rgba8()
        }
    };

    tracing::debug!(
        from_width = width,
        from_height = height,
        to_width = out.width(),
        to_height = out.height(),
        geometry = ?geometry,
        "Resized image"
    );

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba(color)))
    }

    #[test]
    fn test_shortest_side_dimensions() {
        assert_eq!(shortest_side_dimensions(1000, 500, 300), (600, 300));
        assert_eq!(shortest_side_dimensions(500, 1000, 300), (300, 600));
        // 333 * 300/200 = 499.5 rounds up
        assert_eq!(shortest_side_dimensions(333, 200, 300), (500, 300));
        // Upscales small inputs too
        assert_eq!(shortest_side_dimensions(100, 150, 300), (300, 450));
    }

    #[test]
    fn test_cover_square_is_exact() {
        let out = apply(&solid(800, 400, [10, 20, 30, 255]), Geometry::CoverSquare { size: 64 }).unwrap();
        assert_eq!(out.dimensions(), (64, 64));
    }

    #[test]
    fn test_contain_square_pads_with_background() {
        let out = apply(
            &solid(200, 100, [0, 0, 0, 255]),
            Geometry::ContainSquare {
                size: 60,
                background: [255, 255, 255, 255],
            },
        )
        .unwrap();
        assert_eq!(out.dimensions(), (60, 60));
        // Letterbox bands above and below the 60x30 image
        assert_eq!(out.get_pixel(30, 2), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(30, 57), &Rgba([255, 255, 255, 255]));
        assert_eq!(out.get_pixel(30, 30), &Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_scale_shortest_side_output() {
        let out = apply(
            &solid(90, 60, [1, 2, 3, 255]),
            Geometry::ScaleShortestSide { target: 30 },
        )
        .unwrap();
        assert_eq!(out.dimensions(), (45, 30));
    }
}
