use crate::error::ProcessingError;
use crate::image::{geometry, mask, orientation::ImageOrientation};
use crate::recipe::VariantRecipe;
use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader, RgbaImage};
use std::io::Cursor;

/// Content type of everything a codec produces.
pub const OUTPUT_CONTENT_TYPE: &str = "image/png";

/// Decode, reshape and encode images.
///
/// Implementations are synchronous and CPU bound; callers on an async runtime
/// move them onto the blocking pool.
pub trait ImageCodec: Send + Sync {
    /// Decode any supported format, apply EXIF orientation, re-encode as PNG.
    fn normalize(&self, data: &[u8]) -> Result<Bytes, ProcessingError>;

    /// Render `recipe` against already normalized bytes, encoded as PNG.
    fn render(&self, data: &[u8], recipe: &VariantRecipe) -> Result<Bytes, ProcessingError>;
}

/// `ImageCodec` backed by the `image` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    pub fn new() -> Self {
        Self
    }

    fn decode(data: &[u8]) -> Result<DynamicImage, ProcessingError> {
        let img = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?
            .decode()?;
        Ok(img)
    }

    fn encode_png(img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let (width, height) = img.dimensions();
        let mut buffer = Vec::with_capacity((width * height * 4) as usize);
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|e| ProcessingError::Encode(e.to_string()))?;
        Ok(Bytes::from(buffer))
    }
}

impl ImageCodec for RasterCodec {
    fn normalize(&self, data: &[u8]) -> Result<Bytes, ProcessingError> {
        let img = Self::decode(data)?;
        let img = ImageOrientation::apply_exif_orientation(img, data);
        Self::encode_png(&img)
    }

    fn render(&self, data: &[u8], recipe: &VariantRecipe) -> Result<Bytes, ProcessingError> {
        let img = Self::decode(data)?;
        let mut out: RgbaImage = geometry::apply(&img, recipe.geometry)?;
        mask::apply_mask(&mut out, recipe.mask);
        if let Some(border) = &recipe.border {
            mask::draw_border(&mut out, border);
        }

        tracing::debug!(
            variant = ?recipe.kind,
            width = out.width(),
            height = out.height(),
            "Rendered variant"
        );

        Self::encode_png(&DynamicImage::ImageRgba8(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn jpeg(width: u32, height: u32) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([200, 40, 40]),
        ));
        let mut buffer = Vec::new();
        img.write_to(&mut Cursor::new(&mut buffer), ImageFormat::Jpeg)
            .unwrap();
        buffer
    }

    fn decode(bytes: &[u8]) -> DynamicImage {
        image::load_from_memory_with_format(bytes, ImageFormat::Png).unwrap()
    }

    #[test]
    fn test_normalize_reencodes_as_png() {
        let out = RasterCodec::new().normalize(&jpeg(32, 16)).unwrap();
        assert_eq!(image::guess_format(&out).unwrap(), ImageFormat::Png);
        assert_eq!(decode(&out).dimensions(), (32, 16));
    }

    #[test]
    fn test_normalize_rejects_garbage() {
        let result = RasterCodec::new().normalize(b"definitely not an image");
        assert!(matches!(result, Err(ProcessingError::Decode(_))));
    }

    #[test]
    fn test_render_circle_is_square_and_transparent_outside() {
        let codec = RasterCodec::new();
        let normalized = codec.normalize(&jpeg(120, 80)).unwrap();
        let out = codec
            .render(&normalized, &VariantRecipe::circle(50, "circle"))
            .unwrap();
        let img = decode(&out).to_rgba8();
        assert_eq!(img.dimensions(), (50, 50));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(49, 49)[3], 0);
        assert_eq!(img.get_pixel(25, 25)[3], 255);
    }

    #[test]
    fn test_render_rounded_card() {
        let codec = RasterCodec::new();
        let normalized = codec.normalize(&jpeg(100, 50)).unwrap();
        let out = codec
            .render(&normalized, &VariantRecipe::rounded_card(120, "rounded-corners"))
            .unwrap();
        let img = decode(&out).to_rgba8();
        assert_eq!(img.dimensions(), (120, 120));
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        // Stroke on top of the white letterbox band
        assert_eq!(img.get_pixel(60, 0), &Rgba([0xD5, 0xD9, 0xD9, 0xFF]));
        assert_eq!(img.get_pixel(60, 5), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_render_representative_dimensions() {
        let codec = RasterCodec::new();
        let normalized = codec.normalize(&jpeg(90, 60)).unwrap();
        let out = codec
            .render(&normalized, &VariantRecipe::representative(30, "representative"))
            .unwrap();
        assert_eq!(decode(&out).dimensions(), (45, 30));
    }
}
