//! Image processing module
//!
//! - EXIF orientation correction (orientation)
//! - Resize geometry for each recipe (geometry)
//! - Anti-aliased alpha masks and border strokes (mask)
//! - The codec that chains them (codec)

pub mod codec;
pub mod geometry;
pub mod mask;
pub mod orientation;

pub use codec::{ImageCodec, RasterCodec, OUTPUT_CONTENT_TYPE};
pub use orientation::ImageOrientation;
