//! Migrator Processing Library
//!
//! Raster work for the transform pipeline: decoding, EXIF orientation, resize
//! geometry, alpha masks, border overlays and PNG encoding, plus the table of
//! derivative recipes keyed by photo type.
//!
//! Everything here is synchronous and CPU bound. Async callers run it on the
//! blocking thread pool.

pub mod error;
pub mod image;
pub mod recipe;

pub use error::ProcessingError;
pub use self::image::{ImageCodec, RasterCodec, OUTPUT_CONTENT_TYPE};
pub use recipe::{Border, Geometry, Mask, RecipeTable, VariantKind, VariantRecipe};
