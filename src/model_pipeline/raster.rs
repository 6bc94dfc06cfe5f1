//! Raster image reading module
//!
//! Decodes source photos into an in-memory raster the normalizer can consume.

mod reader;
mod image_reader;
pub mod types;

pub use reader::RasterReader;
pub use image_reader::ImageCrateReader;
pub use types::RasterImage;
