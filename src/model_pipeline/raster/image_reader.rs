//! Raster reader backed by the `image` crate.
//!
//! Supports every format the crate is built with (PNG, JPEG, BMP, TIFF, ...),
//! detected from the file's magic bytes rather than its extension.

use tracing::debug;

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::raster::reader::RasterReader;
use crate::model_pipeline::raster::types::RasterImage;

pub struct ImageCrateReader;

impl RasterReader for ImageCrateReader {
    /// Decodes `data` into a [`RasterImage`].
    ///
    /// Fails with [`ConversionError::DecodeError`] when the bytes are not a
    /// recognised image, and with [`ConversionError::InvalidDimensions`] when
    /// the decoded image has no pixels.
    fn read_raster(&self, data: &[u8]) -> Result<RasterImage> {
        debug!("Decoding image, {} bytes", data.len());

        let decoded = image::load_from_memory(data)
            .map_err(|e| ConversionError::DecodeError(e.to_string()))?;

        let (width, height) = (decoded.width() as usize, decoded.height() as usize);
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        debug!(
            "Decoded image: {}x{}, {} channel(s)",
            width,
            height,
            decoded.color().channel_count()
        );

        Ok(RasterImage::new(decoded))
    }
}
