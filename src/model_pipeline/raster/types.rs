//! Raster image data types

use image::{DynamicImage, GrayImage};

/// A decoded source image. Immutable once loaded.
#[derive(Debug, Clone)]
pub struct RasterImage {
    image: DynamicImage,
}

impl RasterImage {
    pub fn new(image: DynamicImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> usize {
        self.image.width() as usize
    }

    pub fn height(&self) -> usize {
        self.image.height() as usize
    }

    /// Number of colour channels (1 gray, 2 gray+alpha, 3 RGB, 4 RGBA).
    pub fn channels(&self) -> u8 {
        self.image.color().channel_count()
    }

    pub fn as_dynamic(&self) -> &DynamicImage {
        &self.image
    }
}

impl From<DynamicImage> for RasterImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

impl From<GrayImage> for RasterImage {
    fn from(image: GrayImage) -> Self {
        Self::new(DynamicImage::ImageLuma8(image))
    }
}
