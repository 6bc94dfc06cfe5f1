//! Edge-distance depth proxy.
//!
//! Canny edges act as obstacles; the Euclidean distance to the nearest edge
//! grows toward the interior of outlined shapes, so shape centres read as
//! "near" and silhouettes as "far". Deterministic and model-free.

use image::{ImageBuffer, Luma};
use imageproc::distance_transform::euclidean_squared_distance_transform;
use imageproc::edges::canny;
use tracing::{debug, warn};

use crate::model_pipeline::reconstruction::config::{ReconstructionConfig, sigma_for_kernel};
use crate::model_pipeline::reconstruction::types::DepthField;

/// Upper end of the intermediate distance normalization.
const DEPTH_SCALE: f32 = 255.0;

pub fn estimate_depth(image: &image::GrayImage, config: &ReconstructionConfig) -> DepthField {
    let (width, height) = image.dimensions();

    let edges = canny(image, config.canny_low, config.canny_high);
    let edge_pixels = edges.pixels().filter(|p| p[0] > 0).count();
    debug!("Canny found {} edge pixels", edge_pixels);

    if edge_pixels == 0 {
        warn!("No edges detected, depth field is flat");
        return DepthField::zeros(width as usize, height as usize);
    }

    // Edge pixels are the foreground the transform measures distance to.
    let squared = euclidean_squared_distance_transform(&edges);
    let distances: Vec<f32> = squared.pixels().map(|p| p[0].sqrt() as f32).collect();

    let max = distances.iter().copied().fold(0.0f32, f32::max);
    let scaled: Vec<f32> = if max > 0.0 {
        distances.iter().map(|d| d / max * DEPTH_SCALE).collect()
    } else {
        distances
    };

    let field: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(width, height, |x, y| Luma([scaled[(y * width + x) as usize]]));
    let smoothed = if config.depth_blur_kernel > 1 {
        imageproc::filter::gaussian_blur_f32(&field, sigma_for_kernel(config.depth_blur_kernel))
    } else {
        field
    };

    DepthField::new(width as usize, height as usize, smoothed.into_raw())
}
