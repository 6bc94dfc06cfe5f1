//! Image normalization: luminance, fixed resolution, denoise, local contrast.

use image::GrayImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use crate::model_pipeline::raster::RasterImage;
use crate::model_pipeline::reconstruction::clahe::equalize_adaptive;
use crate::model_pipeline::reconstruction::config::{ReconstructionConfig, sigma_for_kernel};

/// Produces the single-channel, fixed-size, contrast-enhanced image the
/// depth estimator works on. Order matters: each step assumes the previous.
pub fn normalize_image(raster: &RasterImage, config: &ReconstructionConfig) -> GrayImage {
    let gray = raster.as_dynamic().to_luma8();

    let resized = if gray.dimensions() == (config.target_width, config.target_height) {
        gray
    } else {
        imageops::resize(
            &gray,
            config.target_width,
            config.target_height,
            FilterType::Triangle,
        )
    };
    debug!(
        "Resized {}x{} -> {}x{}",
        raster.width(),
        raster.height(),
        resized.width(),
        resized.height()
    );

    let denoised = gaussian_blur(&resized, config.pre_blur_kernel);

    equalize_adaptive(&denoised, config.clahe_clip_limit, config.clahe_tile_grid)
}

/// Gaussian blur sized by an odd kernel width; a 1-wide kernel is the identity.
pub(crate) fn gaussian_blur(image: &GrayImage, kernel: u32) -> GrayImage {
    if kernel <= 1 {
        return image.clone();
    }
    imageproc::filter::gaussian_blur_f32(image, sigma_for_kernel(kernel))
}

#[cfg(test)]
mod tests {
    use image::{DynamicImage, Luma, Rgb, RgbImage};

    use super::*;
    use crate::model_pipeline::test_utils::draw_disc;

    fn small_config() -> ReconstructionConfig {
        ReconstructionConfig::builder().resolution(64, 48).build()
    }

    #[test]
    fn test_color_input_becomes_target_gray() {
        let rgb = RgbImage::from_fn(200, 120, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let raster = RasterImage::from(DynamicImage::ImageRgb8(rgb));

        let out = normalize_image(&raster, &small_config());

        assert_eq!(out.dimensions(), (64, 48));
    }

    #[test]
    fn test_normalization_is_near_fixed_point() {
        let config = ReconstructionConfig::default();
        let flat = GrayImage::from_pixel(256, 256, Luma([128]));

        let once = normalize_image(&RasterImage::from(flat), &config);
        let twice = normalize_image(&RasterImage::from(once.clone()), &config);

        let diffs: Vec<i32> = once
            .pixels()
            .zip(twice.pixels())
            .map(|(a, b)| (a[0] as i32 - b[0] as i32).abs())
            .collect();
        let mean = diffs.iter().sum::<i32>() as f64 / diffs.len() as f64;
        let max = *diffs.iter().max().unwrap();

        assert!(mean <= 4.0, "mean drift {mean}");
        assert!(max <= 5, "max drift {max}");
    }

    #[test]
    fn test_textured_image_is_near_fixed_point() {
        let config = ReconstructionConfig::default();
        let disc = draw_disc(256, 256, [128.0, 128.0], 77.0, 230, 20);

        let once = normalize_image(&RasterImage::from(disc), &config);
        let twice = normalize_image(&RasterImage::from(once.clone()), &config);

        let mut diffs: Vec<i32> = once
            .pixels()
            .zip(twice.pixels())
            .map(|(a, b)| (a[0] as i32 - b[0] as i32).abs())
            .collect();
        diffs.sort_unstable();
        let mean = diffs.iter().sum::<i32>() as f64 / diffs.len() as f64;
        let p99 = diffs[diffs.len() * 99 / 100];

        // The rim is re-blurred on every pass, so drift concentrates there
        assert!(mean <= 8.0, "mean drift {mean}");
        assert!(p99 <= 35, "99th percentile drift {p99}");

        // Away from the rim the two levels stay well separated
        for (x, y, pixel) in twice.enumerate_pixels() {
            let d = ((x as f32 - 128.0).powi(2) + (y as f32 - 128.0).powi(2)).sqrt();
            if d <= 73.0 {
                assert!(pixel[0] >= 200, "inside ({x}, {y}) = {}", pixel[0]);
            } else if d >= 81.0 {
                assert!(pixel[0] <= 60, "outside ({x}, {y}) = {}", pixel[0]);
            }
        }
    }

    #[test]
    fn test_is_deterministic() {
        let image = GrayImage::from_fn(90, 70, |x, y| Luma([((x * x + y * 5) % 256) as u8]));
        let raster = RasterImage::from(image);

        let a = normalize_image(&raster, &small_config());
        let b = normalize_image(&raster, &small_config());

        assert_eq!(a, b);
    }

    #[test]
    fn test_unit_kernel_skips_blur() {
        let image = GrayImage::from_fn(9, 9, |x, y| Luma([((x + y) * 10) as u8]));
        assert_eq!(gaussian_blur(&image, 1), image);
    }
}
