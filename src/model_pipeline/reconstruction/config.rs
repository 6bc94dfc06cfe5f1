//! Reconstruction configuration types

use crate::model_pipeline::common::error::{ConversionError, Result};

/// Tunables of the image → mesh reconstruction.
///
/// Every stage parameter is exposed so tests can run the pipeline at small
/// resolutions.
#[derive(Debug, Clone)]
pub struct ReconstructionConfig {
    /// Normalized image width in pixels
    pub target_width: u32,
    /// Normalized image height in pixels
    pub target_height: u32,
    /// Odd Gaussian kernel size applied before contrast enhancement (1 disables)
    pub pre_blur_kernel: u32,
    /// CLAHE clip limit, relative to a uniform histogram
    pub clahe_clip_limit: f32,
    /// CLAHE tile grid as (columns, rows)
    pub clahe_tile_grid: (u32, u32),
    /// Canny hysteresis low threshold
    pub canny_low: f32,
    /// Canny hysteresis high threshold
    pub canny_high: f32,
    /// Odd Gaussian kernel size applied to the depth field (1 disables)
    pub depth_blur_kernel: u32,
    /// Number of layers along the extrusion axis
    pub thickness: usize,
    /// Isovalue for surface extraction
    pub iso_level: f32,
    /// Reject decoded images larger than this on either side
    pub max_input_dimension: Option<usize>,
}

impl Default for ReconstructionConfig {
    fn default() -> Self {
        Self {
            target_width: 256,
            target_height: 256,
            pre_blur_kernel: 5,
            clahe_clip_limit: 2.0,
            clahe_tile_grid: (8, 8),
            canny_low: 50.0,
            canny_high: 150.0,
            depth_blur_kernel: 15,
            thickness: 10,
            iso_level: 0.5,
            max_input_dimension: Some(50000),
        }
    }
}

impl ReconstructionConfig {
    pub fn builder() -> ReconstructionConfigBuilder {
        ReconstructionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(ConversionError::InvalidConfig(msg));

        if self.target_width == 0 || self.target_height == 0 {
            return invalid(format!(
                "target resolution must be non-zero, got {}x{}",
                self.target_width, self.target_height
            ));
        }
        for (name, kernel) in [
            ("pre_blur_kernel", self.pre_blur_kernel),
            ("depth_blur_kernel", self.depth_blur_kernel),
        ] {
            if kernel == 0 || kernel % 2 == 0 {
                return invalid(format!("{name} must be a positive odd size, got {kernel}"));
            }
        }
        if !(self.clahe_clip_limit > 0.0) || !self.clahe_clip_limit.is_finite() {
            return invalid(format!(
                "clahe_clip_limit must be positive, got {}",
                self.clahe_clip_limit
            ));
        }
        if self.clahe_tile_grid.0 == 0 || self.clahe_tile_grid.1 == 0 {
            return invalid("clahe_tile_grid must be non-zero".to_string());
        }
        if !(self.canny_low >= 0.0) || self.canny_low > self.canny_high {
            return invalid(format!(
                "canny thresholds must satisfy 0 <= low <= high, got {}/{}",
                self.canny_low, self.canny_high
            ));
        }
        if self.thickness == 0 {
            return invalid("thickness must be at least 1".to_string());
        }
        if !self.iso_level.is_finite() {
            return invalid(format!("iso_level must be finite, got {}", self.iso_level));
        }
        Ok(())
    }
}

/// Builder for ReconstructionConfig
#[derive(Default)]
pub struct ReconstructionConfigBuilder {
    resolution: Option<(u32, u32)>,
    pre_blur_kernel: Option<u32>,
    clahe_clip_limit: Option<f32>,
    clahe_tile_grid: Option<(u32, u32)>,
    canny_thresholds: Option<(f32, f32)>,
    depth_blur_kernel: Option<u32>,
    thickness: Option<usize>,
    iso_level: Option<f32>,
    max_input_dimension: Option<Option<usize>>,
}

impl ReconstructionConfigBuilder {
    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn pre_blur_kernel(mut self, kernel: u32) -> Self {
        self.pre_blur_kernel = Some(kernel);
        self
    }

    pub fn clahe_clip_limit(mut self, clip_limit: f32) -> Self {
        self.clahe_clip_limit = Some(clip_limit);
        self
    }

    pub fn clahe_tile_grid(mut self, columns: u32, rows: u32) -> Self {
        self.clahe_tile_grid = Some((columns, rows));
        self
    }

    pub fn canny_thresholds(mut self, low: f32, high: f32) -> Self {
        self.canny_thresholds = Some((low, high));
        self
    }

    pub fn depth_blur_kernel(mut self, kernel: u32) -> Self {
        self.depth_blur_kernel = Some(kernel);
        self
    }

    pub fn thickness(mut self, thickness: usize) -> Self {
        self.thickness = Some(thickness);
        self
    }

    pub fn iso_level(mut self, level: f32) -> Self {
        self.iso_level = Some(level);
        self
    }

    pub fn max_input_dimension(mut self, max: Option<usize>) -> Self {
        self.max_input_dimension = Some(max);
        self
    }

    pub fn build(self) -> ReconstructionConfig {
        let default = ReconstructionConfig::default();
        let (target_width, target_height) = self
            .resolution
            .unwrap_or((default.target_width, default.target_height));
        let (canny_low, canny_high) = self
            .canny_thresholds
            .unwrap_or((default.canny_low, default.canny_high));
        ReconstructionConfig {
            target_width,
            target_height,
            pre_blur_kernel: self.pre_blur_kernel.unwrap_or(default.pre_blur_kernel),
            clahe_clip_limit: self.clahe_clip_limit.unwrap_or(default.clahe_clip_limit),
            clahe_tile_grid: self.clahe_tile_grid.unwrap_or(default.clahe_tile_grid),
            canny_low,
            canny_high,
            depth_blur_kernel: self.depth_blur_kernel.unwrap_or(default.depth_blur_kernel),
            thickness: self.thickness.unwrap_or(default.thickness),
            iso_level: self.iso_level.unwrap_or(default.iso_level),
            max_input_dimension: self.max_input_dimension.unwrap_or(default.max_input_dimension),
        }
    }
}

/// Gaussian sigma implied by an odd kernel size, using the usual
/// `0.3 * ((k - 1) / 2 - 1) + 0.8` rule for a zero sigma request.
pub fn sigma_for_kernel(kernel: u32) -> f32 {
    0.3 * ((kernel as f32 - 1.0) * 0.5 - 1.0) + 0.8
}
