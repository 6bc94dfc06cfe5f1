//! Depth field → column-filled occupancy volume.

use tracing::{debug, warn};

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::reconstruction::types::{DepthField, OccupancyVolume};

/// Extrudes `depth` into a `(height, width, thickness)` volume.
///
/// The field is rescaled to [0, 1] by its own min/max. Each column is solid
/// from layer 0 up to `floor(normalized * (thickness - 1))` inclusive. A flat
/// field (max == min) normalizes to all zeros, leaving only the base layer.
pub fn build_volume(depth: &DepthField, thickness: usize) -> Result<OccupancyVolume> {
    if thickness == 0 {
        return Err(ConversionError::InvalidConfig(
            "thickness must be at least 1".to_string(),
        ));
    }

    let mut volume = OccupancyVolume::empty(depth.height, depth.width, thickness);
    let Some((min, max)) = depth.range() else {
        return Ok(volume);
    };

    let span = max - min;
    let degenerate = !(span > 0.0) || !span.is_finite();
    if degenerate {
        warn!(min, max, "Depth field has no dynamic range, filling base layer only");
    }

    let top_layer = (thickness - 1) as f32;
    for row in 0..depth.height {
        for col in 0..depth.width {
            let normalized = if degenerate {
                0.0
            } else {
                ((depth.get(row, col) - min) / span).clamp(0.0, 1.0)
            };
            let fill_height = fill_height(normalized, top_layer, thickness);
            for layer in 0..=fill_height {
                volume.set(row, col, layer, 1.0);
            }
        }
    }

    debug!(
        height = depth.height,
        width = depth.width,
        thickness,
        "Built occupancy volume"
    );
    Ok(volume)
}

fn fill_height(normalized: f32, top_layer: f32, thickness: usize) -> usize {
    ((normalized * top_layer).floor() as usize).min(thickness - 1)
}
