use std::path::PathBuf;

use tracing::{info, warn};

use crate::model_pipeline::common::timing::PipelineTimings;
use crate::model_pipeline::mesh::types::SurfaceMesh;

/// Outcome of a file conversion.
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub vertex_count: usize,
    pub face_count: usize,
    /// No triangles were produced. The file is still written.
    pub empty_surface: bool,
    pub timings: PipelineTimings,
}

impl ConversionReport {
    pub fn new(output_path: PathBuf, mesh: &SurfaceMesh, timings: PipelineTimings) -> Self {
        Self {
            output_path,
            vertex_count: mesh.vertex_count(),
            face_count: mesh.face_count(),
            empty_surface: mesh.is_empty(),
            timings,
        }
    }

    pub fn log_summary(&self) {
        if self.empty_surface {
            warn!(output = %self.output_path.display(), "Conversion produced an empty surface");
        } else {
            info!(
                output = %self.output_path.display(),
                vertices = self.vertex_count,
                faces = self.face_count,
                "Conversion complete"
            );
        }
        self.timings.log_summary();
    }
}
