use std::io::Write;

use crate::model_pipeline::common::error::Result;
use crate::model_pipeline::mesh::types::{MeshFormat, SurfaceMesh};

pub trait MeshWriter {
    fn format(&self) -> MeshFormat;
    fn write_mesh(&self, mesh: &SurfaceMesh, output: &mut dyn Write) -> Result<()>;
}
