//! Binary STL encoding via `stl_io`.
//!
//! STL stores an unindexed triangle soup; reading welds identical corner
//! positions back into shared vertices.

use std::io::{Read, Seek, Write};

use stl_io::{Normal, Triangle, Vertex};
use tracing::debug;

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::mesh::types::{MeshFormat, SurfaceMesh};
use crate::model_pipeline::mesh::writer::MeshWriter;

pub struct StlWriter;

impl MeshWriter for StlWriter {
    fn format(&self) -> MeshFormat {
        MeshFormat::Stl
    }

    fn write_mesh(&self, mesh: &SurfaceMesh, output: &mut dyn Write) -> Result<()> {
        debug!("Encoding STL: {} facets", mesh.face_count());
        mesh.validate()?;

        let triangles: Vec<Triangle> = (0..mesh.face_count())
            .map(|face| {
                let [a, b, c] = mesh.triangle(face);
                Triangle {
                    normal: Normal::new(mesh.face_normal(face)),
                    vertices: [Vertex::new(a), Vertex::new(b), Vertex::new(c)],
                }
            })
            .collect();

        let mut output = output;
        stl_io::write_stl(&mut output, triangles.iter())?;
        Ok(())
    }
}

/// Reads an STL stream (binary or ASCII) into an indexed mesh.
pub fn read_stl<R: Read + Seek>(input: &mut R) -> Result<SurfaceMesh> {
    let indexed = stl_io::read_stl(input)
        .map_err(|e| ConversionError::MeshLoadError(format!("STL: {e}")))?;

    let vertices = indexed
        .vertices
        .iter()
        .map(|v| [v[0], v[1], v[2]])
        .collect();
    let faces = indexed
        .faces
        .iter()
        .map(|f| f.vertices.map(|i| i as u32))
        .collect();

    Ok(SurfaceMesh::new(vertices, faces))
}
