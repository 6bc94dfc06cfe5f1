//! Wavefront OBJ encoding.
//!
//! Only positions and triangular faces are written: `v x y z` lines followed
//! by `f a b c` lines with 1-based indices.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::mesh::types::{MeshFormat, SurfaceMesh};
use crate::model_pipeline::mesh::writer::MeshWriter;

pub struct ObjWriter;

impl MeshWriter for ObjWriter {
    fn format(&self) -> MeshFormat {
        MeshFormat::Obj
    }

    fn write_mesh(&self, mesh: &SurfaceMesh, output: &mut dyn Write) -> Result<()> {
        debug!(
            "Encoding OBJ: {} vertices, {} faces",
            mesh.vertex_count(),
            mesh.face_count()
        );
        mesh.validate()?;

        writeln!(output, "# {} vertices, {} faces", mesh.vertex_count(), mesh.face_count())?;
        for [x, y, z] in &mesh.vertices {
            writeln!(output, "v {x} {y} {z}")?;
        }
        for [a, b, c] in &mesh.faces {
            writeln!(output, "f {} {} {}", a + 1, b + 1, c + 1)?;
        }
        Ok(())
    }
}

/// Parses vertex and face lines from OBJ text.
///
/// Polygon faces are fan-triangulated. Face corners may carry `/vt/vn`
/// suffixes and negative (relative) indices; other statements are skipped.
pub fn read_obj(input: impl BufRead) -> Result<SurfaceMesh> {
    let mut mesh = SurfaceMesh::default();

    for (line_no, line) in input.lines().enumerate() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords = tokens
                    .take(3)
                    .map(|t| t.parse::<f32>())
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map_err(|e| parse_error(line_no, e))?;
                let [x, y, z] = coords[..] else {
                    return Err(parse_error(line_no, "vertex needs three coordinates"));
                };
                mesh.vertices.push([x, y, z]);
            }
            Some("f") => {
                let corners = tokens
                    .map(|t| resolve_index(t, mesh.vertex_count()))
                    .collect::<Option<Vec<u32>>>()
                    .ok_or_else(|| parse_error(line_no, "bad face index"))?;
                if corners.len() < 3 {
                    return Err(parse_error(line_no, "face needs at least three corners"));
                }
                for i in 1..corners.len() - 1 {
                    mesh.faces.push([corners[0], corners[i], corners[i + 1]]);
                }
            }
            _ => {}
        }
    }

    mesh.validate()
        .map_err(|e| ConversionError::MeshLoadError(e.to_string()))?;
    Ok(mesh)
}

fn resolve_index(token: &str, vertex_count: usize) -> Option<u32> {
    let raw: i64 = token.split('/').next()?.parse().ok()?;
    let idx = match raw {
        0 => return None,
        r if r > 0 => r - 1,
        r => vertex_count as i64 + r,
    };
    u32::try_from(idx).ok()
}

fn parse_error(line_no: usize, err: impl std::fmt::Display) -> ConversionError {
    ConversionError::MeshLoadError(format!("OBJ line {}: {}", line_no + 1, err))
}
