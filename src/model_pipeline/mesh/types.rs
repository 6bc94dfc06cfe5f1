//! Mesh data types

use std::fmt;
use std::str::FromStr;

use crate::model_pipeline::common::error::{ConversionError, Result};

/// Indexed triangle mesh. Faces reference `vertices` by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceMesh {
    pub vertices: Vec<[f32; 3]>,
    pub faces: Vec<[u32; 3]>,
}

impl SurfaceMesh {
    pub fn new(vertices: Vec<[f32; 3]>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Checks that every face index points into the vertex list.
    pub fn validate(&self) -> Result<()> {
        let count = self.vertices.len();
        for (i, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&idx| idx as usize >= count) {
                return Err(ConversionError::ExportError(format!(
                    "face {i} references vertex {bad}, mesh has {count}"
                )));
            }
        }
        Ok(())
    }

    /// Axis-aligned `(min, max)` corners, `None` without vertices.
    pub fn bounding_box(&self) -> Option<([f32; 3], [f32; 3])> {
        let first = *self.vertices.first()?;
        Some(self.vertices.iter().fold((first, first), |(mut lo, mut hi), v| {
            for axis in 0..3 {
                lo[axis] = lo[axis].min(v[axis]);
                hi[axis] = hi[axis].max(v[axis]);
            }
            (lo, hi)
        }))
    }

    /// Size of the bounding box along each axis.
    pub fn extent(&self) -> [f32; 3] {
        match self.bounding_box() {
            Some((lo, hi)) => [hi[0] - lo[0], hi[1] - lo[1], hi[2] - lo[2]],
            None => [0.0; 3],
        }
    }

    /// Corner positions of one face.
    pub fn triangle(&self, face: usize) -> [[f32; 3]; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    /// Unit normal by the right-hand rule, zero for degenerate faces.
    pub fn face_normal(&self, face: usize) -> [f32; 3] {
        let [a, b, c] = self.triangle(face);
        let u = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
        let v = [c[0] - a[0], c[1] - a[1], c[2] - a[2]];
        let n = [
            u[1] * v[2] - u[2] * v[1],
            u[2] * v[0] - u[0] * v[2],
            u[0] * v[1] - u[1] * v[0],
        ];
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > 0.0 {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            [0.0; 3]
        }
    }

    pub fn translate(&mut self, offset: [f32; 3]) {
        for v in &mut self.vertices {
            for axis in 0..3 {
                v[axis] += offset[axis];
            }
        }
    }

    /// Appends `other`, re-basing its face indices.
    pub fn append(&mut self, other: SurfaceMesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend(other.vertices);
        self.faces
            .extend(other.faces.into_iter().map(|[a, b, c]| [a + base, b + base, c + base]));
    }
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    /// Wavefront OBJ: text vertex and face lines, 1-based indices
    Obj,
    /// Binary STL: flat list of facets with normals
    Stl,
}

impl MeshFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MeshFormat::Obj => "obj",
            MeshFormat::Stl => "stl",
        }
    }

    /// Infers the format from a path's extension, case-insensitively.
    pub fn from_path(path: &std::path::Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .ok_or_else(|| {
                ConversionError::MeshLoadError(format!("{}: no file extension", path.display()))
            })?;
        ext.parse().map_err(|_| {
            ConversionError::MeshLoadError(format!("{}: unsupported format", path.display()))
        })
    }
}

impl fmt::Display for MeshFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MeshFormat {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "obj" => Ok(MeshFormat::Obj),
            "stl" => Ok(MeshFormat::Stl),
            other => Err(ConversionError::ExportError(format!("unsupported format '{other}'"))),
        }
    }
}
