//! Isosurface extraction by marching cubes.

mod tables;

use std::collections::HashMap;

use tracing::debug;

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::mesh::SurfaceMesh;
use crate::model_pipeline::reconstruction::types::OccupancyVolume;

pub use tables::{CORNER_OFFSETS, EDGE_CORNERS, TRI_TABLE};

/// Extracts the `level` isosurface of `volume`.
///
/// Vertices are in volume index space `[row, col, layer]`, one per crossed
/// lattice edge and shared by every triangle touching it. Triangles are wound
/// so their normals point from occupied (>= level) toward empty space.
///
/// A uniform volume yields an empty mesh. Otherwise `level` must lie strictly
/// inside the volume's value range.
pub fn extract_surface(volume: &OccupancyVolume, level: f32) -> Result<SurfaceMesh> {
    let Some((min, max)) = volume.range() else {
        return Ok(SurfaceMesh::default());
    };
    if !level.is_finite() {
        return Err(ConversionError::IsoLevelOutOfRange { level, min, max });
    }
    if min == max {
        debug!(value = min, "Uniform volume, no surface to extract");
        return Ok(SurfaceMesh::default());
    }
    if !(level > min && level < max) {
        return Err(ConversionError::IsoLevelOutOfRange { level, min, max });
    }

    let (rows, cols, layers) = volume.shape();
    if rows < 2 || cols < 2 || layers < 2 {
        return Ok(SurfaceMesh::default());
    }

    let mut extractor = Extractor {
        volume,
        level,
        mesh: SurfaceMesh::default(),
        edge_vertices: HashMap::new(),
    };

    for row in 0..rows - 1 {
        for col in 0..cols - 1 {
            for layer in 0..layers - 1 {
                extractor.march_cell([row, col, layer]);
            }
        }
    }

    debug!(
        vertices = extractor.mesh.vertex_count(),
        faces = extractor.mesh.face_count(),
        "Marching cubes complete"
    );
    Ok(extractor.mesh)
}

/// Case index of a cell: bit `i` set when corner `i` is below `level`.
pub fn cell_case(corner_values: &[f32; 8], level: f32) -> usize {
    corner_values
        .iter()
        .enumerate()
        .filter(|(_, v)| **v < level)
        .fold(0, |case, (i, _)| case | (1 << i))
}

struct Extractor<'a> {
    volume: &'a OccupancyVolume,
    level: f32,
    mesh: SurfaceMesh,
    /// (flat index of the edge's lower endpoint, axis) -> vertex index
    edge_vertices: HashMap<(usize, usize), u32>,
}

impl Extractor<'_> {
    fn march_cell(&mut self, origin: [usize; 3]) {
        let corners = CORNER_OFFSETS.map(|off| [origin[0] + off[0], origin[1] + off[1], origin[2] + off[2]]);
        let values = corners.map(|[r, c, l]| self.volume.get(r, c, l));

        let triangles = TRI_TABLE[cell_case(&values, self.level)];
        for tri in triangles.chunks_exact(3) {
            let face = [
                self.edge_vertex(&corners, &values, tri[0]),
                self.edge_vertex(&corners, &values, tri[1]),
                self.edge_vertex(&corners, &values, tri[2]),
            ];
            self.mesh.faces.push(face);
        }
    }

    fn edge_vertex(&mut self, corners: &[[usize; 3]; 8], values: &[f32; 8], edge: u8) -> u32 {
        let [a, b] = EDGE_CORNERS[edge as usize];
        let (pa, pb) = (corners[a], corners[b]);
        let axis = (0..3).find(|&i| pa[i] != pb[i]).unwrap_or(0);
        let lower = if pa[axis] < pb[axis] { pa } else { pb };
        let key = (self.volume.index(lower[0], lower[1], lower[2]), axis);

        if let Some(&idx) = self.edge_vertices.get(&key) {
            return idx;
        }

        let (va, vb) = (values[a], values[b]);
        let t = if vb != va { (self.level - va) / (vb - va) } else { 0.5 };
        let position = [0, 1, 2].map(|i| pa[i] as f32 + t * (pb[i] as f32 - pa[i] as f32));

        let idx = self.mesh.vertices.len() as u32;
        self.mesh.vertices.push(position);
        self.edge_vertices.insert(key, idx);
        idx
    }
}
