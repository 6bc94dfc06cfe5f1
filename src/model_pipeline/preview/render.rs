//! Software rasterizer for mesh previews.
//!
//! Orthographic view from a fixed azimuth/elevation, z-buffered, flat
//! Lambert shading. Faces are lit from both sides so meshes with mixed
//! winding still read correctly.

use std::path::Path;

use image::{Rgb, RgbImage};
use tracing::{info, instrument, warn};

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::mesh::{SurfaceMesh, load_mesh};

const AZIMUTH_DEG: f32 = 35.0;
const ELEVATION_DEG: f32 = 30.0;
/// Fraction of the image the model's bounding sphere spans.
const FILL: f32 = 0.9;
const AMBIENT: f32 = 0.2;
const LIGHT: [f32; 3] = [0.3, 0.5, 0.81];

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const SURFACE: [f32; 3] = [90.0, 150.0, 220.0];

/// Which renderer produced a preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Shaded,
    PointCloud,
}

/// Maps model space onto pixel coordinates plus a view depth (larger is nearer).
struct Camera {
    centre: [f32; 3],
    scale: f32,
    half_size: f32,
    rotation: [[f32; 3]; 3],
}

impl Camera {
    fn fit(mesh: &SurfaceMesh, size: u32) -> Result<Self> {
        let (lo, hi) = mesh
            .bounding_box()
            .ok_or_else(|| ConversionError::RenderError("mesh has no vertices".to_string()))?;
        let centre = [(lo[0] + hi[0]) / 2.0, (lo[1] + hi[1]) / 2.0, (lo[2] + hi[2]) / 2.0];
        let diagonal = ((hi[0] - lo[0]).powi(2) + (hi[1] - lo[1]).powi(2) + (hi[2] - lo[2]).powi(2)).sqrt();
        if !diagonal.is_finite() {
            return Err(ConversionError::RenderError("non-finite vertex coordinates".to_string()));
        }

        let half_size = size as f32 / 2.0;
        // A single point still gets drawn, centred
        let scale = if diagonal > 0.0 { FILL * size as f32 / diagonal } else { 1.0 };

        let (az, el) = (AZIMUTH_DEG.to_radians(), ELEVATION_DEG.to_radians());
        let (sa, ca, se, ce) = (az.sin(), az.cos(), el.sin(), el.cos());
        // Turn about z by the azimuth, then tilt toward the viewer by the elevation
        let rotation = [
            [ca, -sa, 0.0],
            [sa * se, ca * se, ce],
            [-sa * ce, -ca * ce, se],
        ];

        Ok(Self { centre, scale, half_size, rotation })
    }

    fn rotate(&self, v: [f32; 3]) -> [f32; 3] {
        let r = &self.rotation;
        [
            r[0][0] * v[0] + r[0][1] * v[1] + r[0][2] * v[2],
            r[1][0] * v[0] + r[1][1] * v[1] + r[1][2] * v[2],
            r[2][0] * v[0] + r[2][1] * v[1] + r[2][2] * v[2],
        ]
    }

    fn project(&self, v: [f32; 3]) -> [f32; 3] {
        let local = [v[0] - self.centre[0], v[1] - self.centre[1], v[2] - self.centre[2]];
        let [x, y, z] = self.rotate(local);
        [
            self.half_size + x * self.scale,
            self.half_size - y * self.scale,
            z,
        ]
    }
}

fn edge(a: [f32; 3], b: [f32; 3], px: f32, py: f32) -> f32 {
    (b[0] - a[0]) * (py - a[1]) - (b[1] - a[1]) * (px - a[0])
}

/// Z-buffered flat-shaded render. Fails on meshes without faces.
pub fn render_shaded(mesh: &SurfaceMesh, size: u32) -> Result<RgbImage> {
    if mesh.is_empty() {
        return Err(ConversionError::RenderError("mesh has no faces".to_string()));
    }
    mesh.validate()
        .map_err(|e| ConversionError::RenderError(e.to_string()))?;
    let camera = Camera::fit(mesh, size)?;

    let mut image = RgbImage::from_pixel(size, size, BACKGROUND);
    let mut depth = vec![f32::NEG_INFINITY; (size * size) as usize];
    let light_len = (LIGHT[0] * LIGHT[0] + LIGHT[1] * LIGHT[1] + LIGHT[2] * LIGHT[2]).sqrt();

    for face in 0..mesh.face_count() {
        let normal = camera.rotate(mesh.face_normal(face));
        let lambert = ((normal[0] * LIGHT[0] + normal[1] * LIGHT[1] + normal[2] * LIGHT[2])
            / light_len)
            .abs();
        let shade = AMBIENT + (1.0 - AMBIENT) * lambert;
        let colour = Rgb(SURFACE.map(|c| (c * shade).round().clamp(0.0, 255.0) as u8));

        let [a, b, c] = mesh.triangle(face).map(|v| camera.project(v));
        let area = edge(a, b, c[0], c[1]);
        if area.abs() < f32::EPSILON {
            continue;
        }

        let min_x = a[0].min(b[0]).min(c[0]).floor().max(0.0) as u32;
        let max_x = a[0].max(b[0]).max(c[0]).ceil().min(size as f32 - 1.0).max(0.0) as u32;
        let min_y = a[1].min(b[1]).min(c[1]).floor().max(0.0) as u32;
        let max_y = a[1].max(b[1]).max(c[1]).ceil().min(size as f32 - 1.0).max(0.0) as u32;

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let w0 = edge(b, c, px, py) / area;
                let w1 = edge(c, a, px, py) / area;
                let w2 = edge(a, b, px, py) / area;
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }
                let z = w0 * a[2] + w1 * b[2] + w2 * c[2];
                let slot = (y * size + x) as usize;
                if z > depth[slot] {
                    depth[slot] = z;
                    image.put_pixel(x, y, colour);
                }
            }
        }
    }

    Ok(image)
}

/// Vertices as depth-tinted dots.
pub fn render_point_cloud(mesh: &SurfaceMesh, size: u32) -> Result<RgbImage> {
    let camera = Camera::fit(mesh, size)?;
    let projected: Vec<[f32; 3]> = mesh.vertices.iter().map(|&v| camera.project(v)).collect();

    let (near, far) = projected.iter().fold((f32::NEG_INFINITY, f32::INFINITY), |(n, f), p| {
        (n.max(p[2]), f.min(p[2]))
    });
    let span = if near > far { near - far } else { 1.0 };

    let mut image = RgbImage::from_pixel(size, size, BACKGROUND);
    for p in &projected {
        let (x, y) = (p[0].floor(), p[1].floor());
        if x < 0.0 || y < 0.0 || x >= size as f32 || y >= size as f32 {
            continue;
        }
        let closeness = (p[2] - far) / span;
        let tint = (200.0 * (1.0 - closeness)).round() as u8;
        image.put_pixel(x as u32, y as u32, Rgb([tint, tint, 255]));
    }

    Ok(image)
}

/// Renders the mesh file at `model_path` to the PNG at `output_path`.
#[instrument(skip(model_path, output_path))]
pub fn visualize(model_path: &Path, output_path: &Path, size: u32) -> Result<PreviewKind> {
    let mesh = load_mesh(model_path)?;

    let (image, kind) = match render_shaded(&mesh, size) {
        Ok(image) => (image, PreviewKind::Shaded),
        Err(e) => {
            warn!("Shaded preview failed ({}), falling back to point cloud", e);
            (render_point_cloud(&mesh, size)?, PreviewKind::PointCloud)
        }
    };

    image
        .save(output_path)
        .map_err(|e| ConversionError::RenderError(format!("{}: {}", output_path.display(), e)))?;
    info!(output = %output_path.display(), kind = ?kind, "Preview written");
    Ok(kind)
}
