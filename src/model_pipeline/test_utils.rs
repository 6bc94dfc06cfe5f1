//! Shared fixtures for image and mesh unit tests.

use std::collections::HashMap;
use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, Luma};

use crate::model_pipeline::mesh::types::SurfaceMesh;

/// Render a filled disc.
///
/// Pixels at distance `d <= radius` from `center` (x, y) get `fg_pix`,
/// everything else `bg_pix`.
pub(crate) fn draw_disc(
    w: u32,
    h: u32,
    center: [f32; 2],
    radius: f32,
    fg_pix: u8,
    bg_pix: u8,
) -> GrayImage {
    GrayImage::from_fn(w, h, |x, y| {
        let dx = x as f32 - center[0];
        let dy = y as f32 - center[1];
        if (dx * dx + dy * dy).sqrt() <= radius {
            Luma([fg_pix])
        } else {
            Luma([bg_pix])
        }
    })
}

pub(crate) fn encode_png(image: DynamicImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

/// Closed unit tetrahedron with outward winding.
pub(crate) fn tetrahedron() -> SurfaceMesh {
    SurfaceMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        vec![[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]],
    )
}

/// Every directed edge appears once and its reverse exists: closed and consistently wound.
pub(crate) fn assert_closed_and_oriented(mesh: &SurfaceMesh) {
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    for &[a, b, c] in &mesh.faces {
        for edge in [(a, b), (b, c), (c, a)] {
            *directed.entry(edge).or_default() += 1;
        }
    }
    for (&(a, b), &count) in &directed {
        assert_eq!(count, 1, "edge {a}->{b} used {count} times");
        assert!(directed.contains_key(&(b, a)), "edge {a}->{b} has no twin");
    }
}

/// Enclosed volume, positive when normals point outward.
pub(crate) fn signed_volume(mesh: &SurfaceMesh) -> f32 {
    (0..mesh.face_count())
        .map(|f| {
            let [a, b, c] = mesh.triangle(f);
            a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
                + a[2] * (b[0] * c[1] - b[1] * c[0])
        })
        .sum::<f32>()
        / 6.0
}
