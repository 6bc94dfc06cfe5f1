//! Parametric primitive meshes.
//!
//! All generators return closed meshes with outward winding, centred on the
//! origin except the cone, whose base sits on z = 0.

use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use tracing::debug;

use crate::model_pipeline::mesh::types::SurfaceMesh;
use crate::model_pipeline::text::prompt::{CustomObject, ShapeDescriptor, ShapeKind};

/// Angular resolution of revolved primitives.
pub const SEGMENTS: usize = 32;
/// Latitude rings per capsule hemisphere.
const CAP_RINGS: usize = 8;
const ICOSPHERE_SUBDIVISIONS: usize = 2;

const DEFAULT_EXTENT: f32 = 1.0;
const DEFAULT_HEIGHT: f32 = 1.0;
const DEFAULT_RADIUS: f32 = 0.5;

pub fn generate_shape(shape: &ShapeDescriptor) -> SurfaceMesh {
    let scale = shape.scale;

    if let Some(CustomObject::Car) = shape.custom {
        debug!("Building car at scale {}", scale);
        return car(scale);
    }

    let height = shape.height.unwrap_or(DEFAULT_HEIGHT) * scale;
    let radius = shape.radius.unwrap_or(DEFAULT_RADIUS) * scale;

    debug!("Building {} at scale {}", shape.kind, scale);
    match shape.kind {
        ShapeKind::Cube | ShapeKind::Box => cuboid([
            shape.width.unwrap_or(DEFAULT_EXTENT) * scale,
            shape.height.unwrap_or(DEFAULT_EXTENT) * scale,
            shape.depth.unwrap_or(DEFAULT_EXTENT) * scale,
        ]),
        ShapeKind::Cylinder => cylinder(radius, height),
        ShapeKind::Cone => cone(radius, height),
        ShapeKind::Capsule => capsule(radius, height),
        ShapeKind::Sphere => icosphere(radius, ICOSPHERE_SUBDIVISIONS),
    }
}

/// Axis-aligned box with the given full extents.
pub fn cuboid(extents: [f32; 3]) -> SurfaceMesh {
    // Corner i has bit 0 = +x, bit 1 = +y, bit 2 = +z
    let vertices = (0..8)
        .map(|i| {
            let mut v = [0.0; 3];
            for (axis, coord) in v.iter_mut().enumerate() {
                let sign = if (i >> axis) & 1 == 1 { 0.5 } else { -0.5 };
                *coord = sign * extents[axis];
            }
            v
        })
        .collect();

    const QUADS: [[u32; 4]; 6] = [
        [0, 4, 6, 2],
        [1, 3, 7, 5],
        [0, 1, 5, 4],
        [2, 6, 7, 3],
        [0, 2, 3, 1],
        [4, 5, 7, 6],
    ];
    let faces = QUADS
        .iter()
        .flat_map(|&[a, b, c, d]| [[a, b, c], [a, c, d]])
        .collect();

    SurfaceMesh::new(vertices, faces)
}

/// Cylinder along z, centred on the origin.
pub fn cylinder(radius: f32, height: f32) -> SurfaceMesh {
    let half = height / 2.0;
    revolve(&[[0.0, half], [radius, half], [radius, -half], [0.0, -half]], SEGMENTS)
}

/// Cone along z with its base on z = 0 and apex at z = height.
pub fn cone(radius: f32, height: f32) -> SurfaceMesh {
    revolve(&[[0.0, height], [radius, 0.0], [0.0, 0.0]], SEGMENTS)
}

/// Capsule along z. `height` is the distance between the hemisphere centres.
pub fn capsule(radius: f32, height: f32) -> SurfaceMesh {
    let half = height / 2.0;
    let mut profile = vec![[0.0, half + radius]];
    for k in 1..=CAP_RINGS {
        let phi = FRAC_PI_2 * k as f32 / CAP_RINGS as f32;
        profile.push([radius * phi.sin(), half + radius * phi.cos()]);
    }
    for k in 0..CAP_RINGS {
        let phi = FRAC_PI_2 + FRAC_PI_2 * k as f32 / CAP_RINGS as f32;
        profile.push([radius * phi.sin(), -half + radius * phi.cos()]);
    }
    profile.push([0.0, -half - radius]);
    revolve(&profile, SEGMENTS)
}

/// Surface of revolution about z.
///
/// `profile` lists `[radius, z]` points from the top pole to the bottom pole;
/// both ends must lie on the axis.
fn revolve(profile: &[[f32; 2]], segments: usize) -> SurfaceMesh {
    let rings = &profile[1..profile.len() - 1];
    let mut vertices = Vec::with_capacity(rings.len() * segments + 2);

    vertices.push([0.0, 0.0, profile[0][1]]);
    for &[r, z] in rings {
        for j in 0..segments {
            let theta = 2.0 * PI * j as f32 / segments as f32;
            vertices.push([r * theta.cos(), r * theta.sin(), z]);
        }
    }
    let bottom = vertices.len() as u32;
    vertices.push([0.0, 0.0, profile[profile.len() - 1][1]]);

    let ring_vertex = |ring: usize, j: usize| (1 + ring * segments + j % segments) as u32;
    let mut faces = Vec::with_capacity(2 * rings.len() * segments);

    for j in 0..segments {
        faces.push([0, ring_vertex(0, j), ring_vertex(0, j + 1)]);
    }
    for ring in 0..rings.len() - 1 {
        for j in 0..segments {
            let (a0, a1) = (ring_vertex(ring, j), ring_vertex(ring, j + 1));
            let (b0, b1) = (ring_vertex(ring + 1, j), ring_vertex(ring + 1, j + 1));
            faces.push([a0, b0, b1]);
            faces.push([a0, b1, a1]);
        }
    }
    let last = rings.len() - 1;
    for j in 0..segments {
        faces.push([bottom, ring_vertex(last, j + 1), ring_vertex(last, j)]);
    }

    SurfaceMesh::new(vertices, faces)
}

/// Geodesic sphere from a subdivided icosahedron.
pub fn icosphere(radius: f32, subdivisions: usize) -> SurfaceMesh {
    let t = (1.0 + 5.0f32.sqrt()) / 2.0;
    let mut vertices: Vec<[f32; 3]> = vec![
        [-1.0, t, 0.0],
        [1.0, t, 0.0],
        [-1.0, -t, 0.0],
        [1.0, -t, 0.0],
        [0.0, -1.0, t],
        [0.0, 1.0, t],
        [0.0, -1.0, -t],
        [0.0, 1.0, -t],
        [t, 0.0, -1.0],
        [t, 0.0, 1.0],
        [-t, 0.0, -1.0],
        [-t, 0.0, 1.0],
    ];
    let mut faces: Vec<[u32; 3]> = vec![
        [0, 11, 5], [0, 5, 1], [0, 1, 7], [0, 7, 10], [0, 10, 11],
        [1, 5, 9], [5, 11, 4], [11, 10, 2], [10, 7, 6], [7, 1, 8],
        [3, 9, 4], [3, 4, 2], [3, 2, 6], [3, 6, 8], [3, 8, 9],
        [4, 9, 5], [2, 4, 11], [6, 2, 10], [8, 6, 7], [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let mut midpoint = |a: u32, b: u32, vertices: &mut Vec<[f32; 3]>| {
            *midpoints.entry((a.min(b), a.max(b))).or_insert_with(|| {
                let (p, q) = (vertices[a as usize], vertices[b as usize]);
                vertices.push([(p[0] + q[0]) / 2.0, (p[1] + q[1]) / 2.0, (p[2] + q[2]) / 2.0]);
                (vertices.len() - 1) as u32
            })
        };

        faces = faces
            .iter()
            .flat_map(|&[a, b, c]| {
                let ab = midpoint(a, b, &mut vertices);
                let bc = midpoint(b, c, &mut vertices);
                let ca = midpoint(c, a, &mut vertices);
                [[a, ab, ca], [b, bc, ab], [c, ca, bc], [ab, bc, ca]]
            })
            .collect();
    }

    for v in &mut vertices {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        for coord in v.iter_mut() {
            *coord *= radius / len;
        }
    }

    SurfaceMesh::new(vertices, faces)
}

/// Body and cabin boxes plus four wheels whose axle runs along y.
pub fn car(scale: f32) -> SurfaceMesh {
    let scaled = |v: [f32; 3]| [v[0] * scale, v[1] * scale, v[2] * scale];

    let mut mesh = cuboid(scaled([2.0, 1.0, 0.5]));

    let mut cabin = cuboid(scaled([1.0, 0.8, 0.4]));
    cabin.translate(scaled([0.2, 0.0, 0.45]));
    mesh.append(cabin);

    const WHEEL_POSITIONS: [[f32; 3]; 4] = [
        [-0.5, -0.6, -0.2],
        [-0.5, 0.6, -0.2],
        [0.8, -0.6, -0.2],
        [0.8, 0.6, -0.2],
    ];
    for position in WHEEL_POSITIONS {
        let mut wheel = cylinder(0.25 * scale, 0.1 * scale);
        // Quarter turn about x: the z axis maps onto y
        for v in &mut wheel.vertices {
            *v = [v[0], -v[2], v[1]];
        }
        wheel.translate(scaled(position));
        mesh.append(wheel);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::model_pipeline::test_utils::{assert_closed_and_oriented, signed_volume};
    use crate::model_pipeline::text::prompt::parse_prompt;

    fn assert_extent(mesh: &SurfaceMesh, expected: [f32; 3]) {
        let extent = mesh.extent();
        for axis in 0..3 {
            assert_abs_diff_eq!(extent[axis], expected[axis], epsilon = 1e-4);
        }
    }

    #[test]
    fn test_cube_shares_corners() {
        let mesh = cuboid([1.0, 1.0, 1.0]);
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_count(), 12);
        assert_closed_and_oriented(&mesh);
        assert_abs_diff_eq!(signed_volume(&mesh), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_box_dimensions() {
        let shape = ShapeDescriptor {
            width: Some(2.0),
            height: Some(3.0),
            depth: Some(4.0),
            ..ShapeDescriptor::new(ShapeKind::Box)
        };
        let mesh = generate_shape(&shape);
        assert_extent(&mesh, [2.0, 3.0, 4.0]);
        assert_abs_diff_eq!(signed_volume(&mesh), 24.0, epsilon = 1e-3);
    }

    #[test]
    fn test_cylinder() {
        let mesh = cylinder(0.5, 1.0);
        assert_eq!(mesh.vertex_count(), 2 + 2 * SEGMENTS);
        assert_eq!(mesh.face_count(), 4 * SEGMENTS);
        assert_closed_and_oriented(&mesh);
        assert_extent(&mesh, [1.0, 1.0, 1.0]);
        // Inscribed 32-gon prism is a little smaller than pi r^2 h
        let volume = signed_volume(&mesh);
        assert!(volume > 0.77 && volume < PI * 0.25, "volume {volume}");
    }

    #[test]
    fn test_cone_base_on_ground() {
        let mesh = cone(0.5, 1.0);
        assert_closed_and_oriented(&mesh);
        let (lo, hi) = mesh.bounding_box().unwrap();
        assert_abs_diff_eq!(lo[2], 0.0);
        assert_abs_diff_eq!(hi[2], 1.0);
        assert!(signed_volume(&mesh) > 0.0);
    }

    #[test]
    fn test_capsule_length() {
        let mesh = capsule(0.5, 1.0);
        assert_closed_and_oriented(&mesh);
        assert_extent(&mesh, [1.0, 1.0, 2.0]);
        assert!(signed_volume(&mesh) > 0.0);
    }

    #[test]
    fn test_icosphere() {
        let mesh = icosphere(0.5, 2);
        assert_eq!(mesh.vertex_count(), 162);
        assert_eq!(mesh.face_count(), 320);
        assert_closed_and_oriented(&mesh);
        for v in &mesh.vertices {
            assert_abs_diff_eq!((v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt(), 0.5, epsilon = 1e-5);
        }
        assert!(signed_volume(&mesh) > 0.0);
    }

    #[test]
    fn test_large_ball_doubles_default_sphere() {
        let default_sphere = generate_shape(&ShapeDescriptor::new(ShapeKind::Sphere));
        let large_ball = generate_shape(&parse_prompt("a large ball"));

        let small = default_sphere.extent();
        let large = large_ball.extent();
        for axis in 0..3 {
            assert_abs_diff_eq!(large[axis], 2.0 * small[axis], epsilon = 1e-4);
        }
        assert_abs_diff_eq!(small[0], 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_car_parts() {
        let mesh = generate_shape(&parse_prompt("a red car"));
        assert_eq!(mesh.face_count(), 2 * 12 + 4 * 4 * SEGMENTS);
        assert_closed_and_oriented(&mesh);

        // Wheels stick out to y = 0.6 + 0.05 beyond the 1.0 wide body
        let (lo, hi) = mesh.bounding_box().unwrap();
        assert_abs_diff_eq!(lo[1], -0.65, epsilon = 1e-4);
        assert_abs_diff_eq!(hi[1], 0.65, epsilon = 1e-4);
        assert_abs_diff_eq!(hi[2], 0.65, epsilon = 1e-4);
        assert_abs_diff_eq!(lo[2], -0.45, epsilon = 1e-4);
    }

    #[test]
    fn test_scale_multiplies_offsets() {
        let unit = car(1.0).extent();
        let doubled = generate_shape(&parse_prompt("a big car")).extent();
        for axis in 0..3 {
            assert_abs_diff_eq!(doubled[axis], 2.0 * unit[axis], epsilon = 1e-4);
        }
    }
}
