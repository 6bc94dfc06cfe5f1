//! Mesh preview rendering
//!
//! Renders a saved mesh to a PNG, falling back to a point cloud of its
//! vertices when the shaded render is not possible.

mod render;

pub use render::{PreviewKind, render_point_cloud, render_shaded, visualize};
