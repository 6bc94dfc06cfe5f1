//! Text prompt → primitive shape module
//!
//! Keyword rules map a free-text description onto a [`ShapeDescriptor`],
//! which the generators turn into a closed mesh.

pub mod prompt;
pub mod primitives;

pub use prompt::{CustomObject, ShapeDescriptor, ShapeKind, parse_prompt};
pub use primitives::generate_shape;
