//! Image → mesh reconstruction stages
//!
//! Each stage is a pure function consuming the previous stage's output:
//! [`normalize_image`] → [`estimate_depth`] → [`build_volume`] → [`extract_surface`].

mod clahe;
pub mod config;
mod depth;
mod normalize;
pub mod surface;
pub mod types;
mod volume;

pub use clahe::equalize_adaptive;
pub use config::{ReconstructionConfig, ReconstructionConfigBuilder};
pub use depth::estimate_depth;
pub use normalize::normalize_image;
pub use surface::extract_surface;
pub use types::{DepthField, OccupancyVolume};
pub use volume::build_volume;
