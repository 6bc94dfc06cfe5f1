//! Photo and text to 3D mesh conversion
//!
//! Two pipelines share the mesh export stage:
//! - image: decode → normalize → depth estimate → occupancy volume → marching cubes
//! - text: keyword rules → parametric primitives

pub mod common;
pub mod conversions;
pub mod mesh;
pub mod preview;
pub mod raster;
pub mod reconstruction;
pub mod text;

#[cfg(test)]
pub(crate) mod test_utils;

pub use common::{
    ConversionError,
    PipelineTimings,
    Result,
    Stage,
};

pub use raster::{
    ImageCrateReader,
    RasterImage,
    RasterReader,
};

pub use reconstruction::{
    DepthField,
    OccupancyVolume,
    ReconstructionConfig,
    ReconstructionConfigBuilder,
};

pub use mesh::{
    FormatWriter,
    MeshFormat,
    MeshWriter,
    SurfaceMesh,
};

pub use text::{
    ShapeDescriptor,
    ShapeKind,
};

pub use conversions::{
    ConversionReport,
    ImageToModelPipeline,
    TextToModelPipeline,
};

pub use preview::PreviewKind;
