use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Input file not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to decode image: {0}")]
    DecodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Isosurface level {level} must lie strictly between volume min {min} and max {max}")]
    IsoLevelOutOfRange { level: f32, min: f32, max: f32 },

    #[error("Failed to export mesh: {0}")]
    ExportError(String),

    #[error("Failed to load mesh: {0}")]
    MeshLoadError(String),

    #[error("Failed to render preview: {0}")]
    RenderError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConversionError>;
