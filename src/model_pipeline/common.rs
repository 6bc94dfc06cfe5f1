//! Common utilities module
//!
//! This module contains the error type and stage timing shared by both
//! conversion pipelines.

pub mod error;
pub mod timing;

pub use error::{ConversionError, Result};
pub use timing::{PipelineTimings, Stage, StepTiming, Timer};
