//! Pipeline conversions module
//!
//! Orchestration of the photo → mesh and prompt → mesh conversions.

mod image_to_model;
mod report;
mod text_to_model;

#[cfg(test)]
mod tests;

pub use image_to_model::ImageToModelPipeline;
pub use report::ConversionReport;
pub use text_to_model::TextToModelPipeline;
