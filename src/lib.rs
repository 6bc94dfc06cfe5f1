pub mod logger;
pub mod model_pipeline;
