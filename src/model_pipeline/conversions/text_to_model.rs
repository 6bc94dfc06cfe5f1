use std::io::Write;
use std::path::Path;

use tracing::{info, instrument};

use crate::model_pipeline::{
    common::error::Result,
    common::timing::{PipelineTimings, Stage},
    conversions::report::ConversionReport,
    mesh::{FormatWriter, MeshFormat, MeshWriter, SurfaceMesh, output_path_for, write_mesh_file},
    text::{ShapeDescriptor, generate_shape, parse_prompt},
};

pub struct TextToModelPipeline<W: MeshWriter> {
    writer: W,
}

impl TextToModelPipeline<FormatWriter> {
    pub fn new(format: MeshFormat) -> Self {
        Self {
            writer: FormatWriter(format),
        }
    }
}

impl<W: MeshWriter> TextToModelPipeline<W> {
    pub fn with_custom(writer: W) -> Self {
        Self { writer }
    }

    /// Parses `prompt` and builds the matching primitive.
    pub fn generate(
        &self,
        prompt: &str,
        timings: &mut PipelineTimings,
    ) -> (ShapeDescriptor, SurfaceMesh) {
        let shape = {
            let _span = tracing::info_span!("parse_prompt").entered();
            timings.time(Stage::ParsePrompt, || parse_prompt(prompt))
        };
        info!(kind = %shape.kind, scale = shape.scale, "Prompt parsed");

        let mesh = {
            let _span = tracing::info_span!("generate_shape").entered();
            timings.time(Stage::GenerateShape, || generate_shape(&shape))
        };
        (shape, mesh)
    }

    #[instrument(skip(self, output))]
    pub fn convert(&self, prompt: &str, output: &mut dyn Write) -> Result<SurfaceMesh> {
        let mut timings = PipelineTimings::new();
        let (_, mesh) = self.generate(prompt, &mut timings);

        {
            let _span = tracing::info_span!("encode_mesh").entered();
            self.writer.write_mesh(&mesh, output)?;
        }
        Ok(mesh)
    }

    /// Builds the shape for `prompt` and writes it to `<output_base>.<ext>`.
    #[instrument(skip(self, output_base))]
    pub fn convert_file<Q: AsRef<Path>>(
        &self,
        prompt: &str,
        output_base: Q,
    ) -> Result<ConversionReport> {
        let output_path = output_path_for(output_base.as_ref(), self.writer.format());
        let mut timings = PipelineTimings::new();

        let (_, mesh) = self.generate(prompt, &mut timings);

        {
            let _span = tracing::info_span!("write_output_file").entered();
            timings.time(Stage::Export, || {
                write_mesh_file(&self.writer, &mesh, &output_path)
            })?;
        }

        Ok(ConversionReport::new(output_path, &mesh, timings))
    }
}
