use std::io::Write;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::model_pipeline::{
    common::error::{ConversionError, Result},
    common::timing::{PipelineTimings, Stage},
    conversions::report::ConversionReport,
    mesh::{FormatWriter, MeshFormat, MeshWriter, SurfaceMesh, output_path_for, write_mesh_file},
    raster::{ImageCrateReader, RasterReader},
    reconstruction::{
        ReconstructionConfig, build_volume, estimate_depth, extract_surface, normalize_image,
    },
};

pub struct ImageToModelPipeline<R: RasterReader, W: MeshWriter> {
    reader: R,
    writer: W,
    config: ReconstructionConfig,
}

impl ImageToModelPipeline<ImageCrateReader, FormatWriter> {
    pub fn new(config: ReconstructionConfig, format: MeshFormat) -> Self {
        Self {
            reader: ImageCrateReader,
            writer: FormatWriter(format),
            config,
        }
    }
}

impl<R: RasterReader, W: MeshWriter> ImageToModelPipeline<R, W> {
    pub fn with_custom(reader: R, writer: W, config: ReconstructionConfig) -> Self {
        Self {
            reader,
            writer,
            config,
        }
    }

    fn validate_dimensions(&self, width: usize, height: usize) -> Result<()> {
        if width == 0 || height == 0 {
            return Err(ConversionError::InvalidDimensions(width, height));
        }

        if let Some(max) = self.config.max_input_dimension {
            if width > max || height > max {
                return Err(ConversionError::InvalidDimensions(width, height));
            }
        }

        Ok(())
    }

    /// Decodes `input_data` and runs every reconstruction stage.
    pub fn reconstruct(
        &self,
        input_data: &[u8],
        timings: &mut PipelineTimings,
    ) -> Result<SurfaceMesh> {
        self.config.validate()?;

        let raster = {
            let _span = tracing::info_span!("decode_image").entered();
            timings.time(Stage::Decode, || self.reader.read_raster(input_data))?
        };

        {
            let _span = tracing::info_span!("validate_dimensions",
                width = raster.width(),
                height = raster.height()
            ).entered();
            self.validate_dimensions(raster.width(), raster.height())?;
        }

        let normalized = {
            let _span = tracing::info_span!("normalize").entered();
            timings.time(Stage::Normalize, || normalize_image(&raster, &self.config))
        };
        drop(raster);

        let depth = {
            let _span = tracing::info_span!("estimate_depth").entered();
            timings.time(Stage::EstimateDepth, || estimate_depth(&normalized, &self.config))
        };
        debug!("Depth field {}x{}", depth.width, depth.height);

        let volume = {
            let _span = tracing::info_span!("build_volume", thickness = self.config.thickness)
                .entered();
            timings.time(Stage::BuildVolume, || build_volume(&depth, self.config.thickness))?
        };

        let mesh = {
            let _span = tracing::info_span!("extract_surface", level = self.config.iso_level)
                .entered();
            timings.time(Stage::ExtractSurface, || {
                extract_surface(&volume, self.config.iso_level)
            })?
        };

        if mesh.is_empty() {
            warn!("Isosurface is empty");
        }
        Ok(mesh)
    }

    #[instrument(skip(self, input_data, output), fields(input_size = input_data.len()))]
    pub fn convert(&self, input_data: &[u8], output: &mut dyn Write) -> Result<SurfaceMesh> {
        self.convert_with_timings(input_data, output)
            .map(|(mesh, _)| mesh)
    }

    /// Like [`convert`](Self::convert), also returning per-stage durations.
    pub fn convert_with_timings(
        &self,
        input_data: &[u8],
        output: &mut dyn Write,
    ) -> Result<(SurfaceMesh, PipelineTimings)> {
        info!("Starting image to {} conversion", self.writer.format());
        let mut timings = PipelineTimings::new();

        let mesh = self.reconstruct(input_data, &mut timings)?;

        {
            let _span = tracing::info_span!("encode_mesh").entered();
            timings.time(Stage::Export, || self.writer.write_mesh(&mesh, output))?;
        }

        info!(
            vertices = mesh.vertex_count(),
            faces = mesh.face_count(),
            "Conversion complete"
        );
        Ok((mesh, timings))
    }

    /// Converts the image at `input_path` into `<output_base>.<ext>`.
    ///
    /// The output file only appears once it has been fully written.
    #[instrument(skip(self, input_path, output_base))]
    pub fn convert_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_base: Q,
    ) -> Result<ConversionReport> {
        let input_path = input_path.as_ref();
        let output_path = output_path_for(output_base.as_ref(), self.writer.format());

        info!(
            input = %input_path.display(),
            output = %output_path.display(),
            "Converting file"
        );

        if !input_path.is_file() {
            return Err(ConversionError::InputNotFound(input_path.to_path_buf()));
        }

        let mut timings = PipelineTimings::new();
        let input_data = {
            let _span = tracing::info_span!("read_input_file").entered();
            timings.time(Stage::ReadInput, || std::fs::read(input_path)).map_err(|e| {
                ConversionError::InputReadError(format!("{}: {}", input_path.display(), e))
            })?
        };

        let mesh = self.reconstruct(&input_data, &mut timings)?;

        {
            let _span = tracing::info_span!("write_output_file").entered();
            timings.time(Stage::Export, || {
                write_mesh_file(&self.writer, &mesh, &output_path)
            })?;
        }

        Ok(ConversionReport::new(output_path, &mesh, timings))
    }

    pub fn config(&self) -> &ReconstructionConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: ReconstructionConfig) {
        self.config = config;
    }
}
