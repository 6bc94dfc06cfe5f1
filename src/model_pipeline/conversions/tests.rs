use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, GrayImage, Luma};
use tempfile::tempdir;

use crate::model_pipeline::common::error::{ConversionError, Result};
use crate::model_pipeline::common::timing::Stage;
use crate::model_pipeline::conversions::{ImageToModelPipeline, TextToModelPipeline};
use crate::model_pipeline::mesh::{MeshFormat, MeshWriter, SurfaceMesh, load_mesh};
use crate::model_pipeline::raster::{ImageCrateReader, RasterImage, RasterReader};
use crate::model_pipeline::reconstruction::ReconstructionConfig;
use crate::model_pipeline::test_utils::{draw_disc, encode_png};

struct MockReader {
    should_fail: bool,
    mock_image: Option<GrayImage>,
}

impl RasterReader for MockReader {
    fn read_raster(&self, _data: &[u8]) -> Result<RasterImage> {
        if self.should_fail {
            return Err(ConversionError::DecodeError("Mock decode error".to_string()));
        }
        Ok(self
            .mock_image
            .clone()
            .unwrap_or_else(|| GrayImage::from_pixel(64, 64, Luma([128])))
            .into())
    }
}

struct MockWriter {
    should_fail: bool,
    written_meshes: Arc<Mutex<Vec<SurfaceMesh>>>,
}

impl MeshWriter for MockWriter {
    fn format(&self) -> MeshFormat {
        MeshFormat::Obj
    }

    fn write_mesh(&self, mesh: &SurfaceMesh, _output: &mut dyn Write) -> Result<()> {
        if self.should_fail {
            return Err(ConversionError::ExportError("Mock encode error".to_string()));
        }
        self.written_meshes.lock().unwrap().push(mesh.clone());
        Ok(())
    }
}

fn small_config() -> ReconstructionConfig {
    ReconstructionConfig::builder().resolution(64, 64).build()
}

fn recording_writer() -> (MockWriter, Arc<Mutex<Vec<SurfaceMesh>>>) {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter { should_fail: false, written_meshes: written.clone() };
    (writer, written)
}

/// Fill height of column `(row, col)`, read from its vertical-edge crossing at
/// `fill + 0.5`. A column without a crossing is solid up to the top layer.
fn column_fill(mesh: &SurfaceMesh, row: f32, col: f32, thickness: usize) -> f32 {
    mesh.vertices
        .iter()
        .find(|v| v[0] == row && v[1] == col)
        .map_or((thickness - 1) as f32, |v| v[2] - 0.5)
}

#[test]
fn test_disc_relief_spans_frame_and_peaks_inside() {
    // Layer 0 is always solid and the volume is unpadded, so the surface covers
    // the whole 64x64 frame regardless of disc size; the disc shows up as relief.
    for radius in [10.0f32, 16.0, 24.0] {
        let png = encode_png(DynamicImage::ImageLuma8(draw_disc(64, 64, [32.0, 32.0], radius, 255, 0)));
        let (writer, written) = recording_writer();
        let config = ReconstructionConfig::builder()
            .resolution(64, 64)
            .thickness(10)
            .iso_level(0.5)
            .build();

        let pipeline = ImageToModelPipeline::with_custom(ImageCrateReader, writer, config);
        let mut output = Cursor::new(Vec::new());
        let mesh = pipeline.convert(&png, &mut output).unwrap();

        assert!(mesh.face_count() > 0, "radius {radius}");
        assert!(mesh.validate().is_ok());
        let extent = mesh.extent();
        assert_eq!(extent[0], 63.0, "radius {radius}");
        assert_eq!(extent[1], 63.0, "radius {radius}");
        assert!(extent[2] > 0.0 && extent[2] <= 9.0, "radius {radius}");

        let centre = column_fill(&mesh, 32.0, 32.0, 10);
        let rim = column_fill(&mesh, 32.0, 32.0 - radius, 10);
        assert!(centre > rim, "radius {radius}: centre {centre} vs rim {rim}");
        assert_eq!(written.lock().unwrap().len(), 1);
    }
}

#[test]
fn test_flat_image_gives_base_sheet() {
    let (writer, written) = recording_writer();
    let reader = MockReader { should_fail: false, mock_image: None };

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, small_config());
    let mesh = pipeline.convert(b"fake image data", &mut Cursor::new(Vec::new())).unwrap();

    // No edges, so every column keeps only its base layer
    assert_eq!(mesh.vertex_count(), 64 * 64);
    assert_eq!(mesh.face_count(), 2 * 63 * 63);
    assert!(mesh.vertices.iter().all(|v| v[2] == 0.5));
    assert_eq!(written.lock().unwrap()[0], mesh);
}

#[test]
fn test_single_layer_volume_is_empty_surface() {
    let dir = tempdir().unwrap();
    let (writer, _) = recording_writer();
    let reader = MockReader { should_fail: false, mock_image: None };
    let config = ReconstructionConfig::builder().resolution(64, 64).thickness(1).build();
    let input = dir.path().join("flat.png");
    std::fs::write(&input, b"not decoded by the mock").unwrap();

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, config);
    let report = pipeline.convert_file(&input, dir.path().join("flat")).unwrap();

    assert!(report.empty_surface);
    assert_eq!(report.vertex_count, 0);
    assert_eq!(report.face_count, 0);
    assert_eq!(report.output_path, dir.path().join("flat.obj"));
}

#[test]
fn test_reader_failure() {
    let (writer, written) = recording_writer();
    let reader = MockReader { should_fail: true, mock_image: None };

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, small_config());
    let result = pipeline.convert(b"fake image data", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::DecodeError(_)));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_writer_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let reader = MockReader { should_fail: false, mock_image: None };
    let writer = MockWriter { should_fail: true, written_meshes: written };

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, small_config());
    let result = pipeline.convert(b"fake image data", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::ExportError(_)));
}

#[test]
fn test_dimension_validation_failure() {
    let (writer, _) = recording_writer();
    let reader = MockReader {
        should_fail: false,
        mock_image: Some(GrayImage::new(120, 10)),
    };
    let config = ReconstructionConfig::builder()
        .resolution(64, 64)
        .max_input_dimension(Some(100))
        .build();

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, config);
    let result = pipeline.convert(b"fake image data", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::InvalidDimensions(120, 10)));
}

#[test]
fn test_dimension_validation_disabled() {
    let (writer, _) = recording_writer();
    let reader = MockReader {
        should_fail: false,
        mock_image: Some(GrayImage::from_pixel(120, 10, Luma([40]))),
    };
    let config = ReconstructionConfig::builder()
        .resolution(64, 64)
        .max_input_dimension(None)
        .build();

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, config);
    assert!(pipeline.convert(b"fake image data", &mut Cursor::new(Vec::new())).is_ok());
}

#[test]
fn test_invalid_config_rejected_before_decoding() {
    let (writer, _) = recording_writer();
    let reader = MockReader { should_fail: true, mock_image: None };
    let config = ReconstructionConfig::builder().depth_blur_kernel(4).build();

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, config);
    let result = pipeline.convert(b"fake image data", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::InvalidConfig(_)));
}

#[test]
fn test_timings_cover_every_stage() {
    let (writer, _) = recording_writer();
    let reader = MockReader { should_fail: false, mock_image: None };

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, small_config());
    let (_, timings) = pipeline
        .convert_with_timings(b"fake image data", &mut Cursor::new(Vec::new()))
        .unwrap();

    for stage in [
        Stage::Decode,
        Stage::Normalize,
        Stage::EstimateDepth,
        Stage::BuildVolume,
        Stage::ExtractSurface,
        Stage::Export,
    ] {
        assert!(timings.get_step(stage).is_some(), "missing {stage}");
    }
    assert_eq!(timings.get_step(Stage::ReadInput), None);
}

#[test]
fn test_missing_input_reported_before_processing() {
    let dir = tempdir().unwrap();
    let (writer, written) = recording_writer();
    let reader = MockReader { should_fail: false, mock_image: None };

    let pipeline = ImageToModelPipeline::with_custom(reader, writer, small_config());
    let missing = dir.path().join("missing.png");
    let result = pipeline.convert_file(&missing, dir.path().join("out"));

    assert!(matches!(result, Err(ConversionError::InputNotFound(path)) if path == missing));
    assert!(written.lock().unwrap().is_empty());
}

#[test]
fn test_undecodable_file_leaves_no_output() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("broken.png");
    std::fs::write(&input, b"\x89PNG but not really").unwrap();

    let pipeline = ImageToModelPipeline::new(small_config(), MeshFormat::Stl);
    let result = pipeline.convert_file(&input, dir.path().join("broken"));

    assert!(matches!(result, Err(ConversionError::DecodeError(_))));
    assert!(!dir.path().join("broken.stl").exists());
}

#[test]
fn test_image_file_round_trip() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("disc.png");
    let image = draw_disc(48, 40, [24.0, 20.0], 14.0, 230, 10);
    image.save(&input).unwrap();

    let config = ReconstructionConfig::builder().resolution(48, 40).build();
    let pipeline = ImageToModelPipeline::new(config, MeshFormat::Stl);
    let report = pipeline.convert_file(&input, dir.path().join("disc")).unwrap();

    assert!(!report.empty_surface);
    assert!(report.timings.get_step(Stage::ReadInput).is_some());
    let loaded = load_mesh(&report.output_path).unwrap();
    assert_eq!(loaded.face_count(), report.face_count);
}

#[test]
fn test_text_pipeline_large_ball() {
    let dir = tempdir().unwrap();
    let pipeline = TextToModelPipeline::new(MeshFormat::Obj);

    let report = pipeline.convert_file("a large ball", dir.path().join("ball")).unwrap();

    assert_eq!(report.output_path, dir.path().join("ball.obj"));
    assert_eq!(report.face_count, 320);
    assert!(report.timings.get_step(Stage::ParsePrompt).is_some());
    let loaded = load_mesh(&report.output_path).unwrap();
    assert_eq!(loaded.vertex_count(), 162);
    let extent = loaded.extent();
    assert!((extent[0] - 2.0).abs() < 1e-4);
}

#[test]
fn test_text_pipeline_writer_failure() {
    let written = Arc::new(Mutex::new(Vec::new()));
    let writer = MockWriter { should_fail: true, written_meshes: written };

    let pipeline = TextToModelPipeline::with_custom(writer);
    let result = pipeline.convert("a cube", &mut Cursor::new(Vec::new()));

    assert!(matches!(result.unwrap_err(), ConversionError::ExportError(_)));
}

#[test]
fn test_text_pipeline_records_mesh() {
    let (writer, written) = recording_writer();

    let pipeline = TextToModelPipeline::with_custom(writer);
    let mesh = pipeline.convert("a tiny box", &mut Cursor::new(Vec::new())).unwrap();

    assert_eq!(mesh.face_count(), 12);
    assert_eq!(mesh.extent(), [0.5, 0.5, 0.5]);
    assert_eq!(written.lock().unwrap().len(), 1);
}
