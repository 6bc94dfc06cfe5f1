use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgGroup, Parser, ValueEnum};
use photo3d_rs::logger;
use photo3d_rs::model_pipeline::preview::visualize;
use photo3d_rs::model_pipeline::{
    ConversionReport, ImageToModelPipeline, MeshFormat, ReconstructionConfig, TextToModelPipeline,
};
use tracing::{error, info};

const PREVIEW_SIZE: u32 = 512;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Obj,
    Stl,
}

impl From<Format> for MeshFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Obj => MeshFormat::Obj,
            Format::Stl => MeshFormat::Stl,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "photo3d_rs")]
#[command(about = "Convert a photo or a text description into a 3D mesh")]
#[command(version)]
#[command(group(ArgGroup::new("source").required(true).args(["image", "text"])))]
struct Cli {
    /// Input image (.jpg, .png, ...)
    #[arg(long)]
    image: Option<PathBuf>,

    /// Text description of the object to generate
    #[arg(long)]
    text: Option<String>,

    /// Output path without extension
    #[arg(long, default_value = "output/model")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Format::Obj)]
    format: Format,

    /// Also render a PNG preview next to the mesh
    #[arg(long)]
    visualize: bool,

    /// Side of the square working resolution
    #[arg(long, default_value_t = 256)]
    resolution: u32,

    /// Layers in the extruded volume
    #[arg(long, default_value_t = 10)]
    thickness: usize,

    /// Isosurface level
    #[arg(long, default_value_t = 0.5)]
    level: f32,

    #[arg(long, default_value_t = 50.0)]
    canny_low: f32,

    #[arg(long, default_value_t = 150.0)]
    canny_high: f32,

    /// Odd kernel size of the denoising blur
    #[arg(long, default_value_t = 5)]
    pre_blur: u32,

    /// Odd kernel size of the depth smoothing blur
    #[arg(long, default_value_t = 15)]
    depth_blur: u32,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn reconstruction_config(&self) -> ReconstructionConfig {
        ReconstructionConfig::builder()
            .resolution(self.resolution, self.resolution)
            .thickness(self.thickness)
            .iso_level(self.level)
            .canny_thresholds(self.canny_low, self.canny_high)
            .pre_blur_kernel(self.pre_blur)
            .depth_blur_kernel(self.depth_blur)
            .build()
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logger::init(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            report.log_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to generate 3D model: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ConversionReport> {
    let format = MeshFormat::from(cli.format);

    if let Some(dir) = cli.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating output directory {}", dir.display()))?;
    }

    let report = match (&cli.image, &cli.text) {
        (Some(image), _) => {
            info!("Converting image {} to 3D model", image.display());
            let pipeline = ImageToModelPipeline::new(cli.reconstruction_config(), format);
            pipeline.convert_file(image, &cli.output)?
        }
        (None, Some(prompt)) => {
            info!("Converting text prompt '{}' to 3D model", prompt);
            TextToModelPipeline::new(format).convert_file(prompt, &cli.output)?
        }
        (None, None) => anyhow::bail!("either --image or --text is required"),
    };
    info!("3D model saved to {}", report.output_path.display());

    if cli.visualize {
        render_preview(&report.output_path)?;
    }

    Ok(report)
}

fn render_preview(model_path: &Path) -> anyhow::Result<()> {
    let preview_path = model_path.with_extension("png");
    let kind = visualize(model_path, &preview_path, PREVIEW_SIZE)
        .with_context(|| format!("rendering preview of {}", model_path.display()))?;
    info!("{:?} preview saved to {}", kind, preview_path.display());
    Ok(())
}
