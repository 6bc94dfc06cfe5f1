use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use photo3d_rs::model_pipeline::reconstruction::{
    build_volume, estimate_depth, extract_surface, normalize_image,
};
use photo3d_rs::model_pipeline::{
    ImageToModelPipeline, MeshFormat, RasterImage, ReconstructionConfig, TextToModelPipeline,
};
use std::io::Cursor;

fn generate_disc_image(size: u32) -> GrayImage {
    let centre = size as f32 / 2.0;
    let radius = size as f32 * 0.4;
    GrayImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 - centre).powi(2) + (y as f32 - centre).powi(2)).sqrt();
        Luma([if d <= radius { 230 } else { 20 }])
    })
}

fn encode_png(image: &GrayImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn benchmark_conversion_sizes(c: &mut Criterion) {
    let mut group = c.benchmark_group("image_conversion_by_resolution");
    group.sample_size(10);
    let png = encode_png(&generate_disc_image(512));

    for resolution in [64u32, 128, 256] {
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{resolution}x{resolution}")),
            &png,
            |b, data| {
                let config = ReconstructionConfig::builder()
                    .resolution(resolution, resolution)
                    .build();
                let pipeline = ImageToModelPipeline::new(config, MeshFormat::Stl);

                b.iter(|| {
                    let mut output = Cursor::new(Vec::new());
                    let _ = pipeline.convert(black_box(data), &mut output);
                });
            },
        );
    }

    group.finish();
}

fn benchmark_individual_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruction_stages");
    let config = ReconstructionConfig::default();
    let raster = RasterImage::from(generate_disc_image(512));

    let normalized = normalize_image(&raster, &config);
    let depth = estimate_depth(&normalized, &config);
    let volume = build_volume(&depth, config.thickness).unwrap();

    group.bench_function("normalize", |b| {
        b.iter(|| normalize_image(black_box(&raster), &config))
    });
    group.bench_function("estimate_depth", |b| {
        b.iter(|| estimate_depth(black_box(&normalized), &config))
    });
    group.bench_function("build_volume", |b| {
        b.iter(|| build_volume(black_box(&depth), config.thickness))
    });
    group.bench_function("extract_surface", |b| {
        b.iter(|| extract_surface(black_box(&volume), config.iso_level))
    });

    group.finish();
}

fn benchmark_text_shapes(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_shapes");
    let pipeline = TextToModelPipeline::new(MeshFormat::Obj);

    for prompt in ["a cube", "a large ball", "a small car"] {
        group.bench_with_input(BenchmarkId::from_parameter(prompt), &prompt, |b, prompt| {
            b.iter(|| {
                let mut output = Cursor::new(Vec::new());
                let _ = pipeline.convert(black_box(prompt), &mut output);
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    benchmark_conversion_sizes,
    benchmark_individual_stages,
    benchmark_text_shapes
);
criterion_main!(benches);
