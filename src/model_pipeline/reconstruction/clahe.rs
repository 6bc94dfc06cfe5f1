//! Contrast-limited adaptive histogram equalization.
//!
//! The image is split into a grid of tiles. Each tile gets its own clipped
//! histogram-equalization lookup table, and every pixel is mapped through a
//! bilinear blend of the four nearest tile tables so tile seams stay invisible.

use image::{GrayImage, Luma};

const BINS: usize = 256;

/// Applies CLAHE with `clip_limit` (relative to a flat histogram) over a
/// `grid` of (columns, rows) tiles. The grid is shrunk to the image size when
/// the image has fewer pixels than tiles along an axis.
pub fn equalize_adaptive(image: &GrayImage, clip_limit: f32, grid: (u32, u32)) -> GrayImage {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return image.clone();
    }

    let tiles_x = grid.0.clamp(1, width) as usize;
    let tiles_y = grid.1.clamp(1, height) as usize;

    let mut luts = Vec::with_capacity(tiles_x * tiles_y);
    for ty in 0..tiles_y {
        let (y0, y1) = tile_bounds(ty, tiles_y, height);
        for tx in 0..tiles_x {
            let (x0, x1) = tile_bounds(tx, tiles_x, width);
            luts.push(tile_lut(image, x0..x1, y0..y1, clip_limit));
        }
    }
    let lut = |tx: usize, ty: usize| &luts[ty * tiles_x + tx];

    let tile_w = width as f32 / tiles_x as f32;
    let tile_h = height as f32 / tiles_y as f32;

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty1, ty2, ya) = neighbours(y as f32 / tile_h - 0.5, tiles_y);
        for x in 0..width {
            let (tx1, tx2, xa) = neighbours(x as f32 / tile_w - 0.5, tiles_x);
            let v = image.get_pixel(x, y)[0] as usize;

            let top = lut(tx1, ty1)[v] as f32 * (1.0 - xa) + lut(tx2, ty1)[v] as f32 * xa;
            let bottom = lut(tx1, ty2)[v] as f32 * (1.0 - xa) + lut(tx2, ty2)[v] as f32 * xa;
            let mapped = top * (1.0 - ya) + bottom * ya;

            out.put_pixel(x, y, Luma([mapped.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

fn tile_bounds(index: usize, tiles: usize, extent: u32) -> (u32, u32) {
    let extent = extent as usize;
    ((index * extent / tiles) as u32, ((index + 1) * extent / tiles) as u32)
}

/// Lower/upper tile index around a fractional tile coordinate plus the blend weight.
fn neighbours(position: f32, tiles: usize) -> (usize, usize, f32) {
    let lower = position.floor();
    let weight = position - lower;
    let upper = ((lower as i64) + 1).min(tiles as i64 - 1).max(0) as usize;
    let lower = (lower as i64).max(0) as usize;
    (lower, upper, weight)
}

fn tile_lut(
    image: &GrayImage,
    xs: std::ops::Range<u32>,
    ys: std::ops::Range<u32>,
    clip_limit: f32,
) -> [u8; BINS] {
    let mut hist = [0u32; BINS];
    for y in ys.clone() {
        for x in xs.clone() {
            hist[image.get_pixel(x, y)[0] as usize] += 1;
        }
    }
    let area = (xs.len() * ys.len()) as u32;

    let clip = ((clip_limit * area as f32 / BINS as f32) as u32).max(1);
    let mut excess = 0u32;
    for count in hist.iter_mut() {
        if *count > clip {
            excess += *count - clip;
            *count = clip;
        }
    }

    // Spread the clipped mass evenly, then hand out the remainder at a fixed stride.
    let batch = excess / BINS as u32;
    let mut residual = excess - batch * BINS as u32;
    for count in hist.iter_mut() {
        *count += batch;
    }
    if residual > 0 {
        let step = (BINS as u32 / residual).max(1) as usize;
        for count in hist.iter_mut().step_by(step) {
            if residual == 0 {
                break;
            }
            *count += 1;
            residual -= 1;
        }
    }

    let scale = 255.0 / area as f32;
    let mut lut = [0u8; BINS];
    let mut cumulative = 0u32;
    for (entry, count) in lut.iter_mut().zip(hist) {
        cumulative += count;
        *entry = (cumulative as f32 * scale).round().min(255.0) as u8;
    }
    lut
}
