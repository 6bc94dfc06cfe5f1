//! Intermediate arrays of the reconstruction pipeline

/// Per-pixel closeness proxy, row-major `height × width`.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthField {
    pub width: usize,
    pub height: usize,
    pub data: Vec<f32>,
}

impl DepthField {
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Self {
        assert_eq!(data.len(), width * height, "depth field size mismatch");
        Self { width, height, data }
    }

    pub fn zeros(width: usize, height: usize) -> Self {
        Self::new(width, height, vec![0.0; width * height])
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self::new(width, height, data)
    }

    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Observed `(min, max)`, or `None` for an empty field.
    pub fn range(&self) -> Option<(f32, f32)> {
        value_range(&self.data)
    }
}

/// Binary occupancy grid indexed `(row, col, layer)`, layer varying fastest.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyVolume {
    pub height: usize,
    pub width: usize,
    pub thickness: usize,
    pub data: Vec<f32>,
}

impl OccupancyVolume {
    pub fn empty(height: usize, width: usize, thickness: usize) -> Self {
        Self {
            height,
            width,
            thickness,
            data: vec![0.0; height * width * thickness],
        }
    }

    /// Builds a volume by sampling `f(row, col, layer)`.
    pub fn from_fn(
        height: usize,
        width: usize,
        thickness: usize,
        mut f: impl FnMut(usize, usize, usize) -> f32,
    ) -> Self {
        let mut volume = Self::empty(height, width, thickness);
        for row in 0..height {
            for col in 0..width {
                for layer in 0..thickness {
                    let idx = volume.index(row, col, layer);
                    volume.data[idx] = f(row, col, layer);
                }
            }
        }
        volume
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, self.thickness)
    }

    #[inline]
    pub fn index(&self, row: usize, col: usize, layer: usize) -> usize {
        (row * self.width + col) * self.thickness + layer
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize, layer: usize) -> f32 {
        self.data[self.index(row, col, layer)]
    }

    pub fn set(&mut self, row: usize, col: usize, layer: usize, value: f32) {
        let idx = self.index(row, col, layer);
        self.data[idx] = value;
    }

    /// Occupancy values of one `(row, col)` column, base first.
    pub fn column(&self, row: usize, col: usize) -> &[f32] {
        let start = self.index(row, col, 0);
        &self.data[start..start + self.thickness]
    }

    pub fn range(&self) -> Option<(f32, f32)> {
        value_range(&self.data)
    }
}

fn value_range(values: &[f32]) -> Option<(f32, f32)> {
    values.iter().fold(None, |acc, &v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}
