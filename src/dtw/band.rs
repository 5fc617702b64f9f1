use std::ops::Range;

/// Sakoe-Chiba style search band around the normalised diagonal.
///
/// Row `i` of an `n_x x n_y` grid keeps the columns within `half_width` of
/// `i * (n_y - 1) / (n_x - 1)`. The half width is the requested radius
/// (a fraction of `n_y`) plus the larger of one column and the diagonal
/// slope, which keeps neighbouring rows overlapping so that a monotone path
/// from `(0, 0)` to `(n_x - 1, n_y - 1)` always exists inside the band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    slope: f64,
    half_width: f64,
    n_y: usize,
}

impl Band {
    /// Band for an `n_x x n_y` grid with `radius` given as a fraction of `n_y`.
    pub fn new(n_x: usize, n_y: usize, radius: f32) -> Self {
        if n_x < 2 || n_y < 2 {
            return Self::full(n_y);
        }
        let slope = (n_y - 1) as f64 / (n_x - 1) as f64;
        let half_width = radius.max(0.0) as f64 * n_y as f64 + slope.max(1.0);
        Self {
            slope,
            half_width,
            n_y,
        }
    }

    /// A band that keeps every column.
    pub fn full(n_y: usize) -> Self {
        Self {
            slope: 0.0,
            half_width: f64::INFINITY,
            n_y,
        }
    }

    pub fn contains(&self, i: usize, j: usize) -> bool {
        j < self.n_y && (i as f64 * self.slope - j as f64).abs() <= self.half_width
    }

    /// Columns of row `i` inside the band.
    pub fn columns(&self, i: usize) -> Range<usize> {
        if self.half_width.is_infinite() {
            return 0..self.n_y;
        }
        let center = i as f64 * self.slope;
        let lo = (center - self.half_width).ceil().max(0.0) as usize;
        let hi = ((center + self.half_width).floor() as usize).min(self.n_y.saturating_sub(1));
        lo..hi + 1
    }
}
