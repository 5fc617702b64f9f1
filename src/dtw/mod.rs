//! Dynamic time warping between two feature sequences.
//!
//! Sequences are matrices shaped `(n_features, n_frames)`. The search builds
//! the full pairwise Euclidean cost matrix, accumulates it with the classic
//! three-way recurrence and walks back from the last cell to `(0, 0)`.
//! Memory and time are `O(n_x * n_y)`; a [`Band`] narrows the search to
//! cells near the diagonal without changing what a path looks like.

mod band;
mod path;

pub use band::Band;
pub use path::WarpPath;

use crate::AlignConfig;
use crate::feature::Spectrogram;
use log::debug;
use ndarray::Array2;

/// A single move of the warp path, listed in tie-break priority order.
///
/// When two predecessors have the same accumulated cost the earlier variant
/// wins, so equal-cost inputs always produce the same path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Advance both sequences.
    Diagonal,
    /// Advance the first sequence only.
    Vertical,
    /// Advance the second sequence only.
    Horizontal,
}

impl Step {
    /// Index offsets `(di, dj)` taken when backtracking over this step.
    pub fn offset(self) -> (usize, usize) {
        match self {
            Step::Diagonal => (1, 1),
            Step::Vertical => (1, 0),
            Step::Horizontal => (0, 1),
        }
    }
}

/// Result of a DTW search.
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    /// Accumulated cost at the final cell.
    pub cost: f64,
    /// Optimal path from `(0, 0)` to the final cell.
    pub path: WarpPath,
}

fn check_inputs(x: &Array2<f32>, y: &Array2<f32>) -> crate::Result<()> {
    if x.nrows() != y.nrows() {
        return Err(crate::Error::ShapeMismatch {
            expected: format!("{} feature rows", x.nrows()),
            got: format!("{} feature rows", y.nrows()),
        });
    }
    for (name, arr) in [("x frames", x), ("y frames", y)] {
        if arr.ncols() == 0 {
            return Err(crate::Error::InvalidSize {
                name,
                value: 0,
                reason: "sequence must have at least one frame",
            });
        }
    }
    for (which, arr) in [("first", x), ("second", y)] {
        if let Some(((bin, frame), _)) = arr.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(crate::Error::NonFiniteSpectrogram { which, bin, frame });
        }
    }
    Ok(())
}

/// Pairwise Euclidean distance between every column of `x` and of `y`.
///
/// With a band, cells outside it are left at infinity.
///
/// # Errors
/// Mismatched feature rows, an empty sequence or non-finite input.
pub fn cost_matrix(
    x: &Array2<f32>,
    y: &Array2<f32>,
    band: Option<&Band>,
) -> crate::Result<Array2<f32>> {
    check_inputs(x, y)?;
    Ok(pairwise_cost(x, y, band))
}

fn pairwise_cost(x: &Array2<f32>, y: &Array2<f32>, band: Option<&Band>) -> Array2<f32> {
    let (n_x, n_y) = (x.ncols(), y.ncols());
    let full = Band::full(n_y);
    let band = band.unwrap_or(&full);

    let mut dist = Array2::<f32>::from_elem((n_x, n_y), f32::INFINITY);
    for i in 0..n_x {
        let xi = x.column(i);
        for j in band.columns(i) {
            let d: f64 = xi
                .iter()
                .zip(y.column(j).iter())
                .map(|(&a, &b)| {
                    let diff = a as f64 - b as f64;
                    diff * diff
                })
                .sum();
            dist[(i, j)] = d.sqrt() as f32;
        }
    }
    dist
}

/// Accumulate a cost matrix with unit-weight diagonal, vertical and
/// horizontal steps.
///
/// `acc[i, j] = dist[i, j] + min(acc[i-1, j], acc[i, j-1], acc[i-1, j-1])`;
/// the first row and column can only be reached along themselves.
/// Accumulation runs in `f64` so long recordings keep their tie structure.
pub fn accumulated_cost(dist: &Array2<f32>) -> Array2<f64> {
    let (n_x, n_y) = dist.dim();
    let mut acc = Array2::<f64>::from_elem((n_x, n_y), f64::INFINITY);
    if n_x == 0 || n_y == 0 {
        return acc;
    }

    acc[(0, 0)] = dist[(0, 0)] as f64;
    for i in 1..n_x {
        acc[(i, 0)] = acc[(i - 1, 0)] + dist[(i, 0)] as f64;
    }
    for j in 1..n_y {
        acc[(0, j)] = acc[(0, j - 1)] + dist[(0, j)] as f64;
    }

    for i in 1..n_x {
        for j in 1..n_y {
            let d = dist[(i, j)];
            if d.is_infinite() {
                continue;
            }
            let best = acc[(i - 1, j - 1)]
                .min(acc[(i - 1, j)])
                .min(acc[(i, j - 1)]);
            acc[(i, j)] = d as f64 + best;
        }
    }
    acc
}

/// Choose the step that reached `(i, j)` in an accumulated cost matrix.
fn best_step(acc: &Array2<f64>, i: usize, j: usize) -> Step {
    if i == 0 {
        return Step::Horizontal;
    }
    if j == 0 {
        return Step::Vertical;
    }
    let diag = acc[(i - 1, j - 1)];
    let vertical = acc[(i - 1, j)];
    let horizontal = acc[(i, j - 1)];

    if diag <= vertical && diag <= horizontal {
        Step::Diagonal
    } else if vertical <= horizontal {
        Step::Vertical
    } else {
        Step::Horizontal
    }
}

/// Walk an accumulated cost matrix back from its last cell to `(0, 0)`.
///
/// Iterative, so path length is bounded only by memory. Ties are resolved in
/// [`Step`] order: diagonal, then vertical, then horizontal.
pub fn backtrack(acc: &Array2<f64>) -> WarpPath {
    let (n_x, n_y) = acc.dim();
    if n_x == 0 || n_y == 0 {
        return WarpPath::from_reversed(Vec::new());
    }

    let (mut i, mut j) = (n_x - 1, n_y - 1);
    let mut cells = Vec::with_capacity(n_x + n_y - 1);
    cells.push((i, j));

    while (i, j) != (0, 0) {
        let (di, dj) = best_step(acc, i, j).offset();
        i -= di;
        j -= dj;
        cells.push((i, j));
    }

    WarpPath::from_reversed(cells)
}

/// Align two feature sequences.
///
/// # Arguments
/// * `x` - First feature matrix (n_features x n_frames_x)
/// * `y` - Second feature matrix (n_features x n_frames_y)
/// * `band_radius` - Optional band half-width as a fraction of `n_frames_y`
///
/// # Errors
/// Mismatched feature rows (`ShapeMismatch`), an empty sequence
/// (`InvalidSize`) or NaN/Inf input (`NonFiniteSpectrogram`), all raised
/// before any cost is computed.
///
/// # Example
/// ```
/// use score_align::dtw::dtw;
/// use ndarray::Array2;
///
/// let x = Array2::from_shape_vec((1, 3), vec![1.0, 2.0, 3.0]).unwrap();
/// let y = Array2::from_shape_vec((1, 5), vec![1.0, 1.5, 2.0, 2.5, 3.0]).unwrap();
/// let alignment = dtw(&x, &y, None).unwrap();
/// assert_eq!(alignment.path.get(0), Some((0, 0)));
/// assert_eq!(alignment.path.end(), (2, 4));
/// ```
pub fn dtw(x: &Array2<f32>, y: &Array2<f32>, band_radius: Option<f32>) -> crate::Result<Alignment> {
    check_inputs(x, y)?;
    let (n_x, n_y) = (x.ncols(), y.ncols());

    let band = band_radius.map(|r| Band::new(n_x, n_y, r));
    let dist = pairwise_cost(x, y, band.as_ref());
    let acc = accumulated_cost(&dist);
    let path = backtrack(&acc);

    Ok(Alignment {
        cost: acc[(n_x - 1, n_y - 1)],
        path,
    })
}

/// Aligns a recording's spectrogram against its synthesized rendition.
///
/// Holds no state between calls; one engine can serve any number of items.
#[derive(Debug, Clone, Default)]
pub struct AlignmentEngine {
    band_radius: Option<f32>,
}

impl AlignmentEngine {
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            band_radius: config.band_radius,
        }
    }

    /// Warp path from `real` frames (first coordinate) to `synth` frames
    /// (second coordinate).
    ///
    /// # Errors
    /// As [`dtw`], with the spectrograms named "recording" and "synthesized"
    /// in non-finite errors.
    pub fn align(&self, real: &Spectrogram, synth: &Spectrogram) -> crate::Result<Alignment> {
        real.ensure_finite("recording")?;
        synth.ensure_finite("synthesized")?;

        let alignment = dtw(real.data(), synth.data(), self.band_radius)?;
        debug!(
            "aligned {} x {} frames: path length {}, cost {:.3}",
            real.n_frames(),
            synth.n_frames(),
            alignment.path.len(),
            alignment.cost
        );
        Ok(alignment)
    }
}

#[cfg(test)]
mod tests;
