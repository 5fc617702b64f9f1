use ndarray::Array2;
use ndarray_npy::{read_npy, write_npy};
use std::path::Path;

/// Monotone correspondence between the frames of two sequences.
///
/// Each entry is `(index_a, index_b)`. The path starts at `(0, 0)`, never
/// decreases in either coordinate and advances at least one coordinate per
/// step. Paths produced by [`dtw`](super::dtw) also end at the last frame of
/// both sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarpPath {
    pairs: Vec<(usize, usize)>,
}

impl WarpPath {
    /// Build a path from externally supplied pairs, checking its shape.
    ///
    /// # Errors
    /// `InvalidWarpPath` if the path is empty, does not start at `(0, 0)`,
    /// or has a step that goes backwards or stands still.
    pub fn from_pairs(pairs: Vec<(usize, usize)>) -> crate::Result<Self> {
        match pairs.first() {
            None => {
                return Err(crate::Error::InvalidWarpPath {
                    step: 0,
                    reason: "path is empty".to_string(),
                });
            }
            Some(&first) if first != (0, 0) => {
                return Err(crate::Error::InvalidWarpPath {
                    step: 0,
                    reason: format!("path starts at {:?} instead of (0, 0)", first),
                });
            }
            Some(_) => {}
        }

        for (step, w) in pairs.windows(2).enumerate() {
            let ((a0, b0), (a1, b1)) = (w[0], w[1]);
            if a1 < a0 || b1 < b0 {
                return Err(crate::Error::InvalidWarpPath {
                    step: step + 1,
                    reason: format!("{:?} -> {:?} moves backwards", w[0], w[1]),
                });
            }
            if (a1, b1) == (a0, b0) {
                return Err(crate::Error::InvalidWarpPath {
                    step: step + 1,
                    reason: format!("{:?} is repeated", w[0]),
                });
            }
        }

        Ok(Self { pairs })
    }

    /// Wrap cells collected while backtracking from the end cell.
    pub(crate) fn from_reversed(mut cells: Vec<(usize, usize)>) -> Self {
        cells.reverse();
        Self { pairs: cells }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Always false for a constructed path; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn as_slice(&self) -> &[(usize, usize)] {
        &self.pairs
    }

    pub fn iter(&self) -> std::slice::Iter<'_, (usize, usize)> {
        self.pairs.iter()
    }

    pub fn get(&self, index: usize) -> Option<(usize, usize)> {
        self.pairs.get(index).copied()
    }

    /// Final cell of the path.
    pub fn end(&self) -> (usize, usize) {
        self.pairs.last().copied().unwrap_or((0, 0))
    }

    /// Check that the path ends at the last cell of an `n_a x n_b` grid.
    pub fn ensure_spans(&self, n_a: usize, n_b: usize) -> crate::Result<()> {
        let expected = (n_a.saturating_sub(1), n_b.saturating_sub(1));
        if self.end() != expected {
            return Err(crate::Error::InvalidWarpPath {
                step: self.len().saturating_sub(1),
                reason: format!("path ends at {:?}, expected {:?}", self.end(), expected),
            });
        }
        Ok(())
    }

    /// Index into the path of the first entry whose second coordinate is
    /// `>= position`, clamped to the last entry.
    pub fn first_at_or_after(&self, position: f64) -> usize {
        let idx = self.pairs.partition_point(|&(_, b)| (b as f64) < position);
        idx.min(self.len().saturating_sub(1))
    }

    /// Index into the path of the last entry whose second coordinate is
    /// `<= position`, clamped to the first entry.
    pub fn last_at_or_before(&self, position: f64) -> usize {
        let idx = self.pairs.partition_point(|&(_, b)| (b as f64) <= position);
        idx.saturating_sub(1).min(self.len().saturating_sub(1))
    }

    /// The path as an `(len, 2)` integer array.
    pub fn to_array(&self) -> Array2<i64> {
        let mut arr = Array2::<i64>::zeros((self.len(), 2));
        for (k, &(a, b)) in self.pairs.iter().enumerate() {
            arr[(k, 0)] = a as i64;
            arr[(k, 1)] = b as i64;
        }
        arr
    }

    /// Parse an `(len, 2)` integer array, validating it like [`from_pairs`](Self::from_pairs).
    pub fn from_array(arr: &Array2<i64>) -> crate::Result<Self> {
        if arr.ncols() != 2 {
            return Err(crate::Error::ShapeMismatch {
                expected: "(n, 2)".to_string(),
                got: format!("{:?}", arr.shape()),
            });
        }
        let mut pairs = Vec::with_capacity(arr.nrows());
        for (step, row) in arr.rows().into_iter().enumerate() {
            if row[0] < 0 || row[1] < 0 {
                return Err(crate::Error::InvalidWarpPath {
                    step,
                    reason: format!("negative index ({}, {})", row[0], row[1]),
                });
            }
            pairs.push((row[0] as usize, row[1] as usize));
        }
        Self::from_pairs(pairs)
    }

    /// Persist the path as a `.npy` file of `int64` pairs.
    pub fn save_npy<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        write_npy(path, &self.to_array())?;
        Ok(())
    }

    /// Load a path written by [`save_npy`](Self::save_npy).
    pub fn load_npy<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let arr: Array2<i64> = read_npy(path)?;
        Self::from_array(&arr)
    }
}

impl<'a> IntoIterator for &'a WarpPath {
    type Item = &'a (usize, usize);
    type IntoIter = std::slice::Iter<'a, (usize, usize)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}
