//! Decibel scaling of magnitude spectrograms.

use ndarray::Array2;

/// Convert amplitude spectrogram to dB scale.
/// S_db = 20 * log10(S / ref)
///
/// Amplitudes and the reference are floored at `amin` before the logarithm.
/// With `top_db`, values more than `top_db` below the peak are raised to
/// that threshold.
pub fn amplitude_to_db(
    amplitude: &Array2<f32>,
    ref_amplitude: f32,
    amin: f32,
    top_db: Option<f32>,
) -> Array2<f32> {
    let log_ref = 20.0 * ref_amplitude.max(amin).log10();
    let mut db = amplitude.mapv(|a| 20.0 * a.max(amin).log10() - log_ref);

    if let Some(top) = top_db {
        let max_db = db.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let threshold = max_db - top;
        db.mapv_inplace(|v| v.max(threshold));
    }

    db
}

/// Convert amplitude spectrogram to dB relative to its own maximum.
///
/// The loudest cell becomes 0 dB and everything else is negative, floored at
/// `-top_db`. A spectrogram whose peak does not exceed `amin` (silence) has no
/// meaningful reference and is returned filled with `-top_db`.
///
/// # Example
/// ```
/// use ndarray::array;
/// use score_align::spectrum::amplitude_to_db_max;
///
/// let s = array![[1.0, 0.1], [0.01, 0.0]];
/// let db = amplitude_to_db_max(&s, 1e-5, 80.0);
/// assert_eq!(db[(0, 0)], 0.0);
/// assert!((db[(0, 1)] + 20.0).abs() < 1e-4);
/// assert_eq!(db[(1, 1)], -80.0);
/// ```
pub fn amplitude_to_db_max(amplitude: &Array2<f32>, amin: f32, top_db: f32) -> Array2<f32> {
    let peak = amplitude
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0f32, f32::max);

    if peak <= amin {
        return Array2::from_elem(amplitude.raw_dim(), -top_db);
    }

    let mut db = amplitude_to_db(amplitude, peak, amin, None);
    db.mapv_inplace(|v| v.clamp(-top_db, 0.0));
    db
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn test_amplitude_to_db_reference() {
        let s = array![[1.0, 10.0], [0.1, 100.0]];
        let db = amplitude_to_db(&s, 1.0, 1e-5, None);
        assert_abs_diff_eq!(db[(0, 0)], 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(db[(0, 1)], 20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(db[(1, 0)], -20.0, epsilon = 1e-4);
        assert_abs_diff_eq!(db[(1, 1)], 40.0, epsilon = 1e-4);
    }

    #[test]
    fn test_amplitude_to_db_top_db() {
        let s = array![[1.0, 1e-6]];
        let db = amplitude_to_db(&s, 1.0, 1e-10, Some(30.0));
        assert_abs_diff_eq!(db[(0, 1)], -30.0, epsilon = 1e-4);
    }

    #[test]
    fn test_max_reference_peak_is_zero() {
        let s = array![[0.5, 0.25], [0.05, 0.5]];
        let db = amplitude_to_db_max(&s, 1e-5, 80.0);
        assert_eq!(db[(0, 0)], 0.0);
        assert_eq!(db[(1, 1)], 0.0);
        assert_abs_diff_eq!(db[(0, 1)], -6.0206, epsilon = 1e-3);
        assert_abs_diff_eq!(db[(1, 0)], -20.0, epsilon = 1e-3);
    }

    #[test]
    fn test_loudness_normalized_per_spectrogram() {
        let quiet = array![[0.01, 0.001]];
        let loud = quiet.mapv(|v| v * 1000.0);
        let a = amplitude_to_db_max(&quiet, 1e-8, 80.0);
        let b = amplitude_to_db_max(&loud, 1e-8, 80.0);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(*x, *y, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_silence_floors_to_top_db() {
        let s = Array2::<f32>::zeros((4, 3));
        let db = amplitude_to_db_max(&s, 1e-5, 80.0);
        assert!(db.iter().all(|&v| v == -80.0));
    }
}
