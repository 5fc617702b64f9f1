use super::*;
use ndarray::{Array2, array};

fn assert_monotone(path: &WarpPath) {
    for w in path.as_slice().windows(2) {
        let ((a0, b0), (a1, b1)) = (w[0], w[1]);
        assert!(a1 >= a0 && b1 >= b0, "{:?} -> {:?} goes backwards", w[0], w[1]);
        assert!(a1 - a0 <= 1 && b1 - b0 <= 1, "{:?} -> {:?} skips", w[0], w[1]);
        assert!((a1, b1) != (a0, b0), "{:?} repeated", w[0]);
    }
}

fn ramp(n_frames: usize, n_bins: usize, rate: f32) -> Array2<f32> {
    Array2::from_shape_fn((n_bins, n_frames), |(b, t)| ((t as f32 * rate) + b as f32).sin())
}

#[test]
fn test_dtw_identical_zero_spectrogram() {
    let s = Array2::<f32>::zeros((3, 5));
    let alignment = dtw(&s, &s, None).unwrap();

    assert_eq!(
        alignment.path.as_slice(),
        &[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]
    );
    assert_eq!(alignment.cost, 0.0);
}

#[test]
fn test_dtw_identical_is_diagonal() {
    let s = ramp(40, 6, 0.3);
    let alignment = dtw(&s, &s, None).unwrap();

    let expected: Vec<(usize, usize)> = (0..40).map(|t| (t, t)).collect();
    assert_eq!(alignment.path.as_slice(), expected.as_slice());
    assert!(alignment.cost < 1e-6);
}

#[test]
fn test_dtw_stretched() {
    let x = array![[1.0, 2.0, 3.0]];
    let y = array![[1.0, 1.5, 2.0, 2.5, 3.0]];

    let alignment = dtw(&x, &y, None).unwrap();

    assert!(alignment.cost.is_finite());
    assert_eq!(alignment.path.get(0), Some((0, 0)));
    assert_eq!(alignment.path.end(), (2, 4));
    assert_monotone(&alignment.path);
}

#[test]
fn test_dtw_known_path() {
    // y repeats x's middle frame; the repeat must be absorbed horizontally.
    let x = array![[0.0, 5.0, 10.0]];
    let y = array![[0.0, 5.0, 5.0, 10.0]];

    let alignment = dtw(&x, &y, None).unwrap();
    assert_eq!(alignment.path.as_slice(), &[(0, 0), (1, 1), (1, 2), (2, 3)]);
    assert_eq!(alignment.cost, 0.0);
}

#[test]
fn test_dtw_vertical_absorbs_repeat_in_first() {
    let x = array![[0.0, 5.0, 5.0, 10.0]];
    let y = array![[0.0, 5.0, 10.0]];

    let alignment = dtw(&x, &y, None).unwrap();
    assert_eq!(alignment.path.as_slice(), &[(0, 0), (1, 1), (2, 1), (3, 2)]);
}

#[test]
fn test_tie_break_prefers_diagonal_then_vertical() {
    // All costs equal: from (1, 1) the diagonal wins.
    let flat = Array2::<f32>::zeros((2, 2));
    let acc = accumulated_cost(&flat);
    assert_eq!(best_step(&acc, 1, 1), Step::Diagonal);

    // Diagonal blocked, vertical and horizontal tied: vertical wins.
    let mut acc = Array2::<f64>::zeros((2, 2));
    acc[(0, 0)] = 10.0;
    assert_eq!(best_step(&acc, 1, 1), Step::Vertical);

    // Vertical predecessor is (0, 1), horizontal is (1, 0).
    acc[(0, 1)] = 3.0;
    acc[(1, 0)] = 1.0;
    assert_eq!(best_step(&acc, 1, 1), Step::Horizontal);
    acc[(0, 1)] = 1.0;
    acc[(1, 0)] = 3.0;
    assert_eq!(best_step(&acc, 1, 1), Step::Vertical);
}

#[test]
fn test_dtw_different_lengths() {
    let x = ramp(12, 4, 0.5);
    let y = ramp(30, 4, 0.2);

    let alignment = dtw(&x, &y, None).unwrap();
    let path = &alignment.path;

    assert_eq!(path.get(0), Some((0, 0)));
    assert_eq!(path.end(), (11, 29));
    assert!(path.len() >= 30);
    assert!(path.len() <= 12 + 30 - 1);
    assert_monotone(path);
}

#[test]
fn test_dtw_single_frame_sequences() {
    let x = array![[1.0], [2.0]];
    let y = array![[1.0, 2.0, 3.0], [2.0, 2.0, 2.0]];

    let alignment = dtw(&x, &y, None).unwrap();
    assert_eq!(alignment.path.as_slice(), &[(0, 0), (0, 1), (0, 2)]);

    let back = dtw(&y, &x, None).unwrap();
    assert_eq!(back.path.as_slice(), &[(0, 0), (1, 0), (2, 0)]);
}

#[test]
fn test_dtw_cost_matches_path() {
    let x = ramp(15, 3, 0.4);
    let y = ramp(20, 3, 0.3);

    let alignment = dtw(&x, &y, None).unwrap();
    let dist = cost_matrix(&x, &y, None).unwrap();
    let summed: f64 = alignment.path.iter().map(|&(i, j)| dist[(i, j)] as f64).sum();
    assert!((summed - alignment.cost).abs() < 1e-4);
}

#[test]
fn test_cost_matrix_euclidean() {
    let x = array![[0.0, 3.0], [0.0, 4.0]];
    let y = array![[0.0], [0.0]];
    let dist = cost_matrix(&x, &y, None).unwrap();
    assert_eq!(dist.dim(), (2, 1));
    assert_eq!(dist[(0, 0)], 0.0);
    assert_eq!(dist[(1, 0)], 5.0);
}

#[test]
fn test_cost_matrix_band_leaves_infinity() {
    let x = ramp(50, 2, 0.1);
    let band = Band::new(50, 50, 0.02);
    let dist = cost_matrix(&x, &x, Some(&band)).unwrap();
    assert!(dist[(0, 49)].is_infinite());
    assert!(dist[(10, 10)].is_finite());
}

#[test]
fn test_accumulated_cost_boundaries() {
    let dist = array![[1.0f32, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let acc = accumulated_cost(&dist);
    assert_eq!(acc[(0, 0)], 1.0);
    assert_eq!(acc[(0, 1)], 3.0);
    assert_eq!(acc[(0, 2)], 6.0);
    assert_eq!(acc[(1, 0)], 5.0);
    // 5 + min(1, 3, 5)
    assert_eq!(acc[(1, 1)], 6.0);
    // 6 + min(3, 6, 6)
    assert_eq!(acc[(1, 2)], 9.0);
}

#[test]
fn test_banded_matches_full_on_aligned_input() {
    let x = ramp(60, 5, 0.25);
    let y = ramp(66, 5, 0.23);

    let full = dtw(&x, &y, None).unwrap();
    let banded = dtw(&x, &y, Some(0.2)).unwrap();

    assert_eq!(full.path, banded.path);
    assert!((full.cost - banded.cost).abs() < 1e-9);
}

#[test]
fn test_banded_path_reaches_corner() {
    let x = ramp(10, 3, 0.9);
    let y = ramp(97, 3, 0.1);

    let alignment = dtw(&x, &y, Some(0.01)).unwrap();
    assert!(alignment.cost.is_finite());
    assert_eq!(alignment.path.get(0), Some((0, 0)));
    assert_eq!(alignment.path.end(), (9, 96));
    assert_monotone(&alignment.path);
}

#[test]
fn test_dtw_mismatched_bins() {
    let x = Array2::<f32>::zeros((3, 4));
    let y = Array2::<f32>::zeros((4, 4));
    assert!(matches!(
        dtw(&x, &y, None),
        Err(crate::Error::ShapeMismatch { .. })
    ));
}

#[test]
fn test_dtw_empty() {
    let x = Array2::<f32>::zeros((2, 0));
    let y = Array2::<f32>::zeros((2, 3));
    assert!(matches!(
        dtw(&x, &y, None),
        Err(crate::Error::InvalidSize { .. })
    ));
    assert!(dtw(&y, &x, None).is_err());
}

#[test]
fn test_dtw_rejects_nan() {
    let x = Array2::<f32>::zeros((2, 3));
    let mut y = Array2::<f32>::zeros((2, 3));
    y[(1, 2)] = f32::NAN;

    match dtw(&x, &y, None) {
        Err(crate::Error::NonFiniteSpectrogram { which, bin, frame }) => {
            assert_eq!(which, "second");
            assert_eq!((bin, frame), (1, 2));
        }
        other => panic!("expected NonFiniteSpectrogram, got {other:?}"),
    }
    assert!(cost_matrix(&y, &x, None).is_err());
}

#[test]
fn test_engine_names_spectrograms() {
    let config = AlignConfig::new();
    let engine = AlignmentEngine::new(&config);

    let ok = Spectrogram::new(Array2::zeros((3, 4)), 22050, 512);
    let mut bad = Array2::zeros((3, 4));
    bad[(0, 0)] = f32::NEG_INFINITY;
    let bad = Spectrogram::new(bad, 22050, 512);

    assert!(matches!(
        engine.align(&bad, &ok),
        Err(crate::Error::NonFiniteSpectrogram {
            which: "recording",
            ..
        })
    ));
    assert!(matches!(
        engine.align(&ok, &bad),
        Err(crate::Error::NonFiniteSpectrogram {
            which: "synthesized",
            ..
        })
    ));
}

#[test]
fn test_engine_identity() {
    let engine = AlignmentEngine::new(&AlignConfig::new());
    let s = Spectrogram::new(Array2::zeros((3, 5)), 22050, 512);
    let alignment = engine.align(&s, &s).unwrap();
    assert_eq!(alignment.path.len(), 5);
    assert_eq!(alignment.path.end(), (4, 4));
}
