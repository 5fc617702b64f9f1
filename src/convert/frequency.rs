/// Center frequency of every constant-Q bin.
///
/// # Arguments
/// * `n_bins` - Number of bins
/// * `fmin` - Frequency of the lowest bin
/// * `bins_per_octave` - Bins per octave
///
/// # Example
/// ```
/// use score_align::convert::cqt_frequencies;
///
/// // 24 semitones starting at C2 (~65 Hz)
/// let freqs = cqt_frequencies(24, 65.406, 12);
/// assert_eq!(freqs.len(), 24);
/// assert!((freqs[12] - 130.813).abs() < 0.1);
/// ```
pub fn cqt_frequencies(n_bins: usize, fmin: f32, bins_per_octave: usize) -> Vec<f32> {
    (0..n_bins)
        .map(|i| fmin * 2.0_f32.powf(i as f32 / bins_per_octave as f32))
        .collect()
}
