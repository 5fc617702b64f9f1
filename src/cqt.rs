/// Constant-Q magnitude spectrogram.
///
/// Bins are spaced logarithmically with a constant number per octave, so
/// that each row of the output tracks one fraction of a semitone. Every bin
/// is a Hann-windowed complex sinusoid whose length shrinks with its centre
/// frequency, giving each bin a bandwidth proportional to that frequency.
/// The filters are applied in the frequency domain: one FFT per frame, and
/// a sparse kernel spectrum per bin.
use crate::convert::cqt_frequencies;
use crate::fft::{FftPlan, hann};
use ndarray::Array2;
use num_complex::Complex32;
use std::f64::consts::PI;

/// Kernel spectrum entries below this fraction of their peak are dropped.
const SPARSITY: f32 = 0.0054;

/// Configuration for the Constant-Q Transform.
///
/// # Example
/// ```
/// use score_align::cqt::CqtConfig;
///
/// let config = CqtConfig::new(22050, 512)
///     .with_fmin(130.81)
///     .with_n_bins(180)
///     .with_bins_per_octave(36);
/// assert_eq!(config.n_bins, 180);
/// ```
#[derive(Debug, Clone)]
pub struct CqtConfig {
    /// Sample rate
    pub sr: u32,
    /// Number of samples between successive CQT columns
    pub hop_length: usize,
    /// Minimum frequency (default: ~32.7 Hz, C1)
    pub fmin: f32,
    /// Number of frequency bins (default: 84, 7 octaves)
    pub n_bins: usize,
    /// Number of bins per octave (default: 12)
    pub bins_per_octave: usize,
}

impl CqtConfig {
    /// Create a new CQT configuration with defaults.
    ///
    /// # Arguments
    /// * `sr` - Sample rate
    /// * `hop_length` - Number of samples between successive CQT columns
    pub fn new(sr: u32, hop_length: usize) -> Self {
        Self {
            sr,
            hop_length,
            fmin: 32.70, // C1
            n_bins: 84,  // 7 octaves
            bins_per_octave: 12,
        }
    }

    /// Set the minimum frequency.
    pub fn with_fmin(mut self, fmin: f32) -> Self {
        self.fmin = fmin;
        self
    }

    /// Set the number of frequency bins.
    pub fn with_n_bins(mut self, n_bins: usize) -> Self {
        self.n_bins = n_bins;
        self
    }

    /// Set the number of bins per octave.
    pub fn with_bins_per_octave(mut self, bins_per_octave: usize) -> Self {
        self.bins_per_octave = bins_per_octave;
        self
    }

    /// Compute the CQT magnitude with this configuration.
    pub fn magnitude(&self, y: &[f32]) -> crate::Result<Array2<f32>> {
        cqt_magnitude(y, self)
    }

    /// Length in samples of the constant-Q filter for each bin.
    ///
    /// The filter spans `Q` periods of its centre frequency, with
    /// `Q = 1 / (2^(1/bins_per_octave) - 1)`.
    fn filter_lengths(&self, freqs: &[f32]) -> Vec<usize> {
        let q = 1.0 / (2.0_f32.powf(1.0 / self.bins_per_octave as f32) - 1.0);
        freqs
            .iter()
            .map(|&f| {
                let len = (self.sr as f32 * q / f).ceil() as usize;
                len.max(2)
            })
            .collect()
    }
}

impl Default for CqtConfig {
    fn default() -> Self {
        Self::new(22050, 512)
    }
}

/// The significant stretch of one bin's filter spectrum.
///
/// Holds `conj(K[j]) / n_fft` for `j` in `offset..offset + weights.len()`,
/// so that the inner product of a frame with the time-domain filter is a
/// short dot product with the frame's spectrum.
struct SpectralKernel {
    offset: usize,
    weights: Vec<Complex32>,
}

impl SpectralKernel {
    /// `len` must not exceed the plan length.
    fn new(fft: &FftPlan, freq: f32, len: usize, sr: u32) -> Self {
        let n_fft = fft.len();
        let window = hann(len);
        let norm: f32 = window.iter().sum();

        // Centred in the frame, like the samples it is matched against.
        let start = n_fft / 2 - len / 2;
        let mut buffer = vec![Complex32::new(0.0, 0.0); n_fft];
        for (m, &w) in window.iter().enumerate() {
            let n = start + m;
            let phase = 2.0 * PI * freq as f64 * (n as f64 - (n_fft / 2) as f64) / sr as f64;
            buffer[n] = Complex32::from_polar(w / norm, phase as f32);
        }
        fft.transform(&mut buffer);

        let peak = buffer.iter().map(|c| c.norm()).fold(0.0f32, f32::max);
        let threshold = peak * SPARSITY;
        let first = buffer.iter().position(|c| c.norm() >= threshold).unwrap_or(0);
        let last = buffer.iter().rposition(|c| c.norm() >= threshold).unwrap_or(first);

        let scale = 1.0 / n_fft as f32;
        let weights = buffer[first..=last].iter().map(|c| c.conj() * scale).collect();
        Self {
            offset: first,
            weights,
        }
    }

    fn apply(&self, spectrum: &[Complex32]) -> f32 {
        spectrum[self.offset..]
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| x * w)
            .sum::<Complex32>()
            .norm()
    }
}

/// Number of CQT frames produced for a signal of `len` samples.
///
/// Frame `t` is centred on sample `t * hop_length`, so the count does not
/// depend on the FFT size.
pub fn n_frames(len: usize, hop_length: usize) -> usize {
    1 + len / hop_length
}

/// Compute the Constant-Q magnitude spectrogram of an audio signal.
///
/// Filters are normalised to unit gain, so a sinusoid of amplitude `a`
/// centred on a bin reads `a / 2` there whatever the bin's frequency. Bins
/// at or above Nyquist stay zero.
///
/// # Returns
/// Magnitudes shaped (n_bins x n_frames)
///
/// # Errors
/// Returns an error if `y` is empty or contains non-finite values, if the
/// sample rate, hop length, `n_bins` or `bins_per_octave` is zero, or if
/// `fmin` is not a positive frequency.
///
/// # Example
/// ```
/// use score_align::cqt::{cqt_magnitude, CqtConfig};
/// use score_align::io;
///
/// let signal = io::tone(440.0, 22050, 1.0);
/// let config = CqtConfig::new(22050, 512);
/// let spec = cqt_magnitude(&signal, &config).unwrap();
/// assert_eq!(spec.shape()[0], 84);
/// ```
pub fn cqt_magnitude(y: &[f32], config: &CqtConfig) -> crate::Result<Array2<f32>> {
    if y.is_empty() {
        return Err(crate::Error::EmptyAudio);
    }
    if !y.iter().all(|v| v.is_finite()) {
        return Err(crate::Error::NonFiniteAudio);
    }
    for (name, value) in [
        ("sr", config.sr as usize),
        ("hop_length", config.hop_length),
        ("n_bins", config.n_bins),
        ("bins_per_octave", config.bins_per_octave),
    ] {
        if value == 0 {
            return Err(crate::Error::InvalidSize {
                name,
                value,
                reason: "must be greater than zero",
            });
        }
    }
    if !(config.fmin.is_finite() && config.fmin > 0.0) {
        return Err(crate::Error::InvalidParameter {
            name: "fmin",
            value: config.fmin.to_string(),
            reason: "must be a positive frequency".to_string(),
        });
    }

    let freqs = cqt_frequencies(config.n_bins, config.fmin, config.bins_per_octave);
    let lengths = config.filter_lengths(&freqs);

    // The longest (lowest) filter decides the FFT size.
    let max_len = lengths.iter().copied().max().unwrap_or(2048);
    let n_fft = max_len.next_power_of_two().max(512);
    let fft = FftPlan::new(n_fft);

    let nyquist = config.sr as f32 / 2.0;
    let kernels: Vec<Option<SpectralKernel>> = freqs
        .iter()
        .zip(&lengths)
        .map(|(&freq, &len)| (freq < nyquist).then(|| SpectralKernel::new(&fft, freq, len, config.sr)))
        .collect();

    let frames = n_frames(y.len(), config.hop_length);
    let mut out = Array2::<f32>::zeros((config.n_bins, frames));
    let mut buffer: Vec<Complex32> = Vec::with_capacity(n_fft);

    for frame_idx in 0..frames {
        fft.frame(y, frame_idx * config.hop_length, &mut buffer);
        for (bin_idx, kernel) in kernels.iter().enumerate() {
            if let Some(kernel) = kernel {
                out[(bin_idx, frame_idx)] = kernel.apply(&buffer);
            }
        }
    }

    Ok(out)
}
