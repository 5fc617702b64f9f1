use super::Spectrogram;
use crate::AlignConfig;
use crate::cqt::CqtConfig;
use crate::io::Waveform;
use crate::spectrum::amplitude_to_db_max;
use log::debug;

/// Turns waveforms into comparable log-magnitude constant-Q spectrograms.
///
/// Every spectrogram spans `n_octaves` from the configured base note with
/// `12 * bins_per_semitone` rows per octave, and is scaled to dB against its
/// own loudest cell. Two recordings of different loudness therefore land on
/// the same scale.
///
/// # Example
/// ```
/// use score_align::{AlignConfig, FeatureExtractor};
/// use score_align::io::{self, Waveform};
///
/// let extractor = FeatureExtractor::new(&AlignConfig::new().with_bins_per_semitone(1));
/// let wave = Waveform::new(io::tone(261.63, 22050, 0.5), 22050);
/// let spec = extractor.extract(&wave).unwrap();
/// assert_eq!(spec.n_bins(), 60);
/// assert!(spec.data().iter().all(|&v| v <= 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    hop_length: usize,
    fmin: f32,
    n_bins: usize,
    bins_per_octave: usize,
    amin: f32,
    top_db: f32,
}

impl FeatureExtractor {
    pub fn new(config: &AlignConfig) -> Self {
        Self {
            hop_length: config.hop_length,
            fmin: config.fmin(),
            n_bins: config.n_bins(),
            bins_per_octave: config.bins_per_octave(),
            amin: config.amin,
            top_db: config.top_db,
        }
    }

    /// Number of pitch bins in every spectrogram this extractor produces.
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Compute the dB-scaled constant-Q spectrogram of `waveform`.
    ///
    /// # Errors
    /// Empty or non-finite audio, and zero hop length or bin counts.
    pub fn extract(&self, waveform: &Waveform) -> crate::Result<Spectrogram> {
        let cqt = CqtConfig::new(waveform.sample_rate(), self.hop_length)
            .with_fmin(self.fmin)
            .with_n_bins(self.n_bins)
            .with_bins_per_octave(self.bins_per_octave);

        let magnitude = cqt.magnitude(waveform.samples())?;
        let db = amplitude_to_db_max(&magnitude, self.amin, self.top_db);
        debug!(
            "extracted {} x {} spectrogram ({:.2} s)",
            db.nrows(),
            db.ncols(),
            waveform.duration()
        );

        Ok(Spectrogram::new(db, waveform.sample_rate(), self.hop_length))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io;

    fn extractor() -> FeatureExtractor {
        FeatureExtractor::new(&AlignConfig::new())
    }

    #[test]
    fn test_shape_follows_config() {
        let wave = Waveform::new(io::tone(440.0, 22050, 1.0), 22050);
        let spec = extractor().extract(&wave).unwrap();
        assert_eq!(spec.n_bins(), 180);
        assert_eq!(spec.hop_length(), 512);
        assert_eq!(spec.sample_rate(), 22050);
        assert!(spec.n_frames() > 1);
    }

    #[test]
    fn test_peak_is_zero_db() {
        let wave = Waveform::new(io::tone(440.0, 22050, 1.0), 22050);
        let spec = extractor().extract(&wave).unwrap();
        let max = spec.data().iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(max, 0.0);
        assert!(spec.data().iter().all(|&v| (-80.0..=0.0).contains(&v)));
    }

    #[test]
    fn test_silence_is_finite_floor() {
        let wave = Waveform::new(vec![0.0; 22050], 22050);
        let spec = extractor().extract(&wave).unwrap();
        assert!(spec.data().iter().all(|&v| v == -80.0));
        assert!(spec.ensure_finite("silence").is_ok());
    }

    #[test]
    fn test_deterministic() {
        let wave = Waveform::new(io::tone(196.0, 22050, 0.5), 22050);
        let a = extractor().extract(&wave).unwrap();
        let b = extractor().extract(&wave).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_gain_invariant() {
        let quiet: Vec<f32> = io::tone(330.0, 22050, 0.5).iter().map(|v| v * 0.1).collect();
        let loud = io::tone(330.0, 22050, 0.5);
        let a = extractor().extract(&Waveform::new(quiet, 22050)).unwrap();
        let b = extractor().extract(&Waveform::new(loud, 22050)).unwrap();
        for (x, y) in a.data().iter().zip(b.data().iter()) {
            // Cells near the floor may be clamped differently.
            if *x > -60.0 && *y > -60.0 {
                assert!((x - y).abs() < 1e-2, "{} vs {}", x, y);
            }
        }
    }

    #[test]
    fn test_empty_waveform_rejected() {
        let wave = Waveform::new(Vec::new(), 22050);
        assert!(matches!(
            extractor().extract(&wave),
            Err(crate::Error::EmptyAudio)
        ));
    }
}
