//! Immutable alignment configuration.

use crate::convert::{midi_to_hz, midi_to_note, note_to_midi};

/// MIDI number of C3, the lowest pitch covered by the spectrogram.
pub const DEFAULT_BASE_MIDI: i32 = 48;

/// Number of octaves covered by the spectrogram.
pub const DEFAULT_N_OCTAVES: usize = 5;

/// Parameters shared by feature extraction, DTW and note mapping.
///
/// Built once (from the command line or in code) and passed by reference to
/// every component; nothing mutates it afterwards.
///
/// # Example
/// ```
/// use score_align::AlignConfig;
///
/// let config = AlignConfig::new()
///     .with_hop_length(256)
///     .with_bins_per_semitone(1)
///     .with_band_radius(0.1);
/// assert_eq!(config.n_bins(), 60);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct AlignConfig {
    /// Number of samples between successive spectrogram frames
    pub hop_length: usize,
    /// Constant-Q bins per semitone
    pub bins_per_semitone: usize,
    /// MIDI note of the lowest bin
    pub base_midi: i32,
    /// Octaves spanned by the spectrogram
    pub n_octaves: usize,
    /// Amplitude floor used before taking logarithms
    pub amin: f32,
    /// Dynamic range kept below the loudest bin, in dB
    pub top_db: f32,
    /// Optional DTW band radius as a fraction of the synthesized length
    pub band_radius: Option<f32>,
    /// Resample every input to this rate when set
    pub sample_rate: Option<u32>,
}

impl AlignConfig {
    pub fn new() -> Self {
        Self {
            hop_length: 512,
            bins_per_semitone: 3,
            base_midi: DEFAULT_BASE_MIDI,
            n_octaves: DEFAULT_N_OCTAVES,
            amin: 1e-5,
            top_db: 80.0,
            band_radius: None,
            sample_rate: None,
        }
    }

    pub fn with_hop_length(mut self, hop_length: usize) -> Self {
        self.hop_length = hop_length;
        self
    }

    pub fn with_bins_per_semitone(mut self, bins_per_semitone: usize) -> Self {
        self.bins_per_semitone = bins_per_semitone;
        self
    }

    /// Start the spectrogram at a named note such as `"C3"` or `"A#1"`.
    ///
    /// # Errors
    /// `InvalidParameter` if the name cannot be parsed.
    pub fn with_base_note(mut self, note: &str) -> crate::Result<Self> {
        self.base_midi = note_to_midi(note).ok_or_else(|| crate::Error::InvalidParameter {
            name: "base_note",
            value: note.to_string(),
            reason: "expected a note name like C3 or F#2".to_string(),
        })?;
        Ok(self)
    }

    /// Name of the lowest spectrogram bin's note.
    pub fn base_note(&self) -> String {
        midi_to_note(self.base_midi)
    }

    pub fn with_top_db(mut self, top_db: f32) -> Self {
        self.top_db = top_db;
        self
    }

    pub fn with_band_radius(mut self, radius: f32) -> Self {
        self.band_radius = Some(radius);
        self
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = Some(sample_rate);
        self
    }

    pub fn bins_per_octave(&self) -> usize {
        12 * self.bins_per_semitone
    }

    pub fn n_bins(&self) -> usize {
        self.n_octaves * self.bins_per_octave()
    }

    /// Frequency of the lowest spectrogram bin in Hz.
    pub fn fmin(&self) -> f32 {
        midi_to_hz(self.base_midi as f32)
    }

    /// Check every field once, before any audio is touched.
    pub fn validate(&self) -> crate::Result<()> {
        if self.hop_length == 0 {
            return Err(crate::Error::InvalidSize {
                name: "hop_length",
                value: 0,
                reason: "must be greater than zero",
            });
        }
        if self.bins_per_semitone == 0 {
            return Err(crate::Error::InvalidSize {
                name: "bins_per_semitone",
                value: 0,
                reason: "must be greater than zero",
            });
        }
        if self.n_octaves == 0 {
            return Err(crate::Error::InvalidSize {
                name: "n_octaves",
                value: 0,
                reason: "must be greater than zero",
            });
        }
        if !(self.amin.is_finite() && self.amin > 0.0) {
            return Err(crate::Error::InvalidParameter {
                name: "amin",
                value: self.amin.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        if !(self.top_db.is_finite() && self.top_db > 0.0) {
            return Err(crate::Error::InvalidParameter {
                name: "top_db",
                value: self.top_db.to_string(),
                reason: "must be a positive finite number".to_string(),
            });
        }
        if let Some(radius) = self.band_radius
            && !(radius.is_finite() && radius > 0.0)
        {
            return Err(crate::Error::InvalidParameter {
                name: "band_radius",
                value: radius.to_string(),
                reason: "must be a positive finite fraction".to_string(),
            });
        }
        if self.sample_rate == Some(0) {
            return Err(crate::Error::InvalidSize {
                name: "sample_rate",
                value: 0,
                reason: "must be greater than zero",
            });
        }
        Ok(())
    }
}

impl Default for AlignConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_cli_defaults() {
        let config = AlignConfig::default();
        assert_eq!(config.hop_length, 512);
        assert_eq!(config.bins_per_semitone, 3);
        assert_eq!(config.bins_per_octave(), 36);
        assert_eq!(config.n_bins(), 180);
        assert!((config.fmin() - 130.813).abs() < 1e-2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_base_note() {
        assert_eq!(AlignConfig::new().base_note(), "C3");
        let config = AlignConfig::new().with_base_note("A2").unwrap();
        assert_eq!(config.base_midi, 45);
        assert!((config.fmin() - 110.0).abs() < 1e-3);
        assert!(AlignConfig::new().with_base_note("X9").is_err());
    }

    #[test]
    fn test_zero_hop_rejected() {
        let config = AlignConfig::new().with_hop_length(0);
        assert!(matches!(
            config.validate(),
            Err(crate::Error::InvalidSize {
                name: "hop_length",
                ..
            })
        ));
    }

    #[test]
    fn test_zero_bins_rejected() {
        assert!(AlignConfig::new().with_bins_per_semitone(0).validate().is_err());
    }

    #[test]
    fn test_band_radius_must_be_positive() {
        assert!(AlignConfig::new().with_band_radius(0.0).validate().is_err());
        assert!(AlignConfig::new().with_band_radius(f32::NAN).validate().is_err());
        assert!(AlignConfig::new().with_band_radius(0.25).validate().is_ok());
    }

    #[test]
    fn test_top_db_must_be_positive() {
        assert!(AlignConfig::new().with_top_db(-1.0).validate().is_err());
    }

    #[test]
    fn test_zero_sample_rate_rejected() {
        assert!(AlignConfig::new().with_sample_rate(0).validate().is_err());
    }
}
