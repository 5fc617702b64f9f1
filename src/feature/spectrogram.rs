use ndarray::Array2;

/// A dB-scaled spectrogram indexed `(pitch bin, frame)`.
///
/// Carries the hop length and sample rate it was computed with so that frame
/// indices can be turned back into seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrogram {
    data: Array2<f32>,
    sample_rate: u32,
    hop_length: usize,
}

impl Spectrogram {
    pub fn new(data: Array2<f32>, sample_rate: u32, hop_length: usize) -> Self {
        Self {
            data,
            sample_rate,
            hop_length,
        }
    }

    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    pub fn n_bins(&self) -> usize {
        self.data.nrows()
    }

    pub fn n_frames(&self) -> usize {
        self.data.ncols()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn hop_length(&self) -> usize {
        self.hop_length
    }

    /// Time in seconds of the start of frame `index`.
    pub fn frame_time(&self, index: usize) -> f64 {
        crate::convert::frame_to_time(index, self.sample_rate, self.hop_length)
    }

    /// Time spanned by all frames, in seconds.
    pub fn duration(&self) -> f64 {
        self.frame_time(self.n_frames())
    }

    /// Fail with the position of the first NaN or infinite cell.
    ///
    /// `which` names the spectrogram in the error message.
    pub fn ensure_finite(&self, which: &'static str) -> crate::Result<()> {
        match self.data.indexed_iter().find(|(_, v)| !v.is_finite()) {
            Some(((bin, frame), _)) => Err(crate::Error::NonFiniteSpectrogram { which, bin, frame }),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_accessors() {
        let s = Spectrogram::new(Array2::zeros((3, 5)), 22050, 512);
        assert_eq!(s.n_bins(), 3);
        assert_eq!(s.n_frames(), 5);
    }

    #[test]
    fn test_frame_time() {
        let s = Spectrogram::new(Array2::zeros((3, 5)), 22050, 512);
        assert_eq!(s.frame_time(0), 0.0);
        assert!((s.frame_time(4) - 4.0 * 512.0 / 22050.0).abs() < 1e-12);
        assert!((s.duration() - 5.0 * 512.0 / 22050.0).abs() < 1e-12);
    }

    #[test]
    fn test_ensure_finite_reports_position() {
        let mut data = Array2::zeros((3, 5));
        data[(2, 3)] = f32::INFINITY;
        let s = Spectrogram::new(data, 22050, 512);
        match s.ensure_finite("reference") {
            Err(crate::Error::NonFiniteSpectrogram { which, bin, frame }) => {
                assert_eq!(which, "reference");
                assert_eq!((bin, frame), (2, 3));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
