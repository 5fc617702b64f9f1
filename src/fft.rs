use num_complex::Complex32;
use rustfft::{Fft, FftPlanner};
use std::f32::consts::PI;
use std::sync::Arc;

/// Periodic Hann window of `len` samples.
pub fn hann(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (1.0 - (2.0 * PI * i as f32 / len as f32).cos()))
        .collect()
}

/// Planned forward FFT of a fixed length.
///
/// One plan is built per spectrogram and reused for the kernels and every
/// frame, so the planner cost is paid once per signal.
pub struct FftPlan {
    forward: Arc<dyn Fft<f32>>,
    len: usize,
}

impl FftPlan {
    /// Create a plan for frames of `len` samples.
    pub fn new(len: usize) -> Self {
        let mut planner = FftPlanner::new();
        let forward = planner.plan_fft_forward(len);
        Self { forward, len }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Transform `buffer` in place. Its length must equal the plan length.
    pub fn transform(&self, buffer: &mut [Complex32]) {
        self.forward.process(buffer);
    }

    /// Transform the unwindowed frame of `y` centred on sample `center`.
    ///
    /// Samples falling outside `y` are treated as zero. `buffer` is resized
    /// to the plan length and overwritten with the spectrum.
    pub fn frame(&self, y: &[f32], center: usize, buffer: &mut Vec<Complex32>) {
        let n = self.len;
        buffer.clear();
        buffer.resize(n, Complex32::new(0.0, 0.0));

        let start = center as isize - (n / 2) as isize;
        for (i, buf) in buffer.iter_mut().enumerate() {
            let idx = start + i as isize;
            if idx >= 0 && (idx as usize) < y.len() {
                buf.re = y[idx as usize];
            }
        }

        self.transform(buffer);
    }
}

#[cfg(feature = "parallel")]
const _: () = {
    fn _assert_send_sync<T: Send + Sync>() {}
    fn _check() {
        _assert_send_sync::<FftPlan>();
    }
};
