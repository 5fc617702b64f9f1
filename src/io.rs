//! Waveform loading, resampling and writing.
//!
//! Every loader returns a mono [`Waveform`]; multi-channel sources are
//! averaged down to one channel.

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::path::Path;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("hound error: {0}")]
    Hound(#[from] hound::Error),
    #[error("symphonia error: {0}")]
    Symphonia(SymphoniaError),
    #[error("no audio track found")]
    NoAudioTrack,
    #[error("unsupported number of channels")]
    UnsupportedChannels,
    #[error("resampling error: {0}")]
    Resample(String),
}

impl From<SymphoniaError> for AudioError {
    fn from(err: SymphoniaError) -> Self {
        Self::Symphonia(err)
    }
}

/// A mono audio signal together with its sample rate.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap mono samples recorded at `sample_rate` Hz.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in seconds.
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Resample to `target_sr`, returning `self` unchanged when the rates match.
    pub fn resampled(self, target_sr: u32) -> crate::Result<Self> {
        if target_sr == self.sample_rate {
            return Ok(self);
        }
        let samples = resample(&self.samples, self.sample_rate, target_sr)?;
        Ok(Self::new(samples, target_sr))
    }
}

/// Load an audio file as a mono waveform.
///
/// WAV files are read directly with hound; any other container goes through
/// symphonia's probe. When `target_sr` is given and differs from the file's
/// native rate, the signal is resampled.
///
/// # Example
/// ```no_run
/// use score_align::io;
///
/// let native = io::load("performance.wav", None).unwrap();
/// let at_22k = io::load("performance.flac", Some(22050)).unwrap();
/// assert_eq!(at_22k.sample_rate(), 22050);
/// # let _ = native;
/// ```
pub fn load<P: AsRef<Path>>(path: P, target_sr: Option<u32>) -> crate::Result<Waveform> {
    let path = path.as_ref();
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));

    let waveform = if is_wav {
        load_wav(path)?
    } else {
        decode(path)?
    };
    debug!(
        "loaded {} ({} samples at {} Hz)",
        path.display(),
        waveform.len(),
        waveform.sample_rate()
    );

    match target_sr {
        Some(sr) => waveform.resampled(sr),
        None => Ok(waveform),
    }
}

/// Load a WAV file with hound and downmix it to mono.
pub fn load_wav<P: AsRef<Path>>(path: P) -> crate::Result<Waveform> {
    let mut reader = WavReader::open(path).map_err(AudioError::Hound)?;
    let spec = reader.spec();
    if spec.channels == 0 {
        return Err(AudioError::UnsupportedChannels.into());
    }

    let mut interleaved: Vec<f32> = Vec::with_capacity(reader.len() as usize);
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, _) => {
            for s in reader.samples::<f32>() {
                interleaved.push(s.map_err(AudioError::Hound)?);
            }
        }
        (SampleFormat::Int, bits) if bits <= 16 => {
            let scale = (1i32 << (bits - 1)) as f32;
            for s in reader.samples::<i16>() {
                interleaved.push(s.map_err(AudioError::Hound)? as f32 / scale);
            }
        }
        (SampleFormat::Int, bits) => {
            let scale = (1i64 << (bits - 1)) as f32;
            for s in reader.samples::<i32>() {
                interleaved.push(s.map_err(AudioError::Hound)? as f32 / scale);
            }
        }
    }

    Ok(Waveform::new(
        downmix(&interleaved, spec.channels as usize),
        spec.sample_rate,
    ))
}

fn decode(path: &Path) -> Result<Waveform, AudioError> {
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let file = std::fs::File::open(path).map_err(SymphoniaError::IoError)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.sample_rate.is_some())
        .ok_or(AudioError::NoAudioTrack)?
        .clone();

    let sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(0);
    if channels == 0 {
        return Err(AudioError::UnsupportedChannels);
    }

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut interleaved: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::ResetRequired) => {
                decoder.reset();
                continue;
            }
            Err(SymphoniaError::IoError(_)) => break,
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track.id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(audio) => audio,
            Err(SymphoniaError::IoError(_)) => break,
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        };

        let mut sb = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        sb.copy_interleaved_ref(decoded);
        interleaved.extend_from_slice(sb.samples());
    }

    Ok(Waveform::new(downmix(&interleaved, channels), sample_rate))
}

/// Average interleaved channels into a single mono channel.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample a mono signal from `src_sr` to `dst_sr` with a windowed-sinc filter.
pub fn resample(samples: &[f32], src_sr: u32, dst_sr: u32) -> Result<Vec<f32>, AudioError> {
    if src_sr == dst_sr || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    if src_sr == 0 || dst_sr == 0 {
        return Err(AudioError::Resample(format!(
            "cannot resample between {src_sr} Hz and {dst_sr} Hz"
        )));
    }

    let gcd = gcd_u32(src_sr, dst_sr);
    let resample_ratio = (dst_sr / gcd) as f64 / (src_sr / gcd) as f64;

    let chunk_size = 1024usize;
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };
    let mut resampler = SincFixedIn::<f32>::new(resample_ratio, 2.0, params, chunk_size, 1)
        .map_err(|e| AudioError::Resample(e.to_string()))?;

    let mut output: Vec<f32> = Vec::new();
    for chunk in samples.chunks(chunk_size) {
        let mut buf = vec![0.0f32; chunk_size];
        buf[..chunk.len()].copy_from_slice(chunk);
        let chunk_out = resampler
            .process(&[buf], None)
            .map_err(|e| AudioError::Resample(e.to_string()))?;
        output.extend_from_slice(&chunk_out[0]);
    }

    let expected = ((samples.len() as f64) * (dst_sr as f64) / (src_sr as f64)).round() as usize;
    output.truncate(expected);
    Ok(output)
}

fn gcd_u32(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Write a waveform as 16-bit mono PCM.
///
/// Samples are clipped to [-1.0, 1.0] before quantization.
pub fn save_wav<P: AsRef<Path>>(path: P, waveform: &Waveform) -> crate::Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: waveform.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec).map_err(AudioError::Hound)?;
    for &sample in waveform.samples() {
        let s = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(s).map_err(AudioError::Hound)?;
    }
    writer.finalize().map_err(AudioError::Hound)?;
    Ok(())
}

/// Generate a pure tone.
pub fn tone(frequency: f32, sr: u32, duration: f32) -> Vec<f32> {
    let n_samples = (duration * sr as f32) as usize;
    let angular_freq = 2.0 * std::f32::consts::PI * frequency / sr as f32;
    (0..n_samples)
        .map(|i| (angular_freq * i as f32).sin())
        .collect()
}
