//! Projection of note boundaries from synthesized time into recording time.
//!
//! Note boundaries arrive as symbolic ticks of the synthesized rendition. A
//! [`TickScale`] turns ticks into (fractional) synthesized frames, the warp
//! path turns synthesized frames into recording frames, and the hop length
//! turns recording frames into seconds.

use crate::convert::frame_to_time;
use crate::dtw::WarpPath;
use crate::notes::{AlignedNote, Note};

/// Linear tick-to-frame scale of the synthesized rendition.
///
/// The rendition is assumed to play the score at a constant rate, so the
/// last offset tick lands on the last synthesized frame:
/// `frame = tick * total_frames / max_tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickScale {
    frames_per_tick: f64,
}

impl TickScale {
    /// # Errors
    /// `ZeroDuration` when `max_tick` is zero.
    pub fn new(total_frames: usize, max_tick: u64) -> crate::Result<Self> {
        if max_tick == 0 {
            return Err(crate::Error::ZeroDuration);
        }
        Ok(Self {
            frames_per_tick: total_frames as f64 / max_tick as f64,
        })
    }

    /// Scale whose maximum tick is the largest offset in `notes`.
    ///
    /// # Errors
    /// `NoNotes` for an empty list, `ZeroDuration` when every offset is zero.
    pub fn from_notes(notes: &[Note], total_frames: usize) -> crate::Result<Self> {
        let max_tick = notes
            .iter()
            .map(|n| n.offset)
            .max()
            .ok_or(crate::Error::NoNotes)?;
        Self::new(total_frames, max_tick)
    }

    pub fn frames_per_tick(&self) -> f64 {
        self.frames_per_tick
    }

    pub fn to_frame(&self, tick: u64) -> f64 {
        tick as f64 * self.frames_per_tick
    }
}

/// Maps synthesized-frame positions to seconds in the recording.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeMapper {
    hop_length: usize,
    sample_rate: u32,
}

impl TimeMapper {
    /// # Errors
    /// `SampleRateMismatch` when the recording and the synthesized audio
    /// were not analysed at the same rate; `InvalidSize` for a zero hop
    /// length or sample rate.
    pub fn new(hop_length: usize, real_sample_rate: u32, synth_sample_rate: u32) -> crate::Result<Self> {
        if real_sample_rate != synth_sample_rate {
            return Err(crate::Error::SampleRateMismatch {
                real: real_sample_rate,
                synth: synth_sample_rate,
            });
        }
        if hop_length == 0 || real_sample_rate == 0 {
            return Err(crate::Error::InvalidSize {
                name: if hop_length == 0 { "hop_length" } else { "sample_rate" },
                value: 0,
                reason: "must be greater than zero",
            });
        }
        Ok(Self {
            hop_length,
            sample_rate: real_sample_rate,
        })
    }

    fn seconds(&self, path: &WarpPath, index: usize) -> f64 {
        let (real_frame, _) = path.get(index).unwrap_or((0, 0));
        frame_to_time(real_frame, self.sample_rate, self.hop_length)
    }

    /// Map one `(onset, offset)` pair of synthesized-frame positions.
    ///
    /// The start is the first path entry at or after `onset_frame`, the end
    /// the last entry at or before `offset_frame`. Positions outside the
    /// path clamp to its first or last entry. The end is never earlier than
    /// the start, even when both boundaries quantize onto each other.
    pub fn map_frames(&self, path: &WarpPath, onset_frame: f64, offset_frame: f64) -> AlignedNote {
        let start = self.seconds(path, path.first_at_or_after(onset_frame));
        let end = self.seconds(path, path.last_at_or_before(offset_frame));
        AlignedNote {
            start,
            end: end.max(start),
        }
    }

    /// Map every note, in input order.
    pub fn map_notes(&self, path: &WarpPath, notes: &[Note], scale: &TickScale) -> Vec<AlignedNote> {
        notes
            .iter()
            .map(|note| self.map_frames(path, scale.to_frame(note.onset), scale.to_frame(note.offset)))
            .collect()
    }
}

/// Map a note list onto the recording's time axis.
///
/// # Arguments
/// * `path` - Warp path from recording frames to synthesized frames
/// * `notes` - Notes in synthesized ticks
/// * `synth_frames` - Number of frames in the synthesized spectrogram
/// * `hop_length` - Hop length of both spectrograms
/// * `real_sample_rate` / `synth_sample_rate` - Rates the audio was analysed at
///
/// # Errors
/// `NoNotes`, `ZeroDuration`, `SampleRateMismatch` or `InvalidSize`.
///
/// # Example
/// ```
/// use score_align::dtw::WarpPath;
/// use score_align::mapping::map_notes;
/// use score_align::notes::Note;
///
/// let path = WarpPath::from_pairs((0..5).map(|t| (t, t)).collect()).unwrap();
/// let notes = [Note { onset: 0, offset: 10, pitch: 60, velocity: 64 }];
/// let aligned = map_notes(&path, &notes, 5, 512, 22050, 22050).unwrap();
/// assert_eq!(aligned[0].start, 0.0);
/// assert!((aligned[0].end - 4.0 * 512.0 / 22050.0).abs() < 1e-12);
/// ```
pub fn map_notes(
    path: &WarpPath,
    notes: &[Note],
    synth_frames: usize,
    hop_length: usize,
    real_sample_rate: u32,
    synth_sample_rate: u32,
) -> crate::Result<Vec<AlignedNote>> {
    let mapper = TimeMapper::new(hop_length, real_sample_rate, synth_sample_rate)?;
    let scale = TickScale::from_notes(notes, synth_frames)?;
    Ok(mapper.map_notes(path, notes, &scale))
}
