/// Convert a frame index to time (seconds).
pub fn frame_to_time(frame: usize, sr: u32, hop_length: usize) -> f64 {
    (frame * hop_length) as f64 / sr as f64
}
