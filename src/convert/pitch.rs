use super::{A4_HZ, MIDI_A4};

/// Convert a MIDI note number to frequency (Hz).
pub fn midi_to_hz(midi: f32) -> f32 {
    A4_HZ * 2.0f32.powf((midi - MIDI_A4) / 12.0)
}

/// Convert a MIDI note number to its name, e.g. 60 -> "C4".
pub fn midi_to_note(midi: i32) -> String {
    const NOTES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = midi.div_euclid(12) - 1;
    let note = NOTES[midi.rem_euclid(12) as usize];
    format!("{}{}", note, octave)
}

/// Parse a note name such as "C3", "f#2" or "Bb4" into a MIDI note number.
pub fn note_to_midi(note: &str) -> Option<i32> {
    const NOTE_MAP: [(char, i32); 7] = [
        ('C', 0),
        ('D', 2),
        ('E', 4),
        ('F', 5),
        ('G', 7),
        ('A', 9),
        ('B', 11),
    ];

    let note = note.trim();
    let mut chars = note.chars();
    let letter = chars.next()?.to_ascii_uppercase();
    let base = NOTE_MAP.iter().find(|(name, _)| *name == letter)?.1;

    let rest = chars.as_str();
    let (accidental, octave_str) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave_str.parse().ok()?;
    Some((octave + 1) * 12 + base + accidental)
}
