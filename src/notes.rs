//! Note lists in, aligned note times out.
//!
//! Input notes are CSV rows `onset,offset,pitch,velocity` in symbolic ticks
//! of the synthesized rendition. Aligned notes are written back as
//! `start,end` rows in seconds, one per input note and in the same order.

use crate::table::Table;
use std::fmt::Write as _;
use std::path::Path;

/// A score note positioned in synthesized ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Note {
    pub onset: u64,
    pub offset: u64,
    /// MIDI pitch
    pub pitch: i32,
    pub velocity: i32,
}

/// A note's boundaries on the recording's time axis, in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedNote {
    pub start: f64,
    pub end: f64,
}

/// Read a note list from a CSV file.
///
/// Columns are located by header name and may appear in any order; extra
/// columns are ignored. `velocity` is optional and defaults to zero.
///
/// # Errors
/// `Io` if the file cannot be read, `Parse` (with the offending line) for a
/// missing column or a malformed value.
pub fn read_notes<P: AsRef<Path>>(path: P) -> crate::Result<Vec<Note>> {
    let table = Table::read(path.as_ref())?;
    notes_from_table(&table)
}

/// Parse a note list from CSV text; `path` only labels errors.
pub fn parse_notes(text: &str, path: &Path) -> crate::Result<Vec<Note>> {
    let table = Table::parse(text, path)?;
    notes_from_table(&table)
}

fn notes_from_table(table: &Table) -> crate::Result<Vec<Note>> {
    let onset = table.column("onset")?;
    let offset = table.column("offset")?;
    let pitch = table.column("pitch")?;
    let velocity = table.try_column("velocity");

    table
        .records()
        .iter()
        .map(|record| {
            Ok(Note {
                onset: table.parse_field(record, onset)?,
                offset: table.parse_field(record, offset)?,
                pitch: table.parse_field(record, pitch)?,
                velocity: match velocity {
                    Some(col) => table.parse_field(record, col)?,
                    None => 0,
                },
            })
        })
        .collect()
}

/// Render aligned notes as `start,end` CSV text.
pub fn format_aligned(notes: &[AlignedNote]) -> String {
    let mut out = String::from("start,end\n");
    for note in notes {
        // Debug keeps a trailing `.0` on whole seconds.
        let _ = writeln!(out, "{:?},{:?}", note.start, note.end);
    }
    out
}

/// Write aligned notes to `path`, creating parent directories as needed.
pub fn write_aligned<P: AsRef<Path>>(path: P, notes: &[AlignedNote]) -> crate::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, format_aligned(notes))?;
    Ok(())
}

/// Read a `start,end` CSV back into aligned notes.
pub fn read_aligned<P: AsRef<Path>>(path: P) -> crate::Result<Vec<AlignedNote>> {
    let table = Table::read(path.as_ref())?;
    let start = table.column("start")?;
    let end = table.column("end")?;
    table
        .records()
        .iter()
        .map(|record| {
            Ok(AlignedNote {
                start: table.parse_field(record, start)?,
                end: table.parse_field(record, end)?,
            })
        })
        .collect()
}
