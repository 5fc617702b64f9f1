//! Minimal header-addressed CSV reading shared by the note and manifest
//! loaders.
//!
//! Records are one per line. Fields may be double-quoted, with `""` standing
//! for a literal quote; quoted fields do not span lines. Blank lines are
//! skipped and line numbers are 1-based physical lines of the file.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub(crate) struct Record {
    pub line: usize,
    pub fields: Vec<String>,
}

#[derive(Debug, Clone)]
pub(crate) struct Table {
    path: PathBuf,
    header_line: usize,
    header: Vec<String>,
    records: Vec<Record>,
}

impl Table {
    pub fn read(path: &Path) -> crate::Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text, path)
    }

    /// `path` is only used to label errors.
    pub fn parse(text: &str, path: &Path) -> crate::Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(k, l)| (k + 1, l.trim_end_matches('\r')))
            .filter(|(_, l)| !l.trim().is_empty());

        let (header_line, header) = lines.next().ok_or_else(|| crate::Error::Parse {
            path: path.to_path_buf(),
            line: 1,
            reason: "missing header row".to_string(),
        })?;
        let header = split_record(header.trim_start_matches('\u{feff}')).map_err(|reason| {
            crate::Error::Parse {
                path: path.to_path_buf(),
                line: header_line,
                reason,
            }
        })?;
        let header: Vec<String> = header.into_iter().map(|h| h.trim().to_string()).collect();

        let mut records = Vec::new();
        for (line, text) in lines {
            let fields = split_record(text).map_err(|reason| crate::Error::Parse {
                path: path.to_path_buf(),
                line,
                reason,
            })?;
            if fields.len() != header.len() {
                return Err(crate::Error::Parse {
                    path: path.to_path_buf(),
                    line,
                    reason: format!("expected {} fields, found {}", header.len(), fields.len()),
                });
            }
            records.push(Record { line, fields });
        }

        Ok(Self {
            path: path.to_path_buf(),
            header_line,
            header,
            records,
        })
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn try_column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// # Errors
    /// `Parse` on the header line when the column is absent.
    pub fn column(&self, name: &str) -> crate::Result<usize> {
        self.try_column(name).ok_or_else(|| crate::Error::Parse {
            path: self.path.clone(),
            line: self.header_line,
            reason: format!("missing column `{name}`"),
        })
    }

    pub fn error(&self, record: &Record, reason: String) -> crate::Error {
        crate::Error::Parse {
            path: self.path.clone(),
            line: record.line,
            reason,
        }
    }

    /// Parse the field at `column` of `record`, naming the column on failure.
    pub fn parse_field<T>(&self, record: &Record, column: usize) -> crate::Result<T>
    where
        T: std::str::FromStr,
        T::Err: std::fmt::Display,
    {
        let raw = record.fields[column].trim();
        raw.parse::<T>().map_err(|e| {
            self.error(
                record,
                format!("invalid `{}` value {raw:?}: {e}", self.header[column]),
            )
        })
    }
}

fn split_record(line: &str) -> Result<Vec<String>, String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) => {
                if chars.peek() == Some(&'"') {
                    field.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            }
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            _ => field.push(c),
        }
    }
    if in_quotes {
        return Err("unterminated quoted field".to_string());
    }
    fields.push(field);
    Ok(fields)
}

/// Quote a field if it contains a separator, a quote or a line break.
pub(crate) fn escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}
