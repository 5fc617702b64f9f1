//! Dataset manifest and on-disk layout.
//!
//! A manifest is a CSV with at least `collection` and `filename` columns.
//! Each row names one recording; its inputs and outputs live at fixed
//! locations relative to the input and output directories:
//!
//! | file | location |
//! |------|----------|
//! | recording | `<input>/wav/<collection>/<filename>.wav` |
//! | synthesized | `<input>/synth/<collection>/<filename>.wav` |
//! | notes | `<input>/notes/<collection>/<filename>.csv` |
//! | aligned notes | `<out>/alignment/<collection>/<filename>.csv` |
//! | warp path | `<out>/alignment/<collection>/<filename>.npy` |

use crate::table::Table;
use std::fmt;
use std::path::{Path, PathBuf};

/// One manifest row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Item {
    pub collection: String,
    pub filename: String,
}

impl Item {
    pub fn new(collection: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filename: filename.into(),
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.filename)
    }
}

/// Read a manifest CSV.
///
/// # Errors
/// `Io` if unreadable; `Parse` for a missing column or an empty
/// `collection`/`filename` field.
pub fn read_manifest<P: AsRef<Path>>(path: P) -> crate::Result<Vec<Item>> {
    let table = Table::read(path.as_ref())?;
    items_from_table(&table)
}

/// Parse manifest CSV text; `path` only labels errors.
pub fn parse_manifest(text: &str, path: &Path) -> crate::Result<Vec<Item>> {
    let table = Table::parse(text, path)?;
    items_from_table(&table)
}

fn items_from_table(table: &Table) -> crate::Result<Vec<Item>> {
    let collection = table.column("collection")?;
    let filename = table.column("filename")?;

    table
        .records()
        .iter()
        .map(|record| {
            let c = record.fields[collection].trim();
            let f = record.fields[filename].trim();
            if c.is_empty() || f.is_empty() {
                return Err(table.error(record, "empty collection or filename".to_string()));
            }
            Ok(Item::new(c, f))
        })
        .collect()
}

/// Input and output roots of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetLayout {
    input_dir: PathBuf,
    out_dir: PathBuf,
}

impl DatasetLayout {
    pub fn new(input_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            out_dir: out_dir.into(),
        }
    }

    pub fn input_dir(&self) -> &Path {
        &self.input_dir
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    fn input(&self, kind: &str, item: &Item, ext: &str) -> PathBuf {
        self.input_dir
            .join(kind)
            .join(&item.collection)
            .join(format!("{}.{ext}", item.filename))
    }

    pub fn recording(&self, item: &Item) -> PathBuf {
        self.input("wav", item, "wav")
    }

    pub fn synthesized(&self, item: &Item) -> PathBuf {
        self.input("synth", item, "wav")
    }

    pub fn notes(&self, item: &Item) -> PathBuf {
        self.input("notes", item, "csv")
    }

    /// Directory holding every output of the item's collection.
    pub fn alignment_dir(&self, item: &Item) -> PathBuf {
        self.out_dir.join("alignment").join(&item.collection)
    }

    pub fn aligned_notes(&self, item: &Item) -> PathBuf {
        self.alignment_dir(item).join(format!("{}.csv", item.filename))
    }

    pub fn warp_path(&self, item: &Item) -> PathBuf {
        self.alignment_dir(item).join(format!("{}.npy", item.filename))
    }
}
