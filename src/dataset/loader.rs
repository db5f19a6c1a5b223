//! Dataset loaders for the relational store and CSV exports.
//!
//! Both sources share one layout: `id`, `message`, `original`, `genre`
//! followed by one binary column per category. Categories keep the source
//! column order.

use std::path::Path;

use csv::ReaderBuilder;
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};

use crate::dataset::labels::LabelMatrix;
use crate::dataset::{Dataset, RECORD_COLUMNS, Record};
use crate::error::{Result, TriageError};

/// Kind of file a dataset is read from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceKind {
    Sqlite,
    Csv,
}

impl SourceKind {
    /// Detect the source kind from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("db" | "sqlite" | "sqlite3") => Ok(SourceKind::Sqlite),
            Some("csv") => Ok(SourceKind::Csv),
            _ => Err(TriageError::dataset(format!(
                "unsupported dataset format: {}",
                path.display()
            ))),
        }
    }
}

/// Reads a [`Dataset`] from disk.
#[derive(Clone, Debug, Default)]
pub struct DatasetLoader {
    table: Option<String>,
}

impl DatasetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from this SQLite table instead of the file stem.
    pub fn with_table<S: Into<String>>(mut self, table: S) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Load the dataset at `path`.
    pub fn load<P: AsRef<Path>>(&self, path: P) -> Result<Dataset> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(TriageError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("dataset not found: {}", path.display()),
            )));
        }

        let dataset = match SourceKind::from_path(path)? {
            SourceKind::Sqlite => {
                let table = match &self.table {
                    Some(table) => table.clone(),
                    None => default_table_name(path)?,
                };
                load_sqlite(path, &table)?
            }
            SourceKind::Csv => load_csv(path)?,
        };

        log::info!(
            "loaded {} records with {} categories from {}",
            dataset.len(),
            dataset.categories().len(),
            path.display()
        );
        Ok(dataset)
    }
}

/// Load a dataset, reading SQLite sources from `table` or the file stem.
pub fn load_dataset<P: AsRef<Path>>(path: P, table: Option<&str>) -> Result<Dataset> {
    let mut loader = DatasetLoader::new();
    if let Some(table) = table {
        loader = loader.with_table(table);
    }
    loader.load(path)
}

/// Table written by the ETL step: the database file name without extension.
pub fn default_table_name(path: &Path) -> Result<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            TriageError::dataset(format!("cannot derive table name from {}", path.display()))
        })
}

/// Quote `table` as an SQL identifier. Embedded quotes are doubled.
fn quote_identifier(table: &str) -> Result<String> {
    if table.trim().is_empty() {
        return Err(TriageError::dataset("table name is empty"));
    }
    Ok(format!("\"{}\"", table.replace('"', "\"\"")))
}

fn load_sqlite(path: &Path, table: &str) -> Result<Dataset> {
    let query = format!("SELECT * FROM {}", quote_identifier(table)?);
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    let mut stmt = conn.prepare(&query)?;
    let headers: Vec<String> = stmt.column_names().iter().map(|s| s.to_string()).collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut builder = DatasetBuilder::new(&layout);
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let cells = (0..headers.len())
            .map(|i| Ok(Cell::from(row.get_ref(i)?)))
            .collect::<Result<Vec<_>>>()?;
        builder.push(&cells)?;
    }

    builder.finish()
}

fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let layout = ColumnLayout::from_headers(&headers)?;

    let mut builder = DatasetBuilder::new(&layout);
    for record in reader.records() {
        let record = record?;
        let cells: Vec<Cell> = record
            .iter()
            .map(|value| {
                if value.is_empty() {
                    Cell::Null
                } else {
                    Cell::Text(value.to_string())
                }
            })
            .collect();
        builder.push(&cells)?;
    }

    builder.finish()
}

/// A source value before it is interpreted against the layout.
#[derive(Clone, Debug, PartialEq)]
enum Cell {
    Integer(i64),
    Real(f64),
    Text(String),
    Null,
}

impl From<ValueRef<'_>> for Cell {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Cell::Null,
            ValueRef::Integer(v) => Cell::Integer(v),
            ValueRef::Real(v) => Cell::Real(v),
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                Cell::Text(String::from_utf8_lossy(bytes).into_owned())
            }
        }
    }
}

impl Cell {
    fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            Cell::Integer(v) => Some(v.to_string()),
            Cell::Real(v) => Some(v.to_string()),
            Cell::Text(s) => Some(s.clone()),
        }
    }

    fn as_id(&self) -> Option<i64> {
        match self {
            Cell::Integer(v) => Some(*v),
            Cell::Real(v) if v.fract() == 0.0 => Some(*v as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Interpret the cell as a category label. Anything but 0 or 1 is `None`.
    fn as_label(&self) -> Option<u8> {
        let value = match self {
            Cell::Integer(v) => *v as f64,
            Cell::Real(v) => *v,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Null => return None,
        };
        if value == 0.0 {
            Some(0)
        } else if value == 1.0 {
            Some(1)
        } else {
            None
        }
    }
}

/// Positions of the record columns and the category columns.
#[derive(Clone, Debug)]
struct ColumnLayout {
    id: usize,
    message: usize,
    original: Option<usize>,
    genre: usize,
    categories: Vec<(usize, String)>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Result<Self> {
        let position = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| {
            position(name)
                .ok_or_else(|| TriageError::dataset(format!("missing required column '{name}'")))
        };

        let categories: Vec<(usize, String)> = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| !RECORD_COLUMNS.contains(&h.as_str()))
            .map(|(i, h)| (i, h.clone()))
            .collect();

        if categories.is_empty() {
            return Err(TriageError::dataset("dataset has no category columns"));
        }

        Ok(ColumnLayout {
            id: require("id")?,
            message: require("message")?,
            original: position("original"),
            genre: require("genre")?,
            categories,
        })
    }
}

struct DatasetBuilder<'a> {
    layout: &'a ColumnLayout,
    records: Vec<Record>,
    rows: Vec<Vec<u8>>,
}

impl<'a> DatasetBuilder<'a> {
    fn new(layout: &'a ColumnLayout) -> Self {
        DatasetBuilder {
            layout,
            records: Vec::new(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, cells: &[Cell]) -> Result<()> {
        let layout = self.layout;
        let line = self.records.len() + 1;

        let id = cells[layout.id]
            .as_id()
            .ok_or_else(|| TriageError::dataset(format!("record {line}: invalid id")))?;

        let record = Record {
            id,
            message: cells[layout.message].as_text().unwrap_or_default(),
            original: layout.original.and_then(|i| cells[i].as_text()),
            genre: cells[layout.genre].as_text().unwrap_or_default(),
        };

        let labels = layout
            .categories
            .iter()
            .map(|(i, name)| {
                cells[*i].as_label().ok_or_else(|| {
                    TriageError::dataset(format!(
                        "record {id}: category '{name}' has value {:?}, expected 0 or 1",
                        cells[*i]
                    ))
                })
            })
            .collect::<Result<Vec<u8>>>()?;

        self.records.push(record);
        self.rows.push(labels);
        Ok(())
    }

    fn finish(self) -> Result<Dataset> {
        let categories = self
            .layout
            .categories
            .iter()
            .map(|(_, name)| name.clone())
            .collect();
        let labels = LabelMatrix::from_rows(categories, self.rows)?;
        Dataset::new(self.records, labels)
    }
}
