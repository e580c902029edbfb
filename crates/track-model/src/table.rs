//! Column-oriented numeric tables loaded from CSV telemetry exports.
//!
//! Both capture systems export a header row followed by numeric rows.
//! Cells the exporter could not fill are left empty; the loader carries the
//! previous row's value forward so every column ends up the same length.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};

/// A set of equally long numeric columns, in header order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    names: Vec<String>,
    columns: Vec<Vec<f64>>,
}

impl Table {
    /// Load a table from a CSV file on disk.
    ///
    /// The file handle is released before this returns.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, TableError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| TableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = Self::from_reader(file)?;
        tracing::debug!(
            path = %path.display(),
            columns = table.names.len(),
            rows = table.row_count(),
            "Loaded table"
        );
        Ok(table)
    }

    /// Parse a table from any CSV source.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        if headers.is_empty() {
            return Err(TableError::NoHeader);
        }

        let mut table = Self::default();
        for name in headers.iter() {
            if table.index_of(name).is_some() {
                return Err(TableError::DuplicateColumn {
                    name: name.to_string(),
                });
            }
            table.names.push(name.to_string());
            table.columns.push(Vec::new());
        }

        for (row_idx, record) in rdr.records().enumerate() {
            let record = record?;
            // +2: one for the header, one for 1-based line numbers
            let line = row_idx + 2;
            for (col, cell) in record.iter().enumerate() {
                let value = if cell.is_empty() {
                    table.columns[col].last().copied().ok_or_else(|| {
                        TableError::MissingInitialValue {
                            column: table.names[col].clone(),
                        }
                    })?
                } else {
                    cell.parse::<f64>().map_err(|_| TableError::InvalidCell {
                        line,
                        column: table.names[col].clone(),
                        value: cell.to_string(),
                    })?
                };
                table.columns[col].push(value);
            }
        }

        Ok(table)
    }

    /// Column names in header order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Look up a column by exact name.
    pub fn column(&self, name: &str) -> Option<&[f64]> {
        self.index_of(name).map(|i| self.columns[i].as_slice())
    }

    /// Look up a column by name, ignoring ASCII case.
    pub fn column_ci(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n.eq_ignore_ascii_case(name))
            .map(|i| self.columns[i].as_slice())
    }

    /// Look up a column that must exist.
    pub fn require(&self, name: &str) -> Result<&[f64], TableError> {
        self.column_ci(name).ok_or_else(|| TableError::MissingColumn {
            name: name.to_string(),
        })
    }

    /// Append a column. Its length must match the existing row count
    /// unless the table has no columns yet.
    pub fn push_column(
        &mut self,
        name: impl Into<String>,
        values: Vec<f64>,
    ) -> Result<(), TableError> {
        let name = name.into();
        if self.index_of(&name).is_some() {
            return Err(TableError::DuplicateColumn { name });
        }
        if !self.columns.is_empty() && values.len() != self.row_count() {
            return Err(TableError::LengthMismatch {
                column: name,
                expected: self.row_count(),
                actual: values.len(),
            });
        }
        self.names.push(name);
        self.columns.push(values);
        Ok(())
    }

    /// Write the table as CSV, header first.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), TableError> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.names)?;
        for row in 0..self.row_count() {
            wtr.write_record(self.columns.iter().map(|c| c[row].to_string()))?;
        }
        wtr.flush().map_err(|e| TableError::Csv(e.into()))?;
        Ok(())
    }

    /// Write the table to a CSV file, replacing any existing file.
    pub fn write_path(&self, path: impl AsRef<Path>) -> Result<(), TableError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| TableError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        self.write_csv(file)
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }
}

/// Errors raised while loading or building a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Table has no header row")]
    NoHeader,

    #[error("Duplicate column name: {name}")]
    DuplicateColumn { name: String },

    #[error("Missing column: {name}")]
    MissingColumn { name: String },

    #[error("First data row has no value for column '{column}'")]
    MissingInitialValue { column: String },

    #[error("Line {line}, column '{column}': cannot parse '{value}' as a number")]
    InvalidCell {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Column '{column}' has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },
}
