//
//  bitbucket-report
//  output/mod.rs
//

//! Tabular output.
//!
//! Listing commands never print directly; they append typed rows to a
//! [`TableSink`]. The standard sink is the in-memory [`table::DataTable`],
//! which can be rendered to the terminal or written to a CSV file. Keeping
//! the sink behind a trait keeps the listing logic independent of where the
//! rows end up.

use anyhow::Result;
use chrono::{DateTime, FixedOffset};

pub mod csv;
pub mod table;

pub use table::DataTable;

/// Declared type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Free-form text.
    String,
    /// Signed integer.
    Int,
    /// Boolean.
    Bool,
    /// Timestamp with offset.
    DateTime,
}

/// One table cell.
///
/// `Null` renders as the empty string in every output form.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Str(String),
    Int(i64),
    Bool(bool),
    DateTime(DateTime<FixedOffset>),
    Null,
}

impl Cell {
    /// Builds a string cell, mapping an empty value to `Null`.
    pub fn from_str_or_null(value: &str) -> Self {
        if value.is_empty() {
            Self::Null
        } else {
            Self::Str(value.to_string())
        }
    }

    /// Builds a datetime cell, mapping a missing value to `Null`.
    pub fn from_datetime(value: Option<DateTime<FixedOffset>>) -> Self {
        match value {
            Some(datetime) => Self::DateTime(datetime),
            None => Self::Null,
        }
    }

    /// Renders the cell as display text.
    pub fn render(&self) -> String {
        match self {
            Self::Str(value) => value.clone(),
            Self::Int(value) => value.to_string(),
            Self::Bool(value) => value.to_string(),
            Self::DateTime(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Null => String::new(),
        }
    }
}

/// Destination for listing rows.
pub trait TableSink {
    /// Adds a column if it does not exist yet and returns its index.
    fn ensure_column(&mut self, name: &str, column_type: ColumnType) -> usize;

    /// Appends a row. Short rows are padded with `Null`.
    ///
    /// # Errors
    ///
    /// Returns an error when the row has more cells than there are columns.
    fn append(&mut self, row: Vec<Cell>) -> Result<()>;

    /// Number of rows appended so far.
    fn row_count(&self) -> usize;
}
