//
//  bitbucket-report
//  output/table.rs
//

//! In-memory result table and terminal rendering.
//!
//! [`DataTable`] is the standard [`TableSink`]: listing commands append typed
//! rows to it, and the CLI either renders it with `comfy_table` or hands it
//! to the CSV writer. Rendering uses the UTF-8 full border preset with
//! dynamic content arrangement, and colors the header when the terminal
//! supports it.

use anyhow::{bail, Result};
use comfy_table::{presets::UTF8_FULL, Color, ContentArrangement, Table};

use crate::output::{Cell, ColumnType, TableSink};

/// One declared column.
#[derive(Debug, Clone)]
pub struct Column {
    /// Header text, unique within a table.
    pub name: String,
    /// Declared cell type.
    pub column_type: ColumnType,
}

/// A named, typed, in-memory table of listing results.
///
/// # Example
///
/// ```rust
/// use bitbucket_report::output::{Cell, ColumnType, DataTable, TableSink};
///
/// let mut table = DataTable::new("Repositories");
/// table.ensure_column("Name", ColumnType::String);
/// table.ensure_column("Size", ColumnType::Int);
/// table.append(vec![Cell::Str("demo".to_string()), Cell::Int(42)])?;
/// assert_eq!(table.row_count(), 1);
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct DataTable {
    /// Table identifier, used in messages and the count property default.
    pub table_id: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl DataTable {
    /// Creates an empty table with the given identifier.
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Returns the declared columns in order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Returns the appended rows in order.
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Renders the table for the terminal.
    ///
    /// The header is colored cyan when the terminal reports color support.
    pub fn render(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        let color = console::colors_enabled();
        table.set_header(self.columns.iter().map(|column| {
            let cell = comfy_table::Cell::new(&column.name);
            if color {
                cell.fg(Color::Cyan)
            } else {
                cell
            }
        }));

        for row in &self.rows {
            table.add_row(row.iter().map(Cell::render));
        }

        table
    }
}

impl TableSink for DataTable {
    fn ensure_column(&mut self, name: &str, column_type: ColumnType) -> usize {
        if let Some(index) = self.columns.iter().position(|column| column.name == name) {
            return index;
        }
        self.columns.push(Column {
            name: name.to_string(),
            column_type,
        });
        // Existing rows get a trailing null for the new column.
        for row in &mut self.rows {
            row.push(Cell::Null);
        }
        self.columns.len() - 1
    }

    fn append(&mut self, mut row: Vec<Cell>) -> Result<()> {
        if row.len() > self.columns.len() {
            bail!(
                "Row with {} cells does not fit table \"{}\" with {} columns.",
                row.len(),
                self.table_id,
                self.columns.len()
            );
        }
        row.resize(self.columns.len(), Cell::Null);
        self.rows.push(row);
        Ok(())
    }

    fn row_count(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_column_reuses_existing_by_name() {
        let mut table = DataTable::new("T");
        let first = table.ensure_column("Name", ColumnType::String);
        let second = table.ensure_column("Name", ColumnType::String);
        assert_eq!(first, second);
        assert_eq!(table.columns().len(), 1);
    }

    #[test]
    fn test_short_rows_are_padded_with_null() {
        let mut table = DataTable::new("T");
        table.ensure_column("A", ColumnType::String);
        table.ensure_column("B", ColumnType::Int);
        table.append(vec![Cell::Str("x".to_string())]).unwrap();
        assert_eq!(table.rows()[0], vec![Cell::Str("x".to_string()), Cell::Null]);
    }

    #[test]
    fn test_oversized_rows_are_rejected() {
        let mut table = DataTable::new("T");
        table.ensure_column("A", ColumnType::String);
        let result = table.append(vec![Cell::Null, Cell::Null]);
        assert!(result.is_err());
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_late_columns_backfill_existing_rows() {
        let mut table = DataTable::new("T");
        table.ensure_column("A", ColumnType::String);
        table.append(vec![Cell::Str("x".to_string())]).unwrap();
        table.ensure_column("B", ColumnType::String);
        assert_eq!(table.rows()[0].len(), 2);
        assert_eq!(table.rows()[0][1], Cell::Null);
    }
}
