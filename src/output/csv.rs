//
//  bitbucket-report
//  output/csv.rs
//

//! CSV file output for a [`DataTable`].
//!
//! The format is plain comma-separated values with minimal quoting: a field
//! is quoted only when it contains a comma, a double quote, or a line break,
//! and embedded quotes are doubled. The header row is written once; appending
//! to an existing non-empty file skips it so repeated runs accumulate rows
//! under a single header.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::output::table::DataTable;

/// Checks that the output path carries a `.csv` extension.
///
/// Called before any fetch so a misnamed output file is reported as a usage
/// error, not after the work is done.
///
/// # Errors
///
/// Returns an error naming the path when the extension is missing or is not
/// `.csv` (case-insensitive).
pub fn validate_csv_path(path: &Path) -> Result<()> {
    let ok = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !ok {
        anyhow::bail!(
            "Output file \"{}\" must have a .csv extension.",
            path.display()
        );
    }
    Ok(())
}

/// Quotes a field when the CSV format requires it.
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Writes the table to a CSV file.
///
/// With `append` set and the file already non-empty, rows are added without a
/// header; otherwise the file is created (or truncated) and the header row is
/// written first.
pub fn write_csv(table: &DataTable, path: &Path, append: bool) -> Result<()> {
    validate_csv_path(path)?;

    let existing_len = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    let write_header = !append || existing_len == 0;

    let mut file = OpenOptions::new()
        .create(true)
        .append(append)
        .write(true)
        .truncate(!append)
        .open(path)
        .with_context(|| format!("Unable to open output file \"{}\"", path.display()))?;

    if write_header {
        let header: Vec<String> = table
            .columns()
            .iter()
            .map(|column| escape_field(&column.name))
            .collect();
        writeln!(file, "{}", header.join(","))?;
    }

    for row in table.rows() {
        let fields: Vec<String> = row.iter().map(|cell| escape_field(&cell.render())).collect();
        writeln!(file, "{}", fields.join(","))?;
    }

    info!(
        path = %path.display(),
        rows = table.rows().len(),
        "wrote CSV output"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{Cell, ColumnType, TableSink};

    fn sample_table() -> DataTable {
        let mut table = DataTable::new("Issues");
        table.ensure_column("Name", ColumnType::String);
        table.ensure_column("Count", ColumnType::Int);
        table
            .append(vec![Cell::Str("plain".to_string()), Cell::Int(1)])
            .unwrap();
        table
            .append(vec![Cell::Str("with, comma".to_string()), Cell::Int(2)])
            .unwrap();
        table
    }

    #[test]
    fn test_non_csv_extension_is_rejected() {
        assert!(validate_csv_path(Path::new("out.txt")).is_err());
        assert!(validate_csv_path(Path::new("out")).is_err());
        assert!(validate_csv_path(Path::new("out.csv")).is_ok());
        assert!(validate_csv_path(Path::new("OUT.CSV")).is_ok());
    }

    #[test]
    fn test_write_creates_header_and_quotes_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_table(), &path, false).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines[0], "Name,Count");
        assert_eq!(lines[1], "plain,1");
        assert_eq!(lines[2], "\"with, comma\",2");
    }

    #[test]
    fn test_append_skips_header_on_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        write_csv(&sample_table(), &path, false).unwrap();
        write_csv(&sample_table(), &path, true).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let headers = contents
            .lines()
            .filter(|line| *line == "Name,Count")
            .count();
        assert_eq!(headers, 1);
        assert_eq!(contents.lines().count(), 5);
    }

    #[test]
    fn test_append_to_missing_file_writes_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fresh.csv");
        write_csv(&sample_table(), &path, true).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Name,Count\n"));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        assert_eq!(escape_field(r#"say "hi""#), r#""say ""hi""""#);
        assert_eq!(escape_field("plain"), "plain");
    }
}
