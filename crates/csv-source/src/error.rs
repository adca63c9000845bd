//! Error types for reading and mapping the source table.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while opening or streaming the source file.
#[derive(Debug, Error)]
pub enum SourceReadError {
    /// The file could not be opened.
    #[error("Failed to open source file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is empty, so there is no header row.
    #[error("Source file {} has no header row", .path.display())]
    MissingHeader { path: PathBuf },

    /// The header row exists but cannot be used as column names.
    #[error("Malformed header row in {}: {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String },

    /// A data row could not be read (bad encoding, wrong column count, I/O).
    #[error("Failed to read row {row} of {}: {source}", .path.display())]
    Row {
        path: PathBuf,
        row: u64,
        #[source]
        source: csv::Error,
    },

    /// A data row carries a different number of cells than the header.
    #[error("Row {row} has {found} cells, expected {expected}")]
    ColumnCount {
        row: u64,
        expected: usize,
        found: usize,
    },

    /// The inference pass was stopped before reaching the end of the file.
    #[error("Reading {} was cancelled", .path.display())]
    Cancelled { path: PathBuf },

    /// A cell no longer matches the type inferred for its column, which
    /// means the file changed between the inference pass and the read pass.
    #[error("Row {row}, column '{column}': value '{value}' does not parse as {expected}")]
    TypeDrift {
        row: u64,
        column: String,
        value: String,
        expected: report_core::ColumnType,
    },
}

/// The source header lacks columns the node schema selects from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Source is missing required columns: {}", .missing.join(", "))]
pub struct SchemaMismatchError {
    /// Missing source headers, in node property order.
    pub missing: Vec<String>,
}
