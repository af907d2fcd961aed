//! CSV error types

use thiserror::Error;

/// Result type for CSV operations
pub type CsvResult<T> = std::result::Result<T, CsvError>;

/// Errors that can occur during CSV operations
#[derive(Debug, Error)]
pub enum CsvError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Parse error (1-based row and column)
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Table shape differs from the one the caller expected
    #[error("Expected a {expected_rows}x{expected_cols} table, found {rows}x{cols}")]
    ShapeMismatch {
        expected_rows: u32,
        expected_cols: u16,
        rows: u32,
        cols: u16,
    },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] mosaic_sheets_core::Error),
}

impl CsvError {
    pub(crate) fn parse<S: Into<String>>(row: usize, column: usize, message: S) -> Self {
        CsvError::Parse {
            row,
            column,
            message: message.into(),
        }
    }
}
