//! Formula error types

use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors that can occur during formula parsing or evaluation
#[derive(Debug, Error)]
pub enum FormulaError {
    /// Formula parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Formula evaluation error
    #[error("Evaluation error: {0}")]
    Evaluation(String),

    /// Selector index outside `[1, count]`
    #[error("Selector {index} out of range: expected 1..={count}")]
    SelectorOutOfRange { index: i64, count: usize },

    /// Reference to invalid cell
    #[error("Invalid reference: {0}")]
    InvalidReference(String),
}

impl From<mosaic_sheets_core::Error> for FormulaError {
    fn from(err: mosaic_sheets_core::Error) -> Self {
        FormulaError::InvalidReference(err.to_string())
    }
}
