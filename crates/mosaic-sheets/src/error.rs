//! Error type for the mosaic pipeline

use mosaic_sheets_core::{CellAddress, CellError};
use mosaic_sheets_csv::CsvError;
use mosaic_sheets_formula::FormulaError;
use mosaic_sheets_image::ImageError;
use mosaic_sheets_xlsx::XlsxError;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or displaying a mosaic
#[derive(Debug, Error)]
pub enum Error {
    /// Core model error
    #[error(transparent)]
    Core(#[from] mosaic_sheets_core::Error),

    /// Image loading, averaging or saving failed
    #[error(transparent)]
    Image(#[from] ImageError),

    /// Grid table reading or writing failed
    #[error(transparent)]
    Table(#[from] CsvError),

    /// Formula parsing or evaluation failed
    #[error(transparent)]
    Formula(FormulaError),

    /// XLSX reading or writing failed
    #[error(transparent)]
    Xlsx(#[from] XlsxError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Grid tables of different shapes cannot be multiplexed
    #[error(
        "table {table} is {}x{}, expected {}x{} like table 1",
        found.0, found.1, expected.0, expected.1
    )]
    DimensionMismatch {
        /// 1-based position of the offending table
        table: usize,
        expected: (u32, u16),
        found: (u32, u16),
    },

    /// Selector value outside `1..=count`
    #[error("Selector {index} out of range: expected 1..={count}")]
    SelectorOutOfRange { index: i64, count: usize },

    /// Nothing to compose
    #[error("At least one grid table is required")]
    NoTables,

    /// The sheet layout does not fit the grid
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// A displayed cell holds a spreadsheet error
    #[error("Cell {cell} displays {error}")]
    CellError { cell: CellAddress, error: CellError },

    /// A displayed cell holds something other than a gray level
    #[error("Cell {cell} displays '{value}', which is not a gray level")]
    NotAGrayLevel { cell: CellAddress, value: String },

    /// Images and labels must pair up
    #[error("{images} images but {labels} labels")]
    LabelCount { images: usize, labels: usize },

    /// Two tables would be written to the same files
    #[error("Label '{0}' is used more than once")]
    DuplicateLabel(String),
}

impl From<FormulaError> for Error {
    fn from(e: FormulaError) -> Self {
        match e {
            FormulaError::SelectorOutOfRange { index, count } => {
                Error::SelectorOutOfRange { index, count }
            }
            other => Error::Formula(other),
        }
    }
}
