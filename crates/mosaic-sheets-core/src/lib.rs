//! # mosaic-sheets-core
//!
//! Core data structures for the mosaic-sheets photo mosaic tool.
//!
//! This crate provides the types shared by every other crate:
//! - [`Grid`] - A rectangular grid of quantized brightness values
//! - [`quantize`] - Rounding brightness to the 8-step gray palette
//! - [`CellValue`], [`CellAddress`] and [`CellRange`] - Cell contents and addressing
//! - [`Style`] and [`ConditionalFormatRule`] - The fill/font rules that paint the mosaic
//! - [`Workbook`], [`Worksheet`] - The spreadsheet document model
//!
//! ## Example
//!
//! ```rust
//! use mosaic_sheets_core::{CellValue, Workbook};
//!
//! let mut workbook = Workbook::new();
//! let sheet = workbook.worksheet_mut(0).unwrap();
//!
//! sheet.set_cell_value("B2", 128.0).unwrap();
//! sheet.set_cell_value_at(1, 2, CellValue::formula("=CHOOSE(1,0,8)")).unwrap();
//! ```

pub mod cell;
pub mod conditional_format;
pub mod error;
pub mod grid;
pub mod quantize;
pub mod style;
pub mod workbook;
pub mod worksheet;

// Re-exports for convenience
pub use cell::{CellAddress, CellError, CellRange, CellValue};
pub use conditional_format::{CfOperator, CfRuleType, ConditionalFormatRule};
pub use error::{Error, Result};
pub use grid::Grid;
pub use quantize::{round_to_multiple_of_8, QUANTIZATION_STEP};
pub use workbook::Workbook;
pub use worksheet::Worksheet;

pub use style::{Color, FillStyle, FontStyle, Style};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name
pub const MAX_SHEET_NAME_LEN: usize = 31;
