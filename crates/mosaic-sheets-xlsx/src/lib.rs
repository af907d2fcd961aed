//! # mosaic-sheets-xlsx
//!
//! XLSX (Office Open XML) writer for mosaic workbooks, plus a reader that
//! loads the parts a mosaic workbook uses (cell values, formulas with cached
//! results, `cellIs`/`expression` conditional formatting and their dxf
//! styles) so output can be verified and displayed again.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
