//! # mosaic-sheets-csv
//!
//! Reads and writes brightness grids as header-less delimited text tables:
//! one grid row per line, one integer per field.
//!
//! ## Example
//!
//! ```rust
//! use mosaic_sheets_core::Grid;
//! use mosaic_sheets_csv::{GridTableReadOptions, GridTableReader, GridTableWriteOptions, GridTableWriter};
//!
//! let grid = Grid::from_rows(vec![vec![0, 8], vec![128, 255]]).unwrap();
//!
//! let mut buf = Vec::new();
//! GridTableWriter::write(&grid, &mut buf, &GridTableWriteOptions::default()).unwrap();
//! assert_eq!(String::from_utf8_lossy(&buf), "0,8\n128,255\n");
//!
//! let back = GridTableReader::read(buf.as_slice(), &GridTableReadOptions::default()).unwrap();
//! assert_eq!(back, grid);
//! ```

mod error;
mod options;
mod reader;
mod writer;

pub use error::{CsvError, CsvResult};
pub use options::{GridTableReadOptions, GridTableWriteOptions, LineTerminator};
pub use reader::GridTableReader;
pub use writer::GridTableWriter;
