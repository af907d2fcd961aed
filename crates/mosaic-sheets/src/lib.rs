//! # mosaic-sheets
//!
//! Turn photographs into coarse brightness mosaics, and several mosaics into
//! one spreadsheet that shows any of them depending on a single selector
//! cell.
//!
//! The pipeline per image is load → grid-average → quantize → export (a grid
//! table plus a block preview). The grid tables are then composed into a
//! workbook whose cells hold `=CHOOSE($selector,...)` formulas, painted by
//! one conditional format per quantized gray level.
//!
//! ## Example
//!
//! ```rust
//! use mosaic_sheets::prelude::*;
//!
//! let a = Grid::from_rows(vec![vec![0, 8], vec![16, 24]]).unwrap();
//! let b = Grid::from_rows(vec![vec![32, 40], vec![48, 255]]).unwrap();
//!
//! let layout = SheetLayout::default();
//! let workbook = compose_workbook(&[a, b.clone()], &layout).unwrap();
//! let sheet = workbook.worksheet(0).unwrap();
//!
//! // What a spreadsheet application shows with the selector set to 2
//! let range = layout.data_range(2, 2).unwrap();
//! let selector = layout.selector_for(2, 2).unwrap();
//! assert_eq!(displayed_grid(sheet, range, selector, 2).unwrap(), b);
//! ```

pub mod compose;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod render;

pub use compose::{
    compose_tables, compose_workbook, gray_level_rules, write_workbook_atomic, ComposeReport,
    SheetLayout,
};
pub use error::{Error, Result};
pub use pipeline::{
    default_labels, mosaic, run_all, ArtifactNaming, MosaicArtifacts, MosaicOptions, RunReport,
};
pub use render::{displayed_grid, locate_mosaic, render_sheet, MosaicLocation};

// Re-export the building blocks
pub use mosaic_sheets_core::{
    round_to_multiple_of_8, CellAddress, CellRange, CellValue, Color, ConditionalFormatRule,
    Grid, Style, Workbook, Worksheet,
};
pub use mosaic_sheets_csv::{
    GridTableReadOptions, GridTableReader, GridTableWriteOptions, GridTableWriter,
    LineTerminator,
};
pub use mosaic_sheets_formula::{choose_formula, select};
pub use mosaic_sheets_image::{average_grid, load_rgb, render_preview, save_preview, CropPlan};
pub use mosaic_sheets_xlsx::{XlsxReader, XlsxWriter};
