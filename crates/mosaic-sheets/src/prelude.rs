//! Prelude module - common imports for mosaic-sheets users
//!
//! ```rust
//! use mosaic_sheets::prelude::*;
//! ```

pub use crate::{
    // Pipeline
    compose_tables,
    compose_workbook,
    displayed_grid,
    mosaic,
    render_sheet,
    run_all,
    ArtifactNaming,
    MosaicOptions,
    SheetLayout,

    // Model
    CellAddress,
    CellRange,
    Grid,
    Workbook,
    Worksheet,

    // Errors
    Error,
    Result,

    // I/O
    GridTableReadOptions,
    GridTableWriteOptions,
    XlsxReader,
    XlsxWriter,
};
