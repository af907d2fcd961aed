//! Grid table writer

use std::fs::File;
use std::io::Write;
use std::path::Path;

use log::info;
use mosaic_sheets_core::Grid;

use crate::error::CsvResult;
use crate::options::{GridTableWriteOptions, LineTerminator};

/// Grid table writer
pub struct GridTableWriter;

impl GridTableWriter {
    /// Write a grid to a table file
    pub fn write_file<P: AsRef<Path>>(
        grid: &Grid,
        path: P,
        options: &GridTableWriteOptions,
    ) -> CsvResult<()> {
        let path = path.as_ref();
        let file = File::create(path)?;
        Self::write(grid, file, options)?;
        info!("saved table {}", path.display());
        Ok(())
    }

    /// Write a grid to a writer, one row per line, no header
    pub fn write<W: Write>(grid: &Grid, writer: W, options: &GridTableWriteOptions) -> CsvResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(terminator)
            .has_headers(false)
            .from_writer(writer);

        for row in grid.iter_rows() {
            csv_writer.write_record(row.iter().map(|v| v.to_string()))?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}
