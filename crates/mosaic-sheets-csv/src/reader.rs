//! Grid table reader

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::debug;
use mosaic_sheets_core::Grid;

use crate::error::{CsvError, CsvResult};
use crate::options::GridTableReadOptions;

/// Grid table reader
pub struct GridTableReader;

impl GridTableReader {
    /// Read a grid table file
    pub fn read_file<P: AsRef<Path>>(path: P, options: &GridTableReadOptions) -> CsvResult<Grid> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let grid = Self::read(file, options)?;
        debug!(
            "read {}x{} table from {}",
            grid.rows(),
            grid.cols(),
            path.display()
        );
        Ok(grid)
    }

    /// Read a grid table from a reader
    ///
    /// Every field must be an integer in `[0, 255]` and every row must have
    /// the same number of fields. Blank lines are skipped.
    pub fn read<R: Read>(reader: R, options: &GridTableReadOptions) -> CsvResult<Grid> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows: Vec<Vec<u8>> = Vec::new();
        for (row_idx, result) in csv_reader.records().enumerate() {
            let record = result?;
            let row_no = row_idx + 1;

            if let Some(first) = rows.first() {
                if record.len() != first.len() {
                    return Err(CsvError::parse(
                        row_no,
                        record.len().min(first.len()) + 1,
                        format!("expected {} fields, found {}", first.len(), record.len()),
                    ));
                }
            }

            let row = record
                .iter()
                .enumerate()
                .map(|(col_idx, field)| Self::parse_field(field, row_no, col_idx + 1))
                .collect::<CsvResult<Vec<u8>>>()?;
            rows.push(row);
        }

        if rows.first().map_or(true, |r| r.is_empty()) {
            return Err(CsvError::parse(1, 1, "table is empty"));
        }

        let grid = Grid::from_rows(rows)?;

        if let Some((expected_rows, expected_cols)) = options.expected_shape {
            if grid.shape() != (expected_rows, expected_cols) {
                return Err(CsvError::ShapeMismatch {
                    expected_rows,
                    expected_cols,
                    rows: grid.rows(),
                    cols: grid.cols(),
                });
            }
        }

        Ok(grid)
    }

    fn parse_field(field: &str, row: usize, column: usize) -> CsvResult<u8> {
        let value: i64 = field
            .parse()
            .map_err(|_| CsvError::parse(row, column, format!("'{}' is not an integer", field)))?;
        u8::try_from(value).map_err(|_| {
            CsvError::parse(row, column, format!("{} is outside [0, 255]", value))
        })
    }
}
