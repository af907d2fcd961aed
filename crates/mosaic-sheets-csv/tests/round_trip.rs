//! File-level tests for grid tables

use mosaic_sheets_core::Grid;
use mosaic_sheets_csv::{
    CsvError, GridTableReadOptions, GridTableReader, GridTableWriteOptions, GridTableWriter,
    LineTerminator,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn grid_strategy() -> impl Strategy<Value = Grid> {
    (1usize..12, 1usize..12).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(any::<u8>(), cols), rows)
            .prop_map(|rows| Grid::from_rows(rows).unwrap())
    })
}

#[test]
fn file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("CSV_test.csv");

    let grid = Grid::from_rows(vec![vec![0, 8, 16, 24], vec![232, 240, 248, 255]]).unwrap();
    GridTableWriter::write_file(&grid, &path, &GridTableWriteOptions::default()).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text, "0,8,16,24\n232,240,248,255\n");

    let options = GridTableReadOptions::default().with_expected_shape(2, 4);
    assert_eq!(GridTableReader::read_file(&path, &options).unwrap(), grid);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = GridTableReader::read_file(dir.path().join("missing.csv"), &Default::default())
        .unwrap_err();
    assert!(matches!(err, CsvError::Io(_)));
}

proptest! {
    #[test]
    fn read_inverts_write(grid in grid_strategy(), crlf in any::<bool>(), tab in any::<bool>()) {
        let delimiter = if tab { b'\t' } else { b',' };
        let write_options = GridTableWriteOptions {
            delimiter,
            line_terminator: if crlf { LineTerminator::CRLF } else { LineTerminator::LF },
        };
        let read_options = GridTableReadOptions {
            delimiter,
            ..Default::default()
        };

        let mut buf = Vec::new();
        GridTableWriter::write(&grid, &mut buf, &write_options).unwrap();
        let back = GridTableReader::read(buf.as_slice(), &read_options).unwrap();
        prop_assert_eq!(back, grid);
    }
}
