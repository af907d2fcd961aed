//! Spreadsheet composition
//!
//! Several same-shaped grids become one worksheet: every data cell holds
//! `=CHOOSE($selector,v1,...,vN)` over the grids' values at that position,
//! and one `cellIs` rule per quantized level paints matching cells in that
//! gray.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use mosaic_sheets_core::quantize::quantized_levels;
use mosaic_sheets_core::{
    CellAddress, CellRange, CellValue, Color, ConditionalFormatRule, Grid, Style, Workbook,
};
use mosaic_sheets_csv::{GridTableReadOptions, GridTableReader};
use mosaic_sheets_formula::{choose_formula, select};
use mosaic_sheets_xlsx::XlsxWriter;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Rows from the last grid row down to the default selector row
const SELECTOR_ROW_GAP: u32 = 2;
/// Columns from the last grid column right to the default selector column
const SELECTOR_COL_GAP: u32 = 11;

/// Where things go on the composed worksheet
#[derive(Debug, Clone, PartialEq)]
pub struct SheetLayout {
    /// Worksheet name
    pub sheet_name: String,
    /// Cell that grid position (0, 0) lands on
    pub origin: CellAddress,
    /// Selector cell; `None` places it below and to the right of the data
    pub selector: Option<CellAddress>,
    /// Value the selector cell starts with
    pub initial_selector: i64,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet".to_string(),
            origin: CellAddress::new(1, 1),
            selector: None,
            initial_selector: 1,
        }
    }
}

impl SheetLayout {
    /// Set the worksheet name
    pub fn with_sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    /// Set the data origin
    pub fn with_origin(mut self, origin: CellAddress) -> Self {
        self.origin = origin.to_relative();
        self
    }

    /// Pin the selector cell
    pub fn with_selector(mut self, selector: CellAddress) -> Self {
        self.selector = Some(selector.to_relative());
        self
    }

    /// The cells a `rows x cols` grid occupies
    pub fn data_range(&self, rows: u32, cols: u16) -> Result<CellRange> {
        Ok(CellRange::with_size(self.origin, rows, cols)?)
    }

    /// The selector cell for a `rows x cols` grid
    ///
    /// Defaults to two rows below and eleven columns right of the last data
    /// cell, which is `CN53` for a 50x80 grid at `B2`.
    pub fn selector_for(&self, rows: u32, cols: u16) -> Result<CellAddress> {
        if let Some(selector) = self.selector {
            return Ok(selector);
        }
        let no_room = || {
            Error::InvalidLayout(format!(
                "no room for a selector next to a {}x{} grid at {}",
                rows, cols, self.origin
            ))
        };
        let down = rows
            .checked_add(SELECTOR_ROW_GAP - 1)
            .ok_or_else(no_room)?;
        let right = cols as u32 + SELECTOR_COL_GAP - 1;
        self.origin.offset(down, right).map_err(|_| no_room())
    }
}

/// What [`compose_tables`] produced
#[derive(Debug, Clone, PartialEq)]
pub struct ComposeReport {
    /// Path of the written workbook
    pub output: PathBuf,
    /// Number of multiplexed tables
    pub tables: usize,
    /// Grid shape shared by every table
    pub shape: (u32, u16),
    /// Cells holding selector formulas
    pub data_range: CellRange,
    /// Selector cell
    pub selector: CellAddress,
    /// Number of conditional formatting rules
    pub rules: usize,
}

/// One `cellIs equal` rule per quantized level, each painting fill and font
/// in that level's gray, in ascending level order with priorities 1..=33
pub fn gray_level_rules(range: CellRange) -> Vec<ConditionalFormatRule> {
    quantized_levels()
        .into_iter()
        .enumerate()
        .map(|(i, level)| {
            ConditionalFormatRule::cell_is_equal_to(level.to_string())
                .with_range(range)
                .with_format(Style::camouflage(Color::gray(level)))
                .with_priority(i as u32 + 1)
        })
        .collect()
}

/// Check that every grid has the shape of the first
fn common_shape(grids: &[Grid]) -> Result<(u32, u16)> {
    let first = grids.first().ok_or(Error::NoTables)?;
    let expected = first.shape();
    for (i, grid) in grids.iter().enumerate().skip(1) {
        if grid.shape() != expected {
            return Err(Error::DimensionMismatch {
                table: i + 1,
                expected,
                found: grid.shape(),
            });
        }
    }
    Ok(expected)
}

/// Build the selector workbook for `grids`
///
/// # Example
///
/// ```rust
/// use mosaic_sheets::{compose_workbook, SheetLayout};
/// use mosaic_sheets_core::{CellValue, Grid};
///
/// let a = Grid::from_rows(vec![vec![0, 8]]).unwrap();
/// let b = Grid::from_rows(vec![vec![16, 24]]).unwrap();
/// let workbook = compose_workbook(&[a, b], &SheetLayout::default()).unwrap();
///
/// let sheet = workbook.worksheet(0).unwrap();
/// assert_eq!(sheet.get_formula_at(1, 2), Some("=CHOOSE($N$4,8,24)"));
/// assert_eq!(sheet.get_value("N4").unwrap(), CellValue::Number(1.0));
/// ```
pub fn compose_workbook(grids: &[Grid], layout: &SheetLayout) -> Result<Workbook> {
    let (rows, cols) = common_shape(grids)?;
    let range = layout.data_range(rows, cols)?;
    let selector = layout.selector_for(rows, cols)?;
    if range.contains(&selector) {
        return Err(Error::InvalidLayout(format!(
            "selector {} lies inside the data range {}",
            selector, range
        )));
    }
    select(layout.initial_selector, grids)?;

    let mut workbook = Workbook::empty();
    let index = workbook.add_worksheet_with_name(&layout.sheet_name)?;
    let sheet = workbook
        .worksheet_mut(index)
        .ok_or_else(|| Error::InvalidLayout("worksheet vanished".into()))?;

    let mut values = Vec::with_capacity(grids.len());
    for (cell_index, address) in range.cells().enumerate() {
        values.clear();
        values.extend(grids.iter().map(|grid| grid.values()[cell_index]));

        let shown = *select(layout.initial_selector, &values)?;
        let formula = choose_formula(selector, &values);
        sheet.set_cell_value_at(
            address.row,
            address.col,
            CellValue::formula_with_cached(formula, shown as f64),
        )?;
    }

    sheet.set_cell_value_at(selector.row, selector.col, layout.initial_selector as f64)?;

    for rule in gray_level_rules(range) {
        sheet.add_conditional_format(rule);
    }

    debug!(
        "composed {} tables of {}x{} into {}, selector {}",
        grids.len(),
        rows,
        cols,
        range,
        selector
    );

    Ok(workbook)
}

/// Write `workbook` so that `path` either keeps its old content or holds the
/// complete new workbook
pub fn write_workbook_atomic(workbook: &Workbook, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = NamedTempFile::new_in(dir)?;
    XlsxWriter::write(workbook, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    info!("saved workbook {}", path.display());
    Ok(())
}

/// Read grid tables, compose them and write the workbook to `output`
pub fn compose_tables<P, Q>(
    tables: &[P],
    output: Q,
    layout: &SheetLayout,
    read_options: &GridTableReadOptions,
) -> Result<ComposeReport>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let output = output.as_ref();

    let grids = tables
        .iter()
        .map(|path| GridTableReader::read_file(path, read_options))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let workbook = compose_workbook(&grids, layout)?;
    write_workbook_atomic(&workbook, output)?;

    let shape = common_shape(&grids)?;
    Ok(ComposeReport {
        output: output.to_path_buf(),
        tables: grids.len(),
        shape,
        data_range: layout.data_range(shape.0, shape.1)?,
        selector: layout.selector_for(shape.0, shape.1)?,
        rules: workbook
            .worksheet(0)
            .map_or(0, |sheet| sheet.conditional_format_count()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use mosaic_sheets_core::{CfRuleType, MAX_ROWS};
    use pretty_assertions::assert_eq;

    fn grid(rows: Vec<Vec<u8>>) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    #[test]
    fn test_default_layout_matches_fifty_by_eighty() {
        let layout = SheetLayout::default();
        assert_eq!(layout.selector_for(50, 80).unwrap().to_string(), "CN53");
        assert_eq!(layout.data_range(50, 80).unwrap().to_string(), "B2:CC51");
    }

    #[test]
    fn test_default_selector_follows_origin() {
        let layout = SheetLayout::default().with_origin(CellAddress::parse("M20").unwrap());
        assert_eq!(layout.data_range(50, 80).unwrap().to_string(), "M20:CN69");
        let selector = layout.selector_for(50, 80).unwrap();
        assert_eq!(selector.to_string(), "CY71");

        let workbook = compose_workbook(&[Grid::filled(50, 80, 8).unwrap()], &layout).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(
            sheet.value_ref_at(selector.row, selector.col),
            Some(&CellValue::Number(1.0))
        );
    }

    #[test]
    fn test_default_selector_needs_room() {
        let layout = SheetLayout::default().with_origin(CellAddress::new(MAX_ROWS - 2, 0));
        assert!(matches!(
            layout.selector_for(1, 1),
            Err(Error::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_gray_level_rules() {
        let range = CellRange::parse("B2:C3").unwrap();
        let rules = gray_level_rules(range);

        assert_eq!(rules.len(), 33);
        assert_eq!(rules[0].priority, 1);
        assert_eq!(rules[32].priority, 33);
        assert_eq!(rules[32].format, Some(Style::camouflage(Color::gray(255))));
        assert_eq!(
            rules[16].rule_type,
            CfRuleType::CellIs {
                operator: mosaic_sheets_core::CfOperator::Equal,
                formula1: "128".into(),
                formula2: None,
            }
        );
        assert!(rules.iter().all(|r| r.ranges == vec![range]));
    }

    #[test]
    fn test_compose_layout() {
        let a = grid(vec![vec![0, 8, 16], vec![24, 32, 40]]);
        let b = grid(vec![vec![48, 56, 64], vec![72, 80, 255]]);
        let workbook = compose_workbook(&[a, b], &SheetLayout::default()).unwrap();
        let sheet = workbook.worksheet(0).unwrap();

        assert_eq!(sheet.name(), "Sheet");
        // 6 formulas plus the selector
        assert_eq!(sheet.cell_count(), 7);
        assert_eq!(
            sheet.get_value("D3").unwrap(),
            CellValue::formula_with_cached("=CHOOSE($O$5,40,255)", 40.0)
        );
        assert_eq!(sheet.get_value("O5").unwrap(), CellValue::Number(1.0));
        assert_eq!(sheet.conditional_format_count(), 33);
    }

    #[test]
    fn test_initial_selector_picks_cached_values() {
        let a = grid(vec![vec![0]]);
        let b = grid(vec![vec![8]]);
        let layout = SheetLayout {
            initial_selector: 2,
            ..SheetLayout::default()
        };
        let workbook = compose_workbook(&[a, b], &layout).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        assert_eq!(
            sheet.get_value("B2").unwrap(),
            CellValue::formula_with_cached("=CHOOSE($M$4,0,8)", 8.0)
        );
        assert_eq!(sheet.get_value("M4").unwrap(), CellValue::Number(2.0));
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = grid(vec![vec![0, 8]]);
        let b = grid(vec![vec![0, 8]]);
        let c = grid(vec![vec![0], vec![8]]);
        match compose_workbook(&[a, b, c], &SheetLayout::default()) {
            Err(Error::DimensionMismatch {
                table,
                expected,
                found,
            }) => {
                assert_eq!((table, expected, found), (3, (1, 2), (2, 1)));
            }
            other => panic!("expected dimension mismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_no_tables() {
        assert!(matches!(
            compose_workbook(&[], &SheetLayout::default()),
            Err(Error::NoTables)
        ));
    }

    #[test]
    fn test_initial_selector_out_of_range() {
        let layout = SheetLayout {
            initial_selector: 3,
            ..SheetLayout::default()
        };
        let grids = [grid(vec![vec![0]]), grid(vec![vec![8]])];
        assert!(matches!(
            compose_workbook(&grids, &layout),
            Err(Error::SelectorOutOfRange { index: 3, count: 2 })
        ));
    }

    #[test]
    fn test_selector_inside_data_is_rejected() {
        let layout = SheetLayout::default().with_selector(CellAddress::parse("C2").unwrap());
        let grids = [grid(vec![vec![0, 8, 16]])];
        assert!(matches!(
            compose_workbook(&grids, &layout),
            Err(Error::InvalidLayout(_))
        ));
    }
}
