//! What a spreadsheet application shows for a composed worksheet

use image::{Rgb, RgbImage};
use mosaic_sheets_core::{CellAddress, CellRange, CellValue, Grid, Worksheet};
use mosaic_sheets_formula::{
    evaluate, parse_formula, EvaluationContext, FormulaExpr, FormulaValue,
};
use mosaic_sheets_image::render_blocks;

use crate::error::{Error, Result};

/// Background of cells no rule paints
const UNFORMATTED: Rgb<u8> = Rgb([255, 255, 255]);

/// Where a composed worksheet keeps its data and selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MosaicLocation {
    pub data_range: CellRange,
    pub selector: CellAddress,
}

/// Find the data range and selector of a composed worksheet that was read
/// back from a file
///
/// The data range is the bounding box of the formula cells; the selector is
/// the first argument of the top-left formula.
pub fn locate_mosaic(worksheet: &Worksheet) -> Result<MosaicLocation> {
    let mut bounds: Option<(u32, u16, u32, u16)> = None;
    for (row, col, _) in worksheet.formula_cells() {
        bounds = Some(match bounds {
            None => (row, col, row, col),
            Some((r0, c0, r1, c1)) => (r0.min(row), c0.min(col), r1.max(row), c1.max(col)),
        });
    }
    let (r0, c0, r1, c1) = bounds.ok_or_else(|| {
        Error::InvalidLayout(format!("sheet '{}' has no formulas", worksheet.name()))
    })?;
    let data_range = CellRange::from_indices(r0, c0, r1, c1);

    let corner = data_range.start;
    let text = worksheet.get_formula_at(corner.row, corner.col).ok_or_else(|| {
        Error::InvalidLayout(format!("no formula at {}", corner))
    })?;
    let selector = match parse_formula(text)? {
        FormulaExpr::Function { name, args } if name == "CHOOSE" => match args.first() {
            Some(FormulaExpr::CellRef(address)) => address.to_relative(),
            _ => {
                return Err(Error::InvalidLayout(format!(
                    "CHOOSE at {} does not start with a cell reference",
                    corner
                )))
            }
        },
        _ => {
            return Err(Error::InvalidLayout(format!(
                "{} holds '{}', not a CHOOSE formula",
                corner, text
            )))
        }
    };

    Ok(MosaicLocation {
        data_range,
        selector,
    })
}

/// Evaluate every cell of `range` with the selector cell set to
/// `selector_value`
///
/// Formula cells are recalculated; literal numbers are taken as they are.
/// A CHOOSE index outside the table count shows up as
/// [`Error::CellError`] carrying `#VALUE!`.
pub fn displayed_grid(
    worksheet: &Worksheet,
    range: CellRange,
    selector: CellAddress,
    selector_value: i64,
) -> Result<Grid> {
    let ctx = EvaluationContext::new(worksheet)
        .with_override(selector, FormulaValue::Number(selector_value as f64));

    let mut grid = Grid::filled(range.row_count(), range.col_count(), 0)?;
    for address in range.cells() {
        let shown = match worksheet.value_ref_at(address.row, address.col) {
            Some(CellValue::Formula { text, .. }) => evaluate(&parse_formula(text)?, &ctx)?,
            Some(value) => FormulaValue::from(value),
            None => FormulaValue::Empty,
        };
        let level = gray_level(address, shown)?;
        grid.set(
            address.row - range.start.row,
            address.col - range.start.col,
            level,
        )?;
    }
    Ok(grid)
}

fn gray_level(cell: CellAddress, value: FormulaValue) -> Result<u8> {
    match value {
        FormulaValue::Number(n) if n.fract() == 0.0 && (0.0..=255.0).contains(&n) => Ok(n as u8),
        FormulaValue::Error(error) => Err(Error::CellError { cell, error }),
        FormulaValue::Number(n) => Err(Error::NotAGrayLevel {
            cell,
            value: n.to_string(),
        }),
        FormulaValue::String(s) => Err(Error::NotAGrayLevel { cell, value: s }),
        FormulaValue::Empty => Err(Error::NotAGrayLevel {
            cell,
            value: String::new(),
        }),
    }
}

/// Paint `displayed` (the values of `range`) the way the worksheet's
/// conditional formatting colors them
///
/// Each cell takes the fill of its first matching rule by priority; cells no
/// rule matches stay white. With the per-level rules of a composed sheet the
/// result equals the preview of the same grid pixel for pixel.
pub fn render_sheet(
    worksheet: &Worksheet,
    range: CellRange,
    displayed: &Grid,
    cell_height: u32,
    cell_width: u32,
) -> Result<RgbImage> {
    if displayed.shape() != (range.row_count(), range.col_count()) {
        return Err(Error::DimensionMismatch {
            table: 1,
            expected: (range.row_count(), range.col_count()),
            found: displayed.shape(),
        });
    }

    let colors: Vec<Rgb<u8>> = displayed
        .iter_cells()
        .map(|(row, col, value)| {
            fill_for(
                worksheet,
                range.start.row + row,
                range.start.col + col,
                value,
            )
        })
        .collect();

    let cols = displayed.cols() as usize;
    Ok(render_blocks(
        displayed.rows(),
        displayed.cols(),
        cell_height,
        cell_width,
        |row, col| colors[row as usize * cols + col as usize],
    ))
}

fn fill_for(worksheet: &Worksheet, row: u32, col: u16, value: u8) -> Rgb<u8> {
    let mut rules = worksheet.conditional_formats_at(row, col);
    rules.sort_by_key(|rule| rule.priority);

    rules
        .into_iter()
        .filter(|rule| rule.matches_value(value as f64) == Some(true))
        .find_map(|rule| rule.format.and_then(|style| style.fill.color()))
        .map_or(UNFORMATTED, |color| {
            let (r, g, b) = color.to_rgb();
            Rgb([r, g, b])
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::{compose_workbook, gray_level_rules, SheetLayout};
    use mosaic_sheets_core::CellError;
    use mosaic_sheets_image::render_preview;
    use pretty_assertions::assert_eq;

    fn grids() -> Vec<Grid> {
        vec![
            Grid::from_rows(vec![vec![0, 8], vec![16, 255]]).unwrap(),
            Grid::from_rows(vec![vec![128, 136], vec![144, 152]]).unwrap(),
        ]
    }

    #[test]
    fn test_displayed_grid_follows_selector() {
        let layout = SheetLayout::default();
        let workbook = compose_workbook(&grids(), &layout).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        let range = layout.data_range(2, 2).unwrap();
        let selector = layout.selector_for(2, 2).unwrap();

        for (k, expected) in grids().iter().enumerate() {
            let shown = displayed_grid(sheet, range, selector, k as i64 + 1).unwrap();
            assert_eq!(&shown, expected);
        }
    }

    #[test]
    fn test_selector_out_of_range_displays_value_error() {
        let layout = SheetLayout::default();
        let workbook = compose_workbook(&grids(), &layout).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        let range = layout.data_range(2, 2).unwrap();
        let selector = layout.selector_for(2, 2).unwrap();

        for bad in [0, 3, -1] {
            match displayed_grid(sheet, range, selector, bad) {
                Err(Error::CellError { cell, error }) => {
                    assert_eq!(cell, CellAddress::new(1, 1));
                    assert_eq!(error, CellError::Value);
                }
                other => panic!("expected #VALUE! for selector {bad}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_render_sheet_matches_preview() {
        let layout = SheetLayout::default();
        let workbook = compose_workbook(&grids(), &layout).unwrap();
        let sheet = workbook.worksheet(0).unwrap();
        let range = layout.data_range(2, 2).unwrap();

        for grid in grids() {
            let painted = render_sheet(sheet, range, &grid, 3, 4).unwrap();
            assert_eq!(painted, render_preview(&grid, 3, 4));
        }
    }

    #[test]
    fn test_locate_mosaic() {
        let layout = SheetLayout::default();
        let workbook = compose_workbook(&grids(), &layout).unwrap();

        let found = locate_mosaic(workbook.worksheet(0).unwrap()).unwrap();
        assert_eq!(found.data_range.to_string(), "B2:C3");
        assert_eq!(found.selector, layout.selector_for(2, 2).unwrap());
    }

    #[test]
    fn test_locate_mosaic_needs_choose() {
        let mut sheet = Worksheet::new("Sheet");
        assert!(matches!(
            locate_mosaic(&sheet),
            Err(Error::InvalidLayout(_))
        ));

        sheet.set_cell_formula_at(0, 0, "=-8").unwrap();
        assert!(matches!(
            locate_mosaic(&sheet),
            Err(Error::InvalidLayout(_))
        ));
    }

    #[test]
    fn test_unquantized_values_stay_white() {
        let range = CellRange::parse("A1:B1").unwrap();
        let mut sheet = Worksheet::new("Sheet");
        for rule in gray_level_rules(range) {
            sheet.add_conditional_format(rule);
        }
        let displayed = Grid::from_rows(vec![vec![7, 8]]).unwrap();

        let painted = render_sheet(&sheet, range, &displayed, 1, 1).unwrap();
        assert_eq!(painted.get_pixel(0, 0), &Rgb([255, 255, 255]));
        assert_eq!(painted.get_pixel(1, 0), &Rgb([8, 8, 8]));
    }

    #[test]
    fn test_literal_and_text_cells() {
        let mut sheet = Worksheet::new("Sheet");
        sheet.set_cell_value("A1", 64.0).unwrap();
        sheet.set_cell_value("B1", "dark").unwrap();
        let range = CellRange::parse("A1:B1").unwrap();

        let err = displayed_grid(&sheet, range, CellAddress::new(5, 5), 1).unwrap_err();
        assert!(matches!(err, Error::NotAGrayLevel { ref value, .. } if value == "dark"));

        let shown = displayed_grid(&sheet, CellRange::parse("A1").unwrap(), CellAddress::new(5, 5), 1)
            .unwrap();
        assert_eq!(shown.values(), &[64]);
    }
}
