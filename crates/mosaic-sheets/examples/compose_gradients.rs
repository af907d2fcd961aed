//! Example: Compose two synthetic mosaics into a workbook and read it back

use mosaic_sheets::prelude::*;
use mosaic_sheets::{round_to_multiple_of_8, write_workbook_atomic};

fn main() -> Result<()> {
    // A horizontal and a vertical gradient, already on the 8-step palette
    let horizontal = Grid::from_rows(
        (0..6)
            .map(|_| (0..12).map(|c| round_to_multiple_of_8(c * 23)).collect())
            .collect(),
    )?;
    let vertical = Grid::from_rows(
        (0..6)
            .map(|r| vec![round_to_multiple_of_8(r * 51); 12])
            .collect(),
    )?;

    let layout = SheetLayout::default();
    let workbook = compose_workbook(&[horizontal, vertical], &layout)?;

    let path = std::env::temp_dir().join("mosaic_gradients.xlsx");
    write_workbook_atomic(&workbook, &path)?;
    println!("Created {}", path.display());

    let loaded = XlsxReader::read_file(&path)?;
    if let Some(sheet) = loaded.worksheet(0) {
        let range = layout.data_range(6, 12)?;
        let selector = layout.selector_for(6, 12)?;
        for k in 1..=2 {
            println!("Selector {} = {}:", selector, k);
            print!("{}", displayed_grid(sheet, range, selector, k)?);
        }
    }

    Ok(())
}
