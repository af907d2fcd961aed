//! Preview rendering

use std::path::Path;

use image::{Rgb, RgbImage};
use log::info;
use mosaic_sheets_core::Grid;

use crate::error::ImageResult;

/// Paint each grid cell as a `cell_width x cell_height` block of solid gray
///
/// The output is `cols * cell_width` by `rows * cell_height` pixels.
pub fn render_preview(grid: &Grid, cell_height: u32, cell_width: u32) -> RgbImage {
    render_blocks(grid.rows(), grid.cols(), cell_height, cell_width, |row, col| {
        let v = grid.get(row, col).unwrap_or(u8::MAX);
        Rgb([v, v, v])
    })
}

/// Paint a `rows x cols` block image where `color(row, col)` gives each
/// cell's color
pub fn render_blocks<F>(
    rows: u32,
    cols: u16,
    cell_height: u32,
    cell_width: u32,
    color: F,
) -> RgbImage
where
    F: Fn(u32, u16) -> Rgb<u8>,
{
    let width = cols as u32 * cell_width;
    let height = rows * cell_height;
    RgbImage::from_fn(width, height, |x, y| {
        color(y / cell_height, (x / cell_width) as u16)
    })
}

/// Save an image, picking the format from the file extension
pub fn save_preview<P: AsRef<Path>>(image: &RgbImage, path: P) -> ImageResult<()> {
    let path = path.as_ref();
    image.save(path)?;
    info!("saved preview {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_layout() {
        let grid = Grid::from_rows(vec![vec![0, 8, 16], vec![24, 32, 255]]).unwrap();
        let img = render_preview(&grid, 2, 3);

        assert_eq!(img.dimensions(), (9, 4));
        assert_eq!(img.get_pixel(0, 0), &Rgb([0, 0, 0]));
        assert_eq!(img.get_pixel(5, 1), &Rgb([8, 8, 8]));
        assert_eq!(img.get_pixel(6, 0), &Rgb([16, 16, 16]));
        assert_eq!(img.get_pixel(2, 2), &Rgb([24, 24, 24]));
        assert_eq!(img.get_pixel(8, 3), &Rgb([255, 255, 255]));
    }

    #[test]
    fn test_deterministic() {
        let grid = Grid::from_rows(vec![vec![40, 80], vec![120, 160]]).unwrap();
        assert_eq!(render_preview(&grid, 4, 4), render_preview(&grid, 4, 4));
    }
}
