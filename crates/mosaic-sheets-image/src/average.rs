//! Grid averaging
//!
//! The image is center-cropped to the largest region that divides evenly
//! into `rows x cols` tiles, then each tile is reduced to one quantized
//! brightness value.

use std::path::Path;

use image::math::Rect;
use image::{GenericImageView, Rgb, RgbImage};
use log::debug;
use mosaic_sheets_core::{round_to_multiple_of_8, Grid};

use crate::error::{ImageError, ImageResult};

/// How an image of a given size is cropped and tiled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropPlan {
    /// Source image width in pixels
    pub width: u32,
    /// Source image height in pixels
    pub height: u32,
    /// Number of tile rows
    pub rows: u32,
    /// Number of tile columns
    pub cols: u16,
    /// Width of one tile
    pub cell_width: u32,
    /// Height of one tile
    pub cell_height: u32,
    /// Pixels trimmed from the left edge
    pub left: u32,
    /// Pixels trimmed from the top edge
    pub top: u32,
}

impl CropPlan {
    /// Plan the crop of a `width x height` image into `rows x cols` tiles
    ///
    /// Fails when either count is zero or exceeds the matching pixel
    /// dimension, since a tile would then be zero pixels wide.
    ///
    /// # Examples
    /// ```
    /// use mosaic_sheets_image::CropPlan;
    ///
    /// let plan = CropPlan::new(103, 57, 5, 10).unwrap();
    /// assert_eq!((plan.cell_width, plan.cell_height), (10, 11));
    /// assert_eq!((plan.left, plan.top), (1, 1));
    /// ```
    pub fn new(width: u32, height: u32, rows: u32, cols: u16) -> ImageResult<Self> {
        let invalid = ImageError::InvalidDimensions {
            rows,
            cols,
            width,
            height,
        };
        if rows == 0 || cols == 0 {
            return Err(invalid);
        }

        let cell_height = height / rows;
        let cell_width = width / cols as u32;
        if cell_height == 0 || cell_width == 0 {
            return Err(invalid);
        }

        let used_width = cell_width * cols as u32;
        let used_height = cell_height * rows;

        Ok(Self {
            width,
            height,
            rows,
            cols,
            cell_width,
            cell_height,
            left: (width - used_width) / 2,
            top: (height - used_height) / 2,
        })
    }

    /// Width of the cropped region
    pub fn used_width(&self) -> u32 {
        self.cell_width * self.cols as u32
    }

    /// Height of the cropped region
    pub fn used_height(&self) -> u32 {
        self.cell_height * self.rows
    }

    /// The cropped region in source image coordinates
    pub fn crop_rect(&self) -> Rect {
        Rect {
            x: self.left,
            y: self.top,
            width: self.used_width(),
            height: self.used_height(),
        }
    }

    /// Pixel rectangle of tile `(row, col)` relative to the cropped region
    pub fn tile_bounds(&self, row: u32, col: u16) -> Rect {
        Rect {
            x: col as u32 * self.cell_width,
            y: row * self.cell_height,
            width: self.cell_width,
            height: self.cell_height,
        }
    }
}

/// A quantized grid along with the crop it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AveragedGrid {
    pub grid: Grid,
    pub plan: CropPlan,
}

/// Open and decode an image file as 8-bit RGB
pub fn load_rgb<P: AsRef<Path>>(path: P) -> ImageResult<RgbImage> {
    let path = path.as_ref();
    let image = image::open(path)?.to_rgb8();
    debug!(
        "loaded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Average an image down to a `rows x cols` grid of quantized brightness
pub fn average_grid<I>(image: &I, rows: u32, cols: u16) -> ImageResult<AveragedGrid>
where
    I: GenericImageView<Pixel = Rgb<u8>>,
{
    let plan = CropPlan::new(image.width(), image.height(), rows, cols)?;
    debug!("crop plan: {:?}", plan);

    let crop = plan.crop_rect();
    let cropped = image.view(crop.x, crop.y, crop.width, crop.height);

    let mut values = Vec::with_capacity(rows as usize);
    for row in 0..rows {
        let mut line = Vec::with_capacity(cols as usize);
        for col in 0..cols {
            let tile = plan.tile_bounds(row, col);
            let tile = cropped.view(tile.x, tile.y, tile.width, tile.height);
            line.push(round_to_multiple_of_8(tile_brightness(&*tile)));
        }
        values.push(line);
    }

    Ok(AveragedGrid {
        grid: Grid::from_rows(values)?,
        plan,
    })
}

/// Mean of every channel of every pixel, rounded half up
fn tile_brightness<I>(tile: &I) -> i64
where
    I: GenericImageView<Pixel = Rgb<u8>>,
{
    let sum: u64 = tile
        .pixels()
        .map(|(_, _, Rgb([r, g, b]))| r as u64 + g as u64 + b as u64)
        .sum();
    let count = tile.width() as u64 * tile.height() as u64 * 3;
    ((sum + count / 2) / count) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::ImageBuffer;

    #[test]
    fn test_crop_plan_exact_fit() {
        let plan = CropPlan::new(80, 50, 50, 80).unwrap();
        assert_eq!((plan.cell_width, plan.cell_height), (1, 1));
        assert_eq!((plan.left, plan.top), (0, 0));
    }

    #[test]
    fn test_crop_plan_odd_excess_goes_to_trailing_side() {
        // 3 spare columns: 1 trimmed left, 2 trimmed right
        let plan = CropPlan::new(23, 11, 2, 4).unwrap();
        assert_eq!(plan.cell_width, 5);
        assert_eq!(plan.used_width(), 20);
        assert_eq!(plan.left, 1);
        assert_eq!(plan.crop_rect().x + plan.crop_rect().width, 21);
        // 1 spare row: nothing trimmed on top
        assert_eq!(plan.cell_height, 5);
        assert_eq!(plan.used_height(), 10);
        assert_eq!(plan.top, 0);
    }

    #[test]
    fn test_crop_plan_rejects_bad_dimensions() {
        assert!(matches!(
            CropPlan::new(10, 10, 0, 2),
            Err(ImageError::InvalidDimensions { .. })
        ));
        assert!(CropPlan::new(10, 10, 2, 0).is_err());
        assert!(CropPlan::new(10, 10, 11, 2).is_err());
        assert!(CropPlan::new(10, 10, 2, 11).is_err());
    }

    #[test]
    fn test_tile_bounds() {
        let plan = CropPlan::new(40, 30, 3, 4).unwrap();
        let tile = plan.tile_bounds(2, 3);
        assert_eq!((tile.x, tile.y, tile.width, tile.height), (30, 20, 10, 10));
    }

    #[test]
    fn test_mean_is_rounded_before_quantizing() {
        // mean 11/3 = 3.67 rounds to 4, which quantizes up to 8
        let img: RgbImage = ImageBuffer::from_pixel(1, 1, Rgb([3, 4, 4]));
        assert_eq!(average_grid(&img, 1, 1).unwrap().grid.values(), &[8]);

        // mean 10/3 = 3.33 rounds to 3, which quantizes down to 0
        let img: RgbImage = ImageBuffer::from_pixel(1, 1, Rgb([3, 3, 4]));
        assert_eq!(average_grid(&img, 1, 1).unwrap().grid.values(), &[0]);
    }

    #[test]
    fn test_channels_are_averaged_together() {
        let img: RgbImage = ImageBuffer::from_pixel(2, 2, Rgb([10, 20, 30]));
        assert_eq!(average_grid(&img, 1, 1).unwrap().grid.values(), &[24]);
    }
}
