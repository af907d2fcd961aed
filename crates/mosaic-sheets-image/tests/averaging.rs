//! Integration tests for grid averaging and preview rendering

use image::{ImageBuffer, Rgb, RgbImage};
use mosaic_sheets_core::Grid;
use mosaic_sheets_image::{
    average_grid, load_rgb, render_preview, save_preview, CropPlan, ImageError,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tempfile::TempDir;

fn patterned(width: u32, height: u32, seed: u8) -> RgbImage {
    ImageBuffer::from_fn(width, height, |x, y| {
        let v = (x * 31 + y * 17 + seed as u32) % 256;
        Rgb([v as u8, (v / 2) as u8, 255 - v as u8])
    })
}

#[test]
fn solid_gray_square_gives_uniform_grid_and_preview() {
    let img: RgbImage = ImageBuffer::from_pixel(16, 16, Rgb([128, 128, 128]));

    let averaged = average_grid(&img, 2, 2).unwrap();
    assert_eq!(averaged.grid, Grid::filled(2, 2, 128).unwrap());

    let preview = render_preview(
        &averaged.grid,
        averaged.plan.cell_height,
        averaged.plan.cell_width,
    );
    assert_eq!(preview, ImageBuffer::from_pixel(16, 16, Rgb([128, 128, 128])));
}

#[test]
fn crop_is_taken_from_the_center() {
    // 12x4 image, 1 row x 5 cols of 2px: columns 0 and 11 are trimmed.
    // The trimmed columns are bright, the kept ones dark, so any
    // off-center crop would show up in the averages.
    let img: RgbImage = ImageBuffer::from_fn(12, 4, |x, _| {
        if x == 0 || x == 11 {
            Rgb([255, 255, 255])
        } else {
            Rgb([0, 0, 0])
        }
    });

    let averaged = average_grid(&img, 1, 5).unwrap();
    assert_eq!(averaged.plan.left, 1);
    assert_eq!(averaged.grid.values(), &[0, 0, 0, 0, 0]);
}

#[test]
fn halves_average_separately() {
    let img: RgbImage = ImageBuffer::from_fn(4, 2, |x, _| {
        if x < 2 {
            Rgb([0, 0, 0])
        } else {
            Rgb([255, 255, 255])
        }
    });

    let averaged = average_grid(&img, 1, 2).unwrap();
    assert_eq!(averaged.grid.values(), &[0, 255]);
}

#[test]
fn too_many_rows_is_rejected() {
    let img: RgbImage = ImageBuffer::from_pixel(10, 4, Rgb([0, 0, 0]));
    let err = average_grid(&img, 5, 2).unwrap_err();
    assert!(matches!(
        err,
        ImageError::InvalidDimensions {
            rows: 5,
            cols: 2,
            width: 10,
            height: 4
        }
    ));
}

#[test]
fn preview_round_trips_through_png() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("IMG_test.png");

    let grid = Grid::from_rows(vec![vec![0, 64], vec![128, 255]]).unwrap();
    let preview = render_preview(&grid, 3, 5);
    save_preview(&preview, &path).unwrap();

    let loaded = load_rgb(&path).unwrap();
    assert_eq!(loaded, preview);
}

#[test]
fn jpeg_preview_is_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("IMG_test.jpg");

    let grid = Grid::filled(2, 3, 200).unwrap();
    save_preview(&render_preview(&grid, 4, 4), &path).unwrap();

    assert_eq!(load_rgb(&path).unwrap().dimensions(), (12, 8));
}

#[test]
fn missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    assert!(load_rgb(dir.path().join("nope.png")).is_err());
}

proptest! {
    #[test]
    fn averaged_grids_have_requested_shape_and_levels(
        width in 1u32..40,
        height in 1u32..40,
        rows in 1u32..40,
        cols in 1u16..40,
        seed in any::<u8>(),
    ) {
        let rows = 1 + (rows - 1) % height;
        let cols = 1 + (cols - 1) % width as u16;
        let img = patterned(width, height, seed);

        let averaged = average_grid(&img, rows, cols).unwrap();
        prop_assert_eq!(averaged.grid.shape(), (rows, cols));
        prop_assert!(averaged.grid.is_quantized());

        let plan = averaged.plan;
        prop_assert_eq!(plan.used_height(), rows * plan.cell_height);
        prop_assert_eq!(plan.used_width(), cols as u32 * plan.cell_width);
        prop_assert_eq!(plan.top, (height - plan.used_height()) / 2);
        prop_assert_eq!(plan.left, (width - plan.used_width()) / 2);
    }

    #[test]
    fn crop_plan_never_exceeds_image(
        width in 1u32..2000,
        height in 1u32..2000,
        rows in 1u32..200,
        cols in 1u16..200,
    ) {
        match CropPlan::new(width, height, rows, cols) {
            Ok(plan) => {
                let rect = plan.crop_rect();
                prop_assert!(rect.x + rect.width <= width);
                prop_assert!(rect.y + rect.height <= height);
                prop_assert!(width - rect.width < cols as u32);
                prop_assert!(height - rect.height < rows);
                prop_assert_eq!(plan.left, (width - plan.used_width()) / 2);
                prop_assert_eq!(plan.top, (height - plan.used_height()) / 2);
            }
            Err(_) => prop_assert!(rows > height || cols as u32 > width),
        }
    }
}
