//! # mosaic-sheets-image
//!
//! Turns a photograph into a quantized brightness [`Grid`] and paints a grid
//! back into a block preview image.
//!
//! ## Example
//!
//! ```rust
//! use image::{ImageBuffer, Rgb, RgbImage};
//! use mosaic_sheets_image::{average_grid, render_preview};
//!
//! let photo: RgbImage = ImageBuffer::from_pixel(16, 16, Rgb([128, 128, 128]));
//! let averaged = average_grid(&photo, 2, 2).unwrap();
//! assert_eq!(averaged.grid.values(), &[128, 128, 128, 128]);
//!
//! let preview = render_preview(&averaged.grid, averaged.plan.cell_height, averaged.plan.cell_width);
//! assert_eq!(preview.dimensions(), (16, 16));
//! ```
//!
//! [`Grid`]: mosaic_sheets_core::Grid

mod average;
mod error;
mod preview;

pub use average::{average_grid, load_rgb, AveragedGrid, CropPlan};
pub use error::{ImageError, ImageResult};
pub use preview::{render_blocks, render_preview, save_preview};
