//! Image error types

use thiserror::Error;

/// Result type for image operations
pub type ImageResult<T> = std::result::Result<T, ImageError>;

/// Errors that can occur while averaging or rendering images
#[derive(Debug, Error)]
pub enum ImageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Decoding or encoding failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// The image cannot be split into the requested grid
    #[error("Cannot split a {width}x{height} image into {rows} rows and {cols} columns")]
    InvalidDimensions {
        rows: u32,
        cols: u16,
        width: u32,
        height: u32,
    },

    /// Core error
    #[error("Core error: {0}")]
    Core(#[from] mosaic_sheets_core::Error),
}
