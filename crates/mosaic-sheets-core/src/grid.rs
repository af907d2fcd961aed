//! Brightness grid type

use std::fmt;

use crate::error::{Error, Result};
use crate::quantize;

/// A row-major grid of cell brightness values
///
/// Values are `u8`, so every cell is in `[0, 255]` by construction. Grids
/// produced by the averager are additionally quantized (see
/// [`Grid::is_quantized`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid {
    rows: u32,
    cols: u16,
    values: Vec<u8>,
}

impl Grid {
    /// Create a grid with every cell set to `value`
    pub fn filled(rows: u32, cols: u16, value: u8) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(Error::InvalidGridShape(format!(
                "{}x{} grid has no cells",
                rows, cols
            )));
        }
        Ok(Self {
            rows,
            cols,
            values: vec![value; rows as usize * cols as usize],
        })
    }

    /// Build a grid from a list of rows
    ///
    /// # Examples
    /// ```
    /// use mosaic_sheets_core::Grid;
    ///
    /// let grid = Grid::from_rows(vec![vec![0, 8], vec![16, 24]]).unwrap();
    /// assert_eq!(grid.shape(), (2, 2));
    /// assert_eq!(grid.get(1, 0), Some(16));
    /// ```
    pub fn from_rows(rows: Vec<Vec<u8>>) -> Result<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map(|r| r.len()).unwrap_or(0);

        if row_count == 0 || col_count == 0 {
            return Err(Error::InvalidGridShape("grid has no cells".into()));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != col_count) {
            return Err(Error::InvalidGridShape(format!(
                "row {} has {} values, expected {}",
                idx + 1,
                row.len(),
                col_count
            )));
        }

        let rows_u32 = u32::try_from(row_count)
            .map_err(|_| Error::InvalidGridShape(format!("too many rows: {}", row_count)))?;
        let cols_u16 = u16::try_from(col_count)
            .map_err(|_| Error::InvalidGridShape(format!("too many columns: {}", col_count)))?;

        Ok(Self {
            rows: rows_u32,
            cols: cols_u16,
            values: rows.into_iter().flatten().collect(),
        })
    }

    /// Number of rows
    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> u16 {
        self.cols
    }

    /// `(rows, cols)`
    pub fn shape(&self) -> (u32, u16) {
        (self.rows, self.cols)
    }

    /// Get the value at a cell (0-based)
    pub fn get(&self, row: u32, col: u16) -> Option<u8> {
        self.index(row, col).map(|i| self.values[i])
    }

    /// Set the value at a cell (0-based)
    pub fn set(&mut self, row: u32, col: u16, value: u8) -> Result<()> {
        let idx = self.index(row, col).ok_or(Error::GridOutOfBounds {
            row,
            col,
            rows: self.rows,
            cols: self.cols,
        })?;
        self.values[idx] = value;
        Ok(())
    }

    /// Iterate over rows as slices
    pub fn iter_rows(&self) -> impl Iterator<Item = &[u8]> {
        self.values.chunks(self.cols as usize)
    }

    /// Iterate over `(row, col, value)` in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, u8)> + '_ {
        let cols = self.cols as usize;
        self.values
            .iter()
            .enumerate()
            .map(move |(i, &v)| ((i / cols) as u32, (i % cols) as u16, v))
    }

    /// All values in row-major order
    pub fn values(&self) -> &[u8] {
        &self.values
    }

    /// Whether every value is a quantized brightness level
    pub fn is_quantized(&self) -> bool {
        self.values.iter().all(|&v| quantize::is_quantized(v))
    }

    fn index(&self, row: u32, col: u16) -> Option<usize> {
        if row < self.rows && col < self.cols {
            Some(row as usize * self.cols as usize + col as usize)
        } else {
            None
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.iter_rows() {
            let line: Vec<String> = row.iter().map(|v| format!("{:>3}", v)).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
