//! Grid table options

/// Options for reading grid tables
#[derive(Debug, Clone)]
pub struct GridTableReadOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Fail unless the table is exactly `(rows, cols)`
    pub expected_shape: Option<(u32, u16)>,
}

impl Default for GridTableReadOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            expected_shape: None,
        }
    }
}

impl GridTableReadOptions {
    /// Require a specific table shape
    pub fn with_expected_shape(mut self, rows: u32, cols: u16) -> Self {
        self.expected_shape = Some((rows, cols));
        self
    }
}

/// Options for writing grid tables
#[derive(Debug, Clone)]
pub struct GridTableWriteOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Line terminator (default: LF)
    pub line_terminator: LineTerminator,
}

impl Default for GridTableWriteOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            line_terminator: LineTerminator::LF,
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
}
