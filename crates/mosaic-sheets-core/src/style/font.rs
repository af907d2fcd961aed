//! Font style types

use super::Color;

/// Font overrides carried by a style
///
/// Conditional-format styles only override what they set, so there is no
/// family name or size here: those stay whatever the cell already uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FontStyle {
    /// Bold
    pub bold: bool,
    /// Font color
    pub color: Color,
}

impl FontStyle {
    /// Create a new default font
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bold
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set color
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Whether this font overrides nothing
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}
