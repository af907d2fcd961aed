//! Cell styling types
//!
//! - [`Style`] - Complete style (font + fill)
//! - [`FontStyle`] - Font overrides
//! - [`FillStyle`] - Background fill
//! - [`Color`] - Color representation

mod color;
mod fill;
mod font;

pub use color::Color;
pub use fill::FillStyle;
pub use font::FontStyle;

/// Cell style
///
/// Used as the differential format of a conditional-format rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Style {
    /// Font settings
    pub font: FontStyle,
    /// Fill/background settings
    pub fill: FillStyle,
}

impl Style {
    /// Create a new default style
    pub fn new() -> Self {
        Self::default()
    }

    /// Set font to bold
    pub fn bold(mut self, bold: bool) -> Self {
        self.font.bold = bold;
        self
    }

    /// Set font color
    pub fn font_color(mut self, color: Color) -> Self {
        self.font.color = color;
        self
    }

    /// Set a solid fill color
    pub fn fill_color(mut self, color: Color) -> Self {
        self.fill = FillStyle::solid(color);
        self
    }

    /// Style that paints both background and text in `color`, hiding the
    /// cell's value against its own background
    pub fn camouflage(color: Color) -> Self {
        Self::new().fill_color(color).font_color(color)
    }
}
