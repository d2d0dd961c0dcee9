//! Styles and formatting for workbook content.
//!
//! A [`Style`] is an immutable composite value: font, fill, border, number
//! format, alignment, and protection. Equality is structural all the way
//! down, which is what lets the registry deduplicate styles into the
//! indexed tables the file format stores.
//!
//! Styles attached to cells, rows, and columns are shared `Arc` instances.
//! They are never mutated in place: deriving a changed style builds a new
//! value and swaps the reference, so siblings sharing the old instance are
//! unaffected.

mod alignment;
mod border;
mod color;
mod fill;
mod font;
mod number_format;
pub(crate) mod registry;

pub use alignment::{Alignment, Protection};
pub use border::{Border, BorderSide, DiagonalDirection, LineStyle};
pub use color::Color;
pub use fill::{Fill, GradientStop, PatternType};
pub use font::Font;
pub use number_format::{
    FIRST_CUSTOM_FORMAT_ID, NumberFormat, builtin_format_code, is_date_format_code,
    is_duration_format_code,
};
pub use registry::{CellXf, RawStylesheet, StyleRegistry};

use std::sync::Arc;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// A complete cell format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Style {
    pub font: Font,
    pub fill: Fill,
    pub border: Border,
    pub number_format: NumberFormat,
    pub alignment: Alignment,
    pub protection: Protection,
    /// Preserve a leading apostrophe when displaying the cell
    pub quote_prefix: bool,
}

static DEFAULT_STYLE: Lazy<Arc<Style>> = Lazy::new(|| {
    Arc::new(Style {
        font: Font {
            name: Some("Calibri".to_string()),
            size: ordered_float::NotNan::new(11.0).ok(),
            family: Some(2),
            ..Font::default()
        },
        ..Style::default()
    })
});

impl Style {
    /// Create a style with all-default components.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The workbook default ("Normal") style, always resolved to cell-format
    /// index 0.
    ///
    /// This is an immutable constant; callers needing a variation derive a
    /// new style from a clone of it.
    pub fn default_style() -> Arc<Style> {
        Arc::clone(&DEFAULT_STYLE)
    }

    /// Replace the font.
    pub fn with_font(mut self, font: Font) -> Self {
        self.font = font;
        self
    }

    /// Replace the fill.
    pub fn with_fill(mut self, fill: Fill) -> Self {
        self.fill = fill;
        self
    }

    /// Replace the border.
    pub fn with_border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    /// Replace the number format.
    pub fn with_number_format(mut self, number_format: NumberFormat) -> Self {
        self.number_format = number_format;
        self
    }

    /// Replace the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Replace the protection flags.
    pub fn with_protection(mut self, protection: Protection) -> Self {
        self.protection = protection;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_equality() {
        let a = Style::new().with_font(Font::new().with_bold(true));
        let b = Style::new().with_font(Font::new().with_bold(true));
        assert_eq!(a, b);

        let c = Style::new().with_font(Font::new().with_italic(true));
        assert_ne!(a, c);
    }

    #[test]
    fn test_default_style_is_shared_and_immutable() {
        let a = Style::default_style();
        let b = Style::default_style();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.font.name.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_derive_does_not_touch_source() {
        let base = Style::default_style();
        let derived = (*base).clone().with_font(Font::new().with_bold(true));
        assert!(derived.font.bold);
        assert!(!base.font.bold);
    }
}
