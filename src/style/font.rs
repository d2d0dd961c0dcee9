//! Font information and definitions.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use super::Color;

/// Font information.
///
/// Defines the visual appearance of text in cells including typeface,
/// size, color, and text decoration. Equality is fully structural: two
/// fonts with identical attributes are the same font wherever they were
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Font {
    /// Font name/family (e.g., "Calibri", "Arial")
    pub name: Option<String>,
    /// Font size in points
    pub size: Option<NotNan<f64>>,
    /// Bold flag
    pub bold: bool,
    /// Italic flag
    pub italic: bool,
    /// Underline style ("single", "double", ...)
    pub underline: Option<String>,
    /// Strike-through flag
    pub strike: bool,
    /// Font color
    pub color: Option<Color>,
    /// Font charset
    pub charset: Option<u32>,
    /// Font family (1=Roman, 2=Swiss, 3=Modern, 4=Script, 5=Decorative)
    pub family: Option<u32>,
    /// Font scheme (major, minor, none)
    pub scheme: Option<String>,
}

impl Font {
    /// Create a new default font.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the font name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the font size in points.
    pub fn with_size(mut self, size: f64) -> Self {
        self.size = NotNan::new(size).ok();
        self
    }

    /// Set the bold flag.
    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    /// Set the italic flag.
    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    /// Set the font color.
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Check if the font has any special formatting.
    #[inline]
    pub fn has_formatting(&self) -> bool {
        self.bold || self.italic || self.strike || self.underline.is_some()
    }
}
