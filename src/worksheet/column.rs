//! Column-level defaults.

use std::sync::Arc;

use ordered_float::NotNan;

use crate::style::Style;

/// Span-level defaults for one column.
///
/// Mirrors [`super::Row`]: present only when non-default, consulted when a
/// cell in the column is first materialized (a row override wins over a
/// column override).
#[derive(Debug, Clone, Default)]
pub struct Column {
    /// Width in characters, when it differs from the sheet default
    pub width: Option<NotNan<f64>>,
    /// Hidden flag
    pub hidden: bool,
    /// Outline (grouping) level, 0-7
    pub outline_level: u8,
    /// Collapsed outline flag
    pub collapsed: bool,
    /// Default style for cells materialized in this column
    style: Option<Arc<Style>>,
}

impl Column {
    pub fn new() -> Self {
        Self::default()
    }

    /// The column's default style, if one was assigned.
    #[inline]
    pub fn style(&self) -> Option<&Arc<Style>> {
        self.style.as_ref()
    }

    /// Assign the column's default style.
    pub fn set_style(&mut self, style: Arc<Style>) {
        self.style = Some(style);
    }

    /// Set the column width in characters.
    pub fn set_width(&mut self, width: f64) {
        self.width = NotNan::new(width).ok();
    }

    /// Whether the record carries nothing beyond the defaults.
    pub fn is_default(&self) -> bool {
        self.width.is_none()
            && !self.hidden
            && self.outline_level == 0
            && !self.collapsed
            && self.style.is_none()
    }
}
