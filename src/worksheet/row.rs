//! Row-level defaults.

use std::sync::Arc;

use ordered_float::NotNan;

use crate::style::Style;

/// Span-level defaults for one row.
///
/// A row record exists only when something about the row differs from the
/// sheet defaults. Its style is consulted once, when a cell in the row is
/// first materialized; after that the cell owns its own style reference.
#[derive(Debug, Clone, Default)]
pub struct Row {
    /// Height in points, when it differs from the sheet default
    pub height: Option<NotNan<f64>>,
    /// Hidden flag
    pub hidden: bool,
    /// Outline (grouping) level, 0-7
    pub outline_level: u8,
    /// Collapsed outline flag
    pub collapsed: bool,
    /// Default style for cells materialized in this row
    style: Option<Arc<Style>>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// The row's default style, if one was assigned.
    #[inline]
    pub fn style(&self) -> Option<&Arc<Style>> {
        self.style.as_ref()
    }

    /// Assign the row's default style.
    pub fn set_style(&mut self, style: Arc<Style>) {
        self.style = Some(style);
    }

    /// Set the row height in points.
    pub fn set_height(&mut self, height: f64) {
        self.height = NotNan::new(height).ok();
    }

    /// Whether the record carries nothing beyond the defaults (and can be
    /// dropped from the sparse map).
    pub fn is_default(&self) -> bool {
        self.height.is_none()
            && !self.hidden
            && self.outline_level == 0
            && !self.collapsed
            && self.style.is_none()
    }
}
