//! Color representations.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

/// A color as the file format records it.
///
/// The four representations are distinct values: an RGB color and a theme
/// color that happen to render identically are *not* equal and are never
/// coalesced by the style registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// ARGB hex value (e.g. "FFFF0000")
    Rgb(String),
    /// Theme palette reference with an optional tint
    Theme {
        theme: u32,
        tint: Option<NotNan<f64>>,
    },
    /// Legacy indexed-palette reference
    Indexed(u32),
    /// Automatic (context-dependent) color
    Auto,
}

impl Color {
    /// Create an RGB color from a hex string.
    ///
    /// Accepts 6-digit RGB (an opaque alpha is prepended) or 8-digit ARGB;
    /// the stored form is always 8 uppercase hex digits.
    pub fn rgb(hex: &str) -> Self {
        let trimmed = hex.trim_start_matches('#');
        let upper = trimmed.to_ascii_uppercase();
        if upper.len() == 6 {
            Color::Rgb(format!("FF{}", upper))
        } else {
            Color::Rgb(upper)
        }
    }

    /// Theme reference without a tint.
    #[inline]
    pub fn theme(theme: u32) -> Self {
        Color::Theme { theme, tint: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_normalization() {
        assert_eq!(Color::rgb("ff0000"), Color::Rgb("FFFF0000".to_string()));
        assert_eq!(Color::rgb("#00FF00"), Color::Rgb("FF00FF00".to_string()));
        assert_eq!(Color::rgb("80FF0000"), Color::Rgb("80FF0000".to_string()));
    }

    #[test]
    fn test_representations_are_distinct() {
        // Theme 1 usually renders black, as does FF000000, but they are
        // different values and must not intern to the same entry.
        assert_ne!(Color::rgb("000000"), Color::theme(1));
        assert_ne!(Color::Indexed(64), Color::Auto);
    }
}
