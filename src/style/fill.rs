//! Fill patterns and colors.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};

use super::Color;

/// Cell fill pattern types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PatternType {
    #[default]
    None,
    Solid,
    Gray125,
    DarkGray,
    MediumGray,
    LightGray,
    Gray0625,
    DarkHorizontal,
    DarkVertical,
    DarkDown,
    DarkUp,
    DarkGrid,
    DarkTrellis,
    LightHorizontal,
    LightVertical,
    LightDown,
    LightUp,
    LightGrid,
    LightTrellis,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Solid => "solid",
            Self::Gray125 => "gray125",
            Self::DarkGray => "darkGray",
            Self::MediumGray => "mediumGray",
            Self::LightGray => "lightGray",
            Self::Gray0625 => "gray0625",
            Self::DarkHorizontal => "darkHorizontal",
            Self::DarkVertical => "darkVertical",
            Self::DarkDown => "darkDown",
            Self::DarkUp => "darkUp",
            Self::DarkGrid => "darkGrid",
            Self::DarkTrellis => "darkTrellis",
            Self::LightHorizontal => "lightHorizontal",
            Self::LightVertical => "lightVertical",
            Self::LightDown => "lightDown",
            Self::LightUp => "lightUp",
            Self::LightGrid => "lightGrid",
            Self::LightTrellis => "lightTrellis",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "solid" => Some(Self::Solid),
            "gray125" => Some(Self::Gray125),
            "darkGray" => Some(Self::DarkGray),
            "mediumGray" => Some(Self::MediumGray),
            "lightGray" => Some(Self::LightGray),
            "gray0625" => Some(Self::Gray0625),
            "darkHorizontal" => Some(Self::DarkHorizontal),
            "darkVertical" => Some(Self::DarkVertical),
            "darkDown" => Some(Self::DarkDown),
            "darkUp" => Some(Self::DarkUp),
            "darkGrid" => Some(Self::DarkGrid),
            "darkTrellis" => Some(Self::DarkTrellis),
            "lightHorizontal" => Some(Self::LightHorizontal),
            "lightVertical" => Some(Self::LightVertical),
            "lightDown" => Some(Self::LightDown),
            "lightUp" => Some(Self::LightUp),
            "lightGrid" => Some(Self::LightGrid),
            "lightTrellis" => Some(Self::LightTrellis),
            _ => None,
        }
    }
}

/// A single stop of a gradient fill.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0.0 to 1.0
    pub position: NotNan<f64>,
    /// Color at this stop
    pub color: Color,
}

/// Fill information.
///
/// Defines the background fill for cells, either as a pattern with
/// foreground/background colors or as a gradient.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Fill {
    /// Pattern fill with colors
    Pattern {
        /// Pattern type
        pattern: PatternType,
        /// Foreground color
        fg_color: Option<Color>,
        /// Background color
        bg_color: Option<Color>,
    },
    /// Gradient fill
    Gradient {
        /// Gradient type (linear or path)
        gradient_type: Option<String>,
        /// Rotation angle for linear gradients, in degrees
        degree: Option<NotNan<f64>>,
        /// Gradient stops in order
        stops: Vec<GradientStop>,
    },
}

impl Default for Fill {
    fn default() -> Self {
        Self::none()
    }
}

impl Fill {
    /// The empty fill (reserved slot 0 of the fill table).
    #[inline]
    pub fn none() -> Self {
        Fill::Pattern {
            pattern: PatternType::None,
            fg_color: None,
            bg_color: None,
        }
    }

    /// The gray125 fill (reserved slot 1 of the fill table).
    #[inline]
    pub fn gray125() -> Self {
        Fill::Pattern {
            pattern: PatternType::Gray125,
            fg_color: None,
            bg_color: None,
        }
    }

    /// Create a solid fill with the given foreground color.
    #[inline]
    pub fn solid(color: Color) -> Self {
        Fill::Pattern {
            pattern: PatternType::Solid,
            fg_color: Some(color),
            bg_color: None,
        }
    }

    /// Check if this is a solid fill.
    pub fn is_solid(&self) -> bool {
        matches!(
            self,
            Fill::Pattern {
                pattern: PatternType::Solid,
                ..
            }
        )
    }
}
