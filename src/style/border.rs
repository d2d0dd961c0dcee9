//! Border styles and definitions.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::Color;

/// Line styles a border side can use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineStyle {
    Thin,
    Medium,
    Thick,
    Double,
    Hair,
    Dotted,
    Dashed,
    DashDot,
    DashDotDot,
    MediumDashed,
    MediumDashDot,
    MediumDashDotDot,
    SlantDashDot,
}

impl LineStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thin => "thin",
            Self::Medium => "medium",
            Self::Thick => "thick",
            Self::Double => "double",
            Self::Hair => "hair",
            Self::Dotted => "dotted",
            Self::Dashed => "dashed",
            Self::DashDot => "dashDot",
            Self::DashDotDot => "dashDotDot",
            Self::MediumDashed => "mediumDashed",
            Self::MediumDashDot => "mediumDashDot",
            Self::MediumDashDotDot => "mediumDashDotDot",
            Self::SlantDashDot => "slantDashDot",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "thin" => Some(Self::Thin),
            "medium" => Some(Self::Medium),
            "thick" => Some(Self::Thick),
            "double" => Some(Self::Double),
            "hair" => Some(Self::Hair),
            "dotted" => Some(Self::Dotted),
            "dashed" => Some(Self::Dashed),
            "dashDot" => Some(Self::DashDot),
            "dashDotDot" => Some(Self::DashDotDot),
            "mediumDashed" => Some(Self::MediumDashed),
            "mediumDashDot" => Some(Self::MediumDashDot),
            "mediumDashDotDot" => Some(Self::MediumDashDotDot),
            "slantDashDot" => Some(Self::SlantDashDot),
            _ => None,
        }
    }
}

/// Individual border side information.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BorderSide {
    /// Line style
    pub style: LineStyle,
    /// Border color
    pub color: Option<Color>,
}

impl BorderSide {
    /// Create a new border side.
    #[inline]
    pub fn new(style: LineStyle, color: Option<Color>) -> Self {
        Self { style, color }
    }
}

bitflags! {
    /// Which diagonals a diagonal border is drawn on.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct DiagonalDirection: u8 {
        const UP = 0b01;
        const DOWN = 0b10;
    }
}

/// Border information for a cell.
///
/// Defines the borders on all four sides of a cell plus the diagonal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Border {
    /// Left border side
    pub left: Option<BorderSide>,
    /// Right border side
    pub right: Option<BorderSide>,
    /// Top border side
    pub top: Option<BorderSide>,
    /// Bottom border side
    pub bottom: Option<BorderSide>,
    /// Diagonal border side
    pub diagonal: Option<BorderSide>,
    /// Which diagonals to draw
    pub diagonal_direction: DiagonalDirection,
}

impl Border {
    /// Create a new empty border (no borders on any side).
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if this border has any visible sides.
    #[inline]
    pub fn has_borders(&self) -> bool {
        self.left.is_some()
            || self.right.is_some()
            || self.top.is_some()
            || self.bottom.is_some()
            || self.diagonal.is_some()
    }

    /// Apply the same side to left, right, top, and bottom.
    pub fn outline(side: BorderSide) -> Self {
        Self {
            left: Some(side.clone()),
            right: Some(side.clone()),
            top: Some(side.clone()),
            bottom: Some(side),
            ..Default::default()
        }
    }
}
