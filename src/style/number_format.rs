//! Number format definitions and utilities.
//!
//! Formats with IDs below 164 are reserved built-ins that must never be
//! redefined; custom format codes are assigned IDs from 164 upward by the
//! style registry.

use serde::{Deserialize, Serialize};

/// First ID available to custom number formats.
pub const FIRST_CUSTOM_FORMAT_ID: u32 = 164;

/// Built-in number formats (reserved IDs 0-163, of which these are defined).
static BUILTIN_FORMATS: phf::Map<u32, &'static str> = phf::phf_map! {
    0u32 => "General",
    1u32 => "0",
    2u32 => "0.00",
    3u32 => "#,##0",
    4u32 => "#,##0.00",
    9u32 => "0%",
    10u32 => "0.00%",
    11u32 => "0.00E+00",
    12u32 => "# ?/?",
    13u32 => "# ??/??",
    14u32 => "mm-dd-yy",
    15u32 => "d-mmm-yy",
    16u32 => "d-mmm",
    17u32 => "mmm-yy",
    18u32 => "h:mm AM/PM",
    19u32 => "h:mm:ss AM/PM",
    20u32 => "h:mm",
    21u32 => "h:mm:ss",
    22u32 => "m/d/yy h:mm",
    37u32 => "#,##0 ;(#,##0)",
    38u32 => "#,##0 ;[Red](#,##0)",
    39u32 => "#,##0.00;(#,##0.00)",
    40u32 => "#,##0.00;[Red](#,##0.00)",
    45u32 => "mm:ss",
    46u32 => "[h]:mm:ss",
    47u32 => "mmss.0",
    48u32 => "##0.0E+0",
    49u32 => "@",
};

/// Get the format code for a built-in number format ID.
#[inline]
pub fn builtin_format_code(id: u32) -> Option<&'static str> {
    BUILTIN_FORMATS.get(&id).copied()
}

/// A number format as referenced by a cell format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NumberFormat {
    /// One of the reserved built-in formats (ID < 164)
    Builtin(u32),
    /// A custom format code, assigned an ID >= 164 by the registry
    Custom(String),
}

impl Default for NumberFormat {
    /// The "General" format.
    fn default() -> Self {
        NumberFormat::Builtin(0)
    }
}

impl NumberFormat {
    /// The format code, where one is known.
    ///
    /// Built-in IDs outside the documented set have no published code.
    pub fn code(&self) -> Option<&str> {
        match self {
            NumberFormat::Builtin(id) => builtin_format_code(*id),
            NumberFormat::Custom(code) => Some(code),
        }
    }

    /// Whether values formatted this way are calendar dates/times.
    pub fn is_date_format(&self) -> bool {
        match self {
            // Built-in date/time formats occupy 14-22; 45-47 are elapsed.
            NumberFormat::Builtin(id) => (14..=22).contains(id),
            NumberFormat::Custom(code) => is_date_format_code(code),
        }
    }

    /// Whether values formatted this way are elapsed times.
    pub fn is_duration_format(&self) -> bool {
        match self {
            NumberFormat::Builtin(id) => (45..=47).contains(id),
            NumberFormat::Custom(code) => is_duration_format_code(code),
        }
    }
}

/// Check if a custom format code renders a calendar date/time.
///
/// Scans the first section of the code for an unquoted, unescaped
/// date/time token, ignoring bracketed color/locale prefixes. Elapsed
/// formats (`[h]`, `[mm]`, ...) are not dates.
pub fn is_date_format_code(code: &str) -> bool {
    let mut escaped = false;
    let mut in_quotes = false;
    let mut bracket_depth = 0u8;
    let mut elapsed = false;
    let mut am_pm = false;
    let mut prev = ' ';

    for ch in code.chars() {
        match (ch, escaped, in_quotes, am_pm, bracket_depth) {
            (_, true, ..) => escaped = false,
            ('_' | '\\', ..) => escaped = true,
            ('"', _, true, _, _) => in_quotes = false,
            (_, _, true, _, _) => {},
            ('"', ..) => in_quotes = true,
            // Only the first section (positive values) decides.
            (';', ..) => return false,
            ('[', ..) => bracket_depth += 1,
            (']', .., 1) if elapsed => return false,
            (']', ..) => bracket_depth = bracket_depth.saturating_sub(1),
            ('a' | 'A', _, _, false, 0) => am_pm = true,
            ('p' | 'm' | '/' | 'P' | 'M', _, _, true, 0) => return true,
            ('d' | 'm' | 'h' | 'y' | 's' | 'D' | 'M' | 'H' | 'Y' | 'S', _, _, false, 0) => {
                return true;
            },
            _ => {
                if !(elapsed && ch.eq_ignore_ascii_case(&prev)) {
                    elapsed = prev == '[' && matches!(ch, 'm' | 'h' | 's' | 'M' | 'H' | 'S');
                }
            },
        }
        prev = ch;
    }
    false
}

/// Check if a custom format code renders an elapsed time (`[h]:mm:ss` etc).
pub fn is_duration_format_code(code: &str) -> bool {
    let mut in_quotes = false;
    let mut escaped = false;
    let mut prev = ' ';

    for ch in code.chars() {
        if escaped {
            escaped = false;
        } else if ch == '_' || ch == '\\' {
            escaped = true;
        } else if ch == '"' {
            in_quotes = !in_quotes;
        } else if !in_quotes && prev == '[' && matches!(ch, 'h' | 'm' | 's' | 'H' | 'M' | 'S') {
            return true;
        }
        prev = ch;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_format_code() {
        assert_eq!(builtin_format_code(0), Some("General"));
        assert_eq!(builtin_format_code(14), Some("mm-dd-yy"));
        assert_eq!(builtin_format_code(22), Some("m/d/yy h:mm"));
        assert_eq!(builtin_format_code(999), None);
    }

    #[test]
    fn test_is_date_format_code() {
        assert!(is_date_format_code("DD/MM/YY"));
        assert!(is_date_format_code("H:MM:SS;@"));
        assert!(is_date_format_code("m\"M\"d\"D\";@"));
        assert!(is_date_format_code("yyyy-mm-dd"));

        assert!(!is_date_format_code("\"$\"#,##0_);[Red](\"$\"#,##0)"));
        assert!(!is_date_format_code("0_ ;[Red]\\-0\\ "));
        assert!(!is_date_format_code("\\Y000000"));
        assert!(!is_date_format_code("#,##0.0####\" YMD\""));
        assert!(!is_date_format_code("[h]:mm:ss")); // elapsed, not a date
        assert!(!is_date_format_code("[ss]"));
    }

    #[test]
    fn test_is_duration_format_code() {
        assert!(is_duration_format_code("[h]:mm:ss"));
        assert!(is_duration_format_code("[mm]:ss"));
        assert!(!is_duration_format_code("h:mm:ss"));
        assert!(!is_duration_format_code("\"[h]\"0"));
    }

    #[test]
    fn test_kind_checks() {
        assert!(NumberFormat::Builtin(14).is_date_format());
        assert!(NumberFormat::Builtin(46).is_duration_format());
        assert!(!NumberFormat::Builtin(2).is_date_format());
        assert!(NumberFormat::Custom("dd/mm/yyyy".into()).is_date_format());
    }
}
