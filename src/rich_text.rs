//! Rich text: in-cell text with per-run formatting.

use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::style::Color;

/// A contiguous run of text with its own font attributes.
///
/// Two runs are equal only when both the text and every attribute match;
/// run boundaries are significant, so `["ab"]` and `["a", "b"]` with
/// identical formatting are different run lists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RichTextRun {
    /// Text content for this run
    pub text: String,
    /// Font name (optional)
    pub font_name: Option<String>,
    /// Font size in points (optional)
    pub font_size: Option<NotNan<f64>>,
    /// Bold
    pub bold: bool,
    /// Italic
    pub italic: bool,
    /// Underline
    pub underline: bool,
    /// Strike-through
    pub strike: bool,
    /// Text color
    pub color: Option<Color>,
}

impl RichTextRun {
    /// A run with text only, inheriting the cell's font.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Whether the run carries any formatting of its own.
    pub fn has_formatting(&self) -> bool {
        self.font_name.is_some()
            || self.font_size.is_some()
            || self.bold
            || self.italic
            || self.underline
            || self.strike
            || self.color.is_some()
    }
}

/// An ordered list of rich text runs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RichText {
    runs: SmallVec<[RichTextRun; 4]>,
}

impl RichText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a run.
    pub fn push(&mut self, run: RichTextRun) {
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[RichTextRun] {
        &self.runs
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// The visible text with formatting stripped.
    pub fn plain_text(&self) -> String {
        let mut out = String::with_capacity(self.runs.iter().map(|r| r.text.len()).sum());
        for run in &self.runs {
            out.push_str(&run.text);
        }
        out
    }
}

impl FromIterator<RichTextRun> for RichText {
    fn from_iter<I: IntoIterator<Item = RichTextRun>>(iter: I) -> Self {
        Self {
            runs: iter.into_iter().collect(),
        }
    }
}

/// A phonetic guide run attached to a shared-string entry.
///
/// `start` and `end` are UTF-16 code unit offsets into the base text, the
/// way the file format records them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneticRun {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_boundaries_are_significant() {
        let joined: RichText = [RichTextRun::plain("ab")].into_iter().collect();
        let split: RichText = [RichTextRun::plain("a"), RichTextRun::plain("b")]
            .into_iter()
            .collect();
        assert_eq!(joined.plain_text(), split.plain_text());
        assert_ne!(joined, split);
    }

    #[test]
    fn test_plain_run_has_no_formatting() {
        assert!(!RichTextRun::plain("x").has_formatting());
        let bold = RichTextRun {
            bold: true,
            ..RichTextRun::plain("x")
        };
        assert!(bold.has_formatting());
    }
}
