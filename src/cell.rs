//! Cell implementation.
//!
//! A cell holds either a literal value or a formula, never both. The
//! formula text is an opaque A1-style string stored and moved verbatim;
//! nothing here evaluates it.

use std::sync::Arc;

use crate::address::Range;
use crate::rich_text::RichText;
use crate::style::Style;
use crate::value::CellValue;

/// How a formula participates in group storage.
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaKind {
    /// An ordinary single-cell formula
    Normal,
    /// An array formula covering `range`
    Array { range: Range },
    /// A member of a shared-formula group.
    ///
    /// The group master carries the formula text and the host `range`;
    /// the other members carry only the group index.
    Shared { group: u32, range: Option<Range> },
}

/// A formula attached to a cell, with the cached result the file stores
/// alongside it.
#[derive(Debug, Clone, PartialEq)]
pub struct CellFormula {
    /// Formula text without the leading `=`, in A1 form. Empty for
    /// non-master members of a shared group.
    pub text: String,
    pub kind: FormulaKind,
    /// Last computed value, carried through save/load untouched
    pub cached_value: CellValue,
}

impl CellFormula {
    /// An ordinary formula with no cached result.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: FormulaKind::Normal,
            cached_value: CellValue::Blank,
        }
    }
}

/// The mutually exclusive content states of a cell.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellContent {
    /// No content (the cell may still exist to carry a style)
    #[default]
    Blank,
    /// A literal value
    Value(CellValue),
    /// A formula with its cached result
    Formula(CellFormula),
}

/// A single cell.
///
/// Cells are owned by their worksheet and hold a shared reference to an
/// immutable style. Changing a cell's formatting swaps the reference for
/// a newly derived style; it never mutates the shared instance.
#[derive(Debug, Clone)]
pub struct Cell {
    content: CellContent,
    style: Arc<Style>,
    /// Whether a text value goes through the shared-string table on save
    share_string: bool,
    /// Per-run formatting for text content
    rich_text: Option<RichText>,
}

impl Cell {
    /// Create a blank cell carrying the given style.
    pub fn new(style: Arc<Style>) -> Self {
        Self {
            content: CellContent::Blank,
            style,
            share_string: true,
            rich_text: None,
        }
    }

    /// The cell's content state.
    #[inline]
    pub fn content(&self) -> &CellContent {
        &self.content
    }

    /// The cell's value, or `Blank` when it holds none (or a formula).
    pub fn value(&self) -> CellValue {
        match &self.content {
            CellContent::Value(value) => value.clone(),
            CellContent::Formula(formula) => formula.cached_value.clone(),
            CellContent::Blank => CellValue::Blank,
        }
    }

    /// Assign a literal value, replacing any formula and rich text.
    pub fn set_value(&mut self, value: impl Into<CellValue>) {
        self.rich_text = None;
        let value = value.into();
        self.content = if value.is_blank() {
            CellContent::Blank
        } else {
            CellContent::Value(value)
        };
    }

    /// Assign rich text. The plain concatenation becomes the cell's text
    /// value; any formula is dropped.
    pub fn set_rich_text(&mut self, rich: RichText) {
        self.content = CellContent::Value(CellValue::Text(rich.plain_text()));
        self.rich_text = Some(rich);
    }

    /// The rich-text runs, if the cell has per-run formatting.
    #[inline]
    pub fn rich_text(&self) -> Option<&RichText> {
        self.rich_text.as_ref()
    }

    /// The formula, if the cell holds one.
    pub fn formula(&self) -> Option<&CellFormula> {
        match &self.content {
            CellContent::Formula(formula) => Some(formula),
            _ => None,
        }
    }

    /// Assign a formula, replacing any literal value and rich text.
    pub fn set_formula(&mut self, formula: CellFormula) {
        self.rich_text = None;
        self.content = CellContent::Formula(formula);
    }

    /// Remove all content, keeping the style.
    pub fn clear(&mut self) {
        self.rich_text = None;
        self.content = CellContent::Blank;
    }

    /// Whether the cell has neither value nor formula.
    pub fn is_blank(&self) -> bool {
        matches!(self.content, CellContent::Blank)
    }

    /// The cell's style.
    #[inline]
    pub fn style(&self) -> &Arc<Style> {
        &self.style
    }

    /// Replace the cell's style reference.
    pub fn set_style(&mut self, style: Arc<Style>) {
        self.style = style;
    }

    /// Derive a new style from the current one and attach it.
    ///
    /// The current style instance is left untouched for any rows, columns,
    /// or sibling cells sharing it.
    pub fn modify_style(&mut self, f: impl FnOnce(Style) -> Style) {
        self.style = Arc::new(f((*self.style).clone()));
    }

    /// Whether a text value is routed through the shared-string table.
    #[inline]
    pub fn shares_string(&self) -> bool {
        self.share_string
    }

    /// Choose between shared-table and inline storage for text values.
    pub fn set_share_string(&mut self, share: bool) {
        self.share_string = share;
    }

    pub(crate) fn set_content(&mut self, content: CellContent) {
        self.content = content;
    }

    pub(crate) fn set_rich_text_raw(&mut self, rich: Option<RichText>) {
        self.rich_text = rich;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::RichTextRun;
    use crate::style::Font;

    #[test]
    fn test_value_and_formula_are_exclusive() {
        let mut cell = Cell::new(Style::default_style());
        cell.set_value(42.0);
        assert_eq!(cell.value(), CellValue::Number(42.0));

        cell.set_formula(CellFormula::new("SUM(A1:A3)"));
        assert!(cell.formula().is_some());
        assert_eq!(cell.value(), CellValue::Blank); // cached value, not literal

        cell.set_value("text");
        assert!(cell.formula().is_none());
    }

    #[test]
    fn test_rich_text_sets_plain_value() {
        let mut cell = Cell::new(Style::default_style());
        let rich: RichText = [RichTextRun::plain("a"), RichTextRun::plain("b")]
            .into_iter()
            .collect();
        cell.set_rich_text(rich);
        assert_eq!(cell.value(), CellValue::Text("ab".to_string()));

        cell.set_value("plain");
        assert!(cell.rich_text().is_none());
    }

    #[test]
    fn test_modify_style_leaves_shared_instance_alone() {
        let shared = Style::default_style();
        let mut a = Cell::new(Arc::clone(&shared));
        let b = Cell::new(Arc::clone(&shared));

        a.modify_style(|s| s.with_font(Font::new().with_bold(true)));
        assert!(a.style().font.bold);
        assert!(!b.style().font.bold);
        assert!(Arc::ptr_eq(b.style(), &shared));
    }
}
