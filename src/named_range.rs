//! Defined names (named ranges).
//!
//! A defined name maps a workbook- or sheet-scoped name to a reference.
//! Plain range references (single- or multi-area) are parsed into typed
//! targets so structural edits can shift them; anything else (an OFFSET
//! formula, a constant) is held as opaque text and round-tripped
//! verbatim, untouched by shifting.

use crate::address::Range;
use crate::error::{Error, Result};

/// One area of a parsed reference: a sheet name plus a rectangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRange {
    pub sheet: String,
    pub range: Range,
}

impl SheetRange {
    /// Format as `'Sheet name'!$A$1:$B$2` (quoting only when needed).
    pub fn to_reference(&self) -> String {
        format!("{}!{}", quote_sheet_name(&self.sheet), self.range.to_fixed_a1())
    }
}

/// What a defined name points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameTarget {
    /// One or more rectangular areas; these shift with structural edits
    Ranges(Vec<SheetRange>),
    /// Opaque formula text, never shifted
    Formula(String),
}

/// A defined name.
#[derive(Debug, Clone)]
pub struct NamedRange {
    /// The name as entered (lookups are case-insensitive)
    pub name: String,
    pub target: NameTarget,
    /// `None` for workbook scope, or the owning sheet's index
    pub scope: Option<u32>,
    /// Optional comment/description
    pub comment: Option<String>,
    /// Hidden from the name manager UI
    pub hidden: bool,
}

impl NamedRange {
    /// Create a defined name from reference text, parsing range targets
    /// where possible.
    pub fn new(name: impl Into<String>, reference: &str, scope: Option<u32>) -> Self {
        let target = match parse_reference(reference) {
            Some(areas) => NameTarget::Ranges(areas),
            None => NameTarget::Formula(reference.to_string()),
        };
        Self {
            name: name.into(),
            target,
            scope,
            comment: None,
            hidden: false,
        }
    }

    /// The reference text as stored in the file.
    pub fn reference_text(&self) -> String {
        match &self.target {
            NameTarget::Ranges(areas) => areas
                .iter()
                .map(SheetRange::to_reference)
                .collect::<Vec<_>>()
                .join(","),
            NameTarget::Formula(text) => text.clone(),
        }
    }
}

/// The workbook's defined-name registry.
#[derive(Debug, Clone, Default)]
pub struct NamedRanges {
    names: Vec<NamedRange>,
}

impl NamedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a defined name.
    ///
    /// Names are unique per scope, compared case-insensitively.
    pub fn add(&mut self, named: NamedRange) -> Result<()> {
        let collision = self.names.iter().any(|existing| {
            existing.scope == named.scope && existing.name.eq_ignore_ascii_case(&named.name)
        });
        if collision {
            return Err(Error::DuplicateName(format!(
                "defined name {:?}",
                named.name
            )));
        }
        self.names.push(named);
        Ok(())
    }

    /// Look up a name within a scope (workbook scope when `None`).
    pub fn get(&self, name: &str, scope: Option<u32>) -> Option<&NamedRange> {
        self.names
            .iter()
            .find(|n| n.scope == scope && n.name.eq_ignore_ascii_case(name))
    }

    /// Remove a name. Returns whether it existed.
    pub fn remove(&mut self, name: &str, scope: Option<u32>) -> bool {
        let before = self.names.len();
        self.names
            .retain(|n| !(n.scope == scope && n.name.eq_ignore_ascii_case(name)));
        self.names.len() != before
    }

    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &NamedRange> {
        self.names.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Shift parsed targets on `sheet` for a row insertion.
    pub(crate) fn insert_rows(&mut self, sheet: &str, at: u32, count: u32) -> Result<()> {
        self.for_sheet_ranges(sheet, |range| range.with_rows_inserted(at, count).map(Some))
    }

    pub(crate) fn insert_columns(&mut self, sheet: &str, at: u32, count: u32) -> Result<()> {
        self.for_sheet_ranges(sheet, |range| range.with_columns_inserted(at, count).map(Some))
    }

    /// Shift parsed targets on `sheet` for a row deletion; areas deleted
    /// entirely are dropped from their name's area list.
    pub(crate) fn delete_rows(&mut self, sheet: &str, first: u32, count: u32) -> Result<()> {
        self.for_sheet_ranges(sheet, |range| Ok(range.with_rows_deleted(first, count)))
    }

    pub(crate) fn delete_columns(&mut self, sheet: &str, first: u32, count: u32) -> Result<()> {
        self.for_sheet_ranges(sheet, |range| Ok(range.with_columns_deleted(first, count)))
    }

    /// Point parsed targets at a sheet's new name after a rename.
    pub(crate) fn rename_sheet(&mut self, old_name: &str, new_name: &str) {
        for named in &mut self.names {
            if let NameTarget::Ranges(areas) = &mut named.target {
                for area in areas {
                    if area.sheet.eq_ignore_ascii_case(old_name) {
                        area.sheet = new_name.to_string();
                    }
                }
            }
        }
    }

    fn for_sheet_ranges(
        &mut self,
        sheet: &str,
        mut f: impl FnMut(&Range) -> Result<Option<Range>>,
    ) -> Result<()> {
        for named in &mut self.names {
            if let NameTarget::Ranges(areas) = &mut named.target {
                let mut updated = Vec::with_capacity(areas.len());
                for area in areas.iter() {
                    if area.sheet == sheet {
                        if let Some(range) = f(&area.range)? {
                            updated.push(SheetRange {
                                sheet: area.sheet.clone(),
                                range,
                            });
                        }
                    } else {
                        updated.push(area.clone());
                    }
                }
                *areas = updated;
            }
        }
        Ok(())
    }
}

/// Quote a sheet name for use in a reference when it needs it.
fn quote_sheet_name(sheet: &str) -> String {
    let plain = !sheet.is_empty()
        && sheet
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !sheet.chars().next().is_some_and(|c| c.is_ascii_digit());
    if plain {
        sheet.to_string()
    } else {
        format!("'{}'", sheet.replace('\'', "''"))
    }
}

/// Try to parse reference text as a comma-separated list of
/// `Sheet!Range` areas. Returns `None` when any part is not a plain
/// range reference.
fn parse_reference(text: &str) -> Option<Vec<SheetRange>> {
    let mut areas = Vec::new();
    for part in split_areas(text) {
        let (sheet, range_text) = split_sheet(&part)?;
        let range = Range::from_a1(&range_text).ok()?;
        areas.push(SheetRange { sheet, range });
    }
    if areas.is_empty() { None } else { Some(areas) }
}

/// Split on commas that sit outside quoted sheet names.
fn split_areas(text: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for ch in text.chars() {
        match ch {
            '\'' => {
                in_quotes = !in_quotes;
                current.push(ch);
            },
            ',' if !in_quotes => {
                parts.push(std::mem::take(&mut current));
            },
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Split one area into its sheet name and range text.
fn split_sheet(part: &str) -> Option<(String, String)> {
    let part = part.trim();
    let bang = find_sheet_separator(part)?;
    let (sheet_part, range_part) = (&part[..bang], &part[bang + 1..]);

    let sheet = if let Some(stripped) = sheet_part.strip_prefix('\'') {
        stripped.strip_suffix('\'')?.replace("''", "'")
    } else {
        sheet_part.to_string()
    };
    if sheet.is_empty() {
        return None;
    }
    Some((sheet, range_part.to_string()))
}

/// Find the `!` separating sheet from range, respecting quotes.
fn find_sheet_separator(part: &str) -> Option<usize> {
    let mut in_quotes = false;
    for (i, ch) in part.char_indices() {
        match ch {
            '\'' => in_quotes = !in_quotes,
            '!' if !in_quotes => return Some(i),
            _ => {},
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_reference_is_parsed() {
        let named = NamedRange::new("Data", "Sheet1!$A$1:$B$10", None);
        match &named.target {
            NameTarget::Ranges(areas) => {
                assert_eq!(areas.len(), 1);
                assert_eq!(areas[0].sheet, "Sheet1");
                assert_eq!(areas[0].range.to_a1(), "A1:B10");
            },
            NameTarget::Formula(_) => panic!("expected parsed ranges"),
        }
        assert_eq!(named.reference_text(), "Sheet1!$A$1:$B$10");
    }

    #[test]
    fn test_quoted_sheet_names() {
        let named = NamedRange::new("Data", "'P&L 2024'!$A$1", None);
        match &named.target {
            NameTarget::Ranges(areas) => assert_eq!(areas[0].sheet, "P&L 2024"),
            NameTarget::Formula(_) => panic!("expected parsed ranges"),
        }
        assert_eq!(named.reference_text(), "'P&L 2024'!$A$1");
    }

    #[test]
    fn test_formula_stays_opaque() {
        let named = NamedRange::new("Dynamic", "OFFSET(Sheet1!$A$1,0,0,10,1)", None);
        assert!(matches!(named.target, NameTarget::Formula(_)));
        assert_eq!(named.reference_text(), "OFFSET(Sheet1!$A$1,0,0,10,1)");
    }

    #[test]
    fn test_duplicate_names_per_scope() {
        let mut names = NamedRanges::new();
        names.add(NamedRange::new("data", "Sheet1!$A$1", None)).unwrap();
        assert!(matches!(
            names.add(NamedRange::new("DATA", "Sheet1!$B$1", None)),
            Err(Error::DuplicateName(_))
        ));
        // Same name under a sheet scope is a different entry.
        names
            .add(NamedRange::new("data", "Sheet1!$B$1", Some(0)))
            .unwrap();
        assert_eq!(names.len(), 2);
    }

    #[test]
    fn test_shift_only_touches_matching_sheet() {
        let mut names = NamedRanges::new();
        names
            .add(NamedRange::new("A", "Sheet1!$A$10", None))
            .unwrap();
        names
            .add(NamedRange::new("B", "Sheet2!$A$10", None))
            .unwrap();
        names
            .add(NamedRange::new("C", "OFFSET(Sheet1!$A$1,1,1)", None))
            .unwrap();

        names.insert_rows("Sheet1", 1, 2).unwrap();
        assert_eq!(
            names.get("A", None).unwrap().reference_text(),
            "Sheet1!$A$12"
        );
        assert_eq!(
            names.get("B", None).unwrap().reference_text(),
            "Sheet2!$A$10"
        );
        assert_eq!(
            names.get("C", None).unwrap().reference_text(),
            "OFFSET(Sheet1!$A$1,1,1)"
        );
    }
}
