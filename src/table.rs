//! Tables (structured data ranges).
//!
//! A table owns an ordered field list whose count always equals the
//! table's column count. The name-to-position map is rebuilt eagerly
//! inside every operation that can change it (rename, resize, header
//! rescan, column shifts); there is no staleness flag to forget.

use std::collections::HashMap;

use crate::address::{Address, Range};
use crate::error::{Error, Result};

/// Totals row function types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TotalsRowFunction {
    Sum,
    Min,
    Max,
    Average,
    Count,
    CountNums,
    StdDev,
    Var,
    Custom,
}

impl TotalsRowFunction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sum => "sum",
            Self::Min => "min",
            Self::Max => "max",
            Self::Average => "average",
            Self::Count => "count",
            Self::CountNums => "countNums",
            Self::StdDev => "stdDev",
            Self::Var => "var",
            Self::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sum" => Some(Self::Sum),
            "min" => Some(Self::Min),
            "max" => Some(Self::Max),
            "average" => Some(Self::Average),
            "count" => Some(Self::Count),
            "countNums" => Some(Self::CountNums),
            "stdDev" => Some(Self::StdDev),
            "var" => Some(Self::Var),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }

    /// The SUBTOTAL function number used when regenerating the totals-row
    /// formula for this function.
    pub fn subtotal_number(&self) -> Option<u32> {
        match self {
            Self::Average => Some(101),
            Self::CountNums => Some(102),
            Self::Count => Some(103),
            Self::Max => Some(104),
            Self::Min => Some(105),
            Self::StdDev => Some(107),
            Self::Sum => Some(109),
            Self::Var => Some(110),
            Self::Custom => None,
        }
    }
}

/// Table style information for visual formatting.
#[derive(Debug, Clone)]
pub struct TableStyleInfo {
    /// Style name (e.g., "TableStyleMedium2")
    pub name: Option<String>,
    /// Show first column with special formatting
    pub show_first_column: bool,
    /// Show last column with special formatting
    pub show_last_column: bool,
    /// Show alternating row stripes
    pub show_row_stripes: bool,
    /// Show alternating column stripes
    pub show_column_stripes: bool,
}

impl Default for TableStyleInfo {
    fn default() -> Self {
        Self {
            name: None,
            show_first_column: false,
            show_last_column: false,
            show_row_stripes: true,
            show_column_stripes: false,
        }
    }
}

/// A single field (column) of a table.
#[derive(Debug, Clone)]
pub struct TableField {
    /// Field ID (1-based, stable within the table part)
    pub id: u32,
    /// Display name, unique within the table
    pub name: String,
    /// Totals row function
    pub totals_row_function: Option<TotalsRowFunction>,
    /// Totals row label (for text cells in the totals row)
    pub totals_row_label: Option<String>,
    /// Custom totals row formula text, used with
    /// [`TotalsRowFunction::Custom`]
    pub totals_row_formula: Option<String>,
}

impl TableField {
    fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            totals_row_function: None,
            totals_row_label: None,
            totals_row_formula: None,
        }
    }
}

/// A table over a rectangular worksheet region.
#[derive(Debug, Clone)]
pub struct Table {
    id: u32,
    name: String,
    range: Range,
    header_row: bool,
    totals_row: bool,
    fields: Vec<TableField>,
    field_index: HashMap<String, usize>,
    /// Visual formatting flags
    pub style_info: TableStyleInfo,
}

impl Table {
    /// Create a table over `range` with default field names
    /// (`Column1`, `Column2`, ...).
    pub fn new(id: u32, name: impl Into<String>, range: Range, header_row: bool) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::InvalidState("table name must not be empty".into()));
        }

        let mut table = Self {
            id,
            name,
            range,
            header_row,
            totals_row: false,
            fields: Vec::new(),
            field_index: HashMap::new(),
            style_info: TableStyleInfo::default(),
        };
        let names: Vec<String> = (1..=range.column_count())
            .map(|i| format!("Column{}", i))
            .collect();
        table.set_field_names(names)?;
        Ok(table)
    }

    #[inline]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// The full table rectangle, including header and totals rows.
    #[inline]
    pub fn range(&self) -> Range {
        self.range
    }

    #[inline]
    pub fn has_header_row(&self) -> bool {
        self.header_row
    }

    #[inline]
    pub fn has_totals_row(&self) -> bool {
        self.totals_row
    }

    /// The header row sub-range, when the table shows one.
    pub fn header_range(&self) -> Option<Range> {
        if !self.header_row {
            return None;
        }
        let first = self.range.first();
        let last = Address::new(first.row(), self.range.last().column()).ok()?;
        Some(Range::new(first, last))
    }

    /// The totals row sub-range, when the table shows one.
    pub fn totals_range(&self) -> Option<Range> {
        if !self.totals_row {
            return None;
        }
        let last = self.range.last();
        let first = Address::new(last.row(), self.range.first().column()).ok()?;
        Some(Range::new(first, last))
    }

    /// The data sub-range: the rectangle minus header and totals rows.
    pub fn data_range(&self) -> Option<Range> {
        let mut first_row = self.range.first().row();
        let mut last_row = self.range.last().row();
        if self.header_row {
            first_row += 1;
        }
        if self.totals_row {
            last_row -= 1;
        }
        if first_row > last_row {
            return None;
        }
        let first = Address::new(first_row, self.range.first().column()).ok()?;
        let last = Address::new(last_row, self.range.last().column()).ok()?;
        Some(Range::new(first, last))
    }

    /// Toggle the totals row. Enabling it extends the table rectangle one
    /// row down; disabling contracts it back.
    pub fn set_totals_row(&mut self, totals: bool) -> Result<()> {
        if totals == self.totals_row {
            return Ok(());
        }
        if totals {
            let grown = Range::new(
                self.range.first(),
                self.range.last().offset(1, 0)?,
            );
            self.range = grown;
        } else {
            let last = self.range.last().offset(-1, 0)?;
            self.range = Range::new(self.range.first(), last);
        }
        self.totals_row = totals;
        Ok(())
    }

    /// Set the totals flag without moving the rectangle, for loading
    /// tables whose stored range already includes the totals row.
    pub(crate) fn set_totals_row_raw(&mut self, totals: bool) {
        self.totals_row = totals;
    }

    /// Fields in column order.
    #[inline]
    pub fn fields(&self) -> &[TableField] {
        &self.fields
    }

    /// Mutable field access for the load pipeline; names must not change
    /// through this path (the lookup map is keyed on them).
    pub(crate) fn fields_mut(&mut self) -> &mut [TableField] {
        &mut self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&TableField> {
        self.field_index.get(name).map(|&i| &self.fields[i])
    }

    /// The 0-based column position of a field within the table.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    /// Replace every field name at once, renumbering IDs.
    ///
    /// The count must match the table's column count and names must be
    /// unique; the lookup map is rebuilt in the same operation.
    pub fn set_field_names(&mut self, names: Vec<String>) -> Result<()> {
        if names.len() != self.range.column_count() as usize {
            return Err(Error::InvalidState(format!(
                "table {} has {} columns but {} field names were supplied",
                self.name,
                self.range.column_count(),
                names.len()
            )));
        }

        let mut index = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if index.insert(name.clone(), i).is_some() {
                return Err(Error::DuplicateName(format!(
                    "field {:?} in table {}",
                    name, self.name
                )));
            }
        }

        // Carry totals settings across by name where a field survives.
        let mut old: HashMap<String, TableField> = self
            .fields
            .drain(..)
            .map(|f| (f.name.clone(), f))
            .collect();
        self.fields = names
            .into_iter()
            .enumerate()
            .map(|(i, name)| match old.remove(&name) {
                Some(mut field) => {
                    field.id = i as u32 + 1;
                    field
                },
                None => TableField::new(i as u32 + 1, name),
            })
            .collect();
        self.field_index = index;
        Ok(())
    }

    /// Rename one field, keeping names unique.
    pub fn rename_field(&mut self, old_name: &str, new_name: &str) -> Result<()> {
        let position = self.field_position(old_name).ok_or_else(|| {
            Error::InvalidState(format!(
                "table {} has no field named {:?}",
                self.name, old_name
            ))
        })?;
        if old_name == new_name {
            return Ok(());
        }
        if self.field_index.contains_key(new_name) {
            return Err(Error::DuplicateName(format!(
                "field {:?} in table {}",
                new_name, self.name
            )));
        }

        self.fields[position].name = new_name.to_string();
        self.field_index.remove(old_name);
        self.field_index.insert(new_name.to_string(), position);
        Ok(())
    }

    /// Set a totals-row function on a field.
    pub fn set_totals_function(&mut self, field_name: &str, function: TotalsRowFunction) -> Result<()> {
        let position = self.field_position(field_name).ok_or_else(|| {
            Error::InvalidState(format!(
                "table {} has no field named {:?}",
                self.name, field_name
            ))
        })?;
        self.fields[position].totals_row_function = Some(function);
        Ok(())
    }

    /// The totals-row formula for a field, regenerated from the field's
    /// current name and function.
    pub fn totals_formula(&self, field: &TableField) -> Option<String> {
        match field.totals_row_function? {
            TotalsRowFunction::Custom => field.totals_row_formula.clone(),
            function => {
                let number = function.subtotal_number()?;
                Some(format!(
                    "SUBTOTAL({},{}[{}])",
                    number, self.name, field.name
                ))
            },
        }
    }

    /// Move the table to a new rectangle.
    ///
    /// Fields are extended with fresh unique names or truncated to match
    /// the new column count; callers that keep a header row re-scan it
    /// afterwards to pick up the real names.
    pub fn resize(&mut self, new_range: Range) -> Result<()> {
        let old_names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
        let new_count = new_range.column_count() as usize;

        let mut names = old_names;
        names.truncate(new_count);
        while names.len() < new_count {
            names.push(next_unique_name(&names));
        }

        self.range = new_range;
        self.set_field_names(names)
    }

    /// Apply a row insertion to the table rectangle.
    pub(crate) fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        self.range = self.range.with_rows_inserted(at, count)?;
        Ok(())
    }

    /// Apply a row deletion to the table rectangle. Returns `false` when
    /// every row of the table was deleted and the table should be dropped.
    pub(crate) fn delete_rows(&mut self, first: u32, count: u32) -> bool {
        match self.range.with_rows_deleted(first, count) {
            Some(clipped) => {
                self.range = clipped;
                true
            },
            None => false,
        }
    }

    /// Apply a column insertion, creating fields for the new columns.
    pub(crate) fn insert_columns(&mut self, at: u32, count: u32) -> Result<()> {
        let old_range = self.range;
        self.range = self.range.with_columns_inserted(at, count)?;

        if self.range.column_count() != old_range.column_count() {
            // Insertion landed inside the table: splice fresh fields in at
            // the insertion offset.
            let offset = (at - old_range.first().column()) as usize;
            let mut names: Vec<String> = self.fields.iter().map(|f| f.name.clone()).collect();
            for _ in 0..count {
                names.insert(offset, next_unique_name(&names));
            }
            self.set_field_names(names)?;
        }
        Ok(())
    }

    /// Apply a column deletion, dropping the covered fields. Returns
    /// `false` when every column was deleted.
    pub(crate) fn delete_columns(&mut self, first: u32, count: u32) -> Result<bool> {
        let old_range = self.range;
        match self.range.with_columns_deleted(first, count) {
            Some(clipped) => {
                self.range = clipped;
                if self.range.column_count() != old_range.column_count() {
                    let table_first = old_range.first().column();
                    let names: Vec<String> = self
                        .fields
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| {
                            let column = table_first + *i as u32;
                            column < first || column >= first + count
                        })
                        .map(|(_, f)| f.name.clone())
                        .collect();
                    self.set_field_names(names)?;
                }
                Ok(true)
            },
            None => Ok(false),
        }
    }
}

fn next_unique_name(names: &[String]) -> String {
    let mut n = names.len() + 1;
    loop {
        let candidate = format!("Column{}", n);
        if !names.contains(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(a1: &str) -> Range {
        Range::from_a1(a1).unwrap()
    }

    #[test]
    fn test_field_count_matches_columns() {
        let table = Table::new(1, "Sales", range("A1:C5"), true).unwrap();
        assert_eq!(table.fields().len(), 3);
        assert_eq!(table.fields()[0].name, "Column1");
        assert_eq!(table.field_position("Column3"), Some(2));
    }

    #[test]
    fn test_rename_validates_uniqueness() {
        let mut table = Table::new(1, "Sales", range("A1:C5"), true).unwrap();
        table.rename_field("Column1", "Region").unwrap();
        assert_eq!(table.field_position("Region"), Some(0));
        assert_eq!(table.field_position("Column1"), None);

        let err = table.rename_field("Column2", "Region").unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
    }

    #[test]
    fn test_duplicate_header_names_rejected() {
        let mut table = Table::new(1, "Sales", range("A1:B5"), true).unwrap();
        let err = table
            .set_field_names(vec!["X".into(), "X".into()])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateName(_)));
    }

    #[test]
    fn test_totals_row_shifts_data_range() {
        let mut table = Table::new(1, "Sales", range("A1:C5"), true).unwrap();
        assert_eq!(table.data_range().unwrap().to_a1(), "A2:C5");

        table.set_totals_row(true).unwrap();
        assert_eq!(table.range().to_a1(), "A1:C6");
        assert_eq!(table.data_range().unwrap().to_a1(), "A2:C5");
        assert_eq!(table.totals_range().unwrap().to_a1(), "A6:C6");

        table.set_totals_row(false).unwrap();
        assert_eq!(table.range().to_a1(), "A1:C5");
    }

    #[test]
    fn test_totals_formula_follows_rename() {
        let mut table = Table::new(1, "Sales", range("A1:B5"), true).unwrap();
        table.rename_field("Column2", "Amount").unwrap();
        table
            .set_totals_function("Amount", TotalsRowFunction::Sum)
            .unwrap();

        let field = table.field("Amount").unwrap().clone();
        assert_eq!(
            table.totals_formula(&field).unwrap(),
            "SUBTOTAL(109,Sales[Amount])"
        );

        // Renaming the field regenerates the formula text on the next ask.
        table.rename_field("Amount", "Total").unwrap();
        let field = table.field("Total").unwrap().clone();
        assert_eq!(
            table.totals_formula(&field).unwrap(),
            "SUBTOTAL(109,Sales[Total])"
        );
    }

    #[test]
    fn test_resize_adjusts_fields() {
        let mut table = Table::new(1, "Sales", range("A1:B5"), true).unwrap();
        table.rename_field("Column1", "Region").unwrap();

        table.resize(range("A1:D8")).unwrap();
        assert_eq!(table.fields().len(), 4);
        assert_eq!(table.field_position("Region"), Some(0));

        table.resize(range("A1:A8")).unwrap();
        assert_eq!(table.fields().len(), 1);
        assert_eq!(table.fields()[0].name, "Region");
    }

    #[test]
    fn test_column_insertion_splices_fields() {
        let mut table = Table::new(1, "Sales", range("B1:D5"), true).unwrap();
        table.insert_columns(3, 1).unwrap();
        assert_eq!(table.range().to_a1(), "B1:E5");
        assert_eq!(table.fields().len(), 4);
        assert_eq!(table.fields()[1].name, "Column4");
        assert_eq!(table.fields()[2].name, "Column2");
    }

    #[test]
    fn test_column_deletion_drops_fields() {
        let mut table = Table::new(1, "Sales", range("B1:D5"), true).unwrap();
        assert!(table.delete_columns(3, 1).unwrap());
        assert_eq!(table.range().to_a1(), "B1:C5");
        let names: Vec<&str> = table.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Column1", "Column3"]);

        assert!(!table.delete_columns(2, 5).unwrap());
    }
}
