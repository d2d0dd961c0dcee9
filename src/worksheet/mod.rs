//! Worksheets: sparse cell storage plus the registries layered on top.
//!
//! Cells live in a row-major ordered map keyed by address; rows and
//! columns exist only where they differ from the sheet defaults. Reading
//! a cell through the mutable accessor materializes it with the style in
//! effect at its intersection (row override, then column override, then
//! the sheet default), so formatting applied to a whole row or column
//! sticks before any cell in it is touched.
//!
//! Structural edits (row/column insertion and deletion) shift the cell
//! map, the row/column maps, the merge registry, and every table in one
//! operation; bounds are validated up front so a failed edit mutates
//! nothing. Workbook-scoped defined names are shifted by the workbook
//! operation that wraps these.

mod column;
mod merge;
mod row;

pub use column::Column;
pub use merge::MergedRanges;
pub use row::Row;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::address::{Address, MAX_COLUMNS, MAX_ROWS, Range};
use crate::cell::{Cell, CellFormula};
use crate::error::{Error, Result};
use crate::style::Style;
use crate::table::Table;
use crate::value::CellValue;

/// Sheet visibility states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetVisibility {
    #[default]
    Visible,
    /// Hidden, but unhidable from the UI
    Hidden,
    /// Hidden and only unhidable programmatically
    VeryHidden,
}

impl SheetVisibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Visible => "visible",
            Self::Hidden => "hidden",
            Self::VeryHidden => "veryHidden",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "visible" => Some(Self::Visible),
            "hidden" => Some(Self::Hidden),
            "veryHidden" => Some(Self::VeryHidden),
            _ => None,
        }
    }
}

/// The style in effect for a not-yet-materialized cell.
///
/// A row override beats a column override, which beats the sheet default.
pub fn resolve_effective_style(
    row: Option<&Row>,
    column: Option<&Column>,
    sheet_default: &Arc<Style>,
) -> Arc<Style> {
    if let Some(style) = row.and_then(|r| r.style()) {
        Arc::clone(style)
    } else if let Some(style) = column.and_then(|c| c.style()) {
        Arc::clone(style)
    } else {
        Arc::clone(sheet_default)
    }
}

/// A single worksheet.
#[derive(Debug, Clone)]
pub struct Worksheet {
    name: String,
    sheet_id: u32,
    visibility: SheetVisibility,
    cells: BTreeMap<Address, Cell>,
    rows: BTreeMap<u32, Row>,
    columns: BTreeMap<u32, Column>,
    merges: MergedRanges,
    tables: Vec<Table>,
    default_style: Arc<Style>,
    default_row_height: f64,
    default_column_width: f64,
    dirty: bool,
    deleted_rows: BTreeSet<u32>,
    deleted_cells: BTreeSet<Address>,
}

impl Worksheet {
    /// Create an empty worksheet with an explicit default style.
    pub fn new(name: impl Into<String>, sheet_id: u32, default_style: Arc<Style>) -> Self {
        Self {
            name: name.into(),
            sheet_id,
            visibility: SheetVisibility::Visible,
            cells: BTreeMap::new(),
            rows: BTreeMap::new(),
            columns: BTreeMap::new(),
            merges: MergedRanges::new(),
            tables: Vec::new(),
            default_style,
            default_row_height: 15.0,
            default_column_width: 8.43,
            dirty: false,
            deleted_rows: BTreeSet::new(),
            deleted_cells: BTreeSet::new(),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
        self.dirty = true;
    }

    #[inline]
    pub fn sheet_id(&self) -> u32 {
        self.sheet_id
    }

    #[inline]
    pub fn visibility(&self) -> SheetVisibility {
        self.visibility
    }

    pub fn set_visibility(&mut self, visibility: SheetVisibility) {
        self.visibility = visibility;
    }

    /// The sheet's default style, used when neither a row nor a column
    /// override applies.
    #[inline]
    pub fn default_style(&self) -> &Arc<Style> {
        &self.default_style
    }

    #[inline]
    pub fn default_row_height(&self) -> f64 {
        self.default_row_height
    }

    pub fn set_default_row_height(&mut self, height: f64) {
        self.default_row_height = height;
        self.dirty = true;
    }

    #[inline]
    pub fn default_column_width(&self) -> f64 {
        self.default_column_width
    }

    pub fn set_default_column_width(&mut self, width: f64) {
        self.default_column_width = width;
        self.dirty = true;
    }

    // ---- cells ----

    /// Access a cell, materializing it if it does not exist yet.
    ///
    /// A materialized cell starts blank and inherits the style currently
    /// in effect for its row/column intersection; from then on it owns its
    /// own style reference.
    pub fn cell(&mut self, address: Address) -> &mut Cell {
        self.dirty = true;
        let style = resolve_effective_style(
            self.rows.get(&address.row()),
            self.columns.get(&address.column()),
            &self.default_style,
        );
        self.cells.entry(address).or_insert_with(|| Cell::new(style))
    }

    /// Access a cell by A1 reference, materializing it if needed.
    pub fn cell_at(&mut self, reference: &str) -> Result<&mut Cell> {
        let address = Address::from_a1(reference)?;
        Ok(self.cell(address))
    }

    /// The cell at `address`, if it has been materialized.
    #[inline]
    pub fn get_cell(&self, address: Address) -> Option<&Cell> {
        self.cells.get(&address)
    }

    /// The value at `address`, `Blank` for untouched cells.
    pub fn cell_value(&self, address: Address) -> CellValue {
        self.cells
            .get(&address)
            .map(Cell::value)
            .unwrap_or(CellValue::Blank)
    }

    /// Assign a literal value.
    pub fn set_cell_value(&mut self, address: Address, value: impl Into<CellValue>) {
        self.cell(address).set_value(value);
    }

    /// Assign a formula.
    pub fn set_cell_formula(&mut self, address: Address, formula: CellFormula) {
        self.cell(address).set_formula(formula);
    }

    /// Remove a cell entirely, tracking the deletion for the next save.
    pub fn clear_cell(&mut self, address: Address) {
        if self.cells.remove(&address).is_some() {
            self.deleted_cells.insert(address);
            self.dirty = true;
        }
    }

    /// Materialized cells in row-major order.
    #[inline]
    pub fn cells(&self) -> impl Iterator<Item = (&Address, &Cell)> {
        self.cells.iter()
    }

    /// Number of materialized cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The smallest rectangle covering every materialized cell.
    pub fn dimension(&self) -> Option<Range> {
        let mut iter = self.cells.keys();
        let first = *iter.next()?;
        let mut min_col = first.column();
        let mut max_col = first.column();
        let max_row = self.cells.keys().next_back().map_or(first.row(), |a| a.row());
        for address in iter {
            min_col = min_col.min(address.column());
            max_col = max_col.max(address.column());
        }
        let first = Address::new(first.row(), min_col).ok()?;
        let last = Address::new(max_row, max_col).ok()?;
        Some(Range::new(first, last))
    }

    // ---- rows and columns ----

    /// Access a row record, materializing it if needed.
    pub fn row(&mut self, index: u32) -> Result<&mut Row> {
        if index == 0 || index > MAX_ROWS {
            return Err(Error::IndexOutOfRange {
                kind: "row",
                value: index as u64,
                max: MAX_ROWS,
            });
        }
        self.dirty = true;
        Ok(self.rows.entry(index).or_default())
    }

    /// The row record, if one exists.
    #[inline]
    pub fn get_row(&self, index: u32) -> Option<&Row> {
        self.rows.get(&index)
    }

    /// Access a column record, materializing it if needed.
    pub fn column(&mut self, index: u32) -> Result<&mut Column> {
        if index == 0 || index > MAX_COLUMNS {
            return Err(Error::IndexOutOfRange {
                kind: "column",
                value: index as u64,
                max: MAX_COLUMNS,
            });
        }
        self.dirty = true;
        Ok(self.columns.entry(index).or_default())
    }

    /// The column record, if one exists.
    #[inline]
    pub fn get_column(&self, index: u32) -> Option<&Column> {
        self.columns.get(&index)
    }

    /// Row records in index order.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = (&u32, &Row)> {
        self.rows.iter()
    }

    /// Column records in index order.
    #[inline]
    pub fn columns(&self) -> impl Iterator<Item = (&u32, &Column)> {
        self.columns.iter()
    }

    /// The style in effect at an address, without materializing a cell.
    pub fn effective_style(&self, address: Address) -> Arc<Style> {
        match self.cells.get(&address) {
            Some(cell) => Arc::clone(cell.style()),
            None => resolve_effective_style(
                self.rows.get(&address.row()),
                self.columns.get(&address.column()),
                &self.default_style,
            ),
        }
    }

    // ---- merges ----

    /// Merge a range of cells.
    pub fn merge_cells(&mut self, range: Range) -> Result<()> {
        self.merges.add(range)?;
        self.dirty = true;
        Ok(())
    }

    /// Remove a merge matching the exact range.
    pub fn unmerge_cells(&mut self, range: &Range) -> bool {
        let removed = self.merges.remove(range);
        if removed {
            self.dirty = true;
        }
        removed
    }

    #[inline]
    pub fn merged_ranges(&self) -> &MergedRanges {
        &self.merges
    }

    // ---- tables ----

    /// Create a table over `range`.
    ///
    /// With a header row, field names are read from the header cells;
    /// blank headers get generated names and repeated header text gets a
    /// numeric suffix. Without a header row, all names are generated.
    /// Duplicate table names are rejected.
    pub fn add_table(
        &mut self,
        name: impl Into<String>,
        range: Range,
        header_row: bool,
    ) -> Result<&Table> {
        let name = name.into();
        if self
            .tables
            .iter()
            .any(|t| t.name().eq_ignore_ascii_case(&name))
        {
            return Err(Error::DuplicateName(format!("table {:?}", name)));
        }

        let id = self.tables.iter().map(Table::id).max().unwrap_or(0) + 1;
        let mut table = Table::new(id, name, range, header_row)?;
        if header_row {
            table.set_field_names(self.header_names(&table))?;
        }
        let index = self.tables.len();
        self.tables.push(table);
        self.dirty = true;
        Ok(&self.tables[index])
    }

    pub(crate) fn add_table_raw(&mut self, table: Table) -> Result<()> {
        if self
            .tables
            .iter()
            .any(|t| t.name().eq_ignore_ascii_case(table.name()))
        {
            return Err(Error::DuplicateName(format!("table {:?}", table.name())));
        }
        self.tables.push(table);
        Ok(())
    }

    /// Look up a table by name.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Mutable access to a table.
    pub fn table_mut(&mut self, name: &str) -> Option<&mut Table> {
        self.dirty = true;
        self.tables
            .iter_mut()
            .find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Tables on this sheet.
    #[inline]
    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Remove a table. Returns whether it existed.
    pub fn remove_table(&mut self, name: &str) -> bool {
        let before = self.tables.len();
        self.tables.retain(|t| !t.name().eq_ignore_ascii_case(name));
        let removed = self.tables.len() != before;
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Move a table to a new rectangle, re-reading field names from its
    /// header row.
    pub fn resize_table(&mut self, name: &str, new_range: Range) -> Result<()> {
        let position = self
            .tables
            .iter()
            .position(|t| t.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::InvalidState(format!("no table named {:?}", name)))?;

        let mut table = self.tables[position].clone();
        table.resize(new_range)?;
        if table.has_header_row() {
            table.set_field_names(self.header_names(&table))?;
        }
        self.tables[position] = table;
        self.dirty = true;
        Ok(())
    }

    /// Field names read from a table's header-row cells, falling back to
    /// the table's current names for blank headers. Repeated header text
    /// gets a numeric suffix so the field map stays unambiguous.
    fn header_names(&self, table: &Table) -> Vec<String> {
        let Some(header) = table.header_range() else {
            return table.fields().iter().map(|f| f.name.clone()).collect();
        };
        let mut names: Vec<String> = Vec::with_capacity(table.fields().len());
        for (i, address) in header.addresses().enumerate() {
            let base = match self.cell_value(address) {
                CellValue::Text(text) if !text.is_empty() => text,
                _ => table
                    .fields()
                    .get(i)
                    .map(|f| f.name.clone())
                    .unwrap_or_else(|| format!("Column{}", i + 1)),
            };
            let mut candidate = base.clone();
            let mut suffix = 2u32;
            while names.iter().any(|n| n.eq_ignore_ascii_case(&candidate)) {
                candidate = format!("{}{}", base, suffix);
                suffix += 1;
            }
            names.push(candidate);
        }
        names
    }

    // ---- structural edits ----

    /// Insert `count` blank rows above row `before`.
    ///
    /// Shifts cells, row records, merges, and tables in one operation;
    /// the workbook wrapper shifts defined names. Fails without mutating
    /// anything if any shifted structure would leave the grid.
    pub(crate) fn insert_rows(&mut self, before: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if before == 0 || before > MAX_ROWS {
            return Err(Error::IndexOutOfRange {
                kind: "row",
                value: before as u64,
                max: MAX_ROWS,
            });
        }
        self.check_row_headroom(before, count)?;

        let old_cells = std::mem::take(&mut self.cells);
        self.cells = old_cells
            .into_iter()
            .map(|(address, cell)| {
                if address.row() >= before {
                    // Headroom was checked; the offset cannot fail.
                    (
                        address.offset(count as i64, 0).unwrap_or(address),
                        cell,
                    )
                } else {
                    (address, cell)
                }
            })
            .collect();

        let old_rows = std::mem::take(&mut self.rows);
        self.rows = old_rows
            .into_iter()
            .map(|(index, row)| {
                if index >= before {
                    (index + count, row)
                } else {
                    (index, row)
                }
            })
            .collect();

        self.merges.insert_rows(before, count)?;
        for table in &mut self.tables {
            table.insert_rows(before, count)?;
        }

        self.dirty = true;
        Ok(())
    }

    /// Delete rows `first..first + count`.
    ///
    /// Cells on the deleted rows are removed (and tracked for the next
    /// save); merges are clipped; tables contract, and a table whose rows
    /// are all deleted is dropped. Tables with a header row re-read their
    /// field names from the new header cells.
    pub(crate) fn delete_rows(&mut self, first: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if first == 0 || first.saturating_add(count - 1) > MAX_ROWS {
            return Err(Error::IndexOutOfRange {
                kind: "row",
                value: first.saturating_add(count - 1) as u64,
                max: MAX_ROWS,
            });
        }
        let deleted_last = first + count - 1;

        let old_cells = std::mem::take(&mut self.cells);
        for (address, cell) in old_cells {
            if address.row() < first {
                self.cells.insert(address, cell);
            } else if address.row() > deleted_last {
                if let Ok(shifted) = address.offset(-(count as i64), 0) {
                    self.cells.insert(shifted, cell);
                }
            } else {
                self.deleted_cells.insert(address);
            }
        }

        let old_rows = std::mem::take(&mut self.rows);
        for (index, row) in old_rows {
            if index < first {
                self.rows.insert(index, row);
            } else if index > deleted_last {
                self.rows.insert(index - count, row);
            } else {
                self.deleted_rows.insert(index);
            }
        }
        for index in first..=deleted_last {
            self.deleted_rows.insert(index);
        }

        self.merges.delete_rows(first, count);

        let mut survivors = Vec::with_capacity(self.tables.len());
        for mut table in std::mem::take(&mut self.tables) {
            if table.delete_rows(first, count) {
                survivors.push(table);
            }
        }
        self.tables = survivors;

        // The deletion may have changed which cells sit on header rows.
        for position in 0..self.tables.len() {
            if self.tables[position].has_header_row() {
                let names = self.header_names(&self.tables[position]);
                self.tables[position].set_field_names(names)?;
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Insert `count` blank columns left of column `before`.
    pub(crate) fn insert_columns(&mut self, before: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if before == 0 || before > MAX_COLUMNS {
            return Err(Error::IndexOutOfRange {
                kind: "column",
                value: before as u64,
                max: MAX_COLUMNS,
            });
        }
        self.check_column_headroom(before, count)?;

        let old_cells = std::mem::take(&mut self.cells);
        self.cells = old_cells
            .into_iter()
            .map(|(address, cell)| {
                if address.column() >= before {
                    (
                        address.offset(0, count as i64).unwrap_or(address),
                        cell,
                    )
                } else {
                    (address, cell)
                }
            })
            .collect();

        let old_columns = std::mem::take(&mut self.columns);
        self.columns = old_columns
            .into_iter()
            .map(|(index, column)| {
                if index >= before {
                    (index + count, column)
                } else {
                    (index, column)
                }
            })
            .collect();

        self.merges.insert_columns(before, count)?;
        for table in &mut self.tables {
            table.insert_columns(before, count)?;
        }

        self.dirty = true;
        Ok(())
    }

    /// Delete columns `first..first + count`.
    pub(crate) fn delete_columns(&mut self, first: u32, count: u32) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        if first == 0 || first.saturating_add(count - 1) > MAX_COLUMNS {
            return Err(Error::IndexOutOfRange {
                kind: "column",
                value: first.saturating_add(count - 1) as u64,
                max: MAX_COLUMNS,
            });
        }
        let deleted_last = first + count - 1;

        let old_cells = std::mem::take(&mut self.cells);
        for (address, cell) in old_cells {
            if address.column() < first {
                self.cells.insert(address, cell);
            } else if address.column() > deleted_last {
                if let Ok(shifted) = address.offset(0, -(count as i64)) {
                    self.cells.insert(shifted, cell);
                }
            } else {
                self.deleted_cells.insert(address);
            }
        }

        let old_columns = std::mem::take(&mut self.columns);
        for (index, column) in old_columns {
            if index < first {
                self.columns.insert(index, column);
            } else if index > deleted_last {
                self.columns.insert(index - count, column);
            }
        }

        self.merges.delete_columns(first, count);

        let mut survivors = Vec::with_capacity(self.tables.len());
        for mut table in std::mem::take(&mut self.tables) {
            if table.delete_columns(first, count)? {
                survivors.push(table);
            }
        }
        self.tables = survivors;

        for position in 0..self.tables.len() {
            if self.tables[position].has_header_row() {
                let names = self.header_names(&self.tables[position]);
                self.tables[position].set_field_names(names)?;
            }
        }

        self.dirty = true;
        Ok(())
    }

    /// Verify a row insertion cannot push any occupied structure past the
    /// grid bottom.
    fn check_row_headroom(&self, before: u32, count: u32) -> Result<()> {
        let mut max_row = 0u32;
        if let Some(address) = self.cells.keys().next_back() {
            max_row = max_row.max(address.row());
        }
        if let Some(index) = self.rows.keys().next_back() {
            max_row = max_row.max(*index);
        }
        for range in self.merges.iter() {
            max_row = max_row.max(range.last().row());
        }
        for table in &self.tables {
            max_row = max_row.max(table.range().last().row());
        }

        if max_row >= before && max_row as u64 + count as u64 > MAX_ROWS as u64 {
            return Err(Error::IndexOutOfRange {
                kind: "row",
                value: max_row as u64 + count as u64,
                max: MAX_ROWS,
            });
        }
        Ok(())
    }

    /// Verify a column insertion cannot push any occupied structure past
    /// the grid's right edge.
    fn check_column_headroom(&self, before: u32, count: u32) -> Result<()> {
        let mut max_col = 0u32;
        for address in self.cells.keys() {
            max_col = max_col.max(address.column());
        }
        if let Some(index) = self.columns.keys().next_back() {
            max_col = max_col.max(*index);
        }
        for range in self.merges.iter() {
            max_col = max_col.max(range.last().column());
        }
        for table in &self.tables {
            max_col = max_col.max(table.range().last().column());
        }

        if max_col >= before && max_col as u64 + count as u64 > MAX_COLUMNS as u64 {
            return Err(Error::IndexOutOfRange {
                kind: "column",
                value: max_col as u64 + count as u64,
                max: MAX_COLUMNS,
            });
        }
        Ok(())
    }

    // ---- save bookkeeping ----

    /// Whether anything changed since the sheet was loaded or last saved.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rows deleted since the last save.
    ///
    /// The save pipeline consults this (together with the dirty flag) to
    /// decide that the previously loaded part must be replaced rather
    /// than carried over, so deletions are emitted instead of merged
    /// away.
    pub fn pending_deleted_rows(&self) -> &BTreeSet<u32> {
        &self.deleted_rows
    }

    /// Cells deleted since the last save.
    pub fn pending_deleted_cells(&self) -> &BTreeSet<Address> {
        &self.deleted_cells
    }

    /// Reset change tracking after a successful save.
    pub(crate) fn mark_saved(&mut self) {
        self.dirty = false;
        self.deleted_rows.clear();
        self.deleted_cells.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Font;

    fn sheet() -> Worksheet {
        Worksheet::new("Sheet1", 1, Style::default_style())
    }

    fn addr(a1: &str) -> Address {
        Address::from_a1(a1).unwrap()
    }

    fn range(a1: &str) -> Range {
        Range::from_a1(a1).unwrap()
    }

    #[test]
    fn test_materialization_inherits_row_style_over_column() {
        let mut ws = sheet();
        let bold = Arc::new(Style::new().with_font(Font::new().with_bold(true)));
        let italic = Arc::new(Style::new().with_font(Font::new().with_italic(true)));

        ws.row(2).unwrap().set_style(Arc::clone(&bold));
        ws.column(3).unwrap().set_style(Arc::clone(&italic));

        // Row override wins at the intersection.
        assert!(ws.cell(addr("C2")).style().font.bold);
        // Column override applies elsewhere in the column.
        assert!(ws.cell(addr("C5")).style().font.italic);
        // Sheet default everywhere else.
        assert!(!ws.cell(addr("A1")).style().font.bold);
    }

    #[test]
    fn test_materialized_cell_keeps_style_after_row_change() {
        let mut ws = sheet();
        let bold = Arc::new(Style::new().with_font(Font::new().with_bold(true)));
        ws.row(1).unwrap().set_style(bold);

        let style = Arc::clone(ws.cell(addr("A1")).style());
        assert!(style.font.bold);

        // Later row restyling does not rewrite the existing cell.
        let italic = Arc::new(Style::new().with_font(Font::new().with_italic(true)));
        ws.row(1).unwrap().set_style(italic);
        assert!(ws.cell(addr("A1")).style().font.bold);
    }

    #[test]
    fn test_insert_rows_shifts_everything() {
        let mut ws = sheet();
        ws.set_cell_value(addr("A1"), "content");
        ws.set_cell_value(addr("A10"), 10.0);
        ws.row(10).unwrap().set_height(30.0);
        ws.merge_cells(range("B2:C3")).unwrap();
        ws.add_table("T", range("A1:C5"), false).unwrap();

        ws.insert_rows(1, 2).unwrap();

        assert_eq!(ws.cell_value(addr("A3")), CellValue::Text("content".into()));
        assert_eq!(ws.cell_value(addr("A1")), CellValue::Blank);
        assert_eq!(ws.cell_value(addr("A12")), CellValue::Number(10.0));
        assert!(ws.get_row(12).is_some_and(|r| r.height.is_some()));
        assert_eq!(
            ws.merged_ranges().iter().next().unwrap().to_a1(),
            "B4:C5"
        );
        assert_eq!(ws.table("T").unwrap().range().to_a1(), "A3:C7");
    }

    #[test]
    fn test_insert_rows_overflow_is_atomic() {
        let mut ws = sheet();
        ws.set_cell_value(addr("A1"), 1.0);
        let bottom = Address::new(MAX_ROWS, 1).unwrap();
        ws.set_cell_value(bottom, 2.0);

        assert!(matches!(
            ws.insert_rows(1, 1),
            Err(Error::IndexOutOfRange { .. })
        ));
        // Nothing moved.
        assert_eq!(ws.cell_value(addr("A1")), CellValue::Number(1.0));
        assert_eq!(ws.cell_value(bottom), CellValue::Number(2.0));
    }

    #[test]
    fn test_delete_rows_tracks_and_shifts() {
        let mut ws = sheet();
        ws.set_cell_value(addr("A1"), 1.0);
        ws.set_cell_value(addr("A3"), 3.0);
        ws.set_cell_value(addr("A5"), 5.0);

        ws.delete_rows(2, 2).unwrap();

        assert_eq!(ws.cell_value(addr("A1")), CellValue::Number(1.0));
        assert_eq!(ws.cell_value(addr("A3")), CellValue::Number(5.0));
        assert_eq!(ws.cell_count(), 2);
        assert!(ws.pending_deleted_rows().contains(&2));
        assert!(ws.pending_deleted_cells().contains(&addr("A3")));
    }

    #[test]
    fn test_delete_rows_rescans_table_header() {
        let mut ws = sheet();
        ws.set_cell_value(addr("A1"), "Old1");
        ws.set_cell_value(addr("B1"), "Old2");
        ws.set_cell_value(addr("A2"), "New1");
        ws.set_cell_value(addr("B2"), "New2");
        ws.add_table("T", range("A1:B4"), true).unwrap();
        assert_eq!(ws.table("T").unwrap().fields()[0].name, "Old1");

        // Deleting the header row promotes the next row to header.
        ws.delete_rows(1, 1).unwrap();
        let table = ws.table("T").unwrap();
        assert_eq!(table.range().to_a1(), "A1:B3");
        assert_eq!(table.fields()[0].name, "New1");
        assert_eq!(table.fields()[1].name, "New2");
    }

    #[test]
    fn test_insert_columns_shifts_cells() {
        let mut ws = sheet();
        ws.set_cell_value(addr("B1"), "b");
        ws.column(2).unwrap().set_width(20.0);

        ws.insert_columns(1, 3).unwrap();

        assert_eq!(ws.cell_value(addr("E1")), CellValue::Text("b".into()));
        assert!(ws.get_column(5).is_some_and(|c| c.width.is_some()));
    }

    #[test]
    fn test_table_from_header_cells() {
        let mut ws = sheet();
        ws.set_cell_value(addr("A1"), "Region");
        ws.set_cell_value(addr("B1"), "Amount");
        let table = ws.add_table("Sales", range("A1:B5"), true).unwrap();
        let names: Vec<&str> = table.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Region", "Amount"]);
    }

    #[test]
    fn test_duplicate_table_name_rejected() {
        let mut ws = sheet();
        ws.add_table("T", range("A1:B2"), false).unwrap();
        assert!(matches!(
            ws.add_table("t", range("D1:E2"), false),
            Err(Error::DuplicateName(_))
        ));
    }

    #[test]
    fn test_dimension() {
        let mut ws = sheet();
        assert!(ws.dimension().is_none());
        ws.set_cell_value(addr("C3"), 1.0);
        ws.set_cell_value(addr("B7"), 2.0);
        assert_eq!(ws.dimension().unwrap().to_a1(), "B3:C7");
    }
}
