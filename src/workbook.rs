//! The workbook: sheets, defined names, and round-trip state.

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::named_range::{NamedRange, NamedRanges};
use crate::package::Package;
use crate::shared_strings::SharedStringTable;
use crate::style::{RawStylesheet, Style};
use crate::value::DateSystem;
use crate::worksheet::Worksheet;

/// A loaded sheet part kept verbatim for minimal-diff saves.
#[derive(Debug, Clone)]
pub(crate) struct LoadedSheet {
    pub part_name: String,
    pub xml: String,
    pub rels_xml: Option<String>,
    /// Table parts this sheet references, as (part name, xml)
    pub table_parts: Vec<(String, String)>,
}

/// Everything retained from a loaded package that the save pipeline needs
/// to keep untouched parts stable.
#[derive(Debug, Clone, Default)]
pub(crate) struct LoadedDocument {
    /// Style tables in file order; they seed the save-time registry so
    /// format indices survive a round trip
    pub raw_styles: RawStylesheet,
    /// Shared strings in file order, seeding the save-time builder
    pub shared_strings: SharedStringTable,
    /// One entry per sheet, aligned with the workbook's sheet list at
    /// load time
    pub sheets: Vec<LoadedSheet>,
}

/// An in-memory workbook document.
#[derive(Debug)]
pub struct Workbook {
    sheets: Vec<Worksheet>,
    defined_names: NamedRanges,
    date_system: DateSystem,
    default_style: Arc<Style>,
    next_sheet_id: u32,
    loaded: Option<LoadedDocument>,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    /// Create an empty workbook with the standard default style.
    pub fn new() -> Self {
        Self::with_default_style(Style::default_style())
    }

    /// Create an empty workbook with an explicit default style.
    ///
    /// The style is the workbook's "Normal" style: cell-format index 0,
    /// inherited by every cell no row/column/cell override touches.
    pub fn with_default_style(default_style: Arc<Style>) -> Self {
        Self {
            sheets: Vec::new(),
            defined_names: NamedRanges::new(),
            date_system: DateSystem::V1900,
            default_style,
            next_sheet_id: 1,
            loaded: None,
        }
    }

    /// Load a workbook from a package of XML parts.
    pub fn open(package: &Package) -> Result<Self> {
        crate::reader::load_document(package)
    }

    /// Serialize the workbook to a package of XML parts.
    ///
    /// Always rebuilds the style and shared-string tables; reuses loaded
    /// XML verbatim for sheets that have not changed.
    pub fn save(&mut self) -> Result<Package> {
        crate::writer::save_document(self)
    }

    /// The workbook default style.
    #[inline]
    pub fn default_style(&self) -> &Arc<Style> {
        &self.default_style
    }

    #[inline]
    pub fn date_system(&self) -> DateSystem {
        self.date_system
    }

    pub fn set_date_system(&mut self, date_system: DateSystem) {
        self.date_system = date_system;
    }

    // ---- sheets ----

    /// Append a new empty sheet.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<&mut Worksheet> {
        let name = name.into();
        if name.is_empty() || name.len() > 31 {
            return Err(Error::Format(format!("invalid sheet name {:?}", name)));
        }
        if self
            .sheets
            .iter()
            .any(|s| s.name().eq_ignore_ascii_case(&name))
        {
            return Err(Error::DuplicateName(format!("sheet {:?}", name)));
        }

        let sheet_id = self.next_sheet_id;
        self.next_sheet_id += 1;
        self.sheets
            .push(Worksheet::new(name, sheet_id, Arc::clone(&self.default_style)));
        let index = self.sheets.len() - 1;
        Ok(&mut self.sheets[index])
    }

    /// Sheets in workbook order.
    #[inline]
    pub fn sheets(&self) -> &[Worksheet] {
        &self.sheets
    }

    #[inline]
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// A sheet by position.
    #[inline]
    pub fn sheet(&self, index: usize) -> Option<&Worksheet> {
        self.sheets.get(index)
    }

    /// Mutable access to a sheet by position.
    #[inline]
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Worksheet> {
        self.sheets.get_mut(index)
    }

    /// A sheet by name (case-insensitive).
    pub fn sheet_by_name(&self, name: &str) -> Option<&Worksheet> {
        self.sheets.iter().find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Mutable access to a sheet by name.
    pub fn sheet_by_name_mut(&mut self, name: &str) -> Option<&mut Worksheet> {
        self.sheets
            .iter_mut()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Rename a sheet. Defined-name targets pointing at it keep the old
    /// text only when they are opaque formulas; parsed targets follow.
    pub fn rename_sheet(&mut self, index: usize, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        if self.sheets.iter().enumerate().any(|(i, s)| {
            i != index && s.name().eq_ignore_ascii_case(&name)
        }) {
            return Err(Error::DuplicateName(format!("sheet {:?}", name)));
        }
        let sheet = self
            .sheets
            .get_mut(index)
            .ok_or_else(|| Error::InvalidState(format!("no sheet at index {}", index)))?;
        let old_name = sheet.name().to_string();
        sheet.set_name(name.clone());
        self.defined_names.rename_sheet(&old_name, &name);
        Ok(())
    }

    // ---- defined names ----

    #[inline]
    pub fn defined_names(&self) -> &NamedRanges {
        &self.defined_names
    }

    /// Register a defined name, checking for collisions with other names
    /// and with table names (tables reserve their names workbook-wide).
    pub fn add_defined_name(&mut self, named: NamedRange) -> Result<()> {
        let table_collision = self
            .sheets
            .iter()
            .flat_map(|s| s.tables())
            .any(|t| t.name().eq_ignore_ascii_case(&named.name));
        if table_collision {
            return Err(Error::DuplicateName(format!(
                "name {:?} is already used by a table",
                named.name
            )));
        }
        self.defined_names.add(named)
    }

    /// Remove a defined name.
    pub fn remove_defined_name(&mut self, name: &str, scope: Option<u32>) -> bool {
        self.defined_names.remove(name, scope)
    }

    // ---- structural edits ----

    /// Insert `count` blank rows above row `before` on one sheet, shifting
    /// cells, row records, merges, tables, and defined-name targets in the
    /// same operation.
    pub fn insert_rows(&mut self, sheet_index: usize, before: u32, count: u32) -> Result<()> {
        let sheet = self
            .sheets
            .get_mut(sheet_index)
            .ok_or_else(|| Error::InvalidState(format!("no sheet at index {}", sheet_index)))?;
        sheet.insert_rows(before, count)?;
        let name = sheet.name().to_string();
        self.defined_names.insert_rows(&name, before, count)
    }

    /// Delete rows `first..first + count` on one sheet.
    pub fn delete_rows(&mut self, sheet_index: usize, first: u32, count: u32) -> Result<()> {
        let sheet = self
            .sheets
            .get_mut(sheet_index)
            .ok_or_else(|| Error::InvalidState(format!("no sheet at index {}", sheet_index)))?;
        sheet.delete_rows(first, count)?;
        let name = sheet.name().to_string();
        self.defined_names.delete_rows(&name, first, count)
    }

    /// Insert `count` blank columns left of column `before` on one sheet.
    pub fn insert_columns(&mut self, sheet_index: usize, before: u32, count: u32) -> Result<()> {
        let sheet = self
            .sheets
            .get_mut(sheet_index)
            .ok_or_else(|| Error::InvalidState(format!("no sheet at index {}", sheet_index)))?;
        sheet.insert_columns(before, count)?;
        let name = sheet.name().to_string();
        self.defined_names.insert_columns(&name, before, count)
    }

    /// Delete columns `first..first + count` on one sheet.
    pub fn delete_columns(&mut self, sheet_index: usize, first: u32, count: u32) -> Result<()> {
        let sheet = self
            .sheets
            .get_mut(sheet_index)
            .ok_or_else(|| Error::InvalidState(format!("no sheet at index {}", sheet_index)))?;
        sheet.delete_columns(first, count)?;
        let name = sheet.name().to_string();
        self.defined_names.delete_columns(&name, first, count)
    }

    // ---- load/save plumbing ----

    pub(crate) fn from_loaded(
        sheets: Vec<Worksheet>,
        defined_names: NamedRanges,
        date_system: DateSystem,
        default_style: Arc<Style>,
        loaded: LoadedDocument,
    ) -> Self {
        let next_sheet_id = sheets.iter().map(Worksheet::sheet_id).max().unwrap_or(0) + 1;
        Self {
            sheets,
            defined_names,
            date_system,
            default_style,
            next_sheet_id,
            loaded: Some(loaded),
        }
    }

    pub(crate) fn loaded(&self) -> Option<&LoadedDocument> {
        self.loaded.as_ref()
    }

    pub(crate) fn sheets_mut(&mut self) -> &mut [Worksheet] {
        &mut self.sheets
    }

    pub(crate) fn set_loaded(&mut self, loaded: LoadedDocument) {
        self.loaded = Some(loaded);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::{Address, Range};
    use crate::value::CellValue;

    #[test]
    fn test_sheet_names_unique() {
        let mut wb = Workbook::new();
        wb.add_sheet("Data").unwrap();
        assert!(matches!(
            wb.add_sheet("data"),
            Err(Error::DuplicateName(_))
        ));
    }

    #[test]
    fn test_defined_name_table_collision() {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("Data").unwrap();
        sheet
            .add_table("Sales", Range::from_a1("A1:B3").unwrap(), false)
            .unwrap();

        assert!(matches!(
            wb.add_defined_name(NamedRange::new("sales", "Data!$A$1", None)),
            Err(Error::DuplicateName(_))
        ));
        wb.add_defined_name(NamedRange::new("Other", "Data!$A$1", None))
            .unwrap();
    }

    #[test]
    fn test_style_round_trip_dedups_fonts() {
        use crate::style::{Color, Font};

        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("S").unwrap();
        let a1 = Address::from_a1("A1").unwrap();
        let b1 = Address::from_a1("B1").unwrap();
        let c1 = Address::from_a1("C1").unwrap();

        sheet.set_cell_value(a1, 1.0);
        sheet.set_cell_value(b1, 2.0);
        sheet.set_cell_value(c1, 3.0);
        let bold_red = Font::new().with_bold(true).with_color(Color::rgb("FF0000"));
        sheet.cell(a1).modify_style(|s| s.with_font(bold_red.clone()));
        sheet.cell(b1).modify_style(|s| s.with_font(bold_red.clone()));
        sheet
            .cell(c1)
            .modify_style(|s| s.with_font(Font::new().with_italic(true)));

        let package = wb.save().unwrap();

        // Default + bold-red + italic: exactly three font records.
        let styles_xml = package.get_part("xl/styles.xml").unwrap();
        assert!(styles_xml.contains(r#"<fonts count="3">"#));

        let reloaded = Workbook::open(&package).unwrap();
        let sheet = reloaded.sheet(0).unwrap();
        let font_a = &sheet.get_cell(a1).unwrap().style().font;
        let font_b = &sheet.get_cell(b1).unwrap().style().font;
        let font_c = &sheet.get_cell(c1).unwrap().style().font;
        assert_eq!(font_a, font_b);
        assert_ne!(font_a, font_c);
        assert!(font_a.bold);
        assert!(font_c.italic);
    }

    #[test]
    fn test_shared_string_round_trip_dedup() {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("S").unwrap();
        sheet.set_cell_value(Address::from_a1("A1").unwrap(), "Hello");
        sheet.set_cell_value(Address::from_a1("A2").unwrap(), "Hello");
        sheet.set_cell_value(Address::from_a1("A3").unwrap(), "Hello ");

        let package = wb.save().unwrap();
        let strings = crate::reader::strings::parse_shared_strings(
            package.get_part("xl/sharedStrings.xml").unwrap(),
        )
        .unwrap();
        assert_eq!(strings.len(), 2);

        let reloaded = Workbook::open(&package).unwrap();
        let sheet = reloaded.sheet(0).unwrap();
        assert_eq!(
            sheet.cell_value(Address::from_a1("A2").unwrap()),
            CellValue::Text("Hello".to_string())
        );
        assert_eq!(
            sheet.cell_value(Address::from_a1("A3").unwrap()),
            CellValue::Text("Hello ".to_string())
        );
    }

    #[test]
    fn test_untouched_sheet_part_is_byte_stable() {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("S").unwrap();
        sheet.set_cell_value(Address::from_a1("A1").unwrap(), "stable");
        sheet
            .merge_cells(Range::from_a1("B2:C3").unwrap())
            .unwrap();
        let first = wb.save().unwrap();

        let mut reloaded = Workbook::open(&first).unwrap();
        let second = reloaded.save().unwrap();

        assert_eq!(
            first.get_part("xl/worksheets/sheet1.xml"),
            second.get_part("xl/worksheets/sheet1.xml")
        );
        assert_eq!(
            first.get_part("xl/styles.xml"),
            second.get_part("xl/styles.xml")
        );
        assert_eq!(
            first.get_part("xl/sharedStrings.xml"),
            second.get_part("xl/sharedStrings.xml")
        );
    }

    #[test]
    fn test_formula_and_dates_round_trip() {
        use crate::cell::{CellFormula, FormulaKind};
        use crate::style::NumberFormat;
        use chrono::NaiveDate;

        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("S").unwrap();

        let f2 = Address::from_a1("F2").unwrap();
        sheet.set_cell_formula(
            f2,
            CellFormula {
                text: "SUM(A1:A3)".to_string(),
                kind: FormulaKind::Normal,
                cached_value: CellValue::Number(6.0),
            },
        );

        let d1 = Address::from_a1("D1").unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15)
            .unwrap()
            .and_hms_opt(6, 0, 0)
            .unwrap();
        sheet.set_cell_value(d1, date);
        sheet
            .cell(d1)
            .modify_style(|s| s.with_number_format(NumberFormat::Builtin(22)));

        let package = wb.save().unwrap();
        let reloaded = Workbook::open(&package).unwrap();
        let sheet = reloaded.sheet(0).unwrap();

        let formula = sheet.get_cell(f2).unwrap().formula().unwrap().clone();
        assert_eq!(formula.text, "SUM(A1:A3)");
        assert_eq!(formula.cached_value, CellValue::Number(6.0));

        assert_eq!(sheet.cell_value(d1), CellValue::DateTime(date));
    }

    #[test]
    fn test_table_round_trip() {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("S").unwrap();
        sheet.set_cell_value(Address::from_a1("A1").unwrap(), "Region");
        sheet.set_cell_value(Address::from_a1("B1").unwrap(), "Amount");
        sheet
            .add_table("Sales", Range::from_a1("A1:B4").unwrap(), true)
            .unwrap();

        let package = wb.save().unwrap();
        assert!(package.get_part("xl/tables/table1.xml").is_some());

        let reloaded = Workbook::open(&package).unwrap();
        let table = reloaded.sheet(0).unwrap().table("Sales").unwrap();
        assert_eq!(table.range().to_a1(), "A1:B4");
        let names: Vec<&str> = table.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Region", "Amount"]);
    }

    #[test]
    fn test_corrupt_style_index_fails_load() {
        let mut wb = Workbook::new();
        wb.add_sheet("S")
            .unwrap()
            .set_cell_value(Address::from_a1("A1").unwrap(), 1.0);
        let mut package = wb.save().unwrap();

        let sheet_xml = package
            .get_part("xl/worksheets/sheet1.xml")
            .unwrap()
            .replace(r#"<c r="A1""#, r#"<c r="A1" s="99""#);
        package.insert_part("xl/worksheets/sheet1.xml", sheet_xml);

        assert!(matches!(
            Workbook::open(&package),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_insert_rows_shifts_names_tables_and_cells() {
        let mut wb = Workbook::new();
        let sheet = wb.add_sheet("Data").unwrap();
        sheet.set_cell_value(Address::from_a1("A1").unwrap(), "moved");
        sheet
            .add_table("T", Range::from_a1("A1:C5").unwrap(), false)
            .unwrap();
        wb.add_defined_name(NamedRange::new("Target", "Data!$A$10", None))
            .unwrap();

        wb.insert_rows(0, 1, 2).unwrap();

        let sheet = wb.sheet(0).unwrap();
        assert_eq!(
            sheet.cell_value(Address::from_a1("A3").unwrap()),
            CellValue::Text("moved".to_string())
        );
        assert_eq!(sheet.table("T").unwrap().range().to_a1(), "A3:C7");
        assert_eq!(
            wb.defined_names().get("Target", None).unwrap().reference_text(),
            "Data!$A$12"
        );
    }
}
