//! Worksheet part generator.
//!
//! Emits one sheet's XML from the live model using the index mappings the
//! first save pass finalized: every cell's style resolves to a cell-format
//! index and every shared text value to a string-table index.

use std::collections::BTreeSet;
use std::fmt::Write as FmtWrite;

use crate::address::Address;
use crate::cell::{Cell, CellContent, FormulaKind};
use crate::error::{Error, Result};
use crate::shared_strings::SharedStringTable;
use crate::style::StyleRegistry;
use crate::value::{CellValue, DateSystem};
use crate::worksheet::Worksheet;
use crate::xml::escape_xml;

use super::strings::{write_run, write_text_element};

/// Format a numeric cell value: integers without a trailing fraction,
/// everything else in shortest round-trip form.
pub(crate) fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        let mut buf = itoa::Buffer::new();
        buf.format(value as i64).to_string()
    } else {
        let mut buf = ryu::Buffer::new();
        buf.format(value).to_string()
    }
}

/// Generate one worksheet part.
///
/// `table_rel_ids` are the relationship ids (in table order) that the
/// sheet's `.rels` part assigns to its table parts.
pub fn worksheet_xml(
    sheet: &Worksheet,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
    table_rel_ids: &[String],
) -> Result<String> {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

    if let Some(dimension) = sheet.dimension() {
        write!(xml, r#"<dimension ref="{}"/>"#, dimension.to_a1())?;
    }

    write!(
        xml,
        r#"<sheetFormatPr defaultRowHeight="{}" defaultColWidth="{}"/>"#,
        sheet.default_row_height(),
        sheet.default_column_width()
    )?;

    write_columns(&mut xml, sheet, registry)?;
    write_sheet_data(&mut xml, sheet, registry, strings, date_system)?;

    let merges: Vec<String> = sheet.merged_ranges().iter().map(|r| r.to_a1()).collect();
    if !merges.is_empty() {
        write!(xml, r#"<mergeCells count="{}">"#, merges.len())?;
        for merge in merges {
            write!(xml, r#"<mergeCell ref="{}"/>"#, merge)?;
        }
        xml.push_str("</mergeCells>");
    }

    if !table_rel_ids.is_empty() {
        write!(xml, r#"<tableParts count="{}">"#, table_rel_ids.len())?;
        for rel_id in table_rel_ids {
            write!(xml, r#"<tablePart r:id="{}"/>"#, escape_xml(rel_id))?;
        }
        xml.push_str("</tableParts>");
    }

    xml.push_str("</worksheet>");
    Ok(xml)
}

/// Emit the `cols` section for column records with non-default settings.
fn write_columns(xml: &mut String, sheet: &Worksheet, registry: &StyleRegistry) -> Result<()> {
    let columns: Vec<_> = sheet.columns().filter(|(_, c)| !c.is_default()).collect();
    if columns.is_empty() {
        return Ok(());
    }

    xml.push_str("<cols>");
    for (&index, column) in columns {
        write!(xml, r#"<col min="{}" max="{}""#, index, index)?;
        if let Some(width) = column.width {
            write!(xml, r#" width="{}" customWidth="1""#, width)?;
        }
        if let Some(style) = column.style() {
            write!(xml, r#" style="{}""#, style_index(registry, style)?)?;
        }
        if column.hidden {
            xml.push_str(r#" hidden="1""#);
        }
        if column.outline_level > 0 {
            write!(xml, r#" outlineLevel="{}""#, column.outline_level)?;
        }
        if column.collapsed {
            xml.push_str(r#" collapsed="1""#);
        }
        xml.push_str("/>");
    }
    xml.push_str("</cols>");
    Ok(())
}

/// Emit the `sheetData` section: every row that has cells or a
/// non-default record.
fn write_sheet_data(
    xml: &mut String,
    sheet: &Worksheet,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
) -> Result<()> {
    let mut row_indices: BTreeSet<u32> = sheet.cells().map(|(a, _)| a.row()).collect();
    row_indices.extend(
        sheet
            .rows()
            .filter(|(_, r)| !r.is_default())
            .map(|(&i, _)| i),
    );

    if row_indices.is_empty() {
        xml.push_str("<sheetData/>");
        return Ok(());
    }

    xml.push_str("<sheetData>");

    // Group the row-major cell iterator by row as we sweep the indices.
    let mut cells = sheet.cells().peekable();
    for row_index in row_indices {
        let mut row_cells = Vec::new();
        while let Some((address, _)) = cells.peek() {
            if address.row() < row_index {
                cells.next();
            } else if address.row() == row_index {
                let Some((address, cell)) = cells.next() else {
                    break;
                };
                row_cells.push((*address, cell));
            } else {
                break;
            }
        }

        write_row(xml, sheet, registry, strings, date_system, row_index, &row_cells)?;
    }

    xml.push_str("</sheetData>");
    Ok(())
}

/// Emit one `row` element with its cells.
fn write_row(
    xml: &mut String,
    sheet: &Worksheet,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
    row_index: u32,
    row_cells: &[(Address, &Cell)],
) -> Result<()> {
    let mut emitted: Vec<String> = Vec::with_capacity(row_cells.len());
    for (address, cell) in row_cells {
        let mut cell_xml = String::new();
        write_cell(&mut cell_xml, *address, cell, registry, strings, date_system)?;
        if !cell_xml.is_empty() {
            emitted.push(cell_xml);
        }
    }

    let record = sheet.get_row(row_index).filter(|r| !r.is_default());
    if emitted.is_empty() && record.is_none() {
        return Ok(());
    }

    write!(xml, r#"<row r="{}""#, row_index)?;
    if let Some(record) = record {
        if let Some(height) = record.height {
            write!(xml, r#" ht="{}" customHeight="1""#, height)?;
        }
        if record.hidden {
            xml.push_str(r#" hidden="1""#);
        }
        if record.outline_level > 0 {
            write!(xml, r#" outlineLevel="{}""#, record.outline_level)?;
        }
        if record.collapsed {
            xml.push_str(r#" collapsed="1""#);
        }
        if let Some(style) = record.style() {
            write!(
                xml,
                r#" s="{}" customFormat="1""#,
                style_index(registry, style)?
            )?;
        }
    }

    if emitted.is_empty() {
        xml.push_str("/>");
        return Ok(());
    }

    xml.push('>');
    for cell_xml in emitted {
        xml.push_str(&cell_xml);
    }
    xml.push_str("</row>");
    Ok(())
}

/// Look up a style's final format index.
///
/// Every live style was interned during the first save pass, so a miss
/// here is an internal consistency failure, not a user error.
fn style_index(registry: &StyleRegistry, style: &crate::style::Style) -> Result<u32> {
    registry.index_of(style).ok_or_else(|| {
        Error::InvalidState("style was not interned before serialization".to_string())
    })
}

/// Emit one `c` element. Produces nothing for blank, default-styled
/// cells.
fn write_cell(
    xml: &mut String,
    address: Address,
    cell: &Cell,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
) -> Result<()> {
    let index = style_index(registry, cell.style())?;
    let reference = address.to_a1_with(false, false);

    let style_attr = if index != 0 {
        format!(r#" s="{}""#, index)
    } else {
        String::new()
    };

    match cell.content() {
        CellContent::Blank => {
            // A styled blank still occupies a slot; a default blank is
            // nothing at all.
            if index != 0 {
                write!(xml, r#"<c r="{}"{}/>"#, reference, style_attr)?;
            }
        },
        CellContent::Value(value) => {
            write_value_cell(xml, &reference, &style_attr, cell, value, strings, date_system)?;
        },
        CellContent::Formula(formula) => {
            write!(xml, r#"<c r="{}"{}"#, reference, style_attr)?;
            match &formula.cached_value {
                CellValue::Text(_) => xml.push_str(r#" t="str""#),
                CellValue::Boolean(_) => xml.push_str(r#" t="b""#),
                CellValue::Error(_) => xml.push_str(r#" t="e""#),
                _ => {},
            }
            xml.push('>');

            match &formula.kind {
                FormulaKind::Normal => {
                    write!(xml, "<f>{}</f>", escape_xml(&formula.text))?;
                },
                FormulaKind::Array { range } => {
                    write!(
                        xml,
                        r#"<f t="array" ref="{}">{}</f>"#,
                        range.to_a1(),
                        escape_xml(&formula.text)
                    )?;
                },
                FormulaKind::Shared { group, range } => {
                    xml.push_str(r#"<f t="shared""#);
                    if let Some(range) = range {
                        write!(xml, r#" ref="{}""#, range.to_a1())?;
                    }
                    write!(xml, r#" si="{}""#, group)?;
                    if formula.text.is_empty() {
                        xml.push_str("/>");
                    } else {
                        write!(xml, ">{}</f>", escape_xml(&formula.text))?;
                    }
                },
            }

            match &formula.cached_value {
                CellValue::Blank => {},
                CellValue::Text(text) => write!(xml, "<v>{}</v>", escape_xml(text))?,
                CellValue::Boolean(b) => {
                    write!(xml, "<v>{}</v>", if *b { "1" } else { "0" })?;
                },
                CellValue::Error(code) => write!(xml, "<v>{}</v>", code.as_str())?,
                CellValue::Number(n) => write!(xml, "<v>{}</v>", format_number(*n))?,
                value => {
                    if let Some(serial) = value.to_serial(date_system) {
                        write!(xml, "<v>{}</v>", format_number(serial))?;
                    }
                },
            }
            xml.push_str("</c>");
        },
    }

    Ok(())
}

/// Emit a literal-value cell.
fn write_value_cell(
    xml: &mut String,
    reference: &str,
    style_attr: &str,
    cell: &Cell,
    value: &CellValue,
    strings: &SharedStringTable,
    date_system: DateSystem,
) -> Result<()> {
    match value {
        CellValue::Blank => {},
        CellValue::Text(text) => {
            if cell.shares_string() {
                let index = shared_index(cell, text, strings)?;
                write!(
                    xml,
                    r#"<c r="{}"{} t="s"><v>{}</v></c>"#,
                    reference, style_attr, index
                )?;
            } else {
                write!(xml, r#"<c r="{}"{} t="inlineStr"><is>"#, reference, style_attr)?;
                match cell.rich_text() {
                    Some(rich) => {
                        for run in rich.runs() {
                            write_run(xml, run)?;
                        }
                    },
                    None => write_text_element(xml, text)?,
                }
                xml.push_str("</is></c>");
            }
        },
        CellValue::Number(n) => {
            write!(
                xml,
                r#"<c r="{}"{}><v>{}</v></c>"#,
                reference,
                style_attr,
                format_number(*n)
            )?;
        },
        CellValue::Boolean(b) => {
            write!(
                xml,
                r#"<c r="{}"{} t="b"><v>{}</v></c>"#,
                reference,
                style_attr,
                if *b { "1" } else { "0" }
            )?;
        },
        CellValue::Error(code) => {
            write!(
                xml,
                r#"<c r="{}"{} t="e"><v>{}</v></c>"#,
                reference,
                style_attr,
                code.as_str()
            )?;
        },
        CellValue::DateTime(_) | CellValue::TimeSpan(_) => {
            if let Some(serial) = value.to_serial(date_system) {
                write!(
                    xml,
                    r#"<c r="{}"{}><v>{}</v></c>"#,
                    reference,
                    style_attr,
                    format_number(serial)
                )?;
            }
        },
    }
    Ok(())
}

/// The final shared-string index for a text cell.
///
/// The table was completed during the first save pass; like styles, a
/// miss is an internal consistency failure.
fn shared_index(cell: &Cell, text: &str, strings: &SharedStringTable) -> Result<u32> {
    let item = match cell.rich_text() {
        Some(rich) => crate::shared_strings::SharedStringItem::Rich(rich.clone()),
        None => crate::shared_strings::SharedStringItem::Plain(text.to_string()),
    };
    strings.index_of(&item).ok_or_else(|| {
        Error::InvalidState("string was not interned before serialization".to_string())
    })
}
