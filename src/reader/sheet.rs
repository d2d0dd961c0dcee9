//! Parser for worksheet parts (`xl/worksheets/sheetN.xml`).
//!
//! Runs strictly after the style registry and shared-string table are
//! hydrated: every cell's `s` attribute resolves against the registry and
//! every `t="s"` value against the string table, and an index either
//! table cannot satisfy aborts the load.

use std::sync::Arc;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::address::Address;
use crate::cell::{CellContent, CellFormula, FormulaKind};
use crate::error::{Error, Result};
use crate::rich_text::{RichText, RichTextRun};
use crate::shared_strings::{SharedStringItem, SharedStringTable};
use crate::style::{Style, StyleRegistry};
use crate::value::{CellValue, DateSystem, serial_to_datetime, serial_to_timespan};
use crate::worksheet::Worksheet;
use crate::xml::unescape_xml;

use super::styles::parse_color;

/// Everything parsed out of one worksheet part.
pub struct ParsedSheet {
    pub worksheet: Worksheet,
    /// Relationship ids referenced by `<tablePart>` elements
    pub table_rel_ids: Vec<String>,
}

/// Parse one worksheet part.
pub fn parse_worksheet(
    content: &str,
    name: &str,
    sheet_id: u32,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
    default_style: Arc<Style>,
) -> Result<ParsedSheet> {
    // No text trimming: inline-string whitespace is significant.
    let mut reader = Reader::from_str(content);

    let mut worksheet = Worksheet::new(name, sheet_id, default_style);
    let mut table_rel_ids = Vec::new();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"sheetFormatPr" =>
            {
                for attr in e.attributes().flatten() {
                    let Some(value) = attr_value(&reader, &attr) else {
                        continue;
                    };
                    match attr.key.local_name().as_ref() {
                        b"defaultRowHeight" => {
                            if let Ok(height) = fast_float2::parse::<f64, _>(&value) {
                                worksheet.set_default_row_height(height);
                            }
                        },
                        b"defaultColWidth" => {
                            if let Ok(width) = fast_float2::parse::<f64, _>(&value) {
                                worksheet.set_default_column_width(width);
                            }
                        },
                        _ => {},
                    }
                }
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"cols" => {
                parse_columns(&mut reader, &mut worksheet, registry)?;
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"sheetData" => {
                parse_sheet_data(&mut reader, &mut worksheet, registry, strings, date_system)?;
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"mergeCells" => {
                parse_merge_cells(&mut reader, &mut worksheet)?;
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"tablePart" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"id"
                        && let Some(value) = attr_value(&reader, &attr)
                    {
                        table_rel_ids.push(value);
                    }
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML parsing error: {}", e))),
            _ => {},
        }
    }

    Ok(ParsedSheet {
        worksheet,
        table_rel_ids,
    })
}

fn attr_value(
    reader: &Reader<&[u8]>,
    attr: &quick_xml::events::attributes::Attribute,
) -> Option<String> {
    attr.decode_and_unescape_value(reader.decoder())
        .ok()
        .map(|v| v.to_string())
}

fn attr_bool(value: &str) -> bool {
    value == "1" || value == "true"
}

/// Parse the `cols` section into column records.
fn parse_columns(
    reader: &mut Reader<&[u8]>,
    worksheet: &mut Worksheet,
    registry: &StyleRegistry,
) -> Result<()> {
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"col" => {
                let mut min = None;
                let mut max = None;
                let mut width = None;
                let mut style = None;
                let mut hidden = false;
                let mut outline_level = 0u8;
                let mut collapsed = false;

                for attr in e.attributes().flatten() {
                    let Some(value) = attr_value(reader, &attr) else {
                        continue;
                    };
                    match attr.key.local_name().as_ref() {
                        b"min" => min = value.parse::<u32>().ok(),
                        b"max" => max = value.parse::<u32>().ok(),
                        b"width" => width = fast_float2::parse::<f64, _>(&value).ok(),
                        b"style" => style = value.parse::<u32>().ok(),
                        b"hidden" => hidden = attr_bool(&value),
                        b"outlineLevel" => outline_level = value.parse().unwrap_or(0),
                        b"collapsed" => collapsed = attr_bool(&value),
                        _ => {},
                    }
                }

                let (Some(min), Some(max)) = (min, max) else {
                    continue;
                };
                let style = match style {
                    Some(index) => Some(Arc::clone(registry.style_for_index(index)?)),
                    None => None,
                };
                for index in min..=max.min(crate::address::MAX_COLUMNS) {
                    let column = worksheet.column(index)?;
                    if let Some(width) = width {
                        column.set_width(width);
                    }
                    column.hidden = hidden;
                    column.outline_level = outline_level;
                    column.collapsed = collapsed;
                    if let Some(style) = &style {
                        column.set_style(Arc::clone(style));
                    }
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"cols" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in cols: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse the `sheetData` section: rows and their cells.
fn parse_sheet_data(
    reader: &mut Reader<&[u8]>,
    worksheet: &mut Worksheet,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
) -> Result<()> {
    let mut buf = Vec::with_capacity(1024);
    let mut next_row = 1u32;

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"row" => {
                next_row = parse_row(reader, &e, worksheet, registry, strings, date_system, next_row, false)?;
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"row" => {
                next_row = parse_row(reader, &e, worksheet, registry, strings, date_system, next_row, true)?;
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"sheetData" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in sheetData: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse one `row` element and its cells. Returns the next implicit row
/// index.
#[allow(clippy::too_many_arguments)]
fn parse_row(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    worksheet: &mut Worksheet,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
    next_row: u32,
    empty: bool,
) -> Result<u32> {
    let mut row_index = next_row;
    let mut height = None;
    let mut custom_height = false;
    let mut hidden = false;
    let mut outline_level = 0u8;
    let mut collapsed = false;
    let mut style_index = None;
    let mut custom_format = false;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"r" => {
                row_index = atoi_simd::parse::<_, false, false>(value.as_bytes())
                    .map_err(|_| Error::MalformedDocument(format!("bad row index {:?}", value)))?;
            },
            b"ht" => height = fast_float2::parse::<f64, _>(&value).ok(),
            b"customHeight" => custom_height = attr_bool(&value),
            b"hidden" => hidden = attr_bool(&value),
            b"outlineLevel" => outline_level = value.parse().unwrap_or(0),
            b"collapsed" => collapsed = attr_bool(&value),
            b"s" => style_index = value.parse::<u32>().ok(),
            b"customFormat" => custom_format = attr_bool(&value),
            _ => {},
        }
    }

    let needs_record = height.is_some()
        || hidden
        || outline_level != 0
        || collapsed
        || (custom_format && style_index.is_some());
    if needs_record {
        let style = match style_index {
            Some(index) if custom_format => Some(Arc::clone(registry.style_for_index(index)?)),
            _ => None,
        };
        let record = worksheet.row(row_index)?;
        if let (Some(height), true) = (height, custom_height) {
            record.set_height(height);
        }
        record.hidden = hidden;
        record.outline_level = outline_level;
        record.collapsed = collapsed;
        if let Some(style) = style {
            record.set_style(style);
        }
    }

    if !empty {
        let mut next_col = 1u32;
        let mut buf = Vec::with_capacity(512);
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"c" => {
                    next_col =
                        parse_cell(reader, &e, worksheet, registry, strings, date_system, row_index, next_col, false)?;
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"c" => {
                    next_col =
                        parse_cell(reader, &e, worksheet, registry, strings, date_system, row_index, next_col, true)?;
                },
                Ok(Event::End(e)) if e.local_name().as_ref() == b"row" => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("XML error in row: {}", e))),
                _ => {},
            }
        }
    }

    Ok(row_index + 1)
}

/// The content of one `<c>` element before typing.
#[derive(Default)]
struct RawCell {
    value_text: Option<String>,
    formula: Option<RawFormula>,
    inline: Option<SharedStringItem>,
}

struct RawFormula {
    text: String,
    kind: FormulaKind,
}

/// Parse one `c` (cell) element. Returns the next implicit column index.
#[allow(clippy::too_many_arguments)]
fn parse_cell(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    worksheet: &mut Worksheet,
    registry: &StyleRegistry,
    strings: &SharedStringTable,
    date_system: DateSystem,
    row_index: u32,
    next_col: u32,
    empty: bool,
) -> Result<u32> {
    let mut address = None;
    let mut style_index = None;
    let mut data_type: Option<String> = None;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"r" => {
                address = Some(
                    Address::from_a1(&value)
                        .map_err(|e| Error::MalformedDocument(format!("bad cell reference: {}", e)))?,
                );
            },
            b"s" => style_index = value.parse::<u32>().ok(),
            b"t" => data_type = Some(value),
            _ => {},
        }
    }

    let address = match address {
        Some(address) => address,
        None => Address::new(row_index, next_col)?,
    };

    let mut raw = RawCell::default();
    if !empty {
        let mut buf = Vec::with_capacity(256);
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => match e.local_name().as_ref() {
                    b"v" => raw.value_text = Some(read_text(reader, b"v")?),
                    b"f" => raw.formula = Some(parse_formula(reader, &e, false)?),
                    b"is" => raw.inline = Some(parse_inline_string(reader)?),
                    _ => {},
                },
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"f" => {
                    raw.formula = Some(parse_formula(reader, &e, true)?);
                },
                Ok(Event::End(e)) if e.local_name().as_ref() == b"c" => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("XML error in cell: {}", e))),
                _ => {},
            }
        }
    }

    // Resolve the style before touching the cell so a bad index aborts
    // without materializing anything.
    let style = match style_index {
        Some(index) => Some(Arc::clone(registry.style_for_index(index)?)),
        None => None,
    };

    let style_for_typing = style
        .clone()
        .unwrap_or_else(|| Arc::clone(worksheet.default_style()));
    let (content, rich) = typed_content(&raw, data_type.as_deref(), strings, date_system, &style_for_typing)?;

    // An entirely empty record carries no information worth a cell.
    if style.is_none() && matches!(content, CellContent::Blank) {
        return Ok(address.column() + 1);
    }

    let cell = worksheet.cell(address);
    if let Some(style) = style {
        cell.set_style(style);
    }
    cell.set_content(content);
    cell.set_rich_text_raw(rich);
    if matches!(data_type.as_deref(), Some("inlineStr")) {
        cell.set_share_string(false);
    }

    Ok(address.column() + 1)
}

/// Decide the typed content of a cell from its raw pieces.
fn typed_content(
    raw: &RawCell,
    data_type: Option<&str>,
    strings: &SharedStringTable,
    date_system: DateSystem,
    style: &Style,
) -> Result<(CellContent, Option<RichText>)> {
    // A formula wins over a literal: the <v> is its cached result.
    if let Some(formula) = &raw.formula {
        let cached_value = match raw.value_text.as_deref() {
            Some(text) => plain_value(text, data_type, date_system, style)?,
            None => CellValue::Blank,
        };
        return Ok((
            CellContent::Formula(CellFormula {
                text: formula.text.clone(),
                kind: formula.kind.clone(),
                cached_value,
            }),
            None,
        ));
    }

    match data_type {
        Some("s") => {
            let index: u32 = raw
                .value_text
                .as_deref()
                .and_then(|v| atoi_simd::parse::<_, false, false>(v.as_bytes()).ok())
                .ok_or_else(|| {
                    Error::MalformedDocument("shared string cell without an index".to_string())
                })?;
            match &strings.resolve(index)?.item {
                SharedStringItem::Plain(text) => {
                    Ok((CellContent::Value(CellValue::Text(text.clone())), None))
                },
                SharedStringItem::Rich(rich) => Ok((
                    CellContent::Value(CellValue::Text(rich.plain_text())),
                    Some(rich.clone()),
                )),
            }
        },
        Some("inlineStr") => match &raw.inline {
            Some(SharedStringItem::Plain(text)) => {
                Ok((CellContent::Value(CellValue::Text(text.clone())), None))
            },
            Some(SharedStringItem::Rich(rich)) => Ok((
                CellContent::Value(CellValue::Text(rich.plain_text())),
                Some(rich.clone()),
            )),
            None => Ok((CellContent::Blank, None)),
        },
        _ => match raw.value_text.as_deref() {
            Some(text) => Ok((
                CellContent::Value(plain_value(text, data_type, date_system, style)?),
                None,
            )),
            None => Ok((CellContent::Blank, None)),
        },
    }
}

/// Type a `<v>` payload using the explicit `t` attribute, falling back to
/// the cell's number format for date/duration detection.
fn plain_value(
    text: &str,
    data_type: Option<&str>,
    date_system: DateSystem,
    style: &Style,
) -> Result<CellValue> {
    match data_type {
        Some("b") => match text {
            "1" => Ok(CellValue::Boolean(true)),
            "0" => Ok(CellValue::Boolean(false)),
            other => Err(Error::MalformedDocument(format!(
                "invalid boolean cell value {:?}",
                other
            ))),
        },
        Some("e") => match crate::value::CellError::parse(text) {
            Some(code) => Ok(CellValue::Error(code)),
            None => Err(Error::MalformedDocument(format!(
                "invalid error cell value {:?}",
                text
            ))),
        },
        Some("str") => Ok(CellValue::Text(text.to_string())),
        // "n", "d", or untyped numeric content.
        _ => {
            let number: f64 = fast_float2::parse(text).map_err(|_| {
                Error::MalformedDocument(format!("invalid numeric cell value {:?}", text))
            })?;
            if style.number_format.is_duration_format() {
                Ok(CellValue::TimeSpan(serial_to_timespan(number)))
            } else if style.number_format.is_date_format() {
                Ok(CellValue::DateTime(serial_to_datetime(number, date_system)?))
            } else {
                Ok(CellValue::Number(number))
            }
        },
    }
}

/// Parse an `<f>` element into formula text and grouping.
fn parse_formula(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    empty: bool,
) -> Result<RawFormula> {
    let mut formula_type = None;
    let mut group = None;
    let mut range = None;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"t" => formula_type = Some(value),
            b"si" => group = value.parse::<u32>().ok(),
            b"ref" => range = crate::address::Range::from_a1(&value).ok(),
            _ => {},
        }
    }

    let text = if empty {
        String::new()
    } else {
        read_text(reader, b"f")?
    };

    let kind = match formula_type.as_deref() {
        Some("array") => match range {
            Some(range) => FormulaKind::Array { range },
            None => FormulaKind::Normal,
        },
        Some("shared") => match group {
            Some(group) => FormulaKind::Shared { group, range },
            None => FormulaKind::Normal,
        },
        _ => FormulaKind::Normal,
    };

    Ok(RawFormula { text, kind })
}

/// Parse an `<is>` inline string (plain or rich).
fn parse_inline_string(reader: &mut Reader<&[u8]>) -> Result<SharedStringItem> {
    let mut plain: Option<String> = None;
    let mut runs = RichText::new();

    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => plain = Some(read_text(reader, b"t")?),
                b"r" => runs.push(parse_inline_run(reader)?),
                _ => {},
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"t" => {
                plain = Some(String::new());
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"is" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in inline string: {}", e))),
            _ => {},
        }
    }

    if runs.is_empty() {
        Ok(SharedStringItem::Plain(plain.unwrap_or_default()))
    } else {
        Ok(SharedStringItem::Rich(runs))
    }
}

/// Parse one `<r>` run inside an inline string.
fn parse_inline_run(reader: &mut Reader<&[u8]>) -> Result<RichTextRun> {
    let mut run = RichTextRun::default();

    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"t" => run.text = read_text(reader, b"t")?,
                b"rFont" => {
                    run.font_name = val_attr(reader, &e);
                },
                b"sz" => {
                    run.font_size = val_attr(reader, &e)
                        .and_then(|v| fast_float2::parse(&v).ok())
                        .and_then(|v: f64| ordered_float::NotNan::new(v).ok());
                },
                b"b" => run.bold = true,
                b"i" => run.italic = true,
                b"u" => run.underline = true,
                b"strike" => run.strike = true,
                b"color" => run.color = parse_color(reader, &e),
                _ => {},
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"r" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in run: {}", e))),
            _ => {},
        }
    }

    Ok(run)
}

/// Parse the `mergeCells` section.
///
/// Overlapping merges in a file are a structural inconsistency, reported
/// as [`Error::MalformedDocument`].
fn parse_merge_cells(reader: &mut Reader<&[u8]>, worksheet: &mut Worksheet) -> Result<()> {
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"mergeCell" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"ref"
                        && let Some(value) = attr_value(reader, &attr)
                    {
                        let range = crate::address::Range::from_a1(&value).map_err(|e| {
                            Error::MalformedDocument(format!("bad merge reference: {}", e))
                        })?;
                        worksheet.merge_cells(range).map_err(|e| match e {
                            Error::Overlap { new, existing } => Error::MalformedDocument(format!(
                                "overlapping merged ranges {} and {}",
                                new, existing
                            )),
                            other => other,
                        })?;
                    }
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"mergeCells" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in mergeCells: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Collect the text content of an element up to its end tag.
pub(crate) fn read_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => {
                let raw = std::str::from_utf8(t.as_ref())
                    .map_err(|e| Error::Xml(format!("invalid UTF-8 in text content: {}", e)))?;
                text.push_str(&unescape_xml(raw));
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == end => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in text: {}", e))),
            _ => {},
        }
    }
    Ok(text)
}

fn val_attr(reader: &Reader<&[u8]>, start: &BytesStart) -> Option<String> {
    for attr in start.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"val" {
            return attr
                .decode_and_unescape_value(reader.decoder())
                .ok()
                .map(|v| v.to_string());
        }
    }
    None
}
