//! Parser for table parts (`xl/tables/tableN.xml`).

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::address::Range;
use crate::error::{Error, Result};
use crate::table::{Table, TableStyleInfo, TotalsRowFunction};

use super::sheet::read_text;

/// Parse one table part.
pub fn parse_table(content: &str) -> Result<Table> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut table: Option<Table> = None;
    let mut names: Vec<String> = Vec::new();
    let mut totals: Vec<(Option<TotalsRowFunction>, Option<String>, Option<String>)> = Vec::new();
    let mut style_info = None;

    let mut buf = Vec::with_capacity(512);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"table" => {
                table = Some(parse_table_element(&mut reader, &e)?);
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"tableColumn" => {
                let (name, function, label) = column_attrs(&mut reader, &e)?;
                let formula = read_column_formula(&mut reader)?;
                names.push(name);
                totals.push((function, label, formula));
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"tableColumn" => {
                let (name, function, label) = column_attrs(&mut reader, &e)?;
                names.push(name);
                totals.push((function, label, None));
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e))
                if e.local_name().as_ref() == b"tableStyleInfo" =>
            {
                style_info = Some(parse_style_info(&mut reader, &e));
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML parsing error: {}", e))),
            _ => {},
        }
    }

    let mut table =
        table.ok_or_else(|| Error::MalformedDocument("table part without <table>".to_string()))?;

    // The field list must line up with the table rectangle.
    table.set_field_names(names).map_err(|e| match e {
        Error::InvalidState(msg) | Error::DuplicateName(msg) => Error::MalformedDocument(msg),
        other => other,
    })?;
    for (field, (function, label, formula)) in table
        .fields()
        .iter()
        .map(|f| f.name.clone())
        .collect::<Vec<_>>()
        .into_iter()
        .zip(totals)
    {
        if function.is_none() && label.is_none() && formula.is_none() {
            continue;
        }
        if let Some(function) = function {
            table.set_totals_function(&field, function)?;
        }
        if let Some(position) = table.field_position(&field) {
            // Labels and custom formulas attach directly.
            let fields = table.fields_mut();
            fields[position].totals_row_label = label;
            fields[position].totals_row_formula = formula;
        }
    }

    if let Some(style_info) = style_info {
        table.style_info = style_info;
    }

    Ok(table)
}

/// Parse the root `<table>` element attributes.
fn parse_table_element(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Table> {
    let mut id = 1u32;
    let mut name = None;
    let mut range = None;
    let mut header_row = true;
    let mut totals_row = false;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"id" => id = value.parse().unwrap_or(1),
            b"name" => name = Some(value),
            b"displayName" => {
                if name.is_none() {
                    name = Some(value);
                }
            },
            b"ref" => {
                range = Some(Range::from_a1(&value).map_err(|e| {
                    Error::MalformedDocument(format!("bad table reference: {}", e))
                })?);
            },
            b"headerRowCount" => header_row = value != "0",
            b"totalsRowCount" => totals_row = value != "0",
            _ => {},
        }
    }

    let name =
        name.ok_or_else(|| Error::MalformedDocument("table without a name".to_string()))?;
    let range =
        range.ok_or_else(|| Error::MalformedDocument("table without a reference".to_string()))?;

    let mut table = Table::new(id, name, range, header_row).map_err(|e| match e {
        Error::InvalidState(msg) => Error::MalformedDocument(msg),
        other => other,
    })?;
    table.set_totals_row_raw(totals_row);
    Ok(table)
}

/// The name and totals attributes of one `tableColumn`.
fn column_attrs(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
) -> Result<(String, Option<TotalsRowFunction>, Option<String>)> {
    let mut name = None;
    let mut function = None;
    let mut label = None;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"name" => name = Some(value),
            b"totalsRowFunction" => function = TotalsRowFunction::parse(&value),
            b"totalsRowLabel" => label = Some(value),
            _ => {},
        }
    }

    let name = name
        .ok_or_else(|| Error::MalformedDocument("table column without a name".to_string()))?;
    Ok((name, function, label))
}

/// Read an optional `<totalsRowFormula>` child, consuming up to the
/// column's end tag.
fn read_column_formula(reader: &mut Reader<&[u8]>) -> Result<Option<String>> {
    let mut formula = None;
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"totalsRowFormula" => {
                formula = Some(read_text(reader, b"totalsRowFormula")?);
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"tableColumn" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in tableColumn: {}", e))),
            _ => {},
        }
    }
    Ok(formula)
}

/// Parse the `tableStyleInfo` element.
fn parse_style_info(reader: &mut Reader<&[u8]>, start: &BytesStart) -> TableStyleInfo {
    let mut info = TableStyleInfo {
        show_row_stripes: false,
        ..TableStyleInfo::default()
    };

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        let flag = value == "1" || value == "true";
        match attr.key.local_name().as_ref() {
            b"name" => info.name = Some(value),
            b"showFirstColumn" => info.show_first_column = flag,
            b"showLastColumn" => info.show_last_column = flag,
            b"showRowStripes" => info.show_row_stripes = flag,
            b"showColumnStripes" => info.show_column_stripes = flag,
            _ => {},
        }
    }

    info
}

fn attr_value(
    reader: &Reader<&[u8]>,
    attr: &quick_xml::events::attributes::Attribute,
) -> Option<String> {
    attr.decode_and_unescape_value(reader.decoder())
        .ok()
        .map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="2" name="Sales" displayName="Sales" ref="A1:C6" totalsRowCount="1">
<autoFilter ref="A1:C5"/>
<tableColumns count="3">
<tableColumn id="1" name="Region"/>
<tableColumn id="2" name="Units" totalsRowFunction="sum"/>
<tableColumn id="3" name="Check" totalsRowFunction="custom"><totalsRowFormula>SUM(1,2)</totalsRowFormula></tableColumn>
</tableColumns>
<tableStyleInfo name="TableStyleMedium2" showRowStripes="1"/>
</table>"#;

    #[test]
    fn test_parse_table() {
        let table = parse_table(TABLE).unwrap();
        assert_eq!(table.id(), 2);
        assert_eq!(table.name(), "Sales");
        assert_eq!(table.range().to_a1(), "A1:C6");
        assert!(table.has_header_row());
        assert!(table.has_totals_row());

        let names: Vec<&str> = table.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Region", "Units", "Check"]);
        assert_eq!(
            table.field("Units").unwrap().totals_row_function,
            Some(TotalsRowFunction::Sum)
        );
        assert_eq!(
            table.field("Check").unwrap().totals_row_formula.as_deref(),
            Some("SUM(1,2)")
        );
        assert_eq!(table.style_info.name.as_deref(), Some("TableStyleMedium2"));
    }

    #[test]
    fn test_field_count_mismatch_is_malformed() {
        let xml = r#"<table id="1" name="T" ref="A1:C5"><tableColumns count="1"><tableColumn id="1" name="Only"/></tableColumns></table>"#;
        assert!(matches!(parse_table(xml), Err(Error::MalformedDocument(_))));
    }
}
