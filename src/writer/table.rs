//! Table part generator.

use std::fmt::Write as FmtWrite;

use crate::address::{Address, Range};
use crate::error::Result;
use crate::table::Table;
use crate::xml::escape_xml;

/// Generate one table part.
pub fn table_xml(table: &Table) -> Result<String> {
    let mut xml = String::with_capacity(512);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<table xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" id="{}" name="{}" displayName="{}" ref="{}""#,
        table.id(),
        escape_xml(table.name()),
        escape_xml(table.name()),
        table.range().to_a1()
    )?;
    if !table.has_header_row() {
        xml.push_str(r#" headerRowCount="0""#);
    }
    if table.has_totals_row() {
        xml.push_str(r#" totalsRowCount="1""#);
    }
    xml.push('>');

    // The filter strip covers the header and data rows, never the totals.
    if table.has_header_row() {
        let filter_last = table.range().last().row() - u32::from(table.has_totals_row());
        let filter = Range::new(
            table.range().first(),
            Address::new(filter_last, table.range().last().column())?,
        );
        write!(xml, r#"<autoFilter ref="{}"/>"#, filter.to_a1())?;
    }

    write!(xml, r#"<tableColumns count="{}">"#, table.fields().len())?;
    for field in table.fields() {
        write!(
            xml,
            r#"<tableColumn id="{}" name="{}""#,
            field.id,
            escape_xml(&field.name)
        )?;
        if let Some(function) = field.totals_row_function {
            write!(xml, r#" totalsRowFunction="{}""#, function.as_str())?;
        }
        if let Some(label) = &field.totals_row_label {
            write!(xml, r#" totalsRowLabel="{}""#, escape_xml(label))?;
        }

        // Custom totals carry their formula as a child element.
        match table.totals_formula(field) {
            Some(formula)
                if field.totals_row_function
                    == Some(crate::table::TotalsRowFunction::Custom) =>
            {
                write!(
                    xml,
                    "><totalsRowFormula>{}</totalsRowFormula></tableColumn>",
                    escape_xml(&formula)
                )?;
            },
            _ => xml.push_str("/>"),
        }
    }
    xml.push_str("</tableColumns>");

    let info = &table.style_info;
    xml.push_str("<tableStyleInfo");
    if let Some(name) = &info.name {
        write!(xml, r#" name="{}""#, escape_xml(name))?;
    }
    write!(
        xml,
        r#" showFirstColumn="{}" showLastColumn="{}" showRowStripes="{}" showColumnStripes="{}"/>"#,
        u8::from(info.show_first_column),
        u8::from(info.show_last_column),
        u8::from(info.show_row_stripes),
        u8::from(info.show_column_stripes)
    )?;

    xml.push_str("</table>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TotalsRowFunction;

    #[test]
    fn test_table_xml_round_trip_shape() {
        let mut table = Table::new(3, "Sales", Range::from_a1("A1:C5").unwrap(), true).unwrap();
        table.rename_field("Column2", "Units").unwrap();
        table.set_totals_row(true).unwrap();
        table
            .set_totals_function("Units", TotalsRowFunction::Sum)
            .unwrap();

        let xml = table_xml(&table).unwrap();
        assert!(xml.contains(r#"id="3" name="Sales" displayName="Sales" ref="A1:C6""#));
        assert!(xml.contains(r#"totalsRowCount="1""#));
        assert!(xml.contains(r#"<autoFilter ref="A1:C5"/>"#));
        assert!(xml.contains(r#"<tableColumn id="2" name="Units" totalsRowFunction="sum"/>"#));

        let parsed = crate::reader::table::parse_table(&xml).unwrap();
        assert_eq!(parsed.name(), "Sales");
        assert_eq!(parsed.fields().len(), 3);
        assert!(parsed.has_totals_row());
        assert_eq!(
            parsed.field("Units").unwrap().totals_row_function,
            Some(TotalsRowFunction::Sum)
        );
    }
}
