//! `workbook.xml` generator and its relationships part.

use std::fmt::Write as FmtWrite;

use crate::error::Result;
use crate::named_range::NamedRanges;
use crate::value::DateSystem;
use crate::worksheet::{SheetVisibility, Worksheet};
use crate::xml::escape_xml;

/// Generate `workbook.xml`.
///
/// `sheet_rel_ids` carries, per sheet in workbook order, the relationship
/// id assigned to that sheet's part in the workbook `.rels`.
pub fn workbook_xml(
    sheets: &[Worksheet],
    sheet_rel_ids: &[String],
    defined_names: &NamedRanges,
    date_system: DateSystem,
) -> Result<String> {
    let mut xml = String::with_capacity(1024);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#);

    if date_system == DateSystem::V1904 {
        xml.push_str(r#"<workbookPr date1904="1"/>"#);
    } else {
        xml.push_str("<workbookPr/>");
    }

    xml.push_str("<sheets>");
    for (sheet, rel_id) in sheets.iter().zip(sheet_rel_ids) {
        write!(
            xml,
            r#"<sheet name="{}" sheetId="{}""#,
            escape_xml(sheet.name()),
            sheet.sheet_id()
        )?;
        if sheet.visibility() != SheetVisibility::Visible {
            write!(xml, r#" state="{}""#, sheet.visibility().as_str())?;
        }
        write!(xml, r#" r:id="{}"/>"#, escape_xml(rel_id))?;
    }
    xml.push_str("</sheets>");

    if !defined_names.is_empty() {
        xml.push_str("<definedNames>");
        for named in defined_names.iter() {
            write!(xml, r#"<definedName name="{}""#, escape_xml(&named.name))?;
            if let Some(scope) = named.scope {
                write!(xml, r#" localSheetId="{}""#, scope)?;
            }
            if let Some(comment) = &named.comment {
                write!(xml, r#" comment="{}""#, escape_xml(comment))?;
            }
            if named.hidden {
                xml.push_str(r#" hidden="1""#);
            }
            write!(xml, ">{}</definedName>", escape_xml(&named.reference_text()))?;
        }
        xml.push_str("</definedNames>");
    }

    xml.push_str("</workbook>");
    Ok(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::named_range::NamedRange;
    use crate::style::Style;

    #[test]
    fn test_workbook_xml() {
        let mut hidden = Worksheet::new("Back", 2, Style::default_style());
        hidden.set_visibility(SheetVisibility::Hidden);
        let sheets = vec![
            Worksheet::new("Front", 1, Style::default_style()),
            hidden,
        ];
        let rel_ids = vec!["rId1".to_string(), "rId2".to_string()];

        let mut names = NamedRanges::new();
        names
            .add(NamedRange::new("Target", "Front!$A$10", None))
            .unwrap();

        let xml = workbook_xml(&sheets, &rel_ids, &names, DateSystem::V1900).unwrap();
        assert!(xml.contains(r#"<sheet name="Front" sheetId="1" r:id="rId1"/>"#));
        assert!(xml.contains(r#"<sheet name="Back" sheetId="2" state="hidden" r:id="rId2"/>"#));
        assert!(xml.contains(r#"<definedName name="Target">Front!$A$10</definedName>"#));

        let meta = crate::reader::workbook::parse_workbook(&xml).unwrap();
        assert_eq!(meta.sheets.len(), 2);
        assert_eq!(meta.defined_names[0].reference, "Front!$A$10");
    }
}
