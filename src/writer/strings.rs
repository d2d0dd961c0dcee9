//! `sharedStrings.xml` generator.

use std::fmt::Write as FmtWrite;

use crate::error::Result;
use crate::rich_text::RichTextRun;
use crate::shared_strings::{SharedStringItem, SharedStringTable};
use crate::xml::escape_xml;

/// Generate the complete `sharedStrings.xml` content.
pub fn shared_strings_xml(table: &SharedStringTable) -> Result<String> {
    let mut xml = String::with_capacity(1024 + table.len() * 32);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    write!(
        xml,
        r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{}" uniqueCount="{}">"#,
        table.len(),
        table.len()
    )?;

    for entry in table.entries() {
        xml.push_str("<si>");
        match &entry.item {
            SharedStringItem::Plain(text) => write_text_element(&mut xml, text)?,
            SharedStringItem::Rich(rich) => {
                for run in rich.runs() {
                    write_run(&mut xml, run)?;
                }
            },
        }
        for phonetic in &entry.phonetic {
            write!(xml, r#"<rPh sb="{}" eb="{}">"#, phonetic.start, phonetic.end)?;
            write_text_element(&mut xml, &phonetic.text)?;
            xml.push_str("</rPh>");
        }
        xml.push_str("</si>");
    }

    xml.push_str("</sst>");
    Ok(xml)
}

/// Write a `<t>` element, flagging space preservation when the content
/// would otherwise be trimmed by consumers.
pub(crate) fn write_text_element(xml: &mut String, text: &str) -> Result<()> {
    if needs_space_preserve(text) {
        write!(xml, r#"<t xml:space="preserve">{}</t>"#, escape_xml(text))?;
    } else {
        write!(xml, "<t>{}</t>", escape_xml(text))?;
    }
    Ok(())
}

/// Leading/trailing whitespace is semantically significant and must
/// survive the round trip.
fn needs_space_preserve(text: &str) -> bool {
    text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace)
}

/// Write one `<r>` rich-text run with its properties.
pub(crate) fn write_run(xml: &mut String, run: &RichTextRun) -> Result<()> {
    xml.push_str("<r>");

    if run.has_formatting() {
        xml.push_str("<rPr>");
        if run.bold {
            xml.push_str("<b/>");
        }
        if run.italic {
            xml.push_str("<i/>");
        }
        if run.strike {
            xml.push_str("<strike/>");
        }
        if run.underline {
            xml.push_str("<u/>");
        }
        if let Some(size) = run.font_size {
            write!(xml, r#"<sz val="{}"/>"#, size)?;
        }
        if let Some(color) = &run.color {
            super::styles::write_run_color(xml, color)?;
        }
        if let Some(name) = &run.font_name {
            write!(xml, r#"<rFont val="{}"/>"#, escape_xml(name))?;
        }
        xml.push_str("</rPr>");
    }

    write_text_element(xml, &run.text)?;
    xml.push_str("</r>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rich_text::{PhoneticRun, RichText};

    #[test]
    fn test_plain_and_preserved() {
        let mut table = SharedStringTable::new();
        table.add_plain("Hello");
        table.add_plain("Hello ");

        let xml = shared_strings_xml(&table).unwrap();
        assert!(xml.contains(r#"count="2" uniqueCount="2""#));
        assert!(xml.contains("<si><t>Hello</t></si>"));
        assert!(xml.contains(r#"<si><t xml:space="preserve">Hello </t></si>"#));
    }

    #[test]
    fn test_rich_runs() {
        let mut table = SharedStringTable::new();
        let rich: RichText = [
            RichTextRun {
                bold: true,
                ..RichTextRun::plain("Hot")
            },
            RichTextRun::plain(" cold"),
        ]
        .into_iter()
        .collect();
        table.add_rich(rich);

        let xml = shared_strings_xml(&table).unwrap();
        assert!(xml.contains("<r><rPr><b/></rPr><t>Hot</t></r>"));
        assert!(xml.contains(r#"<r><t xml:space="preserve"> cold</t></r>"#));
    }

    #[test]
    fn test_phonetic_emitted() {
        let mut table = SharedStringTable::new();
        let index = table.add_plain("東京");
        table
            .attach_phonetic(
                index,
                vec![PhoneticRun {
                    start: 0,
                    end: 2,
                    text: "トウキョウ".to_string(),
                }],
            )
            .unwrap();

        let xml = shared_strings_xml(&table).unwrap();
        assert!(xml.contains(r#"<rPh sb="0" eb="2"><t>トウキョウ</t></rPh>"#));
    }
}
