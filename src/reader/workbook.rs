//! Parser for the `workbook.xml` part.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::value::DateSystem;
use crate::worksheet::SheetVisibility;

use super::sheet::read_text;

/// One entry of the workbook's sheet list.
#[derive(Debug, Clone)]
pub struct SheetEntry {
    pub name: String,
    pub sheet_id: u32,
    pub rel_id: Option<String>,
    pub visibility: SheetVisibility,
}

/// A defined name as stored in the file.
#[derive(Debug, Clone)]
pub struct RawDefinedName {
    pub name: String,
    pub reference: String,
    pub local_sheet_id: Option<u32>,
    pub comment: Option<String>,
    pub hidden: bool,
}

/// The workbook part's payload.
#[derive(Debug, Default)]
pub struct WorkbookMeta {
    pub sheets: Vec<SheetEntry>,
    pub defined_names: Vec<RawDefinedName>,
    pub date_system: DateSystem,
}

/// Parse `workbook.xml` content.
pub fn parse_workbook(content: &str) -> Result<WorkbookMeta> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut meta = WorkbookMeta::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"definedName" => {
                let defined = parse_defined_name(&mut reader, &e)?;
                meta.defined_names.push(defined);
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    for attr in e.attributes().flatten() {
                        if attr.key.local_name().as_ref() == b"date1904"
                            && let Some(value) = attr_value(&reader, &attr)
                            && (value == "1" || value == "true")
                        {
                            meta.date_system = DateSystem::V1904;
                        }
                    }
                },
                b"sheet" => meta.sheets.push(parse_sheet_entry(&reader, &e)?),
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML parsing error: {}", e))),
            _ => {},
        }
    }

    if meta.sheets.is_empty() {
        return Err(Error::MalformedDocument(
            "workbook has no sheets".to_string(),
        ));
    }

    Ok(meta)
}

fn attr_value(
    reader: &Reader<&[u8]>,
    attr: &quick_xml::events::attributes::Attribute,
) -> Option<String> {
    attr.decode_and_unescape_value(reader.decoder())
        .ok()
        .map(|v| v.to_string())
}

/// Parse one `<sheet>` entry.
fn parse_sheet_entry(reader: &Reader<&[u8]>, start: &BytesStart) -> Result<SheetEntry> {
    let mut name = None;
    let mut sheet_id = None;
    let mut rel_id = None;
    let mut visibility = SheetVisibility::Visible;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"name" => name = Some(value),
            b"sheetId" => sheet_id = value.parse::<u32>().ok(),
            b"id" => rel_id = Some(value),
            b"state" => {
                visibility = SheetVisibility::parse(&value).ok_or_else(|| {
                    Error::MalformedDocument(format!("unknown sheet state {:?}", value))
                })?;
            },
            _ => {},
        }
    }

    let name =
        name.ok_or_else(|| Error::MalformedDocument("sheet without a name".to_string()))?;
    let sheet_id = sheet_id
        .ok_or_else(|| Error::MalformedDocument(format!("sheet {:?} without an id", name)))?;

    Ok(SheetEntry {
        name,
        sheet_id,
        rel_id,
        visibility,
    })
}

/// Parse one `<definedName>` entry with its reference text content.
fn parse_defined_name(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<RawDefinedName> {
    let mut name = None;
    let mut local_sheet_id = None;
    let mut comment = None;
    let mut hidden = false;

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"name" => name = Some(value),
            b"localSheetId" => local_sheet_id = value.parse::<u32>().ok(),
            b"comment" => comment = Some(value),
            b"hidden" => hidden = value == "1" || value == "true",
            _ => {},
        }
    }

    let name =
        name.ok_or_else(|| Error::MalformedDocument("defined name without a name".to_string()))?;
    let reference = read_text(reader, b"definedName")?;

    Ok(RawDefinedName {
        name,
        reference,
        local_sheet_id,
        comment,
        hidden,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORKBOOK: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
<workbookPr date1904="1"/>
<sheets>
<sheet name="First" sheetId="1" r:id="rId1"/>
<sheet name="Second" sheetId="2" state="hidden" r:id="rId2"/>
</sheets>
<definedNames>
<definedName name="Target" comment="note">First!$A$10</definedName>
<definedName name="Local" localSheetId="1" hidden="1">Second!$B$2</definedName>
</definedNames>
</workbook>"#;

    #[test]
    fn test_parse_workbook() {
        let meta = parse_workbook(WORKBOOK).unwrap();
        assert_eq!(meta.date_system, DateSystem::V1904);
        assert_eq!(meta.sheets.len(), 2);
        assert_eq!(meta.sheets[0].name, "First");
        assert_eq!(meta.sheets[0].rel_id.as_deref(), Some("rId1"));
        assert_eq!(meta.sheets[1].visibility, SheetVisibility::Hidden);

        assert_eq!(meta.defined_names.len(), 2);
        assert_eq!(meta.defined_names[0].reference, "First!$A$10");
        assert_eq!(meta.defined_names[0].comment.as_deref(), Some("note"));
        assert_eq!(meta.defined_names[1].local_sheet_id, Some(1));
        assert!(meta.defined_names[1].hidden);
    }

    #[test]
    fn test_empty_workbook_is_malformed() {
        assert!(matches!(
            parse_workbook("<workbook><sheets/></workbook>"),
            Err(Error::MalformedDocument(_))
        ));
    }
}
