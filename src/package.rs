//! The package boundary: named XML parts.
//!
//! The document model does not touch the physical ZIP container. It
//! consumes and produces a [`Package`]: an ordered map from part name
//! (e.g. `xl/styles.xml`) to XML text. Relationship parts are plain parts
//! here too, with just enough parsing to link worksheets to their table
//! parts.

use std::collections::BTreeMap;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{Error, Result};

/// Well-known part names.
pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const STYLES_PART: &str = "xl/styles.xml";
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";

/// Relationship type URIs.
pub const REL_TYPE_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
pub const REL_TYPE_STYLES: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
pub const REL_TYPE_SHARED_STRINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings";
pub const REL_TYPE_TABLE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/table";

/// An ordered collection of named XML parts.
#[derive(Debug, Clone, Default)]
pub struct Package {
    parts: BTreeMap<String, String>,
}

impl Package {
    /// Create an empty package.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) a part.
    pub fn insert_part(&mut self, name: impl Into<String>, xml: impl Into<String>) {
        self.parts.insert(name.into(), xml.into());
    }

    /// The XML text of a part, if present.
    pub fn get_part(&self, name: &str) -> Option<&str> {
        self.parts.get(name).map(String::as_str)
    }

    /// The XML text of a required part.
    pub fn part(&self, name: &str) -> Result<&str> {
        self.parts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| Error::PartNotFound(name.to_string()))
    }

    /// Remove a part, returning its text.
    pub fn remove_part(&mut self, name: &str) -> Option<String> {
        self.parts.remove(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.parts.contains_key(name)
    }

    /// Part names in sorted order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl FromIterator<(String, String)> for Package {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            parts: iter.into_iter().collect(),
        }
    }
}

/// One relationship entry of a `.rels` part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    /// Target path, relative to the source part's directory
    pub target: String,
}

/// The relationships of one source part.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut entries = Vec::new();
        let mut buf = Vec::with_capacity(256);
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.local_name().as_ref() == b"Relationship" =>
                {
                    let mut id = None;
                    let mut rel_type = None;
                    let mut target = None;
                    for attr in e.attributes().flatten() {
                        let value = match attr.decode_and_unescape_value(reader.decoder()) {
                            Ok(value) => value.to_string(),
                            Err(_) => continue,
                        };
                        match attr.key.local_name().as_ref() {
                            b"Id" => id = Some(value),
                            b"Type" => rel_type = Some(value),
                            b"Target" => target = Some(value),
                            _ => {},
                        }
                    }
                    if let (Some(id), Some(rel_type), Some(target)) = (id, rel_type, target) {
                        entries.push(Relationship {
                            id,
                            rel_type,
                            target,
                        });
                    }
                },
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("XML error in relationships: {}", e))),
                _ => {},
            }
        }

        Ok(Self { entries })
    }

    /// Serialize back to a `.rels` part.
    pub fn to_xml(&self) -> String {
        let mut xml = String::with_capacity(256 + self.entries.len() * 128);
        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(
            r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for rel in &self.entries {
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                crate::xml::escape_xml(&rel.id),
                crate::xml::escape_xml(&rel.rel_type),
                crate::xml::escape_xml(&rel.target)
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    /// Add an entry, returning its id.
    pub fn add(&mut self, rel_type: impl Into<String>, target: impl Into<String>) -> String {
        let id = format!("rId{}", self.entries.len() + 1);
        self.entries.push(Relationship {
            id: id.clone(),
            rel_type: rel_type.into(),
            target: target.into(),
        });
        id
    }

    /// Look up an entry by its id.
    pub fn by_id(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// All entries of the given type.
    pub fn of_type<'a>(&'a self, rel_type: &'a str) -> impl Iterator<Item = &'a Relationship> {
        self.entries.iter().filter(move |r| r.rel_type == rel_type)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The `.rels` part name for a part (`xl/workbook.xml` ->
/// `xl/_rels/workbook.xml.rels`).
pub fn rels_part_name(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against its source part's directory,
/// collapsing `..` segments (`xl/worksheets` + `../tables/table1.xml` ->
/// `xl/tables/table1.xml`).
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "." | "" => {},
            ".." => {
                segments.pop();
            },
            other => segments.push(other),
        }
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rels_round_trip() {
        let mut rels = Relationships::default();
        let id = rels.add(REL_TYPE_TABLE, "../tables/table1.xml");
        assert_eq!(id, "rId1");

        let parsed = Relationships::parse(&rels.to_xml()).unwrap();
        let rel = parsed.by_id("rId1").unwrap();
        assert_eq!(rel.rel_type, REL_TYPE_TABLE);
        assert_eq!(rel.target, "../tables/table1.xml");
    }

    #[test]
    fn test_rels_part_name() {
        assert_eq!(
            rels_part_name("xl/workbook.xml"),
            "xl/_rels/workbook.xml.rels"
        );
        assert_eq!(
            rels_part_name("xl/worksheets/sheet1.xml"),
            "xl/worksheets/_rels/sheet1.xml.rels"
        );
    }

    #[test]
    fn test_resolve_target() {
        assert_eq!(
            resolve_target("xl/worksheets/sheet1.xml", "../tables/table1.xml"),
            "xl/tables/table1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "worksheets/sheet1.xml"),
            "xl/worksheets/sheet1.xml"
        );
        assert_eq!(
            resolve_target("xl/workbook.xml", "/xl/styles.xml"),
            "xl/styles.xml"
        );
    }

    #[test]
    fn test_missing_part_is_an_error() {
        let package = Package::new();
        assert!(matches!(
            package.part("xl/styles.xml"),
            Err(Error::PartNotFound(_))
        ));
    }
}
