//! Parser for the `sharedStrings.xml` part.
//!
//! Text is taken exactly as stored, with no trimming, so entries that differ
//! only in surrounding whitespace stay distinct, and `xml:space` handling
//! is left to the XML layer's unescaping.

use ordered_float::NotNan;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::rich_text::{PhoneticRun, RichText, RichTextRun};
use crate::shared_strings::{SharedStringItem, SharedStringTable};

use super::styles::parse_color;

/// Parse `sharedStrings.xml` content.
///
/// Entries are appended in file order; the table they build serves index
/// lookups during the worksheet pass and seeds the save-side builder on
/// round trips.
pub fn parse_shared_strings(content: &str) -> Result<SharedStringTable> {
    let mut reader = Reader::from_str(content);

    let mut table = SharedStringTable::new();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"si" => {
                let (item, phonetic) = parse_string_item(&mut reader)?;
                let index = table.add(item);
                if !phonetic.is_empty() {
                    table.attach_phonetic(index, phonetic)?;
                }
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in sharedStrings: {}", e))),
            _ => {},
        }
    }

    Ok(table)
}

/// Parse one `<si>` entry: a plain `<t>`, or a run list, plus phonetic
/// runs.
fn parse_string_item(reader: &mut Reader<&[u8]>) -> Result<(SharedStringItem, Vec<PhoneticRun>)> {
    let mut plain: Option<String> = None;
    let mut runs = RichText::new();
    let mut phonetic = Vec::new();

    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"t" => plain = Some(read_text(reader, b"t")?),
                b"r" => runs.push(parse_run(reader)?),
                b"rPh" => {
                    if let Some(run) = parse_phonetic_run(reader, &e)? {
                        phonetic.push(run);
                    }
                },
                _ => {},
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"t" => {
                plain = Some(String::new());
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"si" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in si: {}", e))),
            _ => {},
        }
    }

    let item = if runs.is_empty() {
        SharedStringItem::Plain(plain.unwrap_or_default())
    } else {
        SharedStringItem::Rich(runs)
    };
    Ok((item, phonetic))
}

/// Collect the text content of an element up to its end tag.
fn read_text(reader: &mut Reader<&[u8]>, end: &[u8]) -> Result<String> {
    let mut text = String::new();
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Text(t)) => {
                let raw = std::str::from_utf8(t.as_ref())
                    .map_err(|e| Error::Xml(format!("invalid UTF-8 in text content: {}", e)))?;
                text.push_str(&crate::xml::unescape_xml(raw));
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == end => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in text: {}", e))),
            _ => {},
        }
    }
    Ok(text)
}

/// Parse one `<r>` rich-text run.
fn parse_run(reader: &mut Reader<&[u8]>) -> Result<RichTextRun> {
    let mut run = RichTextRun::default();

    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"t" => run.text = read_text(reader, b"t")?,
                b"rFont" => run.font_name = val_attr(reader, &e),
                b"sz" => {
                    run.font_size = val_attr(reader, &e)
                        .and_then(|v| fast_float2::parse(&v).ok())
                        .and_then(|v: f64| NotNan::new(v).ok());
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
            Err(e) => return Err(Error::Xml(format!("XML error in rich run: {}", e))),
            _ => {},
        }
    }

    Ok(run)
}

/// Parse one `<rPh sb=".." eb=".."><t>..</t></rPh>` phonetic run.
fn parse_phonetic_run(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
) -> Result<Option<PhoneticRun>> {
    let mut sb = None;
    let mut eb = None;
    for attr in start.attributes().flatten() {
        if let Ok(value) = attr.decode_and_unescape_value(reader.decoder()) {
            match attr.key.local_name().as_ref() {
                b"sb" => sb = value.parse::<u32>().ok(),
                b"eb" => eb = value.parse::<u32>().ok(),
                _ => {},
            }
        }
    }

    let mut text = String::new();
    let mut buf = Vec::with_capacity(64);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"t" => {
                text = read_text(reader, b"t")?;
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"rPh" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in rPh: {}", e))),
            _ => {},
        }
    }

    match (sb, eb) {
        (Some(start), Some(end)) => Ok(Some(PhoneticRun { start, end, text })),
        _ => Ok(None),
    }
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_strings_preserve_whitespace() {
        let xml = r#"<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="2" uniqueCount="2">
<si><t>Hello</t></si>
<si><t xml:space="preserve">Hello </t></si>
</sst>"#;
        let table = parse_shared_strings(xml).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.resolve(0).unwrap().item.plain_text(), "Hello");
        assert_eq!(table.resolve(1).unwrap().item.plain_text(), "Hello ");
    }

    #[test]
    fn test_rich_text_runs() {
        let xml = r#"<sst><si><r><rPr><b/><sz val="12"/></rPr><t>Hot</t></r><r><t xml:space="preserve"> cold</t></r></si></sst>"#;
        let table = parse_shared_strings(xml).unwrap();
        match &table.resolve(0).unwrap().item {
            SharedStringItem::Rich(rich) => {
                assert_eq!(rich.runs().len(), 2);
                assert!(rich.runs()[0].bold);
                assert_eq!(rich.runs()[0].text, "Hot");
                assert_eq!(rich.runs()[1].text, " cold");
                assert_eq!(rich.plain_text(), "Hot cold");
            },
            other => panic!("expected rich text, got {:?}", other),
        }
    }

    #[test]
    fn test_phonetic_runs_attached() {
        let xml = r#"<sst><si><t>東京</t><rPh sb="0" eb="2"><t>トウキョウ</t></rPh><phoneticPr fontId="1"/></si></sst>"#;
        let table = parse_shared_strings(xml).unwrap();
        let entry = table.resolve(0).unwrap();
        assert_eq!(entry.item.plain_text(), "東京");
        assert_eq!(entry.phonetic.len(), 1);
        assert_eq!(entry.phonetic[0].text, "トウキョウ");
    }

    #[test]
    fn test_escaped_text() {
        let xml = r#"<sst><si><t>a &lt; b &amp; c</t></si></sst>"#;
        let table = parse_shared_strings(xml).unwrap();
        assert_eq!(table.resolve(0).unwrap().item.plain_text(), "a < b & c");
    }
}
