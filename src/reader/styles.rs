//! Parser for the `styles.xml` part.
//!
//! Produces the raw stylesheet tables in file order; the style registry
//! hydrates them into shared style values afterwards.

use ordered_float::NotNan;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, Result};
use crate::style::{
    Alignment, Border, BorderSide, CellXf, Color, DiagonalDirection, Fill, Font, GradientStop,
    LineStyle, PatternType, Protection, RawStylesheet,
};

/// Parse `styles.xml` content into raw tables.
pub fn parse_styles(content: &str) -> Result<RawStylesheet> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut raw = RawStylesheet::default();
    let mut buf = Vec::with_capacity(1024);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"numFmts" => parse_number_formats(&mut reader, &mut raw.number_formats)?,
                b"fonts" => parse_fonts(&mut reader, &mut raw.fonts)?,
                b"fills" => parse_fills(&mut reader, &mut raw.fills)?,
                b"borders" => parse_borders(&mut reader, &mut raw.borders)?,
                b"cellStyleXfs" => parse_cell_xfs(&mut reader, &mut raw.cell_style_xfs, b"cellStyleXfs")?,
                b"cellXfs" => parse_cell_xfs(&mut reader, &mut raw.cell_xfs, b"cellXfs")?,
                _ => {},
            },
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML parsing error: {}", e))),
            _ => {},
        }
    }

    Ok(raw)
}

/// Decode one attribute value as a string.
fn attr_value(reader: &Reader<&[u8]>, attr: &quick_xml::events::attributes::Attribute) -> Option<String> {
    attr.decode_and_unescape_value(reader.decoder())
        .ok()
        .map(|v| v.to_string())
}

fn attr_bool(value: &str) -> bool {
    value == "1" || value == "true"
}

/// Parse the `numFmts` section.
fn parse_number_formats(
    reader: &mut Reader<&[u8]>,
    number_formats: &mut Vec<(u32, String)>,
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"numFmt" => {
                let mut id = None;
                let mut code = None;
                for attr in e.attributes().flatten() {
                    match attr.key.local_name().as_ref() {
                        b"numFmtId" => {
                            id = attr_value(reader, &attr).and_then(|v| v.parse::<u32>().ok());
                        },
                        b"formatCode" => code = attr_value(reader, &attr),
                        _ => {},
                    }
                }
                if let (Some(id), Some(code)) = (id, code) {
                    number_formats.push((id, code));
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"numFmts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in numFmts: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse the `fonts` section.
fn parse_fonts(reader: &mut Reader<&[u8]>, fonts: &mut Vec<Font>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"font" => {
                fonts.push(parse_font(reader)?);
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"font" => {
                fonts.push(Font::new());
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"fonts" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in fonts: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse a single `font` element.
fn parse_font(reader: &mut Reader<&[u8]>) -> Result<Font> {
    let mut font = Font::new();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"name" => {
                    if let Some(value) = val_attr(reader, &e) {
                        font.name = Some(value);
                    }
                },
                b"sz" => {
                    if let Some(value) = val_attr(reader, &e)
                        && let Ok(size) = fast_float2::parse(&value)
                    {
                        font.size = NotNan::new(size).ok();
                    }
                },
                b"b" => font.bold = flag_element(reader, &e),
                b"i" => font.italic = flag_element(reader, &e),
                b"strike" => font.strike = flag_element(reader, &e),
                b"u" => {
                    font.underline = Some(val_attr(reader, &e).unwrap_or_else(|| "single".to_string()));
                },
                b"color" => font.color = parse_color(reader, &e),
                b"charset" => {
                    font.charset = val_attr(reader, &e).and_then(|v| v.parse::<u32>().ok());
                },
                b"family" => {
                    font.family = val_attr(reader, &e).and_then(|v| v.parse::<u32>().ok());
                },
                b"scheme" => font.scheme = val_attr(reader, &e),
                _ => {},
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"font" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in font: {}", e))),
            _ => {},
        }
    }

    Ok(font)
}

/// Read a `val` attribute.
fn val_attr(reader: &Reader<&[u8]>, start: &BytesStart) -> Option<String> {
    for attr in start.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"val" {
            return attr_value(reader, &attr);
        }
    }
    None
}

/// Boolean child elements (`<b/>`, `<b val="0"/>`).
fn flag_element(reader: &Reader<&[u8]>, start: &BytesStart) -> bool {
    val_attr(reader, start).map_or(true, |v| attr_bool(&v))
}

/// Parse the `fills` section.
fn parse_fills(reader: &mut Reader<&[u8]>, fills: &mut Vec<Fill>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"fill" => {
                fills.push(parse_fill(reader)?);
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"fill" => {
                fills.push(Fill::none());
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"fills" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in fills: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse a single `fill` element.
fn parse_fill(reader: &mut Reader<&[u8]>) -> Result<Fill> {
    let mut fill = Fill::none();
    let mut buf = Vec::with_capacity(256);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"patternFill" => {
                fill = parse_pattern_fill(reader, &e, false)?;
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"patternFill" => {
                fill = parse_pattern_fill(reader, &e, true)?;
            },
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"gradientFill" => {
                fill = parse_gradient_fill(reader, &e)?;
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"fill" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in fill: {}", e))),
            _ => {},
        }
    }

    Ok(fill)
}

/// Parse a `patternFill` element.
fn parse_pattern_fill(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
    empty: bool,
) -> Result<Fill> {
    let mut pattern = PatternType::None;
    for attr in start.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"patternType"
            && let Some(value) = attr_value(reader, &attr)
        {
            pattern = PatternType::parse(&value).ok_or_else(|| {
                Error::MalformedDocument(format!("unknown fill pattern type {:?}", value))
            })?;
        }
    }

    let mut fg_color = None;
    let mut bg_color = None;
    if !empty {
        let mut buf = Vec::with_capacity(128);
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"fgColor" => fg_color = parse_color(reader, &e),
                    b"bgColor" => bg_color = parse_color(reader, &e),
                    _ => {},
                },
                Ok(Event::End(e)) if e.local_name().as_ref() == b"patternFill" => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("XML error in patternFill: {}", e))),
                _ => {},
            }
        }
    }

    Ok(Fill::Pattern {
        pattern,
        fg_color,
        bg_color,
    })
}

/// Parse a `gradientFill` element with its stops.
fn parse_gradient_fill(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Fill> {
    let mut gradient_type = None;
    let mut degree = None;
    for attr in start.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"type" => gradient_type = attr_value(reader, &attr),
            b"degree" => {
                degree = attr_value(reader, &attr)
                    .and_then(|v| fast_float2::parse(&v).ok())
                    .and_then(|v: f64| NotNan::new(v).ok());
            },
            _ => {},
        }
    }

    let mut stops = Vec::new();
    let mut buf = Vec::with_capacity(128);
    let mut position = None;
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"stop" => {
                position = None;
                for attr in e.attributes().flatten() {
                    if attr.key.local_name().as_ref() == b"position" {
                        position = attr_value(reader, &attr)
                            .and_then(|v| fast_float2::parse(&v).ok())
                            .and_then(|v: f64| NotNan::new(v).ok());
                    }
                }
            },
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"color" => {
                if let (Some(position), Some(color)) = (position, parse_color(reader, &e)) {
                    stops.push(GradientStop { position, color });
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"gradientFill" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in gradientFill: {}", e))),
            _ => {},
        }
    }

    Ok(Fill::Gradient {
        gradient_type,
        degree,
        stops,
    })
}

/// Parse the `borders` section.
fn parse_borders(reader: &mut Reader<&[u8]>, borders: &mut Vec<Border>) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"border" => {
                borders.push(parse_border(reader, &e)?);
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"border" => {
                let mut border = Border::new();
                apply_diagonal_attrs(reader, &e, &mut border);
                borders.push(border);
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"borders" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in borders: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

fn apply_diagonal_attrs(reader: &Reader<&[u8]>, start: &BytesStart, border: &mut Border) {
    for attr in start.attributes().flatten() {
        match attr.key.local_name().as_ref() {
            b"diagonalUp" => {
                if attr_value(reader, &attr).is_some_and(|v| attr_bool(&v)) {
                    border.diagonal_direction |= DiagonalDirection::UP;
                }
            },
            b"diagonalDown" => {
                if attr_value(reader, &attr).is_some_and(|v| attr_bool(&v)) {
                    border.diagonal_direction |= DiagonalDirection::DOWN;
                }
            },
            _ => {},
        }
    }
}

/// Parse a single `border` element.
fn parse_border(reader: &mut Reader<&[u8]>, start: &BytesStart) -> Result<Border> {
    let mut border = Border::new();
    apply_diagonal_attrs(reader, start, &mut border);

    let mut buf = Vec::with_capacity(256);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let side = parse_border_side(reader, &e)?;
                match e.local_name().as_ref() {
                    b"left" => border.left = side,
                    b"right" => border.right = side,
                    b"top" => border.top = side,
                    b"bottom" => border.bottom = side,
                    b"diagonal" => border.diagonal = side,
                    _ => {},
                }
            },
            Ok(Event::Empty(e)) => {
                let side = border_side_from_attrs(reader, &e)?;
                match e.local_name().as_ref() {
                    b"left" => border.left = side,
                    b"right" => border.right = side,
                    b"top" => border.top = side,
                    b"bottom" => border.bottom = side,
                    b"diagonal" => border.diagonal = side,
                    _ => {},
                }
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == b"border" => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in border: {}", e))),
            _ => {},
        }
    }

    Ok(border)
}

/// The line style named in a side element's attributes, if any.
fn side_style(reader: &Reader<&[u8]>, start: &BytesStart) -> Result<Option<LineStyle>> {
    for attr in start.attributes().flatten() {
        if attr.key.local_name().as_ref() == b"style"
            && let Some(value) = attr_value(reader, &attr)
        {
            if value == "none" {
                return Ok(None);
            }
            return LineStyle::parse(&value)
                .map(Some)
                .ok_or_else(|| {
                    Error::MalformedDocument(format!("unknown border style {:?}", value))
                });
        }
    }
    Ok(None)
}

/// A side parsed from an empty element (`<left style="thin"/>`).
fn border_side_from_attrs(
    reader: &Reader<&[u8]>,
    start: &BytesStart,
) -> Result<Option<BorderSide>> {
    Ok(side_style(reader, start)?.map(|style| BorderSide::new(style, None)))
}

/// Parse one border side (`left`, `right`, `top`, `bottom`, `diagonal`)
/// with child color.
fn parse_border_side(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart,
) -> Result<Option<BorderSide>> {
    let style = side_style(reader, start)?;
    let side_name = start.local_name().as_ref().to_vec();

    let mut color = None;
    let mut buf = Vec::with_capacity(128);
    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) if e.local_name().as_ref() == b"color" => {
                color = parse_color(reader, &e);
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == side_name.as_slice() => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in border side: {}", e))),
            _ => {},
        }
    }

    Ok(style.map(|style| BorderSide::new(style, color)))
}

/// Parse the `cellXfs`/`cellStyleXfs` sections.
fn parse_cell_xfs(
    reader: &mut Reader<&[u8]>,
    cell_xfs: &mut Vec<CellXf>,
    section: &[u8],
) -> Result<()> {
    let mut buf = Vec::with_capacity(512);

    loop {
        buf.clear();
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"xf" => {
                cell_xfs.push(parse_xf(reader, &e, false)?);
            },
            Ok(Event::Empty(e)) if e.local_name().as_ref() == b"xf" => {
                cell_xfs.push(parse_xf(reader, &e, true)?);
            },
            Ok(Event::End(e)) if e.local_name().as_ref() == section => break,
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(format!("XML error in cellXfs: {}", e))),
            _ => {},
        }
    }

    Ok(())
}

/// Parse a single `xf` (format) record.
fn parse_xf(reader: &mut Reader<&[u8]>, start: &BytesStart, empty: bool) -> Result<CellXf> {
    let mut xf = CellXf {
        number_format_id: 0,
        font_id: 0,
        fill_id: 0,
        border_id: 0,
        alignment: None,
        protection: None,
        quote_prefix: false,
    };

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"numFmtId" => xf.number_format_id = value.parse().unwrap_or(0),
            b"fontId" => xf.font_id = value.parse().unwrap_or(0),
            b"fillId" => xf.fill_id = value.parse().unwrap_or(0),
            b"borderId" => xf.border_id = value.parse().unwrap_or(0),
            b"quotePrefix" => xf.quote_prefix = attr_bool(&value),
            _ => {},
        }
    }

    if !empty {
        let mut buf = Vec::with_capacity(256);
        loop {
            buf.clear();
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                    b"alignment" => {
                        let alignment = parse_alignment(reader, &e);
                        if alignment.has_settings() {
                            xf.alignment = Some(alignment);
                        }
                    },
                    b"protection" => {
                        let protection = parse_protection(reader, &e);
                        if protection.has_settings() {
                            xf.protection = Some(protection);
                        }
                    },
                    _ => {},
                },
                Ok(Event::End(e)) if e.local_name().as_ref() == b"xf" => break,
                Ok(Event::Eof) => break,
                Err(e) => return Err(Error::Xml(format!("XML error in xf: {}", e))),
                _ => {},
            }
        }
    }

    Ok(xf)
}

/// Parse an `alignment` element.
fn parse_alignment(reader: &Reader<&[u8]>, start: &BytesStart) -> Alignment {
    let mut alignment = Alignment::new();

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"horizontal" => alignment.horizontal = Some(value),
            b"vertical" => alignment.vertical = Some(value),
            b"textRotation" => alignment.text_rotation = value.parse().ok(),
            b"wrapText" => alignment.wrap_text = attr_bool(&value),
            b"indent" => alignment.indent = value.parse().ok(),
            b"shrinkToFit" => alignment.shrink_to_fit = attr_bool(&value),
            b"readingOrder" => alignment.reading_order = value.parse().ok(),
            _ => {},
        }
    }

    alignment
}

/// Parse a `protection` element.
fn parse_protection(reader: &Reader<&[u8]>, start: &BytesStart) -> Protection {
    let mut protection = Protection::new();

    for attr in start.attributes().flatten() {
        let Some(value) = attr_value(reader, &attr) else {
            continue;
        };
        match attr.key.local_name().as_ref() {
            b"locked" => protection.locked = attr_bool(&value),
            b"hidden" => protection.hidden = attr_bool(&value),
            _ => {},
        }
    }

    protection
}

/// Parse a color from a color-bearing element's attributes.
///
/// The representation in the file (rgb, theme+tint, indexed, auto) is
/// kept as-is; no conversion between representations happens here.
pub(crate) fn parse_color(reader: &Reader<&[u8]>, start: &BytesStart) -> Option<Color> {
    let mut theme = None;
    let mut tint = None;

    for attr in start.attributes().flatten() {
        let value = attr_value(reader, &attr)?;
        match attr.key.local_name().as_ref() {
            b"rgb" => return Some(Color::Rgb(value.to_ascii_uppercase())),
            b"theme" => theme = value.parse::<u32>().ok(),
            b"tint" => {
                tint = fast_float2::parse(&value)
                    .ok()
                    .and_then(|v: f64| NotNan::new(v).ok());
            },
            b"indexed" => return value.parse::<u32>().ok().map(Color::Indexed),
            b"auto" => {
                if attr_bool(&value) {
                    return Some(Color::Auto);
                }
            },
            _ => {},
        }
    }

    theme.map(|theme| Color::Theme { theme, tint })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::StyleRegistry;

    const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
<numFmts count="1"><numFmt numFmtId="164" formatCode="0.000"/></numFmts>
<fonts count="2">
<font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
<font><b/><sz val="12"/><color rgb="FFFF0000"/><name val="Arial"/></font>
</fonts>
<fills count="3">
<fill><patternFill patternType="none"/></fill>
<fill><patternFill patternType="gray125"/></fill>
<fill><patternFill patternType="solid"><fgColor theme="4" tint="0.4"/></patternFill></fill>
</fills>
<borders count="2">
<border><left/><right/><top/><bottom/><diagonal/></border>
<border diagonalUp="1"><left style="thin"><color indexed="64"/></left><right/><top/><bottom/><diagonal style="hair"/></border>
</borders>
<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
<cellXfs count="3">
<xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
<xf numFmtId="164" fontId="1" fillId="2" borderId="1" applyFont="1"><alignment horizontal="center" wrapText="1"/></xf>
<xf numFmtId="0" fontId="0" fillId="0" borderId="0" quotePrefix="1"><protection locked="0"/></xf>
</cellXfs>
</styleSheet>"#;

    #[test]
    fn test_parse_styles_tables() {
        let raw = parse_styles(STYLES).unwrap();
        assert_eq!(raw.number_formats, vec![(164, "0.000".to_string())]);
        assert_eq!(raw.fonts.len(), 2);
        assert_eq!(raw.fills.len(), 3);
        assert_eq!(raw.borders.len(), 2);
        assert_eq!(raw.cell_xfs.len(), 3);

        let bold = &raw.fonts[1];
        assert!(bold.bold);
        assert_eq!(bold.size.map(f64::from), Some(12.0));
        assert_eq!(bold.color, Some(Color::Rgb("FFFF0000".to_string())));

        match &raw.fills[2] {
            Fill::Pattern {
                pattern: PatternType::Solid,
                fg_color: Some(Color::Theme { theme: 4, tint }),
                ..
            } => assert_eq!(tint.map(f64::from), Some(0.4)),
            other => panic!("unexpected fill {:?}", other),
        }

        let bordered = &raw.borders[1];
        assert!(bordered.diagonal_direction.contains(DiagonalDirection::UP));
        assert_eq!(
            bordered.left,
            Some(BorderSide::new(LineStyle::Thin, Some(Color::Indexed(64))))
        );
        assert_eq!(bordered.diagonal.as_ref().map(|s| s.style), Some(LineStyle::Hair));
    }

    #[test]
    fn test_parse_xf_payload() {
        let raw = parse_styles(STYLES).unwrap();

        let styled = &raw.cell_xfs[1];
        assert_eq!(styled.number_format_id, 164);
        assert_eq!(styled.font_id, 1);
        let alignment = styled.alignment.as_ref().unwrap();
        assert_eq!(alignment.horizontal.as_deref(), Some("center"));
        assert!(alignment.wrap_text);

        let quoted = &raw.cell_xfs[2];
        assert!(quoted.quote_prefix);
        assert!(!quoted.protection.unwrap().locked);
    }

    #[test]
    fn test_parse_then_hydrate() {
        let raw = parse_styles(STYLES).unwrap();
        let registry = StyleRegistry::hydrate(&raw).unwrap();
        let style = registry.style_for_index(1).unwrap();
        assert!(style.font.bold);
        assert!(style.fill.is_solid());
        assert_eq!(
            style.number_format,
            crate::style::NumberFormat::Custom("0.000".to_string())
        );
    }

    #[test]
    fn test_unknown_pattern_is_malformed() {
        let xml = r#"<styleSheet><fills count="1"><fill><patternFill patternType="plaid"/></fill></fills></styleSheet>"#;
        assert!(matches!(
            parse_styles(xml),
            Err(Error::MalformedDocument(_))
        ));
    }
}
