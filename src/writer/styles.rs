//! `styles.xml` generator.
//!
//! Linearizes the style registry's tables in their required order:
//! custom number formats, fonts, fills, borders, then the cell-format
//! records that reference them by index.

use std::fmt::Write as FmtWrite;

use crate::error::Result;
use crate::style::{
    Alignment, Border, BorderSide, CellXf, Color, DiagonalDirection, Fill, Font, Protection,
    StyleRegistry,
};
use crate::xml::escape_xml;

/// Generate the complete `styles.xml` content from a registry.
pub fn styles_xml(registry: &StyleRegistry) -> Result<String> {
    let mut xml = String::with_capacity(4096);

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(
        r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#,
    );

    let number_formats = registry.number_formats();
    if !number_formats.is_empty() {
        write!(xml, r#"<numFmts count="{}">"#, number_formats.len())?;
        for (id, code) in number_formats {
            write!(
                xml,
                r#"<numFmt numFmtId="{}" formatCode="{}"/>"#,
                id,
                escape_xml(code)
            )?;
        }
        xml.push_str("</numFmts>");
    }

    write!(xml, r#"<fonts count="{}">"#, registry.fonts().len())?;
    for font in registry.fonts() {
        write_font(&mut xml, font)?;
    }
    xml.push_str("</fonts>");

    write!(xml, r#"<fills count="{}">"#, registry.fills().len())?;
    for fill in registry.fills() {
        write_fill(&mut xml, fill)?;
    }
    xml.push_str("</fills>");

    write!(xml, r#"<borders count="{}">"#, registry.borders().len())?;
    for border in registry.borders() {
        write_border(&mut xml, border)?;
    }
    xml.push_str("</borders>");

    // A single template record backs every cell format.
    xml.push_str(
        r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#,
    );

    write!(xml, r#"<cellXfs count="{}">"#, registry.cell_xfs().len())?;
    for xf in registry.cell_xfs() {
        write_xf(&mut xml, xf)?;
    }
    xml.push_str("</cellXfs>");

    xml.push_str(
        r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#,
    );

    xml.push_str("</styleSheet>");
    Ok(xml)
}

/// Write a color-bearing element (`<color rgb="..."/>`, `<fgColor theme="..."/>`).
fn write_color(xml: &mut String, tag: &str, color: &Color) -> Result<()> {
    match color {
        Color::Rgb(value) => write!(xml, r#"<{} rgb="{}"/>"#, tag, escape_xml(value))?,
        Color::Theme { theme, tint } => match tint {
            Some(tint) => write!(xml, r#"<{} theme="{}" tint="{}"/>"#, tag, theme, tint)?,
            None => write!(xml, r#"<{} theme="{}"/>"#, tag, theme)?,
        },
        Color::Indexed(index) => write!(xml, r#"<{} indexed="{}"/>"#, tag, index)?,
        Color::Auto => write!(xml, r#"<{} auto="1"/>"#, tag)?,
    }
    Ok(())
}

/// Write a run-property `color` element (shared with the string writer).
pub(crate) fn write_run_color(xml: &mut String, color: &Color) -> Result<()> {
    write_color(xml, "color", color)
}

/// Write one `font` element.
fn write_font(xml: &mut String, font: &Font) -> Result<()> {
    xml.push_str("<font>");

    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if font.strike {
        xml.push_str("<strike/>");
    }
    if let Some(underline) = &font.underline {
        if underline == "single" {
            xml.push_str("<u/>");
        } else {
            write!(xml, r#"<u val="{}"/>"#, escape_xml(underline))?;
        }
    }
    if let Some(size) = font.size {
        write!(xml, r#"<sz val="{}"/>"#, size)?;
    }
    if let Some(color) = &font.color {
        write_color(xml, "color", color)?;
    }
    if let Some(name) = &font.name {
        write!(xml, r#"<name val="{}"/>"#, escape_xml(name))?;
    }
    if let Some(family) = font.family {
        write!(xml, r#"<family val="{}"/>"#, family)?;
    }
    if let Some(charset) = font.charset {
        write!(xml, r#"<charset val="{}"/>"#, charset)?;
    }
    if let Some(scheme) = &font.scheme {
        write!(xml, r#"<scheme val="{}"/>"#, escape_xml(scheme))?;
    }

    xml.push_str("</font>");
    Ok(())
}

/// Write one `fill` element.
fn write_fill(xml: &mut String, fill: &Fill) -> Result<()> {
    xml.push_str("<fill>");

    match fill {
        Fill::Pattern {
            pattern,
            fg_color,
            bg_color,
        } => {
            if fg_color.is_none() && bg_color.is_none() {
                write!(xml, r#"<patternFill patternType="{}"/>"#, pattern.as_str())?;
            } else {
                write!(xml, r#"<patternFill patternType="{}">"#, pattern.as_str())?;
                if let Some(color) = fg_color {
                    write_color(xml, "fgColor", color)?;
                }
                if let Some(color) = bg_color {
                    write_color(xml, "bgColor", color)?;
                }
                xml.push_str("</patternFill>");
            }
        },
        Fill::Gradient {
            gradient_type,
            degree,
            stops,
        } => {
            xml.push_str("<gradientFill");
            if let Some(gradient_type) = gradient_type {
                write!(xml, r#" type="{}""#, escape_xml(gradient_type))?;
            }
            if let Some(degree) = degree {
                write!(xml, r#" degree="{}""#, degree)?;
            }
            xml.push('>');
            for stop in stops {
                write!(xml, r#"<stop position="{}">"#, stop.position)?;
                write_color(xml, "color", &stop.color)?;
                xml.push_str("</stop>");
            }
            xml.push_str("</gradientFill>");
        },
    }

    xml.push_str("</fill>");
    Ok(())
}

/// Write one `border` element.
fn write_border(xml: &mut String, border: &Border) -> Result<()> {
    xml.push_str("<border");
    if border.diagonal_direction.contains(DiagonalDirection::UP) {
        xml.push_str(r#" diagonalUp="1""#);
    }
    if border.diagonal_direction.contains(DiagonalDirection::DOWN) {
        xml.push_str(r#" diagonalDown="1""#);
    }
    xml.push('>');

    write_border_side(xml, "left", border.left.as_ref())?;
    write_border_side(xml, "right", border.right.as_ref())?;
    write_border_side(xml, "top", border.top.as_ref())?;
    write_border_side(xml, "bottom", border.bottom.as_ref())?;
    write_border_side(xml, "diagonal", border.diagonal.as_ref())?;

    xml.push_str("</border>");
    Ok(())
}

/// Write a single border side.
fn write_border_side(xml: &mut String, tag: &str, side: Option<&BorderSide>) -> Result<()> {
    match side {
        Some(side) => {
            write!(xml, r#"<{} style="{}">"#, tag, side.style.as_str())?;
            if let Some(color) = &side.color {
                write_color(xml, "color", color)?;
            }
            write!(xml, "</{}>", tag)?;
        },
        None => write!(xml, "<{}/>", tag)?,
    }
    Ok(())
}

/// Write one `xf` (cell format) record.
fn write_xf(xml: &mut String, xf: &CellXf) -> Result<()> {
    write!(
        xml,
        r#"<xf numFmtId="{}" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
        xf.number_format_id, xf.font_id, xf.fill_id, xf.border_id
    )?;

    if xf.number_format_id != 0 {
        xml.push_str(r#" applyNumberFormat="1""#);
    }
    if xf.font_id != 0 {
        xml.push_str(r#" applyFont="1""#);
    }
    if xf.fill_id != 0 {
        xml.push_str(r#" applyFill="1""#);
    }
    if xf.border_id != 0 {
        xml.push_str(r#" applyBorder="1""#);
    }
    if xf.alignment.is_some() {
        xml.push_str(r#" applyAlignment="1""#);
    }
    if xf.protection.is_some() {
        xml.push_str(r#" applyProtection="1""#);
    }
    if xf.quote_prefix {
        xml.push_str(r#" quotePrefix="1""#);
    }

    if xf.alignment.is_none() && xf.protection.is_none() {
        xml.push_str("/>");
        return Ok(());
    }

    xml.push('>');
    if let Some(alignment) = &xf.alignment {
        write_alignment(xml, alignment)?;
    }
    if let Some(protection) = &xf.protection {
        write_protection(xml, protection)?;
    }
    xml.push_str("</xf>");
    Ok(())
}

/// Write an `alignment` element.
fn write_alignment(xml: &mut String, alignment: &Alignment) -> Result<()> {
    xml.push_str("<alignment");
    if let Some(horizontal) = &alignment.horizontal {
        write!(xml, r#" horizontal="{}""#, escape_xml(horizontal))?;
    }
    if let Some(vertical) = &alignment.vertical {
        write!(xml, r#" vertical="{}""#, escape_xml(vertical))?;
    }
    if let Some(rotation) = alignment.text_rotation {
        write!(xml, r#" textRotation="{}""#, rotation)?;
    }
    if alignment.wrap_text {
        xml.push_str(r#" wrapText="1""#);
    }
    if let Some(indent) = alignment.indent {
        write!(xml, r#" indent="{}""#, indent)?;
    }
    if alignment.shrink_to_fit {
        xml.push_str(r#" shrinkToFit="1""#);
    }
    if let Some(order) = alignment.reading_order {
        write!(xml, r#" readingOrder="{}""#, order)?;
    }
    xml.push_str("/>");
    Ok(())
}

/// Write a `protection` element.
fn write_protection(xml: &mut String, protection: &Protection) -> Result<()> {
    xml.push_str("<protection");
    if !protection.locked {
        xml.push_str(r#" locked="0""#);
    }
    if protection.hidden {
        xml.push_str(r#" hidden="1""#);
    }
    xml.push_str("/>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{NumberFormat, Style};
    use std::sync::Arc;

    #[test]
    fn test_reserved_slots_always_emitted() {
        let registry = StyleRegistry::new(&Style::default_style());
        let xml = styles_xml(&registry).unwrap();

        assert!(xml.contains(r#"<fills count="2">"#));
        let none_pos = xml.find(r#"patternType="none""#).unwrap();
        let gray_pos = xml.find(r#"patternType="gray125""#).unwrap();
        assert!(none_pos < gray_pos);
        assert!(xml.contains(r#"<cellXfs count="1">"#));
    }

    #[test]
    fn test_custom_format_ids() {
        let mut registry = StyleRegistry::new(&Style::default_style());
        registry.register(&Arc::new(
            Style::new().with_number_format(NumberFormat::Custom("0.000".into())),
        ));
        let xml = styles_xml(&registry).unwrap();
        assert!(xml.contains(r#"<numFmt numFmtId="164" formatCode="0.000"/>"#));
        assert!(xml.contains(r#"applyNumberFormat="1""#));
    }

    #[test]
    fn test_font_and_alignment_payload() {
        use crate::style::{Alignment, Color, Font};
        let mut registry = StyleRegistry::new(&Style::default_style());
        let style = Style::new()
            .with_font(
                Font::new()
                    .with_bold(true)
                    .with_size(14.0)
                    .with_color(Color::rgb("FF0000")),
            )
            .with_alignment(Alignment {
                horizontal: Some("center".to_string()),
                wrap_text: true,
                ..Alignment::default()
            });
        registry.register(&Arc::new(style));

        let xml = styles_xml(&registry).unwrap();
        assert!(xml.contains("<b/>"));
        assert!(xml.contains(r#"<sz val="14"/>"#));
        assert!(xml.contains(r#"<color rgb="FFFF0000"/>"#));
        assert!(xml.contains(r#"<alignment horizontal="center" wrapText="1"/>"#));
    }
}
