//! The style registry: interning styles into the indexed tables the file
//! format stores, and hydrating those tables back into shared style values.
//!
//! The registry owns four component tables (fonts, fills, borders, number
//! formats) and the composite cell-format table (`cellXfs`). Interning is
//! by structural equality: registering a style whose font already exists
//! in the font table reuses that font's index, and registering a style
//! whose complete cell-format record already exists reuses that record's
//! index. Within one save/load cycle the mapping between distinct style
//! values and format indices is a bijection.
//!
//! Reserved slots the file format hard-codes:
//! - cell-format index 0 is the workbook default style,
//! - fill 0 is the "none" pattern and fill 1 is "gray125",
//! - custom number formats are numbered from 164 up.

use std::collections::HashMap;
use std::sync::Arc;

use super::{
    Alignment, Border, FIRST_CUSTOM_FORMAT_ID, Fill, Font, NumberFormat, Protection, Style,
};
use crate::error::{Error, Result};

/// A cell-format record: indices into the component tables plus the
/// inline alignment/protection payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CellXf {
    /// Number format ID (built-in below 164, custom from 164 up)
    pub number_format_id: u32,
    /// Index into the font table
    pub font_id: u32,
    /// Index into the fill table
    pub fill_id: u32,
    /// Index into the border table
    pub border_id: u32,
    /// Alignment, present only when any setting differs from the default
    pub alignment: Option<Alignment>,
    /// Protection, present only when the flags differ from the default
    pub protection: Option<Protection>,
    /// Quote prefix flag
    pub quote_prefix: bool,
}

/// Raw stylesheet tables in file order, as parsed from `styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct RawStylesheet {
    /// Custom number formats as (ID, format code)
    pub number_formats: Vec<(u32, String)>,
    pub fonts: Vec<Font>,
    pub fills: Vec<Fill>,
    pub borders: Vec<Border>,
    /// Cell style format records (`cellStyleXfs`, template styles)
    pub cell_style_xfs: Vec<CellXf>,
    /// Cell format records (`cellXfs`, referenced by cells)
    pub cell_xfs: Vec<CellXf>,
}

/// Deduplicating style store mapping style values to stable indices.
#[derive(Debug)]
pub struct StyleRegistry {
    fonts: Vec<Font>,
    font_index: HashMap<Font, u32>,
    fills: Vec<Fill>,
    fill_index: HashMap<Fill, u32>,
    borders: Vec<Border>,
    border_index: HashMap<Border, u32>,
    /// Custom number formats in table order as (ID, code)
    number_formats: Vec<(u32, String)>,
    format_index: HashMap<String, u32>,
    next_custom_format_id: u32,
    cell_xfs: Vec<CellXf>,
    xf_index: HashMap<CellXf, u32>,
    /// The hydrated style for each cell-format index
    styles: Vec<Arc<Style>>,
    style_index: HashMap<Arc<Style>, u32>,
}

impl StyleRegistry {
    /// Create a registry seeded with the reserved entries: the default
    /// style at format index 0, the "none" and "gray125" fills at fill
    /// indices 0 and 1, and the default font and border at index 0 of
    /// their tables.
    pub fn new(default_style: &Arc<Style>) -> Self {
        let mut registry = Self {
            fonts: Vec::new(),
            font_index: HashMap::new(),
            fills: Vec::new(),
            fill_index: HashMap::new(),
            borders: Vec::new(),
            border_index: HashMap::new(),
            number_formats: Vec::new(),
            format_index: HashMap::new(),
            next_custom_format_id: FIRST_CUSTOM_FORMAT_ID,
            cell_xfs: Vec::new(),
            xf_index: HashMap::new(),
            styles: Vec::new(),
            style_index: HashMap::new(),
        };

        // Both reserved fills exist before any content fill, even when no
        // cell references them; consumers of the file depend on the slots.
        registry.intern_fill(&Fill::none());
        registry.intern_fill(&Fill::gray125());

        registry.register(default_style);
        registry
    }

    /// Rebuild a registry from loaded tables, preserving every entry at
    /// its original index (including duplicates and unused entries) so
    /// format indices stored elsewhere in the document stay valid.
    pub fn hydrate(raw: &RawStylesheet) -> Result<Self> {
        let mut font_index = HashMap::new();
        for (i, font) in raw.fonts.iter().enumerate() {
            font_index.entry(font.clone()).or_insert(i as u32);
        }
        let mut fill_index = HashMap::new();
        for (i, fill) in raw.fills.iter().enumerate() {
            fill_index.entry(fill.clone()).or_insert(i as u32);
        }
        let mut border_index = HashMap::new();
        for (i, border) in raw.borders.iter().enumerate() {
            border_index.entry(border.clone()).or_insert(i as u32);
        }

        let mut format_index = HashMap::new();
        let mut next_custom_format_id = FIRST_CUSTOM_FORMAT_ID;
        for (id, code) in &raw.number_formats {
            format_index.entry(code.clone()).or_insert(*id);
            if *id >= next_custom_format_id {
                next_custom_format_id = *id + 1;
            }
        }
        let custom_codes: HashMap<u32, &String> =
            raw.number_formats.iter().map(|(id, code)| (*id, code)).collect();

        let mut registry = Self {
            fonts: raw.fonts.clone(),
            font_index,
            fills: raw.fills.clone(),
            fill_index,
            borders: raw.borders.clone(),
            border_index,
            number_formats: raw.number_formats.clone(),
            format_index,
            next_custom_format_id,
            cell_xfs: Vec::with_capacity(raw.cell_xfs.len()),
            xf_index: HashMap::new(),
            styles: Vec::with_capacity(raw.cell_xfs.len()),
            style_index: HashMap::new(),
        };

        for (i, xf) in raw.cell_xfs.iter().enumerate() {
            let font = registry
                .fonts
                .get(xf.font_id as usize)
                .cloned()
                .ok_or_else(|| {
                    Error::MalformedDocument(format!(
                        "cell format {} references font {} but only {} fonts exist",
                        i,
                        xf.font_id,
                        registry.fonts.len()
                    ))
                })?;
            let fill = registry
                .fills
                .get(xf.fill_id as usize)
                .cloned()
                .ok_or_else(|| {
                    Error::MalformedDocument(format!(
                        "cell format {} references fill {} but only {} fills exist",
                        i,
                        xf.fill_id,
                        registry.fills.len()
                    ))
                })?;
            let border = registry
                .borders
                .get(xf.border_id as usize)
                .cloned()
                .ok_or_else(|| {
                    Error::MalformedDocument(format!(
                        "cell format {} references border {} but only {} borders exist",
                        i,
                        xf.border_id,
                        registry.borders.len()
                    ))
                })?;

            let number_format = if xf.number_format_id < FIRST_CUSTOM_FORMAT_ID {
                NumberFormat::Builtin(xf.number_format_id)
            } else {
                match custom_codes.get(&xf.number_format_id) {
                    Some(code) => NumberFormat::Custom((*code).clone()),
                    None => {
                        return Err(Error::MalformedDocument(format!(
                            "cell format {} references undefined number format {}",
                            i, xf.number_format_id
                        )));
                    },
                }
            };

            let style = Arc::new(Style {
                font,
                fill,
                border,
                number_format,
                alignment: xf.alignment.clone().unwrap_or_default(),
                protection: xf.protection.unwrap_or_default(),
                quote_prefix: xf.quote_prefix,
            });

            let index = registry.cell_xfs.len() as u32;
            registry.xf_index.entry(xf.clone()).or_insert(index);
            registry.cell_xfs.push(xf.clone());
            registry
                .style_index
                .entry(Arc::clone(&style))
                .or_insert(index);
            registry.styles.push(style);
        }

        Ok(registry)
    }

    /// Intern a style, returning its cell-format index.
    ///
    /// Structurally equal styles always resolve to the same index; a new
    /// style interns its components individually before the composite
    /// record is assigned the next free index.
    pub fn register(&mut self, style: &Arc<Style>) -> u32 {
        if let Some(&index) = self.style_index.get(style.as_ref()) {
            return index;
        }

        let font_id = self.intern_font(&style.font);
        let fill_id = self.intern_fill(&style.fill);
        let border_id = self.intern_border(&style.border);
        let number_format_id = self.intern_number_format(&style.number_format);

        let xf = CellXf {
            number_format_id,
            font_id,
            fill_id,
            border_id,
            alignment: style.alignment.has_settings().then(|| style.alignment.clone()),
            protection: style.protection.has_settings().then_some(style.protection),
            quote_prefix: style.quote_prefix,
        };

        if let Some(&index) = self.xf_index.get(&xf) {
            self.style_index.insert(Arc::clone(style), index);
            return index;
        }

        let index = self.cell_xfs.len() as u32;
        self.xf_index.insert(xf.clone(), index);
        self.cell_xfs.push(xf);
        self.styles.push(Arc::clone(style));
        self.style_index.insert(Arc::clone(style), index);
        index
    }

    /// Look up a style's index without interning it.
    pub fn index_of(&self, style: &Style) -> Option<u32> {
        self.style_index.get(style).copied()
    }

    /// Resolve a cell-format index from the file to its hydrated style.
    ///
    /// An index beyond the table is document corruption, not a default.
    pub fn style_for_index(&self, index: u32) -> Result<&Arc<Style>> {
        self.styles.get(index as usize).ok_or_else(|| {
            Error::MalformedDocument(format!(
                "style index {} out of bounds ({} cell formats)",
                index,
                self.styles.len()
            ))
        })
    }

    fn intern_font(&mut self, font: &Font) -> u32 {
        if let Some(&index) = self.font_index.get(font) {
            return index;
        }
        let index = self.fonts.len() as u32;
        self.fonts.push(font.clone());
        self.font_index.insert(font.clone(), index);
        index
    }

    fn intern_fill(&mut self, fill: &Fill) -> u32 {
        if let Some(&index) = self.fill_index.get(fill) {
            return index;
        }
        let index = self.fills.len() as u32;
        self.fills.push(fill.clone());
        self.fill_index.insert(fill.clone(), index);
        index
    }

    fn intern_border(&mut self, border: &Border) -> u32 {
        if let Some(&index) = self.border_index.get(border) {
            return index;
        }
        let index = self.borders.len() as u32;
        self.borders.push(border.clone());
        self.border_index.insert(border.clone(), index);
        index
    }

    fn intern_number_format(&mut self, format: &NumberFormat) -> u32 {
        match format {
            NumberFormat::Builtin(id) => *id,
            NumberFormat::Custom(code) => {
                if let Some(&id) = self.format_index.get(code) {
                    return id;
                }
                let id = self.next_custom_format_id;
                self.next_custom_format_id += 1;
                self.number_formats.push((id, code.clone()));
                self.format_index.insert(code.clone(), id);
                id
            },
        }
    }

    /// Fonts in table order.
    #[inline]
    pub fn fonts(&self) -> &[Font] {
        &self.fonts
    }

    /// Fills in table order.
    #[inline]
    pub fn fills(&self) -> &[Fill] {
        &self.fills
    }

    /// Borders in table order.
    #[inline]
    pub fn borders(&self) -> &[Border] {
        &self.borders
    }

    /// Custom number formats in table order as (ID, code).
    #[inline]
    pub fn number_formats(&self) -> &[(u32, String)] {
        &self.number_formats
    }

    /// Cell format records in table order.
    #[inline]
    pub fn cell_xfs(&self) -> &[CellXf] {
        &self.cell_xfs
    }

    /// Number of cell format records.
    #[inline]
    pub fn style_count(&self) -> usize {
        self.cell_xfs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::Color;

    fn bold_red() -> Arc<Style> {
        Arc::new(
            Style::new().with_font(
                Font::new()
                    .with_bold(true)
                    .with_color(Color::rgb("FF0000")),
            ),
        )
    }

    #[test]
    fn test_reserved_slots() {
        let registry = StyleRegistry::new(&Style::default_style());
        assert_eq!(registry.fills()[0], Fill::none());
        assert_eq!(registry.fills()[1], Fill::gray125());
        assert_eq!(registry.style_count(), 1);
        assert_eq!(registry.cell_xfs()[0].font_id, 0);
    }

    #[test]
    fn test_equal_styles_share_an_index() {
        let mut registry = StyleRegistry::new(&Style::default_style());
        let a = registry.register(&bold_red());
        let b = registry.register(&bold_red());
        assert_eq!(a, b);
        assert_eq!(registry.style_count(), 2);
    }

    #[test]
    fn test_component_dedup_across_styles() {
        let mut registry = StyleRegistry::new(&Style::default_style());
        let font = Font::new().with_bold(true);

        // Ten styles sharing one font: the font table gains one entry.
        let fonts_before = registry.fonts().len();
        for i in 0..10u32 {
            let style = Arc::new(
                Style::new()
                    .with_font(font.clone())
                    .with_number_format(NumberFormat::Custom(format!("0.{}", "0".repeat(i as usize + 1)))),
            );
            registry.register(&style);
        }
        assert_eq!(registry.fonts().len(), fonts_before + 1);
        assert_eq!(registry.number_formats().len(), 10);
    }

    #[test]
    fn test_interning_is_deterministic() {
        let styles: Vec<Arc<Style>> = vec![
            bold_red(),
            Arc::new(Style::new().with_fill(Fill::solid(Color::rgb("00FF00")))),
            bold_red(),
            Style::default_style(),
        ];

        let mut first = StyleRegistry::new(&Style::default_style());
        let first_indices: Vec<u32> = styles.iter().map(|s| first.register(s)).collect();

        let mut second = StyleRegistry::new(&Style::default_style());
        let second_indices: Vec<u32> = styles.iter().map(|s| second.register(s)).collect();

        assert_eq!(first_indices, second_indices);
        // Distinct indices match distinct style values, not style instances.
        assert_eq!(first_indices[0], first_indices[2]);
        assert_eq!(first_indices[3], 0);
        assert_eq!(first.style_count(), 3);
    }

    #[test]
    fn test_color_representations_not_coalesced() {
        let mut registry = StyleRegistry::new(&Style::default_style());
        let rgb = Arc::new(Style::new().with_font(Font::new().with_color(Color::rgb("000000"))));
        let themed = Arc::new(Style::new().with_font(Font::new().with_color(Color::theme(1))));
        assert_ne!(registry.register(&rgb), registry.register(&themed));
    }

    #[test]
    fn test_custom_format_ids_start_at_164() {
        let mut registry = StyleRegistry::new(&Style::default_style());
        let style = Arc::new(Style::new().with_number_format(NumberFormat::Custom("0.000".into())));
        registry.register(&style);
        assert_eq!(registry.number_formats()[0].0, FIRST_CUSTOM_FORMAT_ID);
    }

    #[test]
    fn test_hydrate_validates_indices() {
        let raw = RawStylesheet {
            fonts: vec![Font::new()],
            fills: vec![Fill::none(), Fill::gray125()],
            borders: vec![Border::new()],
            cell_xfs: vec![CellXf {
                number_format_id: 0,
                font_id: 7, // out of bounds
                fill_id: 0,
                border_id: 0,
                alignment: None,
                protection: None,
                quote_prefix: false,
            }],
            ..Default::default()
        };
        assert!(matches!(
            StyleRegistry::hydrate(&raw),
            Err(Error::MalformedDocument(_))
        ));
    }

    #[test]
    fn test_hydrate_then_lookup() {
        let raw = RawStylesheet {
            number_formats: vec![(164, "0.000".to_string())],
            fonts: vec![Font::new(), Font::new().with_bold(true)],
            fills: vec![Fill::none(), Fill::gray125()],
            borders: vec![Border::new()],
            cell_xfs: vec![
                CellXf {
                    number_format_id: 0,
                    font_id: 0,
                    fill_id: 0,
                    border_id: 0,
                    alignment: None,
                    protection: None,
                    quote_prefix: false,
                },
                CellXf {
                    number_format_id: 164,
                    font_id: 1,
                    fill_id: 0,
                    border_id: 0,
                    alignment: None,
                    protection: None,
                    quote_prefix: false,
                },
            ],
            ..Default::default()
        };

        let registry = StyleRegistry::hydrate(&raw).unwrap();
        let style = registry.style_for_index(1).unwrap();
        assert!(style.font.bold);
        assert_eq!(style.number_format, NumberFormat::Custom("0.000".into()));
        assert!(registry.style_for_index(2).is_err());

        // A live registration of the same value reuses the loaded index.
        let mut registry = registry;
        let same = Arc::new((**registry.style_for_index(1).unwrap()).clone());
        assert_eq!(registry.register(&same), 1);
    }
}
