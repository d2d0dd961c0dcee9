//! The load pipeline.
//!
//! One strict top-down pass: the style tables and shared strings are
//! hydrated first (they have no forward references), then each worksheet
//! streams its rows and cells against the finished registries, then table
//! parts bind to their sheets. Any structural inconsistency aborts the
//! whole load; no partially hydrated workbook is ever returned.

pub mod sheet;
pub mod strings;
pub mod styles;
pub mod table;
pub mod workbook;

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::named_range::{NamedRange, NamedRanges};
use crate::package::{
    Package, REL_TYPE_TABLE, Relationships, SHARED_STRINGS_PART, STYLES_PART, WORKBOOK_PART,
    rels_part_name, resolve_target,
};
use crate::shared_strings::SharedStringTable;
use crate::style::{RawStylesheet, Style, StyleRegistry};
use crate::workbook::{LoadedDocument, LoadedSheet, Workbook};

/// Load a workbook from a package of parts.
pub(crate) fn load_document(package: &Package) -> Result<Workbook> {
    let meta = workbook::parse_workbook(package.part(WORKBOOK_PART)?)?;

    let workbook_rels = match package.get_part(&rels_part_name(WORKBOOK_PART)) {
        Some(xml) => Relationships::parse(xml)?,
        None => Relationships::default(),
    };

    // Styles and strings come first; worksheet cells resolve against them.
    let (raw_styles, registry) = match package.get_part(STYLES_PART) {
        Some(xml) => {
            let raw = styles::parse_styles(xml)?;
            let registry = StyleRegistry::hydrate(&raw)?;
            (raw, registry)
        },
        None => (
            RawStylesheet::default(),
            StyleRegistry::new(&Style::default_style()),
        ),
    };

    let shared_strings = match package.get_part(SHARED_STRINGS_PART) {
        Some(xml) => strings::parse_shared_strings(xml)?,
        None => SharedStringTable::new(),
    };

    // The file's format index 0 is the workbook default style.
    let default_style = registry
        .style_for_index(0)
        .map(Arc::clone)
        .unwrap_or_else(|_| Style::default_style());

    let mut sheets = Vec::with_capacity(meta.sheets.len());
    let mut loaded_sheets = Vec::with_capacity(meta.sheets.len());

    for entry in &meta.sheets {
        let part_name = entry
            .rel_id
            .as_deref()
            .and_then(|id| workbook_rels.by_id(id))
            .map(|rel| resolve_target(WORKBOOK_PART, &rel.target))
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", entry.sheet_id));

        let sheet_xml = package.part(&part_name)?;
        let mut parsed = sheet::parse_worksheet(
            sheet_xml,
            &entry.name,
            entry.sheet_id,
            &registry,
            &shared_strings,
            meta.date_system,
            Arc::clone(&default_style),
        )?;
        parsed.worksheet.set_visibility(entry.visibility);

        // Bind table parts through the sheet's relationships.
        let rels_name = rels_part_name(&part_name);
        let rels_xml = package.get_part(&rels_name).map(str::to_string);
        let sheet_rels = match &rels_xml {
            Some(xml) => Relationships::parse(xml)?,
            None => Relationships::default(),
        };

        let mut table_parts = Vec::new();
        for rel_id in &parsed.table_rel_ids {
            let rel = sheet_rels.by_id(rel_id).ok_or_else(|| {
                Error::MalformedDocument(format!(
                    "sheet {:?} references unknown relationship {:?}",
                    entry.name, rel_id
                ))
            })?;
            if rel.rel_type != REL_TYPE_TABLE {
                continue;
            }
            let table_part_name = resolve_target(&part_name, &rel.target);
            let table_xml = package.part(&table_part_name)?;
            let parsed_table = table::parse_table(table_xml)?;
            parsed
                .worksheet
                .add_table_raw(parsed_table)
                .map_err(|e| match e {
                    Error::DuplicateName(msg) => Error::MalformedDocument(msg),
                    other => other,
                })?;
            table_parts.push((table_part_name, table_xml.to_string()));
        }

        let mut worksheet = parsed.worksheet;
        worksheet.mark_saved();
        sheets.push(worksheet);
        loaded_sheets.push(LoadedSheet {
            part_name,
            xml: sheet_xml.to_string(),
            rels_xml,
            table_parts,
        });
    }

    let mut defined_names = NamedRanges::new();
    for raw in &meta.defined_names {
        let mut named = NamedRange::new(&raw.name, &raw.reference, raw.local_sheet_id);
        named.comment = raw.comment.clone();
        named.hidden = raw.hidden;
        defined_names.add(named).map_err(|e| match e {
            Error::DuplicateName(msg) => Error::MalformedDocument(msg),
            other => other,
        })?;
    }

    Ok(Workbook::from_loaded(
        sheets,
        defined_names,
        meta.date_system,
        default_style,
        LoadedDocument {
            raw_styles,
            shared_strings,
            sheets: loaded_sheets,
        },
    ))
}
