//! The save pipeline.
//!
//! Two passes. The first walks the entire live model (every cell, every
//! row and column default) interning styles into the registry and text
//! into the shared-string builder, because any cell anywhere may reference
//! any table entry and the tables must be final before a single cell is
//! serialized. The second pass emits the parts using the finished index
//! mappings.
//!
//! On a round trip the registry and string builder are seeded from the
//! loaded tables in their original order, so sheets that have not been
//! touched can be carried over byte-for-byte and still reference valid
//! indices. The style and shared-string parts themselves are always
//! rebuilt.

pub mod sheet;
pub mod strings;
pub mod styles;
pub mod table;
pub mod workbook;

use std::collections::BTreeSet;

use crate::cell::CellContent;
use crate::error::{Error, Result};
use crate::package::{
    Package, REL_TYPE_SHARED_STRINGS, REL_TYPE_STYLES, REL_TYPE_TABLE, REL_TYPE_WORKSHEET,
    Relationships, SHARED_STRINGS_PART, STYLES_PART, WORKBOOK_PART, rels_part_name,
};
use crate::style::{RawStylesheet, StyleRegistry};
use crate::value::CellValue;
use crate::workbook::{LoadedDocument, LoadedSheet, Workbook};

/// Serialize a workbook to a package of parts.
pub(crate) fn save_document(workbook: &mut Workbook) -> Result<Package> {
    validate(workbook)?;

    // ---- pass 1: resolve styles and strings across the whole model ----

    let mut registry = match workbook.loaded() {
        Some(loaded) if !loaded.raw_styles.cell_xfs.is_empty() => {
            StyleRegistry::hydrate(&loaded.raw_styles)?
        },
        _ => StyleRegistry::new(workbook.default_style()),
    };
    let mut strings = workbook
        .loaded()
        .map(|loaded| loaded.shared_strings.clone())
        .unwrap_or_default();

    for sheet in workbook.sheets() {
        for (_, row) in sheet.rows() {
            if let Some(style) = row.style() {
                registry.register(style);
            }
        }
        for (_, column) in sheet.columns() {
            if let Some(style) = column.style() {
                registry.register(style);
            }
        }
        for (_, cell) in sheet.cells() {
            registry.register(cell.style());
            if let CellContent::Value(CellValue::Text(text)) = cell.content()
                && cell.shares_string()
            {
                match cell.rich_text() {
                    Some(rich) => {
                        strings.add_rich(rich.clone());
                    },
                    None => {
                        strings.add_plain(text);
                    },
                }
            }
        }
    }

    // ---- pass 2: emit parts with the finalized mappings ----

    let mut package = Package::new();
    package.insert_part(STYLES_PART, styles::styles_xml(&registry)?);

    let has_strings = !strings.is_empty();
    if has_strings {
        package.insert_part(SHARED_STRINGS_PART, strings::shared_strings_xml(&strings)?);
    }

    // Table part names already claimed by sheets carried over verbatim.
    let mut reserved_table_parts: BTreeSet<String> = BTreeSet::new();
    for (index, sheet) in workbook.sheets().iter().enumerate() {
        if sheet_is_clean(sheet)
            && let Some(loaded) = workbook.loaded().and_then(|l| l.sheets.get(index))
        {
            reserved_table_parts.extend(loaded.table_parts.iter().map(|(name, _)| name.clone()));
        }
    }

    let mut workbook_rels = Relationships::default();
    let mut sheet_rel_ids = Vec::with_capacity(workbook.sheet_count());
    let mut new_loaded_sheets = Vec::with_capacity(workbook.sheet_count());
    let mut next_table_part = 1usize;

    for (index, sheet) in workbook.sheets().iter().enumerate() {
        let loaded_sheet = workbook.loaded().and_then(|l| l.sheets.get(index));
        let part_name = loaded_sheet
            .map(|l| l.part_name.clone())
            .unwrap_or_else(|| format!("xl/worksheets/sheet{}.xml", sheet.sheet_id()));

        if let Some(loaded) = loaded_sheet
            && sheet_is_clean(sheet)
        {
            // Untouched since load: the stored bytes are still valid
            // because the seeded registries preserved their indices.
            package.insert_part(part_name.clone(), loaded.xml.clone());
            if let Some(rels_xml) = &loaded.rels_xml {
                package.insert_part(rels_part_name(&part_name), rels_xml.clone());
            }
            for (table_part, table_xml) in &loaded.table_parts {
                package.insert_part(table_part.clone(), table_xml.clone());
            }
            new_loaded_sheets.push(loaded.clone());
        } else {
            let mut sheet_rels = Relationships::default();
            let mut table_rel_ids = Vec::new();
            let mut table_parts = Vec::new();

            for table in sheet.tables() {
                let table_part = loop {
                    let candidate = format!("xl/tables/table{}.xml", next_table_part);
                    next_table_part += 1;
                    if !reserved_table_parts.contains(&candidate) {
                        break candidate;
                    }
                };
                let file_name = table_part
                    .rsplit_once('/')
                    .map(|(_, file)| file)
                    .unwrap_or(&table_part);
                let rel_id = sheet_rels.add(REL_TYPE_TABLE, format!("../tables/{}", file_name));
                table_rel_ids.push(rel_id);

                let table_xml = table::table_xml(table)?;
                package.insert_part(table_part.clone(), table_xml.clone());
                table_parts.push((table_part, table_xml));
            }

            let sheet_xml = sheet::worksheet_xml(
                sheet,
                &registry,
                &strings,
                workbook.date_system(),
                &table_rel_ids,
            )?;
            package.insert_part(part_name.clone(), sheet_xml.clone());

            let rels_xml = if sheet_rels.is_empty() {
                None
            } else {
                Some(sheet_rels.to_xml())
            };
            if let Some(rels_xml) = &rels_xml {
                package.insert_part(rels_part_name(&part_name), rels_xml.clone());
            }

            new_loaded_sheets.push(LoadedSheet {
                part_name: part_name.clone(),
                xml: sheet_xml,
                rels_xml,
                table_parts,
            });
        }

        let target = part_name
            .strip_prefix("xl/")
            .unwrap_or(&part_name)
            .to_string();
        sheet_rel_ids.push(workbook_rels.add(REL_TYPE_WORKSHEET, target));
    }

    workbook_rels.add(REL_TYPE_STYLES, "styles.xml");
    if has_strings {
        workbook_rels.add(REL_TYPE_SHARED_STRINGS, "sharedStrings.xml");
    }

    package.insert_part(
        WORKBOOK_PART,
        workbook::workbook_xml(
            workbook.sheets(),
            &sheet_rel_ids,
            workbook.defined_names(),
            workbook.date_system(),
        )?,
    );
    package.insert_part(rels_part_name(WORKBOOK_PART), workbook_rels.to_xml());

    // The emitted tables become the seed for the next save, keeping
    // consecutive saves stable.
    workbook.set_loaded(LoadedDocument {
        raw_styles: registry_to_raw(&registry),
        shared_strings: strings,
        sheets: new_loaded_sheets,
    });
    for sheet in workbook.sheets_mut() {
        sheet.mark_saved();
    }

    Ok(package)
}

/// A sheet's loaded part can be carried over only when nothing changed
/// and no deletion is pending against it.
fn sheet_is_clean(sheet: &crate::worksheet::Worksheet) -> bool {
    !sheet.is_dirty()
        && sheet.pending_deleted_rows().is_empty()
        && sheet.pending_deleted_cells().is_empty()
}

/// Re-linearize a registry into raw tables (the shape the next save's
/// seeding expects).
fn registry_to_raw(registry: &StyleRegistry) -> RawStylesheet {
    RawStylesheet {
        number_formats: registry.number_formats().to_vec(),
        fonts: registry.fonts().to_vec(),
        fills: registry.fills().to_vec(),
        borders: registry.borders().to_vec(),
        cell_style_xfs: Vec::new(),
        cell_xfs: registry.cell_xfs().to_vec(),
    }
}

/// Workbook-wide consistency checks, run before any output exists.
fn validate(workbook: &Workbook) -> Result<()> {
    let mut table_names: BTreeSet<String> = BTreeSet::new();

    for sheet in workbook.sheets() {
        for table in sheet.tables() {
            if table.fields().is_empty() {
                return Err(Error::InvalidState(format!(
                    "table {} has no fields",
                    table.name()
                )));
            }
            if table.fields().len() != table.range().column_count() as usize {
                return Err(Error::InvalidState(format!(
                    "table {} has {} fields for {} columns",
                    table.name(),
                    table.fields().len(),
                    table.range().column_count()
                )));
            }
            if !table_names.insert(table.name().to_ascii_lowercase()) {
                return Err(Error::DuplicateName(format!("table {:?}", table.name())));
            }
        }
    }

    for named in workbook.defined_names().iter() {
        if table_names.contains(&named.name.to_ascii_lowercase()) {
            return Err(Error::DuplicateName(format!(
                "defined name {:?} collides with a table",
                named.name
            )));
        }
    }

    Ok(())
}
