//! Quince - an in-memory spreadsheet document model with OOXML load/save
//!
//! This library models a workbook (sheets, cells, rows, columns, styles,
//! merged ranges, tables, defined names) that can be built or mutated
//! through an object API and serialized to and from the OOXML
//! spreadsheet package format, expressed as named XML parts.
//!
//! The centerpiece is the style resolution engine: styles live on cells
//! as shared immutable values, and the [`style::StyleRegistry`] interns
//! them into the deduplicated, indexed tables (`fonts`, `fills`,
//! `borders`, `numFmts`, `cellXfs`) the file format stores, and
//! hydrates those tables back into shared values on load. Text cells go
//! through the same motion via the [`shared_strings::SharedStringTable`].
//!
//! The physical ZIP container is out of scope: a [`package::Package`] is
//! an ordered map of part name to XML text, produced and consumed by
//! whatever container layer sits outside.
//!
//! # Example - Building a workbook
//!
//! ```
//! use quince::workbook::Workbook;
//! use quince::address::Address;
//! use quince::style::{Color, Font};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut wb = Workbook::new();
//! let sheet = wb.add_sheet("Report")?;
//!
//! sheet.set_cell_value(Address::from_a1("A1")?, "Revenue");
//! sheet.set_cell_value(Address::from_a1("B1")?, 1250.75);
//! sheet.cell(Address::from_a1("A1")?).modify_style(|s| {
//!     s.with_font(Font::new().with_bold(true).with_color(Color::rgb("FF0000")))
//! });
//!
//! let package = wb.save()?;
//! assert!(package.get_part("xl/worksheets/sheet1.xml").is_some());
//! # Ok(())
//! # }
//! ```
//!
//! # Example - Round trip
//!
//! ```
//! use quince::workbook::Workbook;
//! use quince::address::Address;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut wb = Workbook::new();
//! wb.add_sheet("Data")?
//!     .set_cell_value(Address::from_a1("C3")?, 42.0);
//! let package = wb.save()?;
//!
//! let reloaded = Workbook::open(&package)?;
//! let value = reloaded.sheet(0).unwrap().cell_value(Address::from_a1("C3")?);
//! assert_eq!(value, quince::value::CellValue::Number(42.0));
//! # Ok(())
//! # }
//! ```

/// Cell address and range primitives (A1/R1C1 references, bounds,
/// shifting arithmetic).
pub mod address;

/// Cells: typed values, opaque formulas, shared style references.
pub mod cell;

/// Crate-wide error types.
pub mod error;

/// Defined names (named ranges) with workbook or sheet scope.
pub mod named_range;

/// The package boundary: named XML parts and relationships.
pub mod package;

/// The load pipeline (package parts to object model).
pub mod reader;

/// Rich text runs and phonetic guides.
pub mod rich_text;

/// The deduplicating shared-string table.
pub mod shared_strings;

/// Style value objects and the interning registry.
pub mod style;

/// Tables (structured ranges) with field maps.
pub mod table;

/// Typed cell values and serial-number conversion.
pub mod value;

/// The workbook document root.
pub mod workbook;

/// Worksheets: sparse cell/row/column collections, merges, structural
/// edits.
pub mod worksheet;

/// The save pipeline (object model to package parts).
pub mod writer;

pub(crate) mod xml;

// Re-export the types most callers touch.
pub use address::{Address, Range};
pub use cell::{Cell, CellFormula};
pub use error::{Error, Result};
pub use package::Package;
pub use style::Style;
pub use value::CellValue;
pub use workbook::Workbook;
pub use worksheet::Worksheet;
