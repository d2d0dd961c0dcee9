//! Cell address and range primitives.
//!
//! Addresses are 1-based `(row, column)` coordinates bounded by the
//! worksheet grid (1,048,576 rows by 16,384 columns). They carry optional
//! fixed markers (`$A$1`) that affect display only; equality, ordering,
//! and hashing consider the coordinates alone.

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of rows in a worksheet.
pub const MAX_ROWS: u32 = 1_048_576;
/// Maximum number of columns in a worksheet.
pub const MAX_COLUMNS: u32 = 16_384;

/// Convert a column number to letters (e.g., 1 -> "A", 26 -> "Z", 27 -> "AA").
///
/// The encoding is pure base-26 with no zero digit; valid input is
/// `1..=16384` ("A" through "XFD").
pub fn column_letters_from_number(column: u32) -> Result<String> {
    if column == 0 || column > MAX_COLUMNS {
        return Err(Error::IndexOutOfRange {
            kind: "column",
            value: column as u64,
            max: MAX_COLUMNS,
        });
    }

    let mut letters = String::with_capacity(3);
    let mut col = column;
    while col > 0 {
        col -= 1;
        letters.insert(0, ((col % 26) as u8 + b'A') as char);
        col /= 26;
    }

    Ok(letters)
}

/// Convert column letters to a column number (A=1, Z=26, AA=27, ...).
///
/// Accepts one to three ASCII letters, case-insensitive.
pub fn column_number_from_letters(letters: &str) -> Result<u32> {
    if letters.is_empty() || letters.len() > 3 {
        return Err(Error::Format(format!("invalid column letters: {:?}", letters)));
    }

    let mut column = 0u32;
    for ch in letters.chars() {
        if !ch.is_ascii_alphabetic() {
            return Err(Error::Format(format!("invalid column letters: {:?}", letters)));
        }
        column = column * 26 + (ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1);
    }

    if column > MAX_COLUMNS {
        return Err(Error::Format(format!(
            "column {} beyond maximum {}",
            letters, MAX_COLUMNS
        )));
    }

    Ok(column)
}

/// A single cell address.
///
/// The fixed flags record `$` markers for display and round-trip; two
/// addresses with the same coordinates compare equal regardless of them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Address {
    row: u32,
    column: u32,
    fixed_row: bool,
    fixed_column: bool,
}

impl Address {
    /// Create an address, validating it against the worksheet bounds.
    pub fn new(row: u32, column: u32) -> Result<Self> {
        if row == 0 || row > MAX_ROWS {
            return Err(Error::IndexOutOfRange {
                kind: "row",
                value: row as u64,
                max: MAX_ROWS,
            });
        }
        if column == 0 || column > MAX_COLUMNS {
            return Err(Error::IndexOutOfRange {
                kind: "column",
                value: column as u64,
                max: MAX_COLUMNS,
            });
        }
        Ok(Self {
            row,
            column,
            fixed_row: false,
            fixed_column: false,
        })
    }

    /// Create an address with explicit fixed markers.
    pub fn with_fixed(row: u32, column: u32, fixed_row: bool, fixed_column: bool) -> Result<Self> {
        let mut address = Self::new(row, column)?;
        address.fixed_row = fixed_row;
        address.fixed_column = fixed_column;
        Ok(address)
    }

    /// Parse an A1-style reference (e.g. `B7`, `$C$12`).
    ///
    /// Malformed input, including out-of-bounds coordinates, is a
    /// [`Error::Format`] so callers can surface it as bad user input.
    pub fn from_a1(reference: &str) -> Result<Self> {
        let bytes = reference.as_bytes();
        let mut idx = 0usize;

        let fixed_column = bytes.first() == Some(&b'$');
        if fixed_column {
            idx += 1;
        }

        let col_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_alphabetic() {
            idx += 1;
        }
        if idx == col_start {
            return Err(Error::Format(format!("missing column in {:?}", reference)));
        }
        let column = column_number_from_letters(&reference[col_start..idx])?;

        let fixed_row = bytes.get(idx) == Some(&b'$');
        if fixed_row {
            idx += 1;
        }

        let row_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if row_start == idx || idx != bytes.len() {
            return Err(Error::Format(format!("invalid reference: {:?}", reference)));
        }

        let row: u32 = atoi_simd::parse::<_, false, false>(&bytes[row_start..idx])
            .map_err(|_| Error::Format(format!("invalid row in {:?}", reference)))?;
        if row == 0 || row > MAX_ROWS {
            return Err(Error::Format(format!(
                "row {} beyond maximum {}",
                row, MAX_ROWS
            )));
        }

        Ok(Self {
            row,
            column,
            fixed_row,
            fixed_column,
        })
    }

    /// Row number (1-based).
    #[inline]
    pub fn row(&self) -> u32 {
        self.row
    }

    /// Column number (1-based).
    #[inline]
    pub fn column(&self) -> u32 {
        self.column
    }

    /// Whether the row carries a `$` marker.
    #[inline]
    pub fn fixed_row(&self) -> bool {
        self.fixed_row
    }

    /// Whether the column carries a `$` marker.
    #[inline]
    pub fn fixed_column(&self) -> bool {
        self.fixed_column
    }

    /// Format as an A1 reference with explicit fixed markers.
    pub fn to_a1_with(&self, fixed_row: bool, fixed_column: bool) -> String {
        // The column was validated at construction, so the conversion
        // cannot fail.
        let mut letters = String::with_capacity(3);
        let mut col = self.column;
        while col > 0 {
            col -= 1;
            letters.insert(0, ((col % 26) as u8 + b'A') as char);
            col /= 26;
        }
        let mut out = String::with_capacity(letters.len() + 9);
        if fixed_column {
            out.push('$');
        }
        out.push_str(&letters);
        if fixed_row {
            out.push('$');
        }
        let mut buf = itoa::Buffer::new();
        out.push_str(buf.format(self.row));
        out
    }

    /// Format as an A1 reference using the stored fixed markers.
    #[inline]
    pub fn to_a1(&self) -> String {
        self.to_a1_with(self.fixed_row, self.fixed_column)
    }

    /// Format as an R1C1 reference (e.g. `R7C2`).
    pub fn to_r1c1(&self) -> String {
        let mut rows = itoa::Buffer::new();
        let mut cols = itoa::Buffer::new();
        format!("R{}C{}", rows.format(self.row), cols.format(self.column))
    }

    /// The address shifted by the given deltas, validated against bounds.
    pub fn offset(&self, row_delta: i64, column_delta: i64) -> Result<Self> {
        let row = self.row as i64 + row_delta;
        let column = self.column as i64 + column_delta;
        if row < 1 || row > MAX_ROWS as i64 {
            return Err(Error::IndexOutOfRange {
                kind: "row",
                value: row.max(0) as u64,
                max: MAX_ROWS,
            });
        }
        if column < 1 || column > MAX_COLUMNS as i64 {
            return Err(Error::IndexOutOfRange {
                kind: "column",
                value: column.max(0) as u64,
                max: MAX_COLUMNS,
            });
        }
        Ok(Self {
            row: row as u32,
            column: column as u32,
            fixed_row: self.fixed_row,
            fixed_column: self.fixed_column,
        })
    }
}

impl PartialEq for Address {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row && self.column == other.column
    }
}

impl Eq for Address {}

impl Hash for Address {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.row.hash(state);
        self.column.hash(state);
    }
}

impl PartialOrd for Address {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Address {
    /// Row-major ordering, so iterating a sorted collection walks the sheet
    /// top-to-bottom, left-to-right.
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        (self.row, self.column).cmp(&(other.row, other.column))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

/// A rectangular cell region, normalized so `first <= last`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    first: Address,
    last: Address,
}

impl Range {
    /// Create a range from two corners; the corners are normalized.
    pub fn new(a: Address, b: Address) -> Self {
        let (first_row, last_row) = if a.row() <= b.row() {
            (a.row(), b.row())
        } else {
            (b.row(), a.row())
        };
        let (first_col, last_col) = if a.column() <= b.column() {
            (a.column(), b.column())
        } else {
            (b.column(), a.column())
        };
        // Components come from validated addresses, so the corners are valid.
        Self {
            first: Address {
                row: first_row,
                column: first_col,
                fixed_row: a.fixed_row,
                fixed_column: a.fixed_column,
            },
            last: Address {
                row: last_row,
                column: last_col,
                fixed_row: b.fixed_row,
                fixed_column: b.fixed_column,
            },
        }
    }

    /// A single-cell range.
    #[inline]
    pub fn cell(address: Address) -> Self {
        Self {
            first: address,
            last: address,
        }
    }

    /// Parse an A1-style range (`A1:C3`) or single reference (`B2`).
    pub fn from_a1(reference: &str) -> Result<Self> {
        match memchr::memchr(b':', reference.as_bytes()) {
            Some(pos) => {
                let first = Address::from_a1(&reference[..pos])?;
                let last = Address::from_a1(&reference[pos + 1..])?;
                Ok(Self::new(first, last))
            },
            None => Ok(Self::cell(Address::from_a1(reference)?)),
        }
    }

    /// Top-left corner.
    #[inline]
    pub fn first(&self) -> Address {
        self.first
    }

    /// Bottom-right corner.
    #[inline]
    pub fn last(&self) -> Address {
        self.last
    }

    /// Number of rows spanned.
    #[inline]
    pub fn row_count(&self) -> u32 {
        self.last.row() - self.first.row() + 1
    }

    /// Number of columns spanned.
    #[inline]
    pub fn column_count(&self) -> u32 {
        self.last.column() - self.first.column() + 1
    }

    /// Number of cells covered.
    #[inline]
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.column_count() as u64
    }

    /// Whether the range covers exactly one cell.
    #[inline]
    pub fn is_single_cell(&self) -> bool {
        self.first == self.last
    }

    /// Whether the given address lies inside the range.
    #[inline]
    pub fn contains(&self, address: Address) -> bool {
        address.row() >= self.first.row()
            && address.row() <= self.last.row()
            && address.column() >= self.first.column()
            && address.column() <= self.last.column()
    }

    /// Whether another range lies entirely inside this one.
    #[inline]
    pub fn contains_range(&self, other: &Range) -> bool {
        self.contains(other.first) && self.contains(other.last)
    }

    /// Whether two ranges share at least one cell.
    #[inline]
    pub fn intersects(&self, other: &Range) -> bool {
        self.first.row() <= other.last.row()
            && other.first.row() <= self.last.row()
            && self.first.column() <= other.last.column()
            && other.first.column() <= self.last.column()
    }

    /// Format as an A1 range reference (`A1:C3`, or `B2` for a single cell).
    pub fn to_a1(&self) -> String {
        if self.is_single_cell() {
            self.first.to_a1_with(false, false)
        } else {
            format!(
                "{}:{}",
                self.first.to_a1_with(false, false),
                self.last.to_a1_with(false, false)
            )
        }
    }

    /// Format with `$` markers on every component, the shape defined names use.
    pub fn to_fixed_a1(&self) -> String {
        if self.is_single_cell() {
            self.first.to_a1_with(true, true)
        } else {
            format!(
                "{}:{}",
                self.first.to_a1_with(true, true),
                self.last.to_a1_with(true, true)
            )
        }
    }

    /// The range shifted by the given deltas, validated against bounds.
    pub fn offset(&self, row_delta: i64, column_delta: i64) -> Result<Self> {
        Ok(Self {
            first: self.first.offset(row_delta, column_delta)?,
            last: self.last.offset(row_delta, column_delta)?,
        })
    }

    /// The range after `count` rows are inserted above row `at`.
    ///
    /// A range entirely below the insertion point shifts down; a range the
    /// insertion point falls inside grows; a range above it is unchanged.
    /// Shifting past the bottom of the grid is an error.
    pub fn with_rows_inserted(&self, at: u32, count: u32) -> Result<Range> {
        if self.first.row() >= at {
            self.offset(count as i64, 0)
        } else if self.last.row() >= at {
            Ok(Range {
                first: self.first,
                last: self.last.offset(count as i64, 0)?,
            })
        } else {
            Ok(*self)
        }
    }

    /// The range after `count` columns are inserted left of column `at`.
    pub fn with_columns_inserted(&self, at: u32, count: u32) -> Result<Range> {
        if self.first.column() >= at {
            self.offset(0, count as i64)
        } else if self.last.column() >= at {
            Ok(Range {
                first: self.first,
                last: self.last.offset(0, count as i64)?,
            })
        } else {
            Ok(*self)
        }
    }

    /// The range after rows `first..first + count` are deleted.
    ///
    /// The deleted span is cut out of the range; `None` means every row of
    /// the range was deleted.
    pub fn with_rows_deleted(&self, first: u32, count: u32) -> Option<Range> {
        let deleted_last = first + count - 1;
        if self.last.row() < first {
            return Some(*self);
        }
        if self.first.row() > deleted_last {
            // Entirely below the deleted span; the offset cannot underflow.
            return self.offset(-(count as i64), 0).ok();
        }

        let survives_above = self.first.row() < first;
        let survives_below = self.last.row() > deleted_last;
        if !survives_above && !survives_below {
            return None;
        }

        let first_row = if survives_above { self.first.row() } else { first };
        let last_row = if survives_below {
            self.last.row() - count
        } else {
            first - 1
        };
        Some(Range {
            first: Address {
                row: first_row,
                column: self.first.column(),
                fixed_row: self.first.fixed_row,
                fixed_column: self.first.fixed_column,
            },
            last: Address {
                row: last_row,
                column: self.last.column(),
                fixed_row: self.last.fixed_row,
                fixed_column: self.last.fixed_column,
            },
        })
    }

    /// The range after columns `first..first + count` are deleted.
    pub fn with_columns_deleted(&self, first: u32, count: u32) -> Option<Range> {
        let deleted_last = first + count - 1;
        if self.last.column() < first {
            return Some(*self);
        }
        if self.first.column() > deleted_last {
            return self.offset(0, -(count as i64)).ok();
        }

        let survives_left = self.first.column() < first;
        let survives_right = self.last.column() > deleted_last;
        if !survives_left && !survives_right {
            return None;
        }

        let first_col = if survives_left {
            self.first.column()
        } else {
            first
        };
        let last_col = if survives_right {
            self.last.column() - count
        } else {
            first - 1
        };
        Some(Range {
            first: Address {
                row: self.first.row(),
                column: first_col,
                fixed_row: self.first.fixed_row,
                fixed_column: self.first.fixed_column,
            },
            last: Address {
                row: self.last.row(),
                column: last_col,
                fixed_row: self.last.fixed_row,
                fixed_column: self.last.fixed_column,
            },
        })
    }

    /// Iterate every address in the range, row-major.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        let (fr, lr) = (self.first.row(), self.last.row());
        let (fc, lc) = (self.first.column(), self.last.column());
        (fr..=lr).flat_map(move |row| {
            (fc..=lc).map(move |column| Address {
                row,
                column,
                fixed_row: false,
                fixed_column: false,
            })
        })
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_a1())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letters_from_number(1).unwrap(), "A");
        assert_eq!(column_letters_from_number(26).unwrap(), "Z");
        assert_eq!(column_letters_from_number(27).unwrap(), "AA");
        assert_eq!(column_letters_from_number(702).unwrap(), "ZZ");
        assert_eq!(column_letters_from_number(703).unwrap(), "AAA");
        assert_eq!(column_letters_from_number(16384).unwrap(), "XFD");
        assert!(column_letters_from_number(0).is_err());
        assert!(column_letters_from_number(16385).is_err());
    }

    #[test]
    fn test_column_numbers() {
        assert_eq!(column_number_from_letters("A").unwrap(), 1);
        assert_eq!(column_number_from_letters("z").unwrap(), 26);
        assert_eq!(column_number_from_letters("AA").unwrap(), 27);
        assert_eq!(column_number_from_letters("XFD").unwrap(), 16384);
        assert!(column_number_from_letters("").is_err());
        assert!(column_number_from_letters("XFE").is_err());
        assert!(column_number_from_letters("A1").is_err());
    }

    #[test]
    fn test_parse_a1() {
        let addr = Address::from_a1("B7").unwrap();
        assert_eq!(addr.row(), 7);
        assert_eq!(addr.column(), 2);
        assert!(!addr.fixed_row());

        let fixed = Address::from_a1("$C$12").unwrap();
        assert_eq!(fixed.column(), 3);
        assert_eq!(fixed.row(), 12);
        assert!(fixed.fixed_row());
        assert!(fixed.fixed_column());
        assert_eq!(fixed.to_a1(), "$C$12");

        assert!(Address::from_a1("A0").is_err());
        assert!(Address::from_a1("7").is_err());
        assert!(Address::from_a1("A").is_err());
        assert!(Address::from_a1("A1B").is_err());
        assert!(Address::from_a1("A1048577").is_err());
    }

    #[test]
    fn test_fixed_markers_do_not_affect_equality() {
        let plain = Address::from_a1("D4").unwrap();
        let fixed = Address::from_a1("$D$4").unwrap();
        assert_eq!(plain, fixed);

        use std::collections::HashSet;
        let mut set = HashSet::new();
        set.insert(plain);
        assert!(set.contains(&fixed));
    }

    #[test]
    fn test_bounds() {
        assert!(Address::new(1_048_576, 16_384).is_ok());
        assert!(matches!(
            Address::new(1_048_577, 1),
            Err(Error::IndexOutOfRange { kind: "row", .. })
        ));
        assert!(matches!(
            Address::new(1, 16_385),
            Err(Error::IndexOutOfRange { kind: "column", .. })
        ));
    }

    #[test]
    fn test_r1c1() {
        assert_eq!(Address::from_a1("B7").unwrap().to_r1c1(), "R7C2");
    }

    #[test]
    fn test_range_normalization() {
        let range = Range::from_a1("C3:A1").unwrap();
        assert_eq!(range.to_a1(), "A1:C3");
        assert_eq!(range.row_count(), 3);
        assert_eq!(range.column_count(), 3);
    }

    #[test]
    fn test_range_predicates() {
        let range = Range::from_a1("B2:D5").unwrap();
        assert!(range.contains(Address::from_a1("C3").unwrap()));
        assert!(!range.contains(Address::from_a1("A1").unwrap()));

        let overlapping = Range::from_a1("D5:E6").unwrap();
        let disjoint = Range::from_a1("E6:F7").unwrap();
        assert!(range.intersects(&overlapping));
        assert!(!range.intersects(&disjoint));
        assert!(range.contains_range(&Range::from_a1("B2:C3").unwrap()));
    }

    #[test]
    fn test_insert_rows_arithmetic() {
        let below = Range::from_a1("A5:C8").unwrap();
        assert_eq!(below.with_rows_inserted(3, 2).unwrap().to_a1(), "A7:C10");

        let spanning = Range::from_a1("A5:C8").unwrap();
        assert_eq!(spanning.with_rows_inserted(6, 2).unwrap().to_a1(), "A5:C10");

        let above = Range::from_a1("A5:C8").unwrap();
        assert_eq!(above.with_rows_inserted(9, 2).unwrap().to_a1(), "A5:C8");
    }

    #[test]
    fn test_delete_rows_arithmetic() {
        let range = Range::from_a1("B4:D8").unwrap();
        // Span below the range: shift up.
        assert_eq!(range.with_rows_deleted(9, 2).unwrap().to_a1(), "B4:D8");
        // Span above the range: shift up.
        assert_eq!(range.with_rows_deleted(1, 2).unwrap().to_a1(), "B2:D6");
        // Span inside the range: contract.
        assert_eq!(range.with_rows_deleted(5, 2).unwrap().to_a1(), "B4:D6");
        // Span clipping the top edge.
        assert_eq!(range.with_rows_deleted(3, 3).unwrap().to_a1(), "B3:D5");
        // Span clipping the bottom edge.
        assert_eq!(range.with_rows_deleted(7, 5).unwrap().to_a1(), "B4:D6");
        // Span covering the whole range.
        assert!(range.with_rows_deleted(4, 5).is_none());
    }

    #[test]
    fn test_range_offset() {
        let range = Range::from_a1("A1:C5").unwrap();
        let shifted = range.offset(2, 0).unwrap();
        assert_eq!(shifted.to_a1(), "A3:C7");
        assert!(Range::from_a1("A1048575:A1048576").unwrap().offset(1, 0).is_err());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn column_letters_round_trip(n in 1u32..=MAX_COLUMNS) {
                let letters = column_letters_from_number(n).unwrap();
                prop_assert_eq!(column_number_from_letters(&letters).unwrap(), n);
            }

            #[test]
            fn a1_round_trip(row in 1u32..=MAX_ROWS, col in 1u32..=MAX_COLUMNS) {
                let addr = Address::new(row, col).unwrap();
                let parsed = Address::from_a1(&addr.to_a1()).unwrap();
                prop_assert_eq!(parsed, addr);
            }
        }
    }
}
