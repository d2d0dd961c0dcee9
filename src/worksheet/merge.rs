//! Merged-range registry.
//!
//! Merged ranges on a sheet are a set of disjoint rectangles. Adding a
//! range that intersects an existing merge fails; merging a single cell
//! is a no-op. Row/column insertion and deletion keep the registry
//! consistent with the grid: merges shift, grow, or are clipped alongside
//! the cells they cover.

use crate::address::Range;
use crate::error::{Error, Result};

/// The disjoint set of merged ranges on one worksheet.
#[derive(Debug, Clone, Default)]
pub struct MergedRanges {
    ranges: Vec<Range>,
}

impl MergedRanges {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a merged range.
    ///
    /// Fails with [`Error::Overlap`] when the range intersects any existing
    /// merge. A single-cell range is accepted and ignored.
    pub fn add(&mut self, range: Range) -> Result<()> {
        if range.is_single_cell() {
            return Ok(());
        }
        if let Some(existing) = self.ranges.iter().find(|r| r.intersects(&range)) {
            return Err(Error::Overlap {
                new: range.to_a1(),
                existing: existing.to_a1(),
            });
        }
        self.ranges.push(range);
        Ok(())
    }

    /// Remove a merge matching the exact range. Returns whether one existed.
    pub fn remove(&mut self, range: &Range) -> bool {
        match self.ranges.iter().position(|r| r == range) {
            Some(pos) => {
                self.ranges.remove(pos);
                true
            },
            None => false,
        }
    }

    /// The merge covering the given range's top-left cell, if any.
    pub fn covering(&self, range: &Range) -> Option<&Range> {
        self.ranges.iter().find(|r| r.contains(range.first()))
    }

    /// Registered merges in insertion order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &Range> {
        self.ranges.iter()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Shift merges for a row insertion. Bounds were validated by the
    /// caller before any mutation started.
    pub(crate) fn insert_rows(&mut self, at: u32, count: u32) -> Result<()> {
        for range in &mut self.ranges {
            *range = range.with_rows_inserted(at, count)?;
        }
        Ok(())
    }

    pub(crate) fn insert_columns(&mut self, at: u32, count: u32) -> Result<()> {
        for range in &mut self.ranges {
            *range = range.with_columns_inserted(at, count)?;
        }
        Ok(())
    }

    /// Clip merges for a row deletion.
    ///
    /// Fully covered merges disappear; partially covered merges contract,
    /// and a merge left covering a single cell is dropped.
    pub(crate) fn delete_rows(&mut self, first: u32, count: u32) {
        self.ranges.retain_mut(|range| {
            match range.with_rows_deleted(first, count) {
                Some(clipped) if !clipped.is_single_cell() => {
                    *range = clipped;
                    true
                },
                _ => false,
            }
        });
    }

    pub(crate) fn delete_columns(&mut self, first: u32, count: u32) {
        self.ranges.retain_mut(|range| {
            match range.with_columns_deleted(first, count) {
                Some(clipped) if !clipped.is_single_cell() => {
                    *range = clipped;
                    true
                },
                _ => false,
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(a1: &str) -> Range {
        Range::from_a1(a1).unwrap()
    }

    #[test]
    fn test_overlap_rejected() {
        let mut merges = MergedRanges::new();
        merges.add(range("B2:C3")).unwrap();

        let err = merges.add(range("C3:D4")).unwrap_err();
        assert!(matches!(err, Error::Overlap { .. }));

        merges.add(range("D5:E6")).unwrap();
        assert_eq!(merges.len(), 2);
    }

    #[test]
    fn test_single_cell_is_noop() {
        let mut merges = MergedRanges::new();
        merges.add(range("B2")).unwrap();
        assert!(merges.is_empty());
    }

    #[test]
    fn test_remove_exact() {
        let mut merges = MergedRanges::new();
        merges.add(range("B2:C3")).unwrap();
        assert!(!merges.remove(&range("B2:B3")));
        assert!(merges.remove(&range("B2:C3")));
        assert!(merges.is_empty());
    }

    #[test]
    fn test_insert_rows_shifts_and_grows() {
        let mut merges = MergedRanges::new();
        merges.add(range("B5:C6")).unwrap();
        merges.add(range("B10:C11")).unwrap();

        merges.insert_rows(8, 2).unwrap();
        let shifted: Vec<String> = merges.iter().map(|r| r.to_a1()).collect();
        assert_eq!(shifted, vec!["B5:C6", "B12:C13"]);

        merges.insert_rows(6, 1).unwrap();
        let grown: Vec<String> = merges.iter().map(|r| r.to_a1()).collect();
        assert_eq!(grown, vec!["B5:C7", "B13:C14"]);
    }

    #[test]
    fn test_delete_rows_clips() {
        let mut merges = MergedRanges::new();
        merges.add(range("B2:C5")).unwrap();
        merges.add(range("B8:C9")).unwrap();

        // Rows 4-5 clip the first merge and shift the second.
        merges.delete_rows(4, 2);
        let after: Vec<String> = merges.iter().map(|r| r.to_a1()).collect();
        assert_eq!(after, vec!["B2:C3", "B6:C7"]);

        // Deleting everything a merge covers removes it.
        merges.delete_rows(6, 2);
        let after: Vec<String> = merges.iter().map(|r| r.to_a1()).collect();
        assert_eq!(after, vec!["B2:C3"]);
    }

    #[test]
    fn test_delete_collapsing_to_single_cell_drops_merge() {
        let mut merges = MergedRanges::new();
        merges.add(range("B2:B3")).unwrap();
        merges.delete_rows(3, 1);
        assert!(merges.is_empty());
    }
}
