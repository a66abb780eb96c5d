//! Sparse cell storage
//!
//! Cells live in a row-major `BTreeMap<row, BTreeMap<col, CellData>>` so the
//! writer can stream rows in order. Cells with no value and the default style
//! are never stored.

use std::collections::BTreeMap;

use super::{CellRange, CellValue};
use crate::style::StylePool;

/// Default row height in points
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;

/// Default column width in characters
pub const DEFAULT_COLUMN_WIDTH: f64 = 8.43;

/// A stored cell: value plus index into the sheet's style pool
#[derive(Debug, Clone, PartialEq)]
pub struct CellData {
    /// The cell's value
    pub value: CellValue,
    /// Index into the style pool (0 = default style)
    pub style_index: u32,
}

impl CellData {
    /// Create a cell with the default style
    pub fn new(value: CellValue) -> Self {
        Self {
            value,
            style_index: 0,
        }
    }

    /// Create a cell with a style
    pub fn with_style(value: CellValue, style_index: u32) -> Self {
        Self { value, style_index }
    }

    /// No value and default style
    pub fn is_empty(&self) -> bool {
        self.value.is_empty() && self.style_index == 0
    }
}

/// Storage for one worksheet's cells and sheet-level layout
#[derive(Debug, Default)]
pub struct CellStorage {
    rows: BTreeMap<u32, BTreeMap<u16, CellData>>,
    pub(crate) style_pool: StylePool,
    row_heights: BTreeMap<u32, f64>,
    column_widths: BTreeMap<u16, f64>,
    merged_regions: Vec<CellRange>,
}

impl CellStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a cell
    pub fn get(&self, row: u32, col: u16) -> Option<&CellData> {
        self.rows.get(&row).and_then(|r| r.get(&col))
    }

    /// Get a mutable cell
    pub fn get_mut(&mut self, row: u32, col: u16) -> Option<&mut CellData> {
        self.rows.get_mut(&row).and_then(|r| r.get_mut(&col))
    }

    /// Store a cell, removing it when `data` is empty
    pub fn set(&mut self, row: u32, col: u16, data: CellData) {
        if data.is_empty() {
            self.remove(row, col);
        } else {
            self.rows.entry(row).or_default().insert(col, data);
        }
    }

    /// Replace the value, keeping the style
    pub fn set_value(&mut self, row: u32, col: u16, value: CellValue) {
        let style_index = self.get(row, col).map_or(0, |c| c.style_index);
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Replace the style, keeping the value
    pub fn set_style(&mut self, row: u32, col: u16, style_index: u32) {
        let value = self
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default();
        self.set(row, col, CellData::with_style(value, style_index));
    }

    /// Remove a cell
    pub fn remove(&mut self, row: u32, col: u16) -> Option<CellData> {
        let row_map = self.rows.get_mut(&row)?;
        let removed = row_map.remove(&col);
        if row_map.is_empty() {
            self.rows.remove(&row);
        }
        removed
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.rows.values().map(|r| r.len()).sum()
    }

    /// True when no cells are stored
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Bounds of stored cells as (min_row, min_col, max_row, max_col)
    pub fn used_bounds(&self) -> Option<(u32, u16, u32, u16)> {
        let min_row = *self.rows.keys().next()?;
        let max_row = *self.rows.keys().next_back()?;

        let mut min_col = u16::MAX;
        let mut max_col = 0u16;
        for cols in self.rows.values() {
            if let Some(&col) = cols.keys().next() {
                min_col = min_col.min(col);
            }
            if let Some(&col) = cols.keys().next_back() {
                max_col = max_col.max(col);
            }
        }

        Some((min_row, min_col, max_row, max_col))
    }

    /// Iterate over all cells in row-major order
    pub fn iter(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.rows
            .iter()
            .flat_map(|(&row, cols)| cols.iter().map(move |(&col, data)| (row, col, data)))
    }

    /// Iterate over the cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.rows
            .get(&row)
            .into_iter()
            .flat_map(|cols| cols.iter().map(|(&col, data)| (col, data)))
    }

    /// Row indices that hold at least one cell
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }

    /// Height of a row in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.row_heights
            .get(&row)
            .copied()
            .unwrap_or(DEFAULT_ROW_HEIGHT)
    }

    /// Set a custom row height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Width of a column in characters
    pub fn column_width(&self, col: u16) -> f64 {
        self.column_widths
            .get(&col)
            .copied()
            .unwrap_or(DEFAULT_COLUMN_WIDTH)
    }

    /// Set a custom column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.column_widths.insert(col, width);
    }

    /// Rows with a custom height
    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        &self.row_heights
    }

    /// Columns with a custom width
    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        &self.column_widths
    }

    /// Merged regions in insertion order
    pub fn merged_regions(&self) -> &[CellRange] {
        &self.merged_regions
    }

    /// First merged region overlapping `range`
    pub fn find_overlapping_merge(&self, range: &CellRange) -> Option<&CellRange> {
        self.merged_regions.iter().find(|m| m.overlaps(range))
    }

    pub(crate) fn push_merged_region(&mut self, range: CellRange) {
        self.merged_regions.push(range);
    }

    /// True if the cell is part of a merged region
    pub fn is_merged(&self, row: u32, col: u16) -> bool {
        let addr = super::CellAddress::new(row, col);
        self.merged_regions.iter().any(|m| m.contains(&addr))
    }

    /// Style pool for this sheet
    pub fn style_pool(&self) -> &StylePool {
        &self.style_pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cells_not_stored() {
        let mut storage = CellStorage::new();

        storage.set(0, 0, CellData::new(CellValue::Number(42.0)));
        assert_eq!(storage.cell_count(), 1);

        storage.set(0, 0, CellData::new(CellValue::Empty));
        assert_eq!(storage.cell_count(), 0);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_style_only_cell_is_kept() {
        let mut storage = CellStorage::new();

        storage.set_style(4, 1, 3);
        let cell = storage.get(4, 1).unwrap();
        assert!(cell.value.is_empty());
        assert_eq!(cell.style_index, 3);

        storage.set_value(4, 1, CellValue::from("Starting Value:"));
        assert_eq!(storage.get(4, 1).unwrap().style_index, 3);
    }

    #[test]
    fn test_used_bounds() {
        let mut storage = CellStorage::new();
        assert!(storage.used_bounds().is_none());

        storage.set(5, 3, CellData::new(CellValue::Number(1.0)));
        storage.set(10, 7, CellData::new(CellValue::Number(2.0)));
        storage.set(2, 1, CellData::new(CellValue::Number(3.0)));

        assert_eq!(storage.used_bounds(), Some((2, 1, 10, 7)));
    }

    #[test]
    fn test_row_major_iteration() {
        let mut storage = CellStorage::new();
        storage.set(1, 0, CellData::new(CellValue::Number(3.0)));
        storage.set(0, 1, CellData::new(CellValue::Number(2.0)));
        storage.set(0, 0, CellData::new(CellValue::Number(1.0)));

        let order: Vec<_> = storage.iter().map(|(r, c, _)| (r, c)).collect();
        assert_eq!(order, vec![(0, 0), (0, 1), (1, 0)]);
    }

    #[test]
    fn test_layout_defaults() {
        let mut storage = CellStorage::new();
        assert_eq!(storage.row_height(0), DEFAULT_ROW_HEIGHT);
        assert_eq!(storage.column_width(0), DEFAULT_COLUMN_WIDTH);

        storage.set_row_height(11, 100.0);
        storage.set_column_width(2, 50.0);
        assert_eq!(storage.row_height(11), 100.0);
        assert_eq!(storage.column_width(2), 50.0);
        assert_eq!(storage.custom_row_heights().len(), 1);
    }
}
