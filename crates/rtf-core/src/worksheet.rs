//! Worksheet type

use std::collections::BTreeMap;

use crate::cell::{CellAddress, CellData, CellRange, CellStorage, CellValue};
use crate::error::{Error, Result};
use crate::style::{Color, Style, StylePool};
use crate::{MAX_COLS, MAX_ROWS};

/// A single named sheet
#[derive(Debug)]
pub struct Worksheet {
    name: String,
    cells: CellStorage,
    tab_color: Option<Color>,
}

impl Worksheet {
    /// Create an empty worksheet. Names are validated by the workbook.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            cells: CellStorage::new(),
            tab_color: None,
        }
    }

    /// Sheet name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tab color
    pub fn tab_color(&self) -> Option<Color> {
        self.tab_color
    }

    /// Set or clear the tab color
    pub fn set_tab_color(&mut self, color: Option<Color>) {
        self.tab_color = color;
    }

    // === Cell access ===

    /// Cell by A1 address
    pub fn cell(&self, address: &str) -> Result<Option<&CellData>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cells.get(addr.row, addr.col))
    }

    /// Cell by indices
    pub fn cell_at(&self, row: u32, col: u16) -> Option<&CellData> {
        self.cells.get(row, col)
    }

    /// Value by A1 address, `Empty` when unset
    pub fn get_value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.get_value_at(addr.row, addr.col))
    }

    /// Value by indices, `Empty` when unset
    pub fn get_value_at(&self, row: u32, col: u16) -> CellValue {
        self.cells
            .get(row, col)
            .map(|c| c.value.clone())
            .unwrap_or_default()
    }

    /// Non-default style of a cell, if any
    pub fn cell_style_at(&self, row: u32, col: u16) -> Option<&Style> {
        match self.cells.get(row, col).map(|c| c.style_index) {
            None | Some(0) => None,
            Some(idx) => self.cells.style_pool().get(idx),
        }
    }

    /// Non-default style of a cell by A1 address, if any
    pub fn cell_style(&self, address: &str) -> Result<Option<&Style>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.cell_style_at(addr.row, addr.col))
    }

    /// Styles used by this sheet
    pub fn style_pool(&self) -> &StylePool {
        self.cells.style_pool()
    }

    // === Cell modification ===

    /// Set a value by A1 address
    pub fn set_cell_value<V: Into<CellValue>>(&mut self, address: &str, value: V) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_value_at(addr.row, addr.col, value)
    }

    /// Set a value by indices
    pub fn set_cell_value_at<V: Into<CellValue>>(
        &mut self,
        row: u32,
        col: u16,
        value: V,
    ) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set_value(row, col, value.into());
        Ok(())
    }

    /// Set a formula by A1 address; the leading `=` is optional
    pub fn set_cell_formula(&mut self, address: &str, formula: &str) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_formula_at(addr.row, addr.col, formula)
    }

    /// Set a formula by indices; the leading `=` is optional
    pub fn set_cell_formula_at(&mut self, row: u32, col: u16, formula: &str) -> Result<()> {
        validate_cell_position(row, col)?;
        self.cells.set_value(row, col, CellValue::formula(formula));
        Ok(())
    }

    /// Set a style by A1 address
    pub fn set_cell_style(&mut self, address: &str, style: &Style) -> Result<()> {
        let addr = CellAddress::parse(address)?;
        self.set_cell_style_at(addr.row, addr.col, style)
    }

    /// Set a style by indices. A styled cell is kept even without a value.
    pub fn set_cell_style_at(&mut self, row: u32, col: u16, style: &Style) -> Result<()> {
        validate_cell_position(row, col)?;
        let style_index = self.cells.style_pool.get_or_insert(style.clone());
        self.cells.set_style(row, col, style_index);
        Ok(())
    }

    /// Bounds of all stored cells
    pub fn used_range(&self) -> Option<CellRange> {
        self.cells
            .used_bounds()
            .map(|(min_row, min_col, max_row, max_col)| {
                CellRange::from_indices(min_row, min_col, max_row, max_col)
            })
    }

    /// Number of stored cells
    pub fn cell_count(&self) -> usize {
        self.cells.cell_count()
    }

    /// True when no cells are stored
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// All stored cells in row-major order
    pub fn iter_cells(&self) -> impl Iterator<Item = (u32, u16, &CellData)> {
        self.cells.iter()
    }

    /// Cells of one row
    pub fn iter_row(&self, row: u32) -> impl Iterator<Item = (u16, &CellData)> {
        self.cells.iter_row(row)
    }

    /// Rows that hold at least one cell
    pub fn row_indices(&self) -> impl Iterator<Item = u32> + '_ {
        self.cells.row_indices()
    }

    // === Rows and columns ===

    /// Row height in points
    pub fn row_height(&self, row: u32) -> f64 {
        self.cells.row_height(row)
    }

    /// Set a custom row height in points
    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.cells.set_row_height(row, height);
    }

    /// Column width in characters
    pub fn column_width(&self, col: u16) -> f64 {
        self.cells.column_width(col)
    }

    /// Set a custom column width in characters
    pub fn set_column_width(&mut self, col: u16, width: f64) {
        self.cells.set_column_width(col, width);
    }

    /// Rows with a custom height
    pub fn custom_row_heights(&self) -> &BTreeMap<u32, f64> {
        self.cells.custom_row_heights()
    }

    /// Columns with a custom width
    pub fn custom_column_widths(&self) -> &BTreeMap<u16, f64> {
        self.cells.custom_column_widths()
    }

    // === Merged cells ===

    /// Merged regions in insertion order
    pub fn merged_regions(&self) -> &[CellRange] {
        self.cells.merged_regions()
    }

    /// Merge a range. Fails if it overlaps an existing merged region.
    pub fn merge_cells(&mut self, range: &CellRange) -> Result<()> {
        if let Some(existing) = self.cells.find_overlapping_merge(range) {
            return Err(Error::MergedCellConflict {
                new: range.to_string(),
                existing: existing.to_string(),
            });
        }
        validate_cell_position(range.end.row, range.end.col)?;
        self.cells.push_merged_region(*range);
        Ok(())
    }

    /// True if the cell belongs to a merged region
    pub fn is_merged(&self, row: u32, col: u16) -> bool {
        self.cells.is_merged(row, col)
    }

    // === Formula calculation support ===

    /// All formula cells as (row, col, formula text)
    pub fn formula_cells(&self) -> impl Iterator<Item = (u32, u16, &str)> {
        self.cells
            .iter()
            .filter_map(|(row, col, cell)| cell.value.formula_text().map(|f| (row, col, f)))
    }

    /// Formula text at a position, if the cell holds a formula
    pub fn get_formula_at(&self, row: u32, col: u16) -> Option<&str> {
        self.cells
            .get(row, col)
            .and_then(|cell| cell.value.formula_text())
    }

    /// Store the calculated result of a formula cell
    pub fn set_formula_result(&mut self, row: u32, col: u16, value: CellValue) -> Result<()> {
        let addr = CellAddress::new(row, col);
        let cell = self
            .cells
            .get_mut(row, col)
            .ok_or_else(|| Error::InvalidAddress(format!("{} is empty", addr)))?;

        match &mut cell.value {
            CellValue::Formula { cached_value, .. } => {
                *cached_value = Some(Box::new(value));
                Ok(())
            }
            _ => Err(Error::InvalidAddress(format!("{} is not a formula", addr))),
        }
    }

    /// Calculated value of a formula cell, or the plain value
    pub fn get_calculated_value_at(&self, row: u32, col: u16) -> Option<&CellValue> {
        self.cells.get(row, col).map(|cell| cell.value.effective_value())
    }
}

fn validate_cell_position(row: u32, col: u16) -> Result<()> {
    if row >= MAX_ROWS {
        return Err(Error::RowOutOfBounds(row, MAX_ROWS - 1));
    }
    if col >= MAX_COLS {
        return Err(Error::ColumnOutOfBounds(col, MAX_COLS - 1));
    }
    Ok(())
}
