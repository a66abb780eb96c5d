//! Thin A1-addressed writer over a worksheet, used by every sheet builder

use rtf_core::{CellAddress, CellRange, CellValue, Color, Result, Style, Worksheet};

pub(crate) struct SheetWriter<'a> {
    sheet: &'a mut Worksheet,
}

impl<'a> SheetWriter<'a> {
    pub(crate) fn new(sheet: &'a mut Worksheet, tab: Color) -> Self {
        sheet.set_tab_color(Some(tab));
        Self { sheet }
    }

    /// Value plus style
    pub(crate) fn put<V: Into<CellValue>>(&mut self, addr: &str, value: V, style: &Style) -> Result<()> {
        self.sheet.set_cell_value(addr, value)?;
        self.sheet.set_cell_style(addr, style)
    }

    /// Value with the default style
    pub(crate) fn plain<V: Into<CellValue>>(&mut self, addr: &str, value: V) -> Result<()> {
        self.sheet.set_cell_value(addr, value)
    }

    /// Style only; the cell stays empty
    pub(crate) fn style(&mut self, addr: &str, style: &Style) -> Result<()> {
        self.sheet.set_cell_style(addr, style)
    }

    pub(crate) fn formula(&mut self, addr: &str, formula: &str, style: &Style) -> Result<()> {
        self.sheet.set_cell_formula(addr, formula)?;
        self.sheet.set_cell_style(addr, style)
    }

    /// Same style across a row span, e.g. `("B", "H", 7)`
    pub(crate) fn style_span(&mut self, first: &str, last: &str, row: u32, style: &Style) -> Result<()> {
        let range = CellRange::parse(&format!("{first}{row}:{last}{row}"))?;
        for addr in range.cells() {
            self.sheet.set_cell_style_at(addr.row, addr.col, style)?;
        }
        Ok(())
    }

    /// Values written left to right starting at `start`
    pub(crate) fn row_values(&mut self, start: &str, values: &[&str], style: &Style) -> Result<()> {
        let start = CellAddress::parse(start)?;
        for (offset, value) in values.iter().enumerate() {
            let col = start.col + offset as u16;
            self.sheet.set_cell_value_at(start.row, col, *value)?;
            self.sheet.set_cell_style_at(start.row, col, style)?;
        }
        Ok(())
    }

    pub(crate) fn merge(&mut self, range: &str) -> Result<()> {
        self.sheet.merge_cells(&CellRange::parse(range)?)
    }

    /// Widths for a run of columns, e.g. `("D", "H", 15.0)`
    pub(crate) fn widths(&mut self, first: &str, last: &str, width: f64) -> Result<()> {
        let first = CellAddress::letters_to_column(first)?;
        let last = CellAddress::letters_to_column(last)?;
        for col in first..=last {
            self.sheet.set_column_width(col, width);
        }
        Ok(())
    }

    /// Height of a 1-based row
    pub(crate) fn height(&mut self, row: u32, height: f64) {
        self.sheet.set_row_height(row - 1, height);
    }
}
