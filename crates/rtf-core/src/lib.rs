//! # rtf-core
//!
//! In-memory document model used by the Return to Form workbook generator.
//!
//! - [`Workbook`] - ordered collection of uniquely named [`Worksheet`]s
//! - [`CellAddress`] and [`CellRange`] - A1-style addressing
//! - [`CellValue`] - text, numbers and formula strings
//! - [`Style`] - font, fill, border and alignment, pooled per sheet
//!
//! ## Example
//!
//! ```rust
//! use rtf_core::{CellRange, Style, Workbook};
//!
//! let mut workbook = Workbook::empty();
//! let idx = workbook.add_worksheet_with_name("Week 1").unwrap();
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//!
//! sheet.set_cell_value("A1", "WEEK 1 LOG").unwrap();
//! sheet.set_cell_style("A1", &Style::new().bold(true)).unwrap();
//! sheet.merge_cells(&CellRange::parse("A1:H1").unwrap()).unwrap();
//! sheet.set_cell_formula("D4", "=C4-B4").unwrap();
//! ```

pub mod cell;
pub mod error;
pub mod style;
pub mod workbook;
pub mod worksheet;

pub use cell::{CellAddress, CellData, CellError, CellRange, CellValue};
pub use error::{Error, Result};
pub use workbook::{DocumentProperties, Workbook};
pub use worksheet::Worksheet;

pub use style::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, Color, FillStyle, FontStyle,
    HorizontalAlignment, Style, StylePool, VerticalAlignment,
};

/// Maximum number of rows in a worksheet (Excel limit)
pub const MAX_ROWS: u32 = 1_048_576;

/// Maximum number of columns in a worksheet (Excel limit)
pub const MAX_COLS: u16 = 16_384;

/// Maximum length of a sheet name, in UTF-16 code units
pub const MAX_SHEET_NAME_LEN: usize = 31;
