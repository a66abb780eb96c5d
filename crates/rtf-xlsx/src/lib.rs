//! # rtf-xlsx
//!
//! XLSX (Office Open XML) writer and reader for rtf-core workbooks.
//!
//! The writer is deterministic: the same workbook always produces the same
//! bytes. Zip entries carry a fixed timestamp and the creation date in
//! `docProps/core.xml` is only written when the workbook sets one.
//!
//! The reader understands the parts the writer produces (inline strings,
//! numbers, formulas with cached values, styles, merges, column widths, row
//! heights, tab colors and document properties) plus shared strings.

pub mod error;
pub mod reader;
pub mod writer;

mod styles;

pub use error::{XlsxError, XlsxResult};
pub use reader::XlsxReader;
pub use writer::XlsxWriter;
