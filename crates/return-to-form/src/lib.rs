//! # return-to-form
//!
//! Builds the "Return to Form - Ultimate Edition" training workbook: an
//! overview, core metrics, an RPE reference, one weekly log plus seven daily
//! logs per week, and a final summary, styled with one of four palettes
//! (Dark Knight by default).
//!
//! ## Example
//!
//! ```rust,no_run
//! use return_to_form::prelude::*;
//!
//! let plan = PlanConfig::default();
//! let workbook = build_workbook(&plan).unwrap();
//! assert_eq!(workbook.sheet_count(), 100);
//!
//! workbook.save(plan.output_path()).unwrap();
//! ```

pub mod calculation;
pub mod check;
pub mod error;
pub mod prelude;
pub mod template;

pub use calculation::{CalculationStats, WorkbookCalculationExt};
pub use check::{check_workbook, CheckReport};
pub use error::{Result, TemplateError};
pub use template::{build_workbook, generate, GenerateReport, PlanConfig, Theme};

// Re-export core types
pub use rtf_core::{
    Alignment, BorderEdge, BorderLineStyle, BorderStyle, CellAddress, CellData, CellError,
    CellRange, CellValue, Color, DocumentProperties, FillStyle, FontStyle, HorizontalAlignment,
    Style, StylePool, VerticalAlignment, Workbook, Worksheet, MAX_COLS, MAX_ROWS,
    MAX_SHEET_NAME_LEN,
};

// Re-export formula types
pub use rtf_formula::{
    evaluate, parse_formula, EvaluationContext, FormulaError, FormulaExpr, FormulaResult,
    FormulaValue,
};

// Re-export I/O types
pub use rtf_xlsx::{XlsxError, XlsxReader, XlsxWriter};

use std::path::Path;

/// Extension trait for Workbook to add file I/O
pub trait WorkbookExt {
    /// Open a workbook from an `.xlsx` file
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook>;

    /// Save the workbook to an `.xlsx` file
    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()>;
}

impl WorkbookExt for Workbook {
    fn open<P: AsRef<Path>>(path: P) -> Result<Workbook> {
        let path = path.as_ref();
        check_extension(path)?;
        Ok(XlsxReader::read_file(path)?)
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        check_extension(path)?;
        Ok(XlsxWriter::write_file(self, path)?)
    }
}

fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match extension.as_deref() {
        Some("xlsx") => Ok(()),
        _ => Err(rtf_core::Error::other(format!(
            "Unsupported file format: {}",
            path.display()
        ))
        .into()),
    }
}
