//! Prelude module - common imports for return-to-form users
//!
//! ```rust
//! use return_to_form::prelude::*;
//! ```

pub use crate::{
    build_workbook,
    check_workbook,
    generate,
    // Cell types
    CellAddress,
    CellRange,
    CellValue,
    // Style types
    Color,
    Style,
    // Errors
    Result,
    TemplateError,
    // Template
    PlanConfig,
    Theme,
    // Main types
    Workbook,
    // Extension traits
    WorkbookCalculationExt,
    WorkbookExt,
    Worksheet,
};
