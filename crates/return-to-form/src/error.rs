//! Error type for workbook generation

use thiserror::Error;

/// Result type alias using [`TemplateError`]
pub type Result<T> = std::result::Result<T, TemplateError>;

/// Errors raised while building, checking, or saving the workbook
#[derive(Debug, Error)]
pub enum TemplateError {
    /// The document model rejected an operation
    #[error(transparent)]
    Core(#[from] rtf_core::Error),

    /// Reading or writing the XLSX package failed
    #[error(transparent)]
    Xlsx(#[from] rtf_xlsx::XlsxError),

    /// The plan configuration is out of range
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),
}
