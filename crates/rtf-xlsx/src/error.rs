//! XLSX error types

use thiserror::Error;

/// Result type for XLSX operations
pub type XlsxResult<T> = std::result::Result<T, XlsxError>;

/// Errors that can occur while reading or writing XLSX
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// ZIP error
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// XML error
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The package is not an XLSX file
    #[error("Invalid XLSX format: {0}")]
    InvalidFormat(String),

    /// A required part is missing from the package
    #[error("Missing required part: {0}")]
    MissingPart(String),

    /// A value inside a part could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// The document model rejected the content
    #[error("Core error: {0}")]
    Core(#[from] rtf_core::Error),
}
