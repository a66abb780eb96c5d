//! Formula error types

use rtf_core::CellError;
use thiserror::Error;

/// Result type for formula operations
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while parsing or evaluating a formula
#[derive(Debug, Error, PartialEq)]
pub enum FormulaError {
    /// The formula text is malformed or exceeds the parser limits
    #[error("Parse error: {0}")]
    Parse(String),

    /// Function name not supported by the evaluator
    #[error("Unknown function: {0}")]
    UnknownFunction(String),
}

impl FormulaError {
    /// The error value a spreadsheet shows in place of the result
    pub fn cell_error(&self) -> CellError {
        match self {
            FormulaError::Parse(_) | FormulaError::UnknownFunction(_) => CellError::Name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_error() {
        assert_eq!(FormulaError::Parse("=C4-".into()).cell_error(), CellError::Name);
        assert_eq!(
            FormulaError::UnknownFunction("AVERAGE".into()).cell_error(),
            CellError::Name
        );
    }
}
