//! # rtf-formula
//!
//! Parser and evaluator for the spreadsheet formulas the workbook template
//! emits: cell and range references, arithmetic, and `SUM`.
//!
//! - Parsing (text → [`FormulaExpr`])
//! - Evaluation ([`FormulaExpr`] → [`FormulaValue`]) against a workbook
//! - Dependency ordering for whole-workbook calculation
//!
//! ## Example
//!
//! ```rust
//! use rtf_formula::{evaluate, parse_formula, EvaluationContext, FormulaValue};
//!
//! let ast = parse_formula("=(10-4)/2").unwrap();
//! let value = evaluate(&ast, &EvaluationContext::simple()).unwrap();
//! assert_eq!(value, FormulaValue::Number(3.0));
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod parser;

pub use ast::{
    BinaryOperator, CellReference, FormulaExpr, RangeReference, Reference, UnaryOperator,
};
pub use dependency::{CalculationOrder, CellKey, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{evaluate, EvaluationContext, FormulaValue};
pub use parser::parse_formula;
