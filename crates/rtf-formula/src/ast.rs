//! Formula syntax tree

use rtf_core::{CellAddress, CellError, CellRange};

/// Parsed formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaExpr {
    /// Numeric literal
    Number(f64),
    /// String literal
    String(String),
    /// TRUE / FALSE
    Boolean(bool),
    /// Error literal such as `#N/A`
    Error(CellError),

    /// Single cell reference
    CellRef(CellReference),
    /// Rectangular range reference
    RangeRef(RangeReference),

    /// Binary operation
    BinaryOp {
        op: BinaryOperator,
        left: Box<FormulaExpr>,
        right: Box<FormulaExpr>,
    },
    /// Unary operation
    UnaryOp {
        op: UnaryOperator,
        operand: Box<FormulaExpr>,
    },

    /// Function call; the name is stored upper-case
    Function { name: String, args: Vec<FormulaExpr> },
}

impl FormulaExpr {
    /// Every cell and range reference in the expression, left to right
    pub fn references(&self) -> Vec<Reference<'_>> {
        let mut out = Vec::new();
        self.collect_references(&mut out);
        out
    }

    fn collect_references<'a>(&'a self, out: &mut Vec<Reference<'a>>) {
        match self {
            FormulaExpr::CellRef(r) => out.push(Reference::Cell(r)),
            FormulaExpr::RangeRef(r) => out.push(Reference::Range(r)),
            FormulaExpr::BinaryOp { left, right, .. } => {
                left.collect_references(out);
                right.collect_references(out);
            }
            FormulaExpr::UnaryOp { operand, .. } => operand.collect_references(out),
            FormulaExpr::Function { args, .. } => {
                for arg in args {
                    arg.collect_references(out);
                }
            }
            FormulaExpr::Number(_)
            | FormulaExpr::String(_)
            | FormulaExpr::Boolean(_)
            | FormulaExpr::Error(_) => {}
        }
    }
}

/// Borrowed view of a reference inside an expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reference<'a> {
    /// A single cell
    Cell(&'a CellReference),
    /// A range
    Range(&'a RangeReference),
}

impl Reference<'_> {
    /// Sheet qualifier, if any
    pub fn sheet(&self) -> Option<&str> {
        match self {
            Reference::Cell(r) => r.sheet.as_deref(),
            Reference::Range(r) => r.sheet.as_deref(),
        }
    }

    /// The reference as a range (a cell is a 1×1 range)
    pub fn range(&self) -> CellRange {
        match self {
            Reference::Cell(r) => CellRange::single(r.address),
            Reference::Range(r) => r.range,
        }
    }
}

/// Cell reference with optional sheet
#[derive(Debug, Clone, PartialEq)]
pub struct CellReference {
    pub sheet: Option<String>,
    pub address: CellAddress,
}

/// Range reference with optional sheet
#[derive(Debug, Clone, PartialEq)]
pub struct RangeReference {
    pub sheet: Option<String>,
    pub range: CellRange,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Negate,
}
