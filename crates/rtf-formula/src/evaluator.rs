//! Formula evaluator
//!
//! Evaluates an expression tree against a workbook. Referenced formula cells
//! contribute their cached result, so whole-workbook calculation must visit
//! cells in dependency order (see [`crate::dependency`]).

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use rtf_core::{CellError, CellRange, CellValue, Workbook, Worksheet};

/// Intermediate value during evaluation
#[derive(Debug, Clone, PartialEq)]
pub enum FormulaValue {
    Number(f64),
    String(String),
    Boolean(bool),
    Error(CellError),
    /// Values of a range, row-major
    Array(Vec<Vec<FormulaValue>>),
    Empty,
}

impl FormulaValue {
    /// Scalar coercion to a number; text that is not numeric yields `None`
    pub fn as_number(&self) -> Option<f64> {
        match self {
            FormulaValue::Number(n) => Some(*n),
            FormulaValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            FormulaValue::String(s) => s.trim().parse().ok(),
            FormulaValue::Empty => Some(0.0),
            FormulaValue::Error(_) | FormulaValue::Array(_) => None,
        }
    }

    /// The error carried by this value, if any
    pub fn get_error(&self) -> Option<CellError> {
        match self {
            FormulaValue::Error(e) => Some(*e),
            _ => None,
        }
    }

    /// True for error values
    pub fn is_error(&self) -> bool {
        self.get_error().is_some()
    }
}

impl From<CellValue> for FormulaValue {
    fn from(value: CellValue) -> Self {
        match value {
            CellValue::Empty => FormulaValue::Empty,
            CellValue::Number(n) => FormulaValue::Number(n),
            CellValue::String(s) => FormulaValue::String(s),
            CellValue::Boolean(b) => FormulaValue::Boolean(b),
            CellValue::Error(e) => FormulaValue::Error(e),
            CellValue::Formula { cached_value, .. } => cached_value
                .map(|v| (*v).into())
                .unwrap_or(FormulaValue::Empty),
        }
    }
}

impl From<FormulaValue> for CellValue {
    fn from(value: FormulaValue) -> Self {
        match value {
            FormulaValue::Empty => CellValue::Empty,
            FormulaValue::Number(n) => CellValue::Number(n),
            FormulaValue::String(s) => CellValue::String(s),
            FormulaValue::Boolean(b) => CellValue::Boolean(b),
            FormulaValue::Error(e) => CellValue::Error(e),
            FormulaValue::Array(_) => CellValue::Error(CellError::Value),
        }
    }
}

/// Where a formula is being evaluated
pub struct EvaluationContext<'a> {
    /// Workbook for reference lookups; `None` resolves every reference to empty
    pub workbook: Option<&'a Workbook>,
    /// Sheet that unqualified references point into
    pub current_sheet: usize,
    /// Row of the formula cell
    pub current_row: u32,
    /// Column of the formula cell
    pub current_col: u16,
}

impl<'a> EvaluationContext<'a> {
    /// Context for the formula at (`sheet`, `row`, `col`)
    pub fn new(workbook: Option<&'a Workbook>, sheet: usize, row: u32, col: u16) -> Self {
        Self {
            workbook,
            current_sheet: sheet,
            current_row: row,
            current_col: col,
        }
    }

    /// Context without a workbook, for constant formulas
    pub fn simple() -> Self {
        Self::new(None, 0, 0, 0)
    }

    fn worksheet(&self, sheet: Option<&str>) -> Option<&'a Worksheet> {
        let workbook = self.workbook?;
        match sheet {
            Some(name) => workbook.worksheet_by_name(name),
            None => workbook.worksheet(self.current_sheet),
        }
    }

    /// Value of one cell; `#REF!` when the sheet does not exist
    pub fn get_cell_value(&self, sheet: Option<&str>, row: u32, col: u16) -> FormulaValue {
        if self.workbook.is_none() {
            return FormulaValue::Empty;
        }
        match self.worksheet(sheet) {
            Some(ws) => ws.get_value_at(row, col).into(),
            None => FormulaValue::Error(CellError::Ref),
        }
    }

    /// Values of a range as a row-major array; `#REF!` when the sheet does not exist
    pub fn get_range_values(&self, sheet: Option<&str>, range: &CellRange) -> FormulaValue {
        if self.workbook.is_none() {
            return FormulaValue::Array(Vec::new());
        }
        let Some(ws) = self.worksheet(sheet) else {
            return FormulaValue::Error(CellError::Ref);
        };

        let rows = (range.start.row..=range.end.row)
            .map(|row| {
                (range.start.col..=range.end.col)
                    .map(|col| ws.get_value_at(row, col).into())
                    .collect()
            })
            .collect();
        FormulaValue::Array(rows)
    }
}

/// Evaluate an expression
///
/// Spreadsheet-level failures (`#VALUE!`, `#DIV/0!`, `#REF!`) come back as
/// [`FormulaValue::Error`]. A function the evaluator does not implement is an
/// `Err`; see [`FormulaError::cell_error`] for the value to display instead.
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<FormulaValue> {
    match expr {
        FormulaExpr::Number(n) => Ok(FormulaValue::Number(*n)),
        FormulaExpr::String(s) => Ok(FormulaValue::String(s.clone())),
        FormulaExpr::Boolean(b) => Ok(FormulaValue::Boolean(*b)),
        FormulaExpr::Error(e) => Ok(FormulaValue::Error(*e)),

        FormulaExpr::CellRef(r) => Ok(ctx.get_cell_value(
            r.sheet.as_deref(),
            r.address.row,
            r.address.col,
        )),
        FormulaExpr::RangeRef(r) => Ok(ctx.get_range_values(r.sheet.as_deref(), &r.range)),

        FormulaExpr::BinaryOp { op, left, right } => {
            let left = scalar(evaluate(left, ctx)?);
            let right = scalar(evaluate(right, ctx)?);
            Ok(evaluate_binary_op(*op, &left, &right))
        }
        FormulaExpr::UnaryOp { op, operand } => {
            let value = scalar(evaluate(operand, ctx)?);
            Ok(evaluate_unary_op(*op, &value))
        }

        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// A range used where a single value is expected is a `#VALUE!` unless it is 1×1
fn scalar(value: FormulaValue) -> FormulaValue {
    match value {
        FormulaValue::Array(rows) => match rows.as_slice() {
            [row] if row.len() == 1 => row[0].clone(),
            _ => FormulaValue::Error(CellError::Value),
        },
        other => other,
    }
}

fn evaluate_binary_op(op: BinaryOperator, left: &FormulaValue, right: &FormulaValue) -> FormulaValue {
    if let Some(e) = left.get_error().or_else(|| right.get_error()) {
        return FormulaValue::Error(e);
    }
    let (Some(l), Some(r)) = (left.as_number(), right.as_number()) else {
        return FormulaValue::Error(CellError::Value);
    };

    match op {
        BinaryOperator::Add => FormulaValue::Number(l + r),
        BinaryOperator::Subtract => FormulaValue::Number(l - r),
        BinaryOperator::Multiply => FormulaValue::Number(l * r),
        BinaryOperator::Divide if r == 0.0 => FormulaValue::Error(CellError::Div0),
        BinaryOperator::Divide => FormulaValue::Number(l / r),
    }
}

fn evaluate_unary_op(op: UnaryOperator, value: &FormulaValue) -> FormulaValue {
    if let Some(e) = value.get_error() {
        return FormulaValue::Error(e);
    }
    match (op, value.as_number()) {
        (UnaryOperator::Negate, Some(n)) => FormulaValue::Number(-n),
        (UnaryOperator::Negate, None) => FormulaValue::Error(CellError::Value),
    }
}

fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<FormulaValue> {
    match name {
        "SUM" => {
            let values = args
                .iter()
                .map(|arg| evaluate(arg, ctx))
                .collect::<FormulaResult<Vec<_>>>()?;
            Ok(sum(&values))
        }
        _ => Err(FormulaError::UnknownFunction(name.to_string())),
    }
}

/// SUM semantics: numbers inside ranges are added while text, booleans and
/// blanks in ranges are skipped. Direct arguments are coerced, so `SUM("x")`
/// is `#VALUE!`. The first error encountered wins.
fn sum(values: &[FormulaValue]) -> FormulaValue {
    let mut total = 0.0;
    for value in values {
        match value {
            FormulaValue::Array(rows) => {
                for item in rows.iter().flatten() {
                    match item {
                        FormulaValue::Number(n) => total += n,
                        FormulaValue::Error(e) => return FormulaValue::Error(*e),
                        _ => {}
                    }
                }
            }
            FormulaValue::Error(e) => return FormulaValue::Error(*e),
            scalar => match scalar.as_number() {
                Some(n) => total += n,
                None => return FormulaValue::Error(CellError::Value),
            },
        }
    }
    FormulaValue::Number(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_formula;

    fn eval(formula: &str, wb: &Workbook) -> FormulaValue {
        let ast = parse_formula(formula).unwrap();
        evaluate(&ast, &EvaluationContext::new(Some(wb), 0, 0, 0)).unwrap()
    }

    fn daily_sheet() -> Workbook {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("W1D1").unwrap();
        let ws = wb.worksheet_mut(0).unwrap();
        for (row, score) in [(17, 8.0), (18, 7.0), (19, 9.0), (20, 6.0)] {
            ws.set_cell_value(&format!("B{}", row), score).unwrap();
        }
        ws.set_cell_value("B21", "/10").unwrap();
        ws.set_cell_value("C4", 180.0).unwrap();
        ws.set_cell_value("B4", 185.5).unwrap();
        ws.set_cell_value("A1", "MONDAY, WEEK 1").unwrap();
        wb
    }

    #[test]
    fn test_constant_arithmetic() {
        let ctx = EvaluationContext::simple();
        let ast = parse_formula("=(10-4)/2+-1").unwrap();
        assert_eq!(evaluate(&ast, &ctx).unwrap(), FormulaValue::Number(2.0));

        let ast = parse_formula("=1/0").unwrap();
        assert_eq!(
            evaluate(&ast, &ctx).unwrap(),
            FormulaValue::Error(CellError::Div0)
        );
    }

    #[test]
    fn test_difference_of_cells() {
        let wb = daily_sheet();
        assert_eq!(eval("=C4-B4", &wb), FormulaValue::Number(-5.5));
        // blank minus blank
        assert_eq!(eval("=C9-B9", &wb), FormulaValue::Number(0.0));
        assert_eq!(eval("=A1-B4", &wb), FormulaValue::Error(CellError::Value));
    }

    #[test]
    fn test_sum_skips_text_in_ranges() {
        let wb = daily_sheet();
        assert_eq!(eval("=SUM(B17:B21)", &wb), FormulaValue::Number(30.0));
        assert_eq!(eval("=SUM(B17, 2)", &wb), FormulaValue::Number(10.0));
        assert_eq!(eval("=SUM(\"x\")", &wb), FormulaValue::Error(CellError::Value));
    }

    #[test]
    fn test_sheet_references() {
        let wb = daily_sheet();
        assert_eq!(eval("=W1D1!B17*2", &wb), FormulaValue::Number(16.0));
        assert_eq!(eval("='Missing'!B17", &wb), FormulaValue::Error(CellError::Ref));
    }

    #[test]
    fn test_unknown_function_rejected() {
        let wb = daily_sheet();
        let ast = parse_formula("=SUM(AVERAGE(B17:B20), 1)").unwrap();
        let err = evaluate(&ast, &EvaluationContext::new(Some(&wb), 0, 0, 0)).unwrap_err();
        assert_eq!(err, FormulaError::UnknownFunction("AVERAGE".into()));
        assert_eq!(err.cell_error(), CellError::Name);
    }

    #[test]
    fn test_range_in_scalar_position() {
        let wb = daily_sheet();
        assert_eq!(eval("=B17:B18+1", &wb), FormulaValue::Error(CellError::Value));
        assert_eq!(eval("=B17:B17+1", &wb), FormulaValue::Number(9.0));
    }

    #[test]
    fn test_cached_formula_results_are_used() {
        let mut wb = daily_sheet();
        let ws = wb.worksheet_mut(0).unwrap();
        ws.set_cell_formula("B22", "=SUM(B17:B21)").unwrap();
        ws.set_formula_result(21, 1, CellValue::Number(30.0)).unwrap();

        assert_eq!(eval("=B22*2", &wb), FormulaValue::Number(60.0));
        assert_eq!(eval("=B22/3", &wb), FormulaValue::Number(10.0));
    }
}
