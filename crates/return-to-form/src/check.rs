//! Acceptance checks for a generated workbook
//!
//! Run against a workbook read back from disk. The formula check overwrites
//! every input cell a formula reads with a known number, recalculates, and
//! compares each result with the difference or sum computed directly.

use std::collections::HashSet;

use rtf_core::{CellValue, Workbook};
use rtf_formula::{parse_formula, BinaryOperator, FormulaExpr};

use crate::calculation::WorkbookCalculationExt;
use crate::template::{FIXED_SHEET_COUNT, SHEETS_PER_WEEK};
use crate::Result;

/// Outcome of [`check_workbook`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckReport {
    pub sheet_count: usize,
    /// Week count implied by the number of sheets, when it divides evenly
    pub weeks: Option<usize>,
    pub formula_count: usize,
    /// Human-readable description of every failed check
    pub failures: Vec<String>,
}

impl CheckReport {
    pub fn passed(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Run every acceptance check; consumes the workbook because inputs are overwritten
pub fn check_workbook(mut workbook: Workbook) -> Result<CheckReport> {
    let mut report = CheckReport {
        sheet_count: workbook.sheet_count(),
        ..CheckReport::default()
    };

    check_sheet_count(&workbook, &mut report);
    check_unique_names(&workbook, &mut report);
    check_merges(&workbook, &mut report);
    check_formulas(&mut workbook, &mut report)?;

    tracing::debug!(failures = report.failures.len(), "checks finished");
    Ok(report)
}

fn check_sheet_count(workbook: &Workbook, report: &mut CheckReport) {
    let count = workbook.sheet_count();
    let weekly = workbook
        .worksheets()
        .filter(|s| s.name().starts_with("Week "))
        .count();
    let expected = weekly * SHEETS_PER_WEEK + FIXED_SHEET_COUNT;

    if weekly == 0 || count != expected {
        report.failures.push(format!(
            "expected {} sheets for {} weeks, found {}",
            expected, weekly, count
        ));
    } else {
        report.weeks = Some(weekly);
    }
}

fn check_unique_names(workbook: &Workbook, report: &mut CheckReport) {
    let mut seen = HashSet::new();
    for sheet in workbook.worksheets() {
        if !seen.insert(sheet.name().to_lowercase()) {
            report
                .failures
                .push(format!("duplicate sheet name '{}'", sheet.name()));
        }
    }
}

fn check_merges(workbook: &Workbook, report: &mut CheckReport) {
    for sheet in workbook.worksheets() {
        let regions = sheet.merged_regions();
        for (i, a) in regions.iter().enumerate() {
            for b in &regions[i + 1..] {
                if a.overlaps(b) {
                    report.failures.push(format!(
                        "'{}': merged ranges {} and {} overlap",
                        sheet.name(),
                        a.to_a1_string(),
                        b.to_a1_string()
                    ));
                }
            }
        }
    }
}

/// Deterministic input for the cell at (row, col)
fn sample_input(row: u32, col: u16) -> f64 {
    f64::from(row + 1) * 1.5 + f64::from(col)
}

fn check_formulas(workbook: &mut Workbook, report: &mut CheckReport) -> Result<()> {
    // (sheet, row, col, parsed formula)
    let mut formulas = Vec::new();
    for (sheet_idx, sheet) in workbook.worksheets().enumerate() {
        for (row, col, text) in sheet.formula_cells() {
            match parse_formula(text) {
                Ok(ast) => formulas.push((sheet_idx, row, col, ast)),
                Err(e) => report.failures.push(format!(
                    "'{}'!{}: cannot parse {}: {}",
                    sheet.name(),
                    rtf_core::CellAddress::new(row, col),
                    text,
                    e
                )),
            }
        }
    }
    report.formula_count = formulas.len();

    for (sheet_idx, _, _, ast) in &formulas {
        let Some(sheet) = workbook.worksheet_mut(*sheet_idx) else {
            continue;
        };
        for reference in ast.references() {
            for addr in reference.range().cells() {
                if sheet.get_formula_at(addr.row, addr.col).is_none() {
                    sheet.set_cell_value_at(addr.row, addr.col, sample_input(addr.row, addr.col))?;
                }
            }
        }
    }

    workbook.calculate()?;

    for (sheet_idx, row, col, ast) in &formulas {
        let Some(sheet) = workbook.worksheet(*sheet_idx) else {
            continue;
        };
        let location = format!("'{}'!{}", sheet.name(), rtf_core::CellAddress::new(*row, *col));
        let Some(expected) = expected_value(ast, *row, *col) else {
            report
                .failures
                .push(format!("{location}: not a change or total formula"));
            continue;
        };
        match sheet.get_calculated_value_at(*row, *col) {
            Some(CellValue::Number(actual)) if (actual - expected).abs() < 1e-9 => {}
            other => report.failures.push(format!(
                "{location}: expected {expected}, calculated {:?}",
                other
            )),
        }
    }
    Ok(())
}

/// Value the formula at (row, col) must produce given [`sample_input`] everywhere
///
/// Two shapes are accepted: a change column, `=C{r}-B{r}` reading the two
/// cells to its left (later minus earlier), and a total, `=SUM(..)` over the
/// cells directly above it in the same column.
fn expected_value(ast: &FormulaExpr, row: u32, col: u16) -> Option<f64> {
    match ast {
        FormulaExpr::BinaryOp {
            op: BinaryOperator::Subtract,
            left,
            right,
        } => match (left.as_ref(), right.as_ref()) {
            (FormulaExpr::CellRef(end), FormulaExpr::CellRef(start))
                if col >= 2
                    && end.sheet.is_none()
                    && start.sheet.is_none()
                    && (end.address.row, end.address.col) == (row, col - 1)
                    && (start.address.row, start.address.col) == (row, col - 2) =>
            {
                Some(sample_input(row, col - 1) - sample_input(row, col - 2))
            }
            _ => None,
        },
        FormulaExpr::Function { name, args } if name == "SUM" => match args.as_slice() {
            [FormulaExpr::RangeRef(r)]
                if r.sheet.is_none()
                    && r.range.start.col == col
                    && r.range.end.col == col
                    && r.range.end.row + 1 == row =>
            {
                Some(
                    r.range
                        .cells()
                        .map(|addr| sample_input(addr.row, addr.col))
                        .sum(),
                )
            }
            _ => None,
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{build_workbook, PlanConfig};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_generated_workbook_passes() {
        let workbook = build_workbook(&PlanConfig::with_weeks(2)).unwrap();
        let report = check_workbook(workbook).unwrap();
        assert_eq!(report.failures, Vec::<String>::new());
        assert_eq!(report.weeks, Some(2));
        assert_eq!(report.sheet_count, 20);
        // 6 metrics + 1 RPE guide + 14 daily + 3 summary
        assert_eq!(report.formula_count, 24);
    }

    #[test]
    fn test_wrong_formula_reported() {
        let mut workbook = build_workbook(&PlanConfig::with_weeks(1)).unwrap();
        let idx = workbook.sheet_index("📊 METRICS").unwrap();
        workbook
            .worksheet_mut(idx)
            .unwrap()
            .set_cell_formula("D4", "=B4-C4")
            .unwrap();

        let report = check_workbook(workbook).unwrap();
        assert!(!report.passed());
        assert_eq!(report.failures.len(), 1);
        assert!(report.failures[0].contains("D4"));
    }

    #[test]
    fn test_oversized_formulas_reported() {
        let mut workbook = build_workbook(&PlanConfig::with_weeks(1)).unwrap();
        let idx = workbook.sheet_index("W1D1").unwrap();
        let sheet = workbook.worksheet_mut(idx).unwrap();
        sheet.set_cell_formula("B22", "=SUM(A1:XFD1048576)").unwrap();
        sheet
            .set_cell_formula("D4", &format!("={}C4", "-".repeat(50_000)))
            .unwrap();

        let report = check_workbook(workbook).unwrap();
        assert_eq!(report.failures.len(), 2);
        assert!(report
            .failures
            .iter()
            .all(|f| f.starts_with("'W1D1'!") && f.contains("cannot parse")));
    }

    #[test]
    fn test_missing_sheet_reported() {
        let mut workbook = Workbook::empty();
        workbook.add_worksheet_with_name("Week 1").unwrap();
        let report = check_workbook(workbook).unwrap();
        assert_eq!(report.weeks, None);
        assert_eq!(report.failures.len(), 1);
    }
}
