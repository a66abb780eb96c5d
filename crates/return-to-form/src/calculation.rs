//! Workbook calculation
//!
//! Evaluates every formula cell in dependency order and stores the result as
//! the cell's cached value. Cells caught in a reference cycle get `#REF!`;
//! formulas that fail to parse or call an unsupported function get `#NAME?`.
//!
//! ```rust
//! use return_to_form::prelude::*;
//!
//! let mut workbook = Workbook::empty();
//! let idx = workbook.add_worksheet_with_name("Summary").unwrap();
//! let sheet = workbook.worksheet_mut(idx).unwrap();
//! sheet.set_cell_value("B12", 180.0).unwrap();
//! sheet.set_cell_value("C12", 172.5).unwrap();
//! sheet.set_cell_formula("D12", "=C12-B12").unwrap();
//!
//! let stats = workbook.calculate().unwrap();
//! assert_eq!(stats.cells_calculated, 1);
//! ```

use std::collections::BTreeMap;

use rtf_core::{CellError, CellValue, Workbook};
use rtf_formula::{
    evaluate, parse_formula, CellKey, DependencyGraph, EvaluationContext, FormulaExpr,
    FormulaValue, Reference,
};

use crate::Result;

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Total number of formula cells
    pub formula_count: usize,
    /// Number of cells evaluated
    pub cells_calculated: usize,
    /// Number of cells caught in a reference cycle
    pub circular_references: usize,
    /// Formulas that failed to parse or evaluate
    pub errors: usize,
}

/// Extension trait for Workbook to add calculation
pub trait WorkbookCalculationExt {
    /// Calculate all formulas in the workbook
    fn calculate(&mut self) -> Result<CalculationStats>;
}

impl WorkbookCalculationExt for Workbook {
    fn calculate(&mut self) -> Result<CalculationStats> {
        let mut engine = CalculationEngine::default();
        engine.calculate_all(self)
    }
}

#[derive(Default)]
struct CalculationEngine {
    dependency_graph: DependencyGraph,
    parsed_formulas: BTreeMap<CellKey, FormulaExpr>,
}

impl CalculationEngine {
    fn calculate_all(&mut self, workbook: &mut Workbook) -> Result<CalculationStats> {
        let mut stats = CalculationStats::default();

        self.collect_formulas(workbook, &mut stats)?;
        if stats.formula_count == 0 {
            return Ok(stats);
        }

        let order = self.dependency_graph.calculation_order();
        stats.circular_references = order.circular.len();

        for key in &order.circular {
            tracing::warn!(sheet = key.sheet, row = key.row, col = key.col, "circular reference");
            store_result(workbook, *key, CellValue::Error(CellError::Ref))?;
            stats.errors += 1;
        }

        for key in order.order {
            let Some(ast) = self.parsed_formulas.get(&key) else {
                continue;
            };

            let ctx = EvaluationContext::new(Some(&*workbook), key.sheet, key.row, key.col);
            let result = match evaluate(ast, &ctx) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(
                        sheet = key.sheet,
                        row = key.row,
                        col = key.col,
                        error = %e,
                        "formula evaluation failed"
                    );
                    stats.errors += 1;
                    FormulaValue::Error(e.cell_error())
                }
            };

            store_result(workbook, key, result.into())?;
            stats.cells_calculated += 1;
        }

        tracing::debug!(
            formulas = stats.formula_count,
            calculated = stats.cells_calculated,
            errors = stats.errors,
            "calculation finished"
        );
        Ok(stats)
    }

    /// Parse every formula and record its precedents
    fn collect_formulas(&mut self, workbook: &mut Workbook, stats: &mut CalculationStats) -> Result<()> {
        let mut unparseable: Vec<(CellKey, CellError)> = Vec::new();

        for (sheet_idx, sheet) in workbook.worksheets().enumerate() {
            for (row, col, formula_text) in sheet.formula_cells() {
                let key = CellKey::new(sheet_idx, row, col);
                stats.formula_count += 1;

                let ast = match parse_formula(formula_text) {
                    Ok(ast) => ast,
                    Err(e) => {
                        tracing::warn!(sheet = sheet.name(), row, col, error = %e, "unparseable formula");
                        unparseable.push((key, e.cell_error()));
                        continue;
                    }
                };

                self.dependency_graph.add_formula(key);
                for reference in ast.references() {
                    let precedent_sheet = match reference.sheet() {
                        Some(name) => match workbook.sheet_index(name) {
                            Some(idx) => idx,
                            // evaluation reports the missing sheet as #REF!
                            None => continue,
                        },
                        None => sheet_idx,
                    };
                    for addr in precedent_cells(&reference) {
                        self.dependency_graph
                            .add_dependency(CellKey::new(precedent_sheet, addr.0, addr.1), key);
                    }
                }
                self.parsed_formulas.insert(key, ast);
            }
        }

        for (key, error) in unparseable {
            store_result(workbook, key, CellValue::Error(error))?;
            stats.errors += 1;
        }
        Ok(())
    }
}

fn precedent_cells(reference: &Reference<'_>) -> Vec<(u32, u16)> {
    reference
        .range()
        .cells()
        .map(|addr| (addr.row, addr.col))
        .collect()
}

fn store_result(workbook: &mut Workbook, key: CellKey, value: CellValue) -> Result<()> {
    if let Some(sheet) = workbook.worksheet_mut(key.sheet) {
        sheet.set_formula_result(key.row, key.col, value)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sheet_workbook() -> Workbook {
        let mut wb = Workbook::empty();
        wb.add_worksheet_with_name("W1D1").unwrap();
        wb
    }

    #[test]
    fn test_difference() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("B4", 82.0).unwrap();
        sheet.set_cell_value("C4", 79.5).unwrap();
        sheet.set_cell_formula("D4", "=C4-B4").unwrap();

        let stats = wb.calculate().unwrap();
        assert_eq!(stats.cells_calculated, 1);
        assert_eq!(
            wb.worksheet(0).unwrap().get_calculated_value_at(3, 3),
            Some(&CellValue::Number(-2.5))
        );
    }

    #[test]
    fn test_sum_of_daily_scores() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        for (row, score) in (16..21).zip([8.0, 7.0, 9.0, 6.0, 10.0]) {
            sheet.set_cell_value_at(row, 1, score).unwrap();
        }
        sheet.set_cell_formula("B22", "=SUM(B17:B21)").unwrap();

        wb.calculate().unwrap();
        assert_eq!(
            wb.worksheet(0).unwrap().get_calculated_value_at(21, 1),
            Some(&CellValue::Number(40.0))
        );
    }

    #[test]
    fn test_chain_evaluated_in_dependency_order() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        // dependents placed before their precedents
        sheet.set_cell_formula("A1", "=A2-A3").unwrap();
        sheet.set_cell_formula("A2", "=SUM(B1:B2)").unwrap();
        sheet.set_cell_value("A3", 1.0).unwrap();
        sheet.set_cell_value("B1", 2.0).unwrap();
        sheet.set_cell_value("B2", 3.0).unwrap();

        let stats = wb.calculate().unwrap();
        assert_eq!(stats.formula_count, 2);
        assert_eq!(
            wb.worksheet(0).unwrap().get_calculated_value_at(0, 0),
            Some(&CellValue::Number(4.0))
        );
    }

    #[test]
    fn test_circular_reference_marked() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_formula("A1", "=B1-1").unwrap();
        sheet.set_cell_formula("B1", "=A1-1").unwrap();

        let stats = wb.calculate().unwrap();
        assert_eq!(stats.circular_references, 2);
        assert_eq!(
            wb.worksheet(0).unwrap().get_calculated_value_at(0, 0),
            Some(&CellValue::Error(CellError::Ref))
        );
    }

    #[test]
    fn test_unparseable_formula_marked() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_formula("A1", "=C4-").unwrap();

        let stats = wb.calculate().unwrap();
        assert_eq!(stats.errors, 1);
        assert_eq!(
            wb.worksheet(0).unwrap().get_calculated_value_at(0, 0),
            Some(&CellValue::Error(CellError::Name))
        );
    }

    #[test]
    fn test_unknown_function_marked() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        sheet.set_cell_value("B17", 8.0).unwrap();
        sheet.set_cell_formula("B22", "=AVERAGE(B17:B21)").unwrap();
        sheet.set_cell_formula("C22", "=B22+1").unwrap();

        let stats = wb.calculate().unwrap();
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.cells_calculated, 2);
        let sheet = wb.worksheet(0).unwrap();
        assert_eq!(
            sheet.get_calculated_value_at(21, 1),
            Some(&CellValue::Error(CellError::Name))
        );
        // the error flows into dependents
        assert_eq!(
            sheet.get_calculated_value_at(21, 2),
            Some(&CellValue::Error(CellError::Name))
        );
    }

    #[test]
    fn test_text_inputs_ignored_by_sum() {
        let mut wb = sheet_workbook();
        let sheet = wb.worksheet_mut(0).unwrap();
        for row in 16..21 {
            sheet.set_cell_value_at(row, 1, "/10").unwrap();
        }
        sheet.set_cell_formula("B22", "=SUM(B17:B21)").unwrap();

        wb.calculate().unwrap();
        assert_eq!(
            wb.worksheet(0).unwrap().get_calculated_value_at(21, 1),
            Some(&CellValue::Number(0.0))
        );
    }
}
