//! Dependency ordering for formula calculation

use ahash::{AHashMap, AHashSet};
use std::collections::BTreeMap;

/// A cell in the workbook: sheet index plus 0-based position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub sheet: usize,
    pub row: u32,
    pub col: u16,
}

impl CellKey {
    /// Create a key
    pub fn new(sheet: usize, row: u32, col: u16) -> Self {
        Self { sheet, row, col }
    }
}

/// Formula cells and the formula cells each one reads
///
/// Only formula-to-formula edges matter for ordering; plain inputs are always
/// up to date.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    precedents: BTreeMap<CellKey, Vec<CellKey>>,
}

/// Result of ordering a [`DependencyGraph`]
#[derive(Debug, Default, PartialEq)]
pub struct CalculationOrder {
    /// Formula cells, every cell after the cells it reads
    pub order: Vec<CellKey>,
    /// Cells on a dependency cycle, in key order; absent from `order`
    pub circular: Vec<CellKey>,
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Visiting,
    Done,
}

impl DependencyGraph {
    /// Register a formula cell (with no precedents yet)
    pub fn add_formula(&mut self, cell: CellKey) {
        self.precedents.entry(cell).or_default();
    }

    /// Record that `dependent` reads `precedent`
    pub fn add_dependency(&mut self, precedent: CellKey, dependent: CellKey) {
        self.precedents.entry(dependent).or_default().push(precedent);
    }

    /// Topological order of the formula cells, cycles split out
    ///
    /// Deterministic: cells are visited in key order.
    pub fn calculation_order(&self) -> CalculationOrder {
        let mut marks: AHashMap<CellKey, Mark> = AHashMap::with_capacity(self.precedents.len());
        let mut circular: AHashSet<CellKey> = AHashSet::new();
        let mut order = Vec::with_capacity(self.precedents.len());
        let mut stack = Vec::new();

        for &cell in self.precedents.keys() {
            self.visit(cell, &mut marks, &mut stack, &mut circular, &mut order);
        }

        order.retain(|k| !circular.contains(k));
        let mut circular: Vec<_> = circular.into_iter().collect();
        circular.sort();
        CalculationOrder { order, circular }
    }

    fn visit(
        &self,
        cell: CellKey,
        marks: &mut AHashMap<CellKey, Mark>,
        stack: &mut Vec<CellKey>,
        circular: &mut AHashSet<CellKey>,
        order: &mut Vec<CellKey>,
    ) {
        match marks.get(&cell) {
            Some(Mark::Done) => return,
            Some(Mark::Visiting) => {
                // every cell on the stack from the first visit of `cell` is on the cycle
                if let Some(pos) = stack.iter().position(|k| *k == cell) {
                    circular.extend(stack[pos..].iter().copied());
                }
                return;
            }
            None => {}
        }

        let Some(precedents) = self.precedents.get(&cell) else {
            // not a formula cell
            return;
        };

        marks.insert(cell, Mark::Visiting);
        stack.push(cell);
        for &p in precedents {
            self.visit(p, marks, stack, circular, order);
        }
        stack.pop();
        marks.insert(cell, Mark::Done);
        order.push(cell);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn key(row: u32) -> CellKey {
        CellKey::new(0, row, 0)
    }

    #[test]
    fn test_dependencies_first() {
        let mut graph = DependencyGraph::default();
        // A1 = A2 + A3, A2 = A3
        graph.add_dependency(key(1), key(0));
        graph.add_dependency(key(2), key(0));
        graph.add_dependency(key(2), key(1));
        graph.add_formula(key(2));

        let result = graph.calculation_order();
        assert_eq!(result.order, vec![key(2), key(1), key(0)]);
        assert!(result.circular.is_empty());
    }

    #[test]
    fn test_non_formula_precedents_ignored() {
        let mut graph = DependencyGraph::default();
        graph.add_dependency(CellKey::new(3, 5, 5), key(0));

        let result = graph.calculation_order();
        assert_eq!(result.order, vec![key(0)]);
    }

    #[test]
    fn test_cycle_detection() {
        let mut graph = DependencyGraph::default();
        // A1 -> A2 -> A1, A3 reads A1, A4 independent
        graph.add_dependency(key(1), key(0));
        graph.add_dependency(key(0), key(1));
        graph.add_dependency(key(0), key(2));
        graph.add_formula(key(3));

        let result = graph.calculation_order();
        assert_eq!(result.circular, vec![key(0), key(1)]);
        assert_eq!(result.order, vec![key(2), key(3)]);
    }

    #[test]
    fn test_self_reference() {
        let mut graph = DependencyGraph::default();
        graph.add_dependency(key(4), key(4));
        let result = graph.calculation_order();
        assert_eq!(result.circular, vec![key(4)]);
        assert!(result.order.is_empty());
    }
}
