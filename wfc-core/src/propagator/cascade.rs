use super::{support_toward, ConstraintPropagator};
use crate::grid::Grid;
use log::trace;
use wfc_rules::{Direction, RuleTable};

/// Worklist propagator that narrows outward until a fixpoint is reached.
///
/// Cells that become contradictions are not expanded further.
#[derive(Debug, Clone, Default)]
pub struct CascadePropagator;

impl CascadePropagator {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintPropagator for CascadePropagator {
    fn propagate(&self, grid: &mut Grid, rules: &RuleTable, collapsed: usize) -> usize {
        let mut narrowed = 0;
        let mut stack = vec![collapsed];

        while let Some(current) = stack.pop() {
            for direction in Direction::ALL {
                let Some(neighbor) = grid.neighbor(current, direction) else {
                    continue;
                };
                let support = support_toward(grid, rules, current, direction);
                let Some(cell) = grid.cell_mut(neighbor) else {
                    continue;
                };
                if cell.restrict(&support) {
                    narrowed += 1;
                    if cell.is_contradiction() {
                        trace!("Cell {} emptied while propagating from {}", neighbor, current);
                    } else {
                        stack.push(neighbor);
                    }
                }
            }
        }
        narrowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::{compile_rules, BaseTile};

    #[test]
    fn test_constraint_reaches_whole_grid() {
        let rules = compile_rules(&[BaseTile::new("0", 0b0000), BaseTile::new("4", 0b1111)])
            .unwrap();
        let mut grid = Grid::new(3, &rules).unwrap();
        let full = rules.id_of("4_0").unwrap();
        grid.cell_mut(4).unwrap().collapse_to(full);

        let narrowed = CascadePropagator::new().propagate(&mut grid, &rules, 4);

        assert_eq!(narrowed, 8);
        for cell in grid.cells().iter().filter(|c| !c.is_collapsed()) {
            assert_eq!(cell.entropy(), 1);
            assert!(cell.states()[full.0]);
        }
    }
}
