use super::{tighten_against_neighbors, ConstraintPropagator};
use crate::grid::Grid;
use log::trace;
use wfc_rules::{Direction, RuleTable};

/// One forward pass from the collapsed cell plus a local re-check.
///
/// Each uncollapsed neighbour is intersected with what the chosen variant
/// permits toward it, then tightened against its own four neighbours. Nothing
/// is queued beyond that.
#[derive(Debug, Clone, Default)]
pub struct LocalPropagator;

impl LocalPropagator {
    pub fn new() -> Self {
        Self
    }
}

impl ConstraintPropagator for LocalPropagator {
    fn propagate(&self, grid: &mut Grid, rules: &RuleTable, collapsed: usize) -> usize {
        let Some(chosen) = grid.collapsed_variant(collapsed) else {
            return 0;
        };
        let mut narrowed = 0;

        for direction in Direction::ALL {
            let Some(neighbor) = grid.neighbor(collapsed, direction) else {
                continue;
            };
            let Some(cell) = grid.cell_mut(neighbor) else {
                continue;
            };
            if cell.is_collapsed() {
                continue;
            }
            let before = cell.entropy();
            cell.intersect(rules.allowed(chosen, direction));
            tighten_against_neighbors(grid, rules, neighbor);

            let after = grid.cell(neighbor).map_or(before, |c| c.entropy());
            if after < before {
                narrowed += 1;
                trace!(
                    "Cell {} narrowed from {} to {} candidates ({} of {})",
                    neighbor,
                    before,
                    after,
                    direction,
                    collapsed
                );
            }
        }
        narrowed
    }
}
