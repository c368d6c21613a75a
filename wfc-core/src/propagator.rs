//! Constraint propagation after a cell has been collapsed.

use crate::grid::Grid;
use bitvec::prelude::*;
use std::fmt::Debug;
use wfc_rules::{Direction, RuleTable, VariantId};

pub mod cascade;
pub mod local;

pub use cascade::CascadePropagator;
pub use local::LocalPropagator;

/// Updates neighbouring candidate sets after the cell at `collapsed` was committed.
///
/// Propagation never fails: a candidate set may be narrowed down to nothing,
/// which leaves a contradiction for the selection step to report.
pub trait ConstraintPropagator: Send + Sync + Debug {
    /// Returns the number of cells whose candidate set shrank.
    fn propagate(&self, grid: &mut Grid, rules: &RuleTable, collapsed: usize) -> usize;
}

/// Which propagator the solver uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum PropagationMode {
    /// Narrow the direct neighbours, then re-check each of them against its
    /// own four neighbours. Effects further away surface in later iterations.
    #[default]
    Local,
    /// Keep narrowing outward until no candidate set changes.
    Cascade,
}

impl PropagationMode {
    pub fn propagator(self) -> Box<dyn ConstraintPropagator> {
        match self {
            Self::Local => Box::new(LocalPropagator::new()),
            Self::Cascade => Box::new(CascadePropagator::new()),
        }
    }
}

/// Union, over every variant still possible at `from`, of what that variant
/// permits toward `direction`.
pub(crate) fn support_toward(
    grid: &Grid,
    rules: &RuleTable,
    from: usize,
    direction: Direction,
) -> BitVec {
    let mut support = bitvec![0; rules.len()];
    if let Some(cell) = grid.cell(from) {
        for variant in cell.states().iter_ones() {
            support |= rules.allowed(VariantId(variant), direction);
        }
    }
    support
}

/// Re-checks the cell at `pos` against all four of its neighbours, collapsed
/// or not, and refreshes its entropy once at the end.
pub(crate) fn tighten_against_neighbors(grid: &mut Grid, rules: &RuleTable, pos: usize) {
    for direction in Direction::ALL {
        let Some(far) = grid.neighbor(pos, direction) else {
            continue;
        };
        let support = support_toward(grid, rules, far, direction.opposite());
        if let Some(cell) = grid.cell_mut(pos) {
            if !cell.is_collapsed() {
                cell.intersect(&support);
            }
        }
    }
    if let Some(cell) = grid.cell_mut(pos) {
        cell.refresh_entropy();
    }
}
