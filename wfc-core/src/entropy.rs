use crate::grid::Grid;
use crate::random::pick_uniform;
use rand::Rng;

/// How to choose among cells sharing the minimum entropy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SelectionStrategy {
    /// Uniformly random among the tied cells.
    #[default]
    RandomLowest,
    /// First tied cell in row-major order.
    FirstMinimum,
}

impl SelectionStrategy {
    /// Picks one position from `candidates`, or `None` if there are none.
    pub fn pick<R: Rng + ?Sized>(self, candidates: &[usize], rng: &mut R) -> Option<usize> {
        match self {
            Self::RandomLowest => pick_uniform(rng, candidates).copied(),
            Self::FirstMinimum => candidates.first().copied(),
        }
    }
}

/// The uncollapsed cells sharing the lowest entropy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MinEntropyCells {
    pub entropy: usize,
    /// Positions in row-major order.
    pub cells: Vec<usize>,
}

/// Scans the grid for the uncollapsed cells with the lowest entropy.
///
/// Returns `None` once every cell is collapsed. A result with entropy `0`
/// means the listed cells are contradictions.
pub fn min_entropy_cells(grid: &Grid) -> Option<MinEntropyCells> {
    let mut min_entropy = usize::MAX;
    let mut cells = Vec::new();
    for cell in grid.cells().iter().filter(|c| !c.is_collapsed()) {
        if cell.entropy() < min_entropy {
            min_entropy = cell.entropy();
            cells.clear();
            cells.push(cell.pos());
        } else if cell.entropy() == min_entropy {
            cells.push(cell.pos());
        }
    }
    if cells.is_empty() {
        None
    } else {
        Some(MinEntropyCells {
            entropy: min_entropy,
            cells,
        })
    }
}
