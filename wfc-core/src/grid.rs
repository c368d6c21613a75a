use crate::WfcError;
use bitvec::prelude::*;
use wfc_rules::{Direction, RuleTable, VariantId};

/// Entropy reported by a collapsed cell. Collapsed cells are never selected
/// again, so the value is advisory only.
pub const COLLAPSED_ENTROPY: usize = usize::MAX;

/// One position of the grid and the variants still possible there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pos: usize,
    x: usize,
    y: usize,
    states: BitVec,
    collapsed: bool,
    entropy: usize,
}

impl Cell {
    fn new(pos: usize, dim: usize, num_variants: usize) -> Self {
        Self {
            pos,
            x: pos % dim,
            y: pos / dim,
            states: bitvec![1; num_variants],
            collapsed: false,
            entropy: num_variants,
        }
    }

    fn reset(&mut self) {
        self.states.fill(true);
        self.collapsed = false;
        self.entropy = self.states.len();
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn x(&self) -> usize {
        self.x
    }

    pub fn y(&self) -> usize {
        self.y
    }

    /// Candidate set, one bit per [`VariantId`].
    pub fn states(&self) -> &BitSlice {
        &self.states
    }

    /// Number of remaining candidates, or [`COLLAPSED_ENTROPY`] once collapsed.
    pub fn entropy(&self) -> usize {
        self.entropy
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    /// An uncollapsed cell whose candidate set is empty.
    pub fn is_contradiction(&self) -> bool {
        !self.collapsed && self.entropy == 0
    }

    /// The committed variant, if the cell has been collapsed.
    pub fn collapsed_variant(&self) -> Option<VariantId> {
        if self.collapsed {
            self.states.first_one().map(VariantId)
        } else {
            None
        }
    }

    /// Intersects the candidate set with `allowed` and refreshes the entropy.
    ///
    /// Collapsed cells are left untouched. Returns whether any candidate was
    /// removed; the entropy never increases.
    pub fn restrict(&mut self, allowed: &BitSlice) -> bool {
        if self.collapsed {
            return false;
        }
        let before = self.entropy;
        self.intersect(allowed);
        self.refresh_entropy();
        self.entropy < before
    }

    /// Intersection without touching the entropy; pair with [`Cell::refresh_entropy`].
    pub(crate) fn intersect(&mut self, allowed: &BitSlice) {
        self.states &= allowed;
    }

    pub(crate) fn refresh_entropy(&mut self) {
        if !self.collapsed {
            self.entropy = self.states.count_ones();
        }
    }

    /// Commits the cell to a single variant.
    ///
    /// # Panics
    ///
    /// Panics if `variant` is outside the cell's candidate range.
    pub fn collapse_to(&mut self, variant: VariantId) {
        self.states.fill(false);
        self.states.set(variant.0, true);
        self.collapsed = true;
        self.entropy = COLLAPSED_ENTROPY;
    }
}

/// A `dim x dim` grid of cells in row-major order (`pos = y * dim + x`).
///
/// A grid is reused across generation requests: [`Grid::reset`] restores every
/// cell instead of allocating a new grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    dim: usize,
    num_variants: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid whose cells can each hold any variant of `rules`.
    ///
    /// # Errors
    ///
    /// Returns [`WfcError::ConfigurationError`] if `dim` is zero, the rule table
    /// is empty, or `dim * dim` overflows.
    pub fn new(dim: usize, rules: &RuleTable) -> Result<Self, WfcError> {
        if dim == 0 {
            return Err(WfcError::ConfigurationError(
                "Grid dimension must be at least 1".to_string(),
            ));
        }
        if rules.is_empty() {
            return Err(WfcError::ConfigurationError(
                "Rule table has no variants".to_string(),
            ));
        }
        let size = dim.checked_mul(dim).ok_or_else(|| {
            WfcError::ConfigurationError(format!("Grid dimension {dim} is too large"))
        })?;
        let num_variants = rules.len();
        let cells = (0..size)
            .map(|pos| Cell::new(pos, dim, num_variants))
            .collect();
        Ok(Self {
            dim,
            num_variants,
            cells,
        })
    }

    /// Returns every cell to the uncollapsed state with the full candidate set.
    pub fn reset(&mut self) {
        for cell in &mut self.cells {
            cell.reset();
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of variants each cell was created with.
    pub fn num_variants(&self) -> usize {
        self.num_variants
    }

    /// Number of cells (`dim * dim`).
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always `false`; a grid has at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, pos: usize) -> Option<&Cell> {
        self.cells.get(pos)
    }

    pub fn cell_mut(&mut self, pos: usize) -> Option<&mut Cell> {
        self.cells.get_mut(pos)
    }

    /// Cell at column `x`, row `y`, or `None` outside the grid.
    pub fn get(&self, x: usize, y: usize) -> Option<&Cell> {
        if x < self.dim && y < self.dim {
            self.cells.get(y * self.dim + x)
        } else {
            None
        }
    }

    /// Index of the cell next to `pos` toward `direction`.
    ///
    /// Returns `None` at the grid boundary; there is no wraparound.
    pub fn neighbor(&self, pos: usize, direction: Direction) -> Option<usize> {
        if pos >= self.cells.len() {
            return None;
        }
        let x = pos % self.dim;
        let y = pos / self.dim;
        match direction {
            Direction::Up if y > 0 => Some(pos - self.dim),
            Direction::Down if y + 1 < self.dim => Some(pos + self.dim),
            Direction::Right if x + 1 < self.dim => Some(pos + 1),
            Direction::Left if x > 0 => Some(pos - 1),
            _ => None,
        }
    }

    pub fn neighbor_cell(&self, pos: usize, direction: Direction) -> Option<&Cell> {
        self.neighbor(pos, direction)
            .and_then(|index| self.cells.get(index))
    }

    pub fn collapsed_variant(&self, pos: usize) -> Option<VariantId> {
        self.cells.get(pos).and_then(Cell::collapsed_variant)
    }

    pub fn collapsed_count(&self) -> usize {
        self.cells.iter().filter(|c| c.is_collapsed()).count()
    }

    pub fn is_fully_collapsed(&self) -> bool {
        self.cells.iter().all(Cell::is_collapsed)
    }

    /// Positions of cells that ran out of candidates.
    pub fn contradictions(&self) -> Vec<usize> {
        self.cells
            .iter()
            .filter(|c| c.is_contradiction())
            .map(Cell::pos)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wfc_rules::{compile_rules, default_catalogue};

    fn rules() -> RuleTable {
        compile_rules(&default_catalogue()).unwrap()
    }

    #[test]
    fn test_cell_coordinates_are_row_major() {
        let grid = Grid::new(3, &rules()).unwrap();
        let cell = grid.cell(5).unwrap();
        assert_eq!((cell.x(), cell.y()), (2, 1));
        assert_eq!(grid.get(2, 1), Some(cell));
        assert!(grid.get(3, 0).is_none());
    }

    #[test]
    fn test_restrict_never_increases_entropy() {
        let rules = rules();
        let mut grid = Grid::new(1, &rules).unwrap();
        let cell = grid.cell_mut(0).unwrap();
        let all = rules.full_set();
        assert!(!cell.restrict(&all));
        assert_eq!(cell.entropy(), rules.len());

        let mut some = bitvec![0; rules.len()];
        some.set(0, true);
        some.set(3, true);
        assert!(cell.restrict(&some));
        assert_eq!(cell.entropy(), 2);
        assert!(!cell.restrict(&all));
        assert_eq!(cell.entropy(), 2);
    }

    #[test]
    fn test_collapse_sets_sentinel() {
        let rules = rules();
        let mut grid = Grid::new(1, &rules).unwrap();
        let cell = grid.cell_mut(0).unwrap();
        cell.collapse_to(VariantId(4));
        assert!(cell.is_collapsed());
        assert_eq!(cell.entropy(), COLLAPSED_ENTROPY);
        assert_eq!(cell.collapsed_variant(), Some(VariantId(4)));
        assert!(!cell.restrict(&bitvec![0; rules.len()]));
        assert_eq!(cell.collapsed_variant(), Some(VariantId(4)));
    }

    #[test]
    fn test_empty_candidate_set_is_contradiction() {
        let rules = rules();
        let mut grid = Grid::new(2, &rules).unwrap();
        grid.cell_mut(3).unwrap().restrict(&bitvec![0; rules.len()]);
        assert!(grid.cell(3).unwrap().is_contradiction());
        assert_eq!(grid.contradictions(), vec![3]);
    }
}
