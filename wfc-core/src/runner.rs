use crate::{
    entropy::{min_entropy_cells, SelectionStrategy},
    grid::Grid,
    propagator::{ConstraintPropagator, PropagationMode},
    random::pick_uniform_iter,
    WfcError,
};
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::{Duration, Instant};
use wfc_rules::{RuleTable, VariantId};

/// Receives events from a generation run, in order.
///
/// This is the seam to whatever renders the grid: the core only reports which
/// variant name each cell was committed to.
pub trait CollapseObserver {
    /// Called once per collapsed cell, in collapse order.
    fn on_cell_collapsed(&mut self, pos: usize, variant: &str);

    /// Called whenever the grid is reset, before any collapse of a new attempt.
    fn on_reset(&mut self) {}
}

/// Adapts a plain closure to [`CollapseObserver`].
struct FnObserver<F>(F);

impl<F: FnMut(usize, &str)> CollapseObserver for FnObserver<F> {
    fn on_cell_collapsed(&mut self, pos: usize, variant: &str) {
        (self.0)(pos, variant);
    }
}

/// Configuration options for a generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WfcConfig {
    /// Seed for the random number generator. `None` seeds from the OS.
    pub seed: Option<u64>,
    pub selection_strategy: SelectionStrategy,
    pub propagation_mode: PropagationMode,
    /// Attempts before a contradiction is reported. Every retry resets the grid.
    pub max_attempts: u32,
}

impl WfcConfig {
    /// Creates a new builder for `WfcConfig`.
    pub fn builder() -> WfcConfigBuilder {
        WfcConfigBuilder::default()
    }
}

impl Default for WfcConfig {
    fn default() -> Self {
        Self {
            seed: None,
            selection_strategy: SelectionStrategy::RandomLowest,
            propagation_mode: PropagationMode::Local,
            max_attempts: 1,
        }
    }
}

/// Builder for `WfcConfig`.
#[derive(Debug, Default)]
pub struct WfcConfigBuilder {
    seed: Option<u64>,
    selection_strategy: SelectionStrategy,
    propagation_mode: PropagationMode,
    max_attempts: Option<u32>,
}

impl WfcConfigBuilder {
    /// Sets the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn selection_strategy(mut self, strategy: SelectionStrategy) -> Self {
        self.selection_strategy = strategy;
        self
    }

    pub fn propagation_mode(mut self, mode: PropagationMode) -> Self {
        self.propagation_mode = mode;
        self
    }

    /// Sets how many times the grid is reset and regenerated after a contradiction.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Builds the `WfcConfig` instance.
    pub fn build(self) -> WfcConfig {
        WfcConfig {
            seed: self.seed,
            selection_strategy: self.selection_strategy,
            propagation_mode: self.propagation_mode,
            max_attempts: self.max_attempts.unwrap_or(1),
        }
    }
}

/// Summary of a successful generation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationStats {
    /// Collapses performed in the successful attempt; equals the cell count.
    pub collapses: usize,
    /// Cells narrowed by propagation in the successful attempt.
    pub narrowed: usize,
    /// Attempts used, including the successful one.
    pub attempts: u32,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SolverState {
    Running,
    Done,
}

/// Per-attempt solver state.
struct Solver<'a> {
    rules: &'a RuleTable,
    strategy: SelectionStrategy,
    propagator: Box<dyn ConstraintPropagator>,
    rng: StdRng,
    collapses: usize,
    narrowed: usize,
}

impl Solver<'_> {
    /// Select, collapse and propagate once.
    fn step(
        &mut self,
        grid: &mut Grid,
        observer: &mut dyn CollapseObserver,
    ) -> Result<SolverState, WfcError> {
        let Some(candidates) = min_entropy_cells(grid) else {
            return Ok(SolverState::Done);
        };

        if candidates.entropy == 0 {
            let pos = candidates.cells[0];
            let dim = grid.dim();
            return Err(WfcError::Contradiction {
                pos,
                x: pos % dim,
                y: pos / dim,
            });
        }

        let pos = self
            .strategy
            .pick(&candidates.cells, &mut self.rng)
            .ok_or_else(|| WfcError::InternalError("No candidate cell to pick".to_string()))?;
        let cell = grid
            .cell_mut(pos)
            .ok_or_else(|| WfcError::InternalError(format!("Cell {pos} out of bounds")))?;

        let chosen = pick_uniform_iter(&mut self.rng, cell.states().iter_ones())
            .map(VariantId)
            .ok_or(WfcError::Contradiction {
                pos,
                x: cell.x(),
                y: cell.y(),
            })?;
        cell.collapse_to(chosen);

        let name = self.rules.name_of(chosen).ok_or_else(|| {
            WfcError::InternalError(format!("Variant {} missing from rule table", chosen.0))
        })?;
        debug!(
            "Collapse {}: cell {} (entropy {}, {} tied) -> {}",
            self.collapses + 1,
            pos,
            candidates.entropy,
            candidates.cells.len(),
            name
        );
        observer.on_cell_collapsed(pos, name);
        self.collapses += 1;

        self.narrowed += self.propagator.propagate(grid, self.rules, pos);
        Ok(SolverState::Running)
    }

    fn run(
        &mut self,
        grid: &mut Grid,
        observer: &mut dyn CollapseObserver,
    ) -> Result<(), WfcError> {
        let mut state = SolverState::Running;
        while state == SolverState::Running {
            state = self.step(grid, observer)?;
        }
        Ok(())
    }
}

/// Runs the collapse loop on `grid`, calling `on_cell_collapsed(pos, variant)`
/// once per collapsed cell in collapse order.
///
/// See [`run_generation_observed`].
pub fn run_generation<F>(
    grid: &mut Grid,
    rules: &RuleTable,
    config: &WfcConfig,
    on_cell_collapsed: F,
) -> Result<GenerationStats, WfcError>
where
    F: FnMut(usize, &str),
{
    run_generation_observed(grid, rules, config, &mut FnObserver(on_cell_collapsed))
}

/// Runs the collapse loop on `grid`, reporting events to `observer`.
///
/// The grid is reset first, so a grid can be reused across requests. Each
/// iteration picks an uncollapsed cell of minimum entropy, commits it to a
/// uniformly chosen candidate and propagates the constraint to its neighbours.
/// The loop ends once every cell is collapsed.
///
/// # Errors
///
/// * `WfcError::ConfigurationError` if `max_attempts` is zero or the grid was
///   built for a different number of variants than `rules` holds.
/// * `WfcError::Contradiction` if a cell ran out of candidates on the last
///   attempt. The grid is left partially collapsed for inspection.
pub fn run_generation_observed(
    grid: &mut Grid,
    rules: &RuleTable,
    config: &WfcConfig,
    observer: &mut dyn CollapseObserver,
) -> Result<GenerationStats, WfcError> {
    if config.max_attempts == 0 {
        return Err(WfcError::ConfigurationError(
            "max_attempts must be at least 1".to_string(),
        ));
    }
    if grid.num_variants() != rules.len() {
        return Err(WfcError::ConfigurationError(format!(
            "Grid holds {} variants but the rule table has {}",
            grid.num_variants(),
            rules.len()
        )));
    }

    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut solver = Solver {
        rules,
        strategy: config.selection_strategy,
        propagator: config.propagation_mode.propagator(),
        rng,
        collapses: 0,
        narrowed: 0,
    };

    info!(
        "Starting generation on {0}x{0} grid with {1} variants ({2:?} propagation)",
        grid.dim(),
        rules.len(),
        config.propagation_mode
    );
    let start_time = Instant::now();

    for attempt in 1..=config.max_attempts {
        grid.reset();
        observer.on_reset();
        solver.collapses = 0;
        solver.narrowed = 0;

        match solver.run(grid, observer) {
            Ok(()) => {
                let stats = GenerationStats {
                    collapses: solver.collapses,
                    narrowed: solver.narrowed,
                    attempts: attempt,
                    elapsed: start_time.elapsed(),
                };
                info!(
                    "Generation finished in {:?}: {} collapses, attempt {}",
                    stats.elapsed, stats.collapses, attempt
                );
                return Ok(stats);
            }
            Err(WfcError::Contradiction { pos, x, y }) if attempt < config.max_attempts => {
                warn!(
                    "Attempt {}/{}: contradiction at cell {} ({}, {}) after {} collapses, resetting",
                    attempt, config.max_attempts, pos, x, y, solver.collapses
                );
            }
            Err(e) => {
                error!(
                    "Generation stopped on attempt {} after {} collapses: {}",
                    attempt, solver.collapses, e
                );
                return Err(e);
            }
        }
    }

    Err(WfcError::InternalError(
        "Attempt loop exited without a result".to_string(),
    ))
}
