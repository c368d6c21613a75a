//! Core library for the socket-tile Wave Function Collapse generator.
//! Defines the grid model, entropy selection, constraint propagation and the
//! collapse loop. Rule compilation lives in `wfc-rules`.

use thiserror::Error;
use wfc_rules::RuleError;

/// Minimum-entropy cell selection.
pub mod entropy;
/// Square grid of candidate cells.
pub mod grid;
/// Constraint propagation after a collapse.
pub mod propagator;
/// Uniform random selection helpers.
pub mod random;

/// The collapse loop.
pub mod runner;

/// Strategy for breaking ties between minimum-entropy cells.
pub use crate::entropy::SelectionStrategy;
/// A single grid cell.
pub use crate::grid::Cell;
/// Square grid of cells.
pub use crate::grid::Grid;
/// Selects how far constraints travel after each collapse.
pub use crate::propagator::PropagationMode;
/// Receives collapse and reset events.
pub use crate::runner::CollapseObserver;
/// Statistics of a finished generation.
pub use crate::runner::GenerationStats;
/// Solver configuration.
pub use crate::runner::WfcConfig;
/// Entry points of the collapse loop.
pub use crate::runner::{run_generation, run_generation_observed};

pub use wfc_rules::{compile_rules, BaseTile, Direction, RuleTable, VariantId};

/// Errors that can occur while building a grid or running a generation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WfcError {
    /// A cell ran out of candidate variants. The grid is left partially collapsed.
    #[error("Contradiction: cell {pos} at ({x}, {y}) has no possible variants")]
    Contradiction { pos: usize, x: usize, y: usize },
    /// Invalid grid dimension, empty rule table or inconsistent solver settings.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
    /// The base tile catalogue could not be compiled.
    #[error("Rule compilation error: {0}")]
    Rules(#[from] RuleError),
    /// An unexpected internal error occurred.
    #[error("Internal error: {0}")]
    InternalError(String),
}
