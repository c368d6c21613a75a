//! Setup module for the Tile Forge application.
//!
//! Rule loading and the single-grid and batch execution modes.

pub mod execution;
