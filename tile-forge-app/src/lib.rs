//! Tile Forge Application Library
//!
//! Configuration, logging, rendering, output and the run modes of the
//! `tile-forge` command line tool.

pub mod app;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod setup;
pub mod visualization;

pub use config::{AppConfig, Settings};
pub use error::AppError;

// Re-export the main function so it can be called from the root crate
pub use crate::app::main;
