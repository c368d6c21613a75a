//! Adjacency rule compiler for socket-based tiles.
//!
//! Base tiles describe which of their four edges carry a connector. The
//! compiler expands them into their distinct rotations ("variants") and derives,
//! for every ordered pair of variants and every direction, whether they may
//! sit next to each other.

use thiserror::Error;

pub mod formats;
pub mod generator;
pub mod loader;
pub mod types;

pub use generator::{compile_rules, default_catalogue, rotate_left_bits, rotate_right_bits, xnor};
pub use types::{BaseTile, Direction, RuleError, RuleTable, Variant, VariantId, SOCKET_BITS};

/// Errors raised while loading a base tile catalogue from a file.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("I/O error reading file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse rules format: {0}")]
    ParseError(String),
    #[error("Invalid rule data: {0}")]
    InvalidData(String),
    #[error("Feature not enabled: {0}")]
    FeatureNotEnabled(String),
}

impl From<RuleError> for LoadError {
    fn from(error: RuleError) -> Self {
        Self::InvalidData(format!("Catalogue error: {error}"))
    }
}
