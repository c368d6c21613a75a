use crate::formats::{FormatParser, RonFormatParser};
use crate::{compile_rules, BaseTile, LoadError, RuleTable};
use std::fs;
use std::path::Path;

/// Reads a base tile catalogue from `path`.
///
/// Only RON is supported at the moment; the file extension is not checked.
pub fn load_catalogue(path: &Path) -> Result<Vec<BaseTile>, LoadError> {
    let parser = RonFormatParser::new();
    log::info!("Loading {} catalogue from {:?}", parser.format_name(), path);
    let content = fs::read_to_string(path)?;
    parser.parse(&content)
}

/// Reads a catalogue from `path` and compiles it into a [`RuleTable`].
pub fn load_from_file(path: &Path) -> Result<RuleTable, LoadError> {
    let tiles = load_catalogue(path)?;
    Ok(compile_rules(&tiles)?)
}
