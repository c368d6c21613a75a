use crate::{BaseTile, LoadError};

/// Interface for format-specific catalogue parsers.
pub trait FormatParser {
    /// Parses file content into a validated list of base tiles.
    ///
    /// The returned catalogue is ready to be handed to [`crate::compile_rules`].
    fn parse(&self, content: &str) -> Result<Vec<BaseTile>, LoadError>;

    /// Descriptive name of the format, used in log and error messages.
    fn format_name(&self) -> &'static str;
}
