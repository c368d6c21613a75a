use crate::formats::FormatParser;
#[cfg(feature = "serde")]
use crate::generator::validate;
use crate::{BaseTile, LoadError};
#[cfg(feature = "serde")]
use serde::Deserialize;

/// Parser for catalogues written in RON (Rusty Object Notation).
///
/// ```ron
/// (
///     tiles: [
///         (id: "empty", sockets: 0b0000),
///         (id: "corner", sockets: 0b1100),
///     ],
/// )
/// ```
pub struct RonFormatParser;

impl Default for RonFormatParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RonFormatParser {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonTileData {
    id: String,
    /// Clockwise from the top edge, most significant bit first.
    sockets: u8,
}

#[cfg(feature = "serde")]
#[derive(Debug, Clone, Deserialize)]
struct RonCatalogueFile {
    tiles: Vec<RonTileData>,
}

impl FormatParser for RonFormatParser {
    fn format_name(&self) -> &'static str {
        "Rusty Object Notation (RON)"
    }

    #[cfg(feature = "serde")]
    fn parse(&self, ron_content: &str) -> Result<Vec<BaseTile>, LoadError> {
        let file: RonCatalogueFile = ron::from_str(ron_content)
            .map_err(|e| LoadError::ParseError(format!("RON deserialization failed: {e}")))?;

        let tiles: Vec<BaseTile> = file
            .tiles
            .into_iter()
            .map(|t| BaseTile::new(t.id, t.sockets))
            .collect();
        validate(&tiles)?;

        log::debug!("Parsed {} base tiles from RON", tiles.len());
        Ok(tiles)
    }

    #[cfg(not(feature = "serde"))]
    fn parse(&self, _ron_content: &str) -> Result<Vec<BaseTile>, LoadError> {
        Err(LoadError::FeatureNotEnabled(
            "serde (required for RON parsing)".to_string(),
        ))
    }
}

/// Parses a base tile catalogue from a RON string.
pub fn parse_ron_catalogue(ron_content: &str) -> Result<Vec<BaseTile>, LoadError> {
    RonFormatParser::new().parse(ron_content)
}
