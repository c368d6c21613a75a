use colored::Colorize;
use std::collections::HashMap;
use wfc_core::{CollapseObserver, RuleTable};

/// Box-drawing glyph for every socket pattern, indexed by the 4-bit pattern.
const SOCKET_GLYPHS: [char; 16] = [
    '·', '╴', '╷', '┐', '╶', '─', '┌', '┬', '╵', '┘', '│', '┤', '└', '┴', '├', '┼',
];

/// Glyph drawn for a bound cell that has not been collapsed yet.
pub const UNRESOLVED_GLYPH: char = '?';

/// Maps variant names to the character a renderer draws for them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlyphAtlas {
    glyphs: HashMap<String, char>,
}

impl GlyphAtlas {
    /// Derives a glyph for every variant of `rules` from its socket pattern.
    pub fn from_rules(rules: &RuleTable) -> Self {
        let glyphs = rules
            .variants()
            .iter()
            .map(|variant| (variant.name().to_owned(), glyph_for_sockets(variant.sockets())))
            .collect();
        Self { glyphs }
    }

    /// Adds or replaces the glyph of `name`.
    pub fn insert(&mut self, name: impl Into<String>, glyph: char) {
        self.glyphs.insert(name.into(), glyph);
    }

    pub fn glyph(&self, name: &str) -> Option<char> {
        self.glyphs.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }
}

/// Box-drawing glyph whose arms point at the connected edges.
pub fn glyph_for_sockets(sockets: u8) -> char {
    SOCKET_GLYPHS[usize::from(sockets & 0b1111)]
}

/// Terminal renderer bound to the cells of one grid.
///
/// Render handles live in a side mapping from cell index to the glyph shown
/// there, so the grid itself carries no rendering state. Collapse events for
/// an index without a handle, or for a variant without a glyph, are logged and
/// otherwise ignored.
#[derive(Debug, Clone)]
pub struct TerminalCanvas {
    dim: usize,
    atlas: GlyphAtlas,
    handles: HashMap<usize, Option<char>>,
}

impl TerminalCanvas {
    /// Creates a canvas for a `dim x dim` grid with no handles bound.
    pub fn new(dim: usize, atlas: GlyphAtlas) -> Self {
        Self {
            dim,
            atlas,
            handles: HashMap::new(),
        }
    }

    /// Binds a handle for every cell of the grid.
    pub fn bind_all(&mut self) {
        for pos in 0..self.dim * self.dim {
            self.bind(pos);
        }
    }

    /// Binds a handle for the cell at `pos`, leaving an existing glyph in place.
    pub fn bind(&mut self, pos: usize) {
        self.handles.entry(pos).or_insert(None);
    }

    pub fn is_bound(&self, pos: usize) -> bool {
        self.handles.contains_key(&pos)
    }

    /// Glyph currently shown at `pos`.
    pub fn glyph_at(&self, pos: usize) -> Option<char> {
        self.handles.get(&pos).copied().flatten()
    }

    /// Shows the glyph of variant `name` at `pos`.
    pub fn assign(&mut self, pos: usize, name: &str) {
        let Some(handle) = self.handles.get_mut(&pos) else {
            log::warn!("No render handle bound for cell {}, skipping '{}'", pos, name);
            return;
        };
        match self.atlas.glyph(name) {
            Some(glyph) => *handle = Some(glyph),
            None => log::warn!("No glyph for variant '{}' at cell {}", name, pos),
        }
    }

    /// Clears every bound handle.
    pub fn reset(&mut self) {
        for handle in self.handles.values_mut() {
            *handle = None;
        }
    }

    /// Draws the grid, one line per row. Unbound cells are blank and bound
    /// cells without a glyph show [`UNRESOLVED_GLYPH`].
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.dim * (self.dim + 1) * 4);
        for y in 0..self.dim {
            for x in 0..self.dim {
                let pos = y * self.dim + x;
                let cell = match self.handles.get(&pos) {
                    None => " ".normal(),
                    Some(None) => UNRESOLVED_GLYPH.to_string().red(),
                    Some(Some(glyph)) if *glyph == SOCKET_GLYPHS[0] => glyph.to_string().dimmed(),
                    Some(Some(glyph)) => glyph.to_string().cyan(),
                };
                out.push_str(&cell.to_string());
            }
            out.push('\n');
        }
        out
    }
}

impl CollapseObserver for TerminalCanvas {
    fn on_cell_collapsed(&mut self, pos: usize, variant: &str) {
        self.assign(pos, variant);
    }

    fn on_reset(&mut self) {
        self.reset();
    }
}
