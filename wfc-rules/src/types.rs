use bitvec::prelude::*;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Number of socket bits carried by a tile, one per edge.
pub const SOCKET_BITS: u32 = 4;

/// One of the four von Neumann directions, in clockwise order starting at the top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All directions in socket bit order (clockwise from UP).
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The direction pointing back from the neighbour.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    /// Position of this direction in [`Direction::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Up => 0,
            Self::Right => 1,
            Self::Down => 2,
            Self::Left => 3,
        }
    }

    /// Socket mask for the edge facing this direction.
    ///
    /// The most significant of the four bits is UP, then clockwise:
    /// `0b1000` UP, `0b0100` RIGHT, `0b0010` DOWN, `0b0001` LEFT.
    #[must_use]
    pub const fn bit(self) -> u8 {
        1 << (SOCKET_BITS as usize - 1 - self.index())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Up => "UP",
            Self::Right => "RIGHT",
            Self::Down => "DOWN",
            Self::Left => "LEFT",
        };
        f.write_str(name)
    }
}

/// Dense identifier of a variant; its index in the compiled catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariantId(pub usize);

/// Errors raised while validating or compiling a base tile catalogue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// No base tiles were supplied.
    #[error("Base tile catalogue cannot be empty.")]
    EmptyCatalogue,
    /// A base tile has an empty identifier.
    #[error("Base tile at index {0} has an empty id.")]
    EmptyBaseTileId(usize),
    /// Two base tiles share an identifier.
    #[error("Duplicate base tile id: {0}")]
    DuplicateBaseTile(String),
    /// A socket pattern does not fit in [`SOCKET_BITS`] bits.
    #[error("Base tile '{id}' has socket pattern {sockets:#b} outside of the 4 socket bits")]
    SocketOutOfRange { id: String, sockets: u8 },
}

/// Immutable definition of a tile before rotation.
///
/// `sockets` is read clockwise from the top edge, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseTile {
    pub id: String,
    pub sockets: u8,
}

impl BaseTile {
    pub fn new(id: impl Into<String>, sockets: u8) -> Self {
        Self {
            id: id.into(),
            sockets,
        }
    }
}

/// A distinct rotation of a [`BaseTile`] together with its adjacency lists.
#[derive(Debug, Clone)]
pub struct Variant {
    pub(crate) name: String,
    pub(crate) base_id: String,
    pub(crate) rotation: u8,
    pub(crate) sockets: u8,
    /// Allowed neighbours, indexed by [`Direction::index`], one bit per [`VariantId`].
    pub(crate) adjacency: [BitVec; 4],
}

impl Variant {
    /// Name in the form `"<baseId>_<rotation>"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_id(&self) -> &str {
        &self.base_id
    }

    /// Quarter turns clockwise applied to the base tile.
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    pub fn sockets(&self) -> u8 {
        self.sockets
    }

    /// Whether this variant exposes a connector toward `direction`.
    pub fn has_socket(&self, direction: Direction) -> bool {
        self.sockets & direction.bit() != 0
    }

    /// Variants permitted in the neighbouring cell toward `direction`.
    pub fn adjacency(&self, direction: Direction) -> &BitSlice {
        &self.adjacency[direction.index()]
    }
}

/// The compiled compatibility contract between variants.
///
/// Built once by [`crate::compile_rules`] and read-only afterwards, so a single
/// table can be shared by any number of concurrent generations.
#[derive(Debug, Clone)]
pub struct RuleTable {
    pub(crate) variants: Vec<Variant>,
    pub(crate) by_name: HashMap<String, VariantId>,
}

impl RuleTable {
    /// Number of variants in the catalogue.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.get(id.0)
    }

    pub fn id_of(&self, name: &str) -> Option<VariantId> {
        self.by_name.get(name).copied()
    }

    pub fn name_of(&self, id: VariantId) -> Option<&str> {
        self.variant(id).map(Variant::name)
    }

    /// Bitset of variants `id` permits toward `direction`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not part of this table.
    #[inline]
    pub fn allowed(&self, id: VariantId, direction: Direction) -> &BitSlice {
        self.variants[id.0].adjacency(direction)
    }

    /// Checks whether `neighbor` may sit next to `tile` toward `direction`.
    ///
    /// Unknown ids are treated as disallowed.
    #[inline]
    pub fn permits(&self, tile: VariantId, neighbor: VariantId, direction: Direction) -> bool {
        self.variant(tile)
            .and_then(|v| v.adjacency(direction).get(neighbor.0).map(|bit| *bit))
            .unwrap_or(false)
    }

    /// Name-keyed view of [`RuleTable::allowed`].
    pub fn allowed_names(&self, id: VariantId, direction: Direction) -> Vec<&str> {
        self.variant(id)
            .map(|v| {
                v.adjacency(direction)
                    .iter_ones()
                    .map(|other| self.variants[other].name())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// A set containing every variant; the initial candidate set of a cell.
    pub fn full_set(&self) -> BitVec {
        bitvec![1; self.variants.len()]
    }
}
