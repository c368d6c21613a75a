use crate::types::{BaseTile, Direction, RuleError, RuleTable, Variant, VariantId, SOCKET_BITS};
use bitvec::prelude::*;
use log::debug;
use std::collections::{HashMap, HashSet};

#[inline]
const fn mask(width: u32) -> u32 {
    if width >= u32::BITS {
        u32::MAX
    } else {
        (1 << width) - 1
    }
}

#[inline]
const fn clamp_width(width: u32) -> u32 {
    if width > u32::BITS {
        u32::BITS
    } else {
        width
    }
}

/// Rotates the low `width` bits of `n` right by `bits`, wrapping around at `width`.
///
/// Widths above 32 are treated as 32. A width of 0 yields 0.
#[must_use]
pub const fn rotate_right_bits(n: u32, bits: u32, width: u32) -> u32 {
    let width = clamp_width(width);
    if width == 0 {
        return 0;
    }
    let bits = bits % width;
    if bits == 0 {
        return n & mask(width);
    }
    ((n >> bits) | (n << (width - bits))) & mask(width)
}

/// Rotates the low `width` bits of `n` left by `bits`, wrapping around at `width`.
///
/// Widths above 32 are treated as 32. A width of 0 yields 0.
#[must_use]
pub const fn rotate_left_bits(n: u32, bits: u32, width: u32) -> u32 {
    let width = clamp_width(width);
    if width == 0 {
        return 0;
    }
    let bits = bits % width;
    if bits == 0 {
        return n & mask(width);
    }
    ((n << bits) | (n >> (width - bits))) & mask(width)
}

/// Bitwise "both set or both clear" over the low `width` bits.
#[must_use]
pub const fn xnor(a: u32, b: u32, width: u32) -> u32 {
    !(a ^ b) & mask(width)
}

/// The catalogue shipped with the application: an empty tile, a straight, a
/// corner, a T-junction and a cross. Compiles to 12 variants.
pub fn default_catalogue() -> Vec<BaseTile> {
    vec![
        BaseTile::new("0", 0b0000),
        BaseTile::new("1", 0b0101),
        BaseTile::new("2", 0b1100),
        BaseTile::new("3", 0b0111),
        BaseTile::new("4", 0b1111),
    ]
}

pub(crate) fn validate(base_tiles: &[BaseTile]) -> Result<(), RuleError> {
    if base_tiles.is_empty() {
        return Err(RuleError::EmptyCatalogue);
    }
    let mut seen = HashSet::new();
    for (index, tile) in base_tiles.iter().enumerate() {
        if tile.id.is_empty() {
            return Err(RuleError::EmptyBaseTileId(index));
        }
        if u32::from(tile.sockets) > mask(SOCKET_BITS) {
            return Err(RuleError::SocketOutOfRange {
                id: tile.id.clone(),
                sockets: tile.sockets,
            });
        }
        if !seen.insert(tile.id.as_str()) {
            return Err(RuleError::DuplicateBaseTile(tile.id.clone()));
        }
    }
    Ok(())
}

/// Compiles a base tile catalogue into the immutable [`RuleTable`].
///
/// Every base tile is rotated clockwise 0..3 quarter turns. A rotation whose
/// socket pattern was already produced (by this or an earlier tile) is
/// skipped. Variant `A` then permits `B` toward direction `D` when the edge
/// `A` exposes toward `D` matches the edge `B` exposes toward `D.opposite()`,
/// which is the XNOR of `A` with `B` turned half way round.
///
/// # Errors
///
/// Returns a [`RuleError`] for an empty catalogue, empty or duplicate ids, or
/// socket patterns wider than [`SOCKET_BITS`].
pub fn compile_rules(base_tiles: &[BaseTile]) -> Result<RuleTable, RuleError> {
    validate(base_tiles)?;

    let mut produced = HashSet::new();
    let mut variants = Vec::new();
    for tile in base_tiles {
        for rotation in 0..SOCKET_BITS {
            let sockets = rotate_right_bits(u32::from(tile.sockets), rotation, SOCKET_BITS);
            if !produced.insert(sockets) {
                continue;
            }
            variants.push(Variant {
                name: format!("{}_{}", tile.id, rotation),
                base_id: tile.id.clone(),
                rotation: rotation as u8,
                sockets: sockets as u8,
                adjacency: Default::default(),
            });
        }
    }

    let count = variants.len();
    let patterns: Vec<u32> = variants.iter().map(|v| u32::from(v.sockets)).collect();
    for (index, variant) in variants.iter_mut().enumerate() {
        let mut adjacency: [BitVec; 4] = std::array::from_fn(|_| bitvec![0; count]);
        for (other, &other_sockets) in patterns.iter().enumerate() {
            let matches = xnor(
                patterns[index],
                rotate_right_bits(other_sockets, 2, SOCKET_BITS),
                SOCKET_BITS,
            );
            for direction in Direction::ALL {
                if matches & u32::from(direction.bit()) != 0 {
                    adjacency[direction.index()].set(other, true);
                }
            }
        }
        variant.adjacency = adjacency;
    }

    let by_name: HashMap<String, VariantId> = variants
        .iter()
        .enumerate()
        .map(|(index, v)| (v.name.clone(), VariantId(index)))
        .collect();

    debug!(
        "Compiled {} base tiles into {} variants",
        base_tiles.len(),
        count
    );

    Ok(RuleTable { variants, by_name })
}
