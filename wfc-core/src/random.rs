use rand::seq::{IteratorRandom, SliceRandom};
use rand::Rng;

/// Picks one element of `items` with probability `1/n`.
///
/// Returns `None` for an empty slice; callers must check.
pub fn pick_uniform<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> Option<&'a T> {
    items.choose(rng)
}

/// Iterator counterpart of [`pick_uniform`], for unordered collections such as
/// the set bits of a candidate set.
pub fn pick_uniform_iter<I, R>(rng: &mut R, items: I) -> Option<I::Item>
where
    I: IntoIterator,
    R: Rng + ?Sized,
{
    items.into_iter().choose(rng)
}
