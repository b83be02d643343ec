use rand::seq::SliceRandom;
use rand::Rng;

#[inline]
pub fn max_u64(a: u64, b: u64) -> u64 {
    if a >= b {
        a
    } else {
        b
    }
}

/// Splits `items` into contiguous chunks of at most `size` elements.
///
/// A `size` of `0` is unbounded and produces a single chunk holding the
/// whole input, otherwise the input is split into `ceil(len / size)` chunks
/// with the final chunk holding the remainder.
pub fn partition_all<T>(size: usize, items: &[T]) -> Vec<&[T]> {
    if size == 0 {
        return vec![items];
    }

    items.chunks(size).collect()
}

/// Shuffles `items` in place with a uniformly random permutation.
pub fn shuffle<T, R>(items: &mut [T], rng: &mut R)
where
    R: Rng + ?Sized,
{
    items.shuffle(rng);
}

/// Shuffles a set of strings in place using the thread local RNG.
pub fn shuffle_strings(items: &mut [String]) {
    shuffle(items, &mut rand::thread_rng());
}
