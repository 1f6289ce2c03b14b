/// Derive an independent seed from a base seed and a stream index (FNV-like
/// mix followed by a splitmix64 finalizer).
#[inline]
pub fn mix_seed(base: u64, stream: u64) -> u64 {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;
    let mut h = FNV_OFFSET ^ base;
    h ^= stream;
    h = h.wrapping_mul(FNV_PRIME);
    splitmix64(h ^ (h >> 33))
}

#[inline]
fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Σ size² over a set of bucket sizes.
#[inline]
pub fn sum_of_squares<I: IntoIterator<Item = usize>>(sizes: I) -> usize {
    sizes.into_iter().map(|s| s * s).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_seeds_differ_per_stream() {
        let a = mix_seed(1, 0);
        let b = mix_seed(1, 1);
        let c = mix_seed(2, 0);
        assert_ne!(a, b);
        assert_ne!(a, c);
        assert_eq!(a, mix_seed(1, 0));
    }

    #[test]
    fn squares() {
        assert_eq!(sum_of_squares(Vec::<usize>::new()), 0);
        assert_eq!(sum_of_squares([1, 2, 3]), 14);
    }
}
