/// Uniform choice, abstracted so the game state machine can be driven by a
/// seeded source in tests (word-option sampling and hint placement are
/// otherwise non-deterministic). Kept object-safe (no generic methods) so
/// it can be threaded through as `&mut dyn Rng`.
pub trait Rng: Send + Sync {
    /// Sample a uniform index in `[0, n)`. Panics if `n == 0`.
    fn gen_range(&mut self, n: usize) -> usize;
}

/// The real, thread-local `rand` source.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRng;

impl Rng for ThreadRng {
    fn gen_range(&mut self, n: usize) -> usize {
        assert!(n > 0, "gen_range called with an empty range");
        rand::random_range(0..n)
    }
}

/// Sample `k` distinct indices from `0..n` without replacement, uniformly,
/// via a partial Fisher-Yates shuffle driven only through `gen_range` (kept
/// object-safe rather than reaching for `rand::seq::SliceRandom`, which
/// needs a concrete `rand::Rng`, not our trait object).
pub fn sample_indices(rng: &mut dyn Rng, n: usize, k: usize) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..n).collect();
    let take = k.min(pool.len());
    for i in 0..take {
        let j = i + rng.gen_range(pool.len() - i);
        pool.swap(i, j);
    }
    pool.truncate(take);
    pool
}

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_support {
    use super::Rng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// A deterministic RNG for tests that need reproducible sampling.
    pub struct SeededRng(StdRng);

    impl SeededRng {
        pub fn new(seed: u64) -> Self {
            Self(StdRng::seed_from_u64(seed))
        }
    }

    impl Rng for SeededRng {
        fn gen_range(&mut self, n: usize) -> usize {
            assert!(n > 0, "gen_range called with an empty range");
            rand::Rng::random_range(&mut self.0, 0..n)
        }
    }
}
