//! Session-scoped randomness.
//!
//! Every synthesis step (fake plugins, farbling, shuffling) draws from one
//! [`RandomSource`] that lives as long as the execution context. The same
//! seed always reproduces the same surface; a fresh seed per session keeps
//! surfaces unlinkable across sessions.

use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Source of randomness threaded through plugin synthesis.
pub trait RandomSource {
    /// Uniform index in `0..bound`. `bound` must be non-zero.
    fn next_index(&mut self, bound: usize) -> usize;

    /// Random alphanumeric string of exactly `len` characters.
    fn random_string(&mut self, len: usize) -> String;

    /// Pick one entry of a fixed word list.
    fn pick<'a>(&mut self, options: &[&'a str]) -> &'a str {
        if options.is_empty() {
            return "";
        }
        options[self.next_index(options.len())]
    }

    /// In-place Fisher-Yates shuffle.
    fn shuffle<T>(&mut self, items: &mut [T])
    where
        Self: Sized,
    {
        for i in (1..items.len()).rev() {
            let j = self.next_index(i + 1);
            items.swap(i, j);
        }
    }
}

/// Seeded PRNG for one execution context.
#[derive(Debug, Clone)]
pub struct SessionRandom {
    rng: StdRng,
    seed: u64,
    draws: u64,
}

impl SessionRandom {
    /// Create a source from a numeric seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            seed,
            draws: 0,
        }
    }

    /// Create a source from a session token.
    ///
    /// Within one build, the same token yields the same sequence. The
    /// token hash and the `StdRng` algorithm may change across toolchain
    /// and `rand` releases.
    pub fn from_seed_str(token: &str) -> Self {
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        Self::from_seed(hasher.finish())
    }

    /// Create a source with a fresh random seed.
    pub fn from_entropy() -> Self {
        Self::from_seed(rand::random::<u64>())
    }

    /// The seed this source started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of draws taken so far. Only ever grows.
    pub fn draws(&self) -> u64 {
        self.draws
    }
}

impl RandomSource for SessionRandom {
    fn next_index(&mut self, bound: usize) -> usize {
        self.draws += 1;
        self.rng.gen_range(0..bound)
    }

    fn random_string(&mut self, len: usize) -> String {
        self.draws += 1;
        (0..len)
            .map(|_| char::from(self.rng.sample(Alphanumeric)))
            .collect()
    }
}
