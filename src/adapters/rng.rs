//! Seeded random source.
//!
//! Wraps `ChaCha8Rng` so identical seeds replay identical runs on every
//! platform.  Without a seed the generator is seeded from OS entropy.

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::app::ports::RandomSource;

/// [`RandomSource`] backed by ChaCha8.
pub struct SimRng(ChaCha8Rng);

impl SimRng {
    /// Seed from `seed`, or from entropy when `None`.
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => {
                info!("RNG seeded with {seed}");
                Self::from_seed_u64(seed)
            }
            None => Self(ChaCha8Rng::from_entropy()),
        }
    }

    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl RandomSource for SimRng {
    fn int_inclusive(&mut self, lo: u8, hi: u8) -> u8 {
        if lo >= hi {
            return lo;
        }
        self.0.gen_range(lo..=hi)
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        if !(lo < hi) {
            return lo;
        }
        self.0.gen_range(lo..hi)
    }
}
