//! Injectable randomness for the simulator and narration gating.

use std::cmp::Ordering;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform noise.
///
/// Production code uses [`SeededNoise`]; tests can substitute a scripted
/// source to assert exact outputs.
pub trait NoiseSource: Send {
    /// A sample drawn uniformly from `[low, high]`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// `true` with the given probability (clamped to `[0, 1]`).
    fn chance(&mut self, probability: f64) -> bool {
        if probability.is_nan() || probability <= 0.0 {
            return false;
        }
        if probability >= 1.0 {
            return true;
        }
        self.uniform(0.0, 1.0) < probability
    }
}

/// Noise backed by a seedable `StdRng`.
#[derive(Debug, Clone)]
pub struct SeededNoise {
    rng: StdRng,
}

impl SeededNoise {
    /// Deterministic sequence for a fixed seed.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Seed from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }
}

impl NoiseSource for SeededNoise {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        match low.partial_cmp(&high) {
            Some(Ordering::Less) => self.rng.random_range(low..=high),
            _ => low,
        }
    }
}
