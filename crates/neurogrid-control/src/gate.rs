//! Rate limit for outgoing narration requests.

use neurogrid_metrics::NoiseSource;

/// Admits a narration request only when nothing is in flight and a
/// Bernoulli draw succeeds.
#[derive(Debug, Clone, Copy)]
pub struct NarrationGate {
    probability: f64,
    max_in_flight: usize,
}

impl NarrationGate {
    pub fn new(probability: f64) -> Self {
        Self {
            probability,
            max_in_flight: 1,
        }
    }

    pub fn admit<N: NoiseSource + ?Sized>(&self, in_flight: usize, noise: &mut N) -> bool {
        if in_flight >= self.max_in_flight {
            return false;
        }
        noise.chance(self.probability)
    }
}
