//! Random sources for the synthetic metrics generator.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform draws.
///
/// The generator never calls an RNG directly; tests swap in a fixed source to
/// pin exact outputs.
pub trait RandomSource {
    /// Draw a value in `[low, high)`.
    fn uniform(&mut self, low: f64, high: f64) -> f64;
}

impl<S: RandomSource + ?Sized> RandomSource for &mut S {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (**self).uniform(low, high)
    }
}

/// Adapter over any `rand` generator.
#[derive(Debug, Clone)]
pub struct RngSource<R = StdRng> {
    rng: R,
}

impl RngSource<StdRng> {
    /// Reproducible source for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Process default: seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded when a seed is given, entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl<R: Rng> RngSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        // Same shape as `low + random() * width`
        low + self.rng.gen::<f64>() * (high - low)
    }
}

/// Deterministic source that always lands at the same relative position in
/// the requested range (0.0 = low end, 1.0 = high end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedFraction(pub f64);

impl FixedFraction {
    /// Always the low end of the range.
    pub fn low() -> Self {
        FixedFraction(0.0)
    }

    /// Always the middle of the range.
    pub fn midpoint() -> Self {
        FixedFraction(0.5)
    }
}

impl RandomSource for FixedFraction {
    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        low + self.0 * (high - low)
    }
}
