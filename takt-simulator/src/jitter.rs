//! ## takt-simulator::jitter
//! **Per-iteration processing time variation**
//!
//! A real loop never spends the same time on every iteration. These models
//! add the variable part on top of a fixed work cost.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use takt_core::Micros;

/// Trait for jitter models.
pub trait JitterModel: Send {
    /// Extra time spent by the next iteration.
    fn sample(&mut self) -> Micros;
}

/// Uniform jitter in `0..=max`, reproducible from a seed.
#[derive(Debug)]
pub struct RandomJitterModel {
    max_us: u64,
    rng: SmallRng,
}

impl RandomJitterModel {
    pub fn new(max_us: u64, seed: u64) -> Self {
        Self {
            max_us,
            rng: SmallRng::seed_from_u64(seed),
        }
    }
}

impl JitterModel for RandomJitterModel {
    fn sample(&mut self) -> Micros {
        let jitter = self.rng.random_range(0..=self.max_us);
        Micros::from_micros(i64::try_from(jitter).unwrap_or(i64::MAX))
    }
}

/// No-op jitter model (no jitter).
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitterModel;

impl JitterModel for NoJitterModel {
    fn sample(&mut self) -> Micros {
        Micros::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_jitter_model_bounds() {
        let mut model = RandomJitterModel::new(50, 7);
        for _ in 0..1_000 {
            let jitter = model.sample();
            assert!(jitter >= Micros::ZERO);
            assert!(jitter <= Micros::from_micros(50));
        }
    }

    #[test]
    fn test_random_jitter_model_is_seeded() {
        let mut a = RandomJitterModel::new(10_000, 3);
        let mut b = RandomJitterModel::new(10_000, 3);
        for _ in 0..100 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn test_no_jitter_model() {
        let mut model = NoJitterModel;
        assert_eq!(model.sample(), Micros::ZERO);
    }
}
