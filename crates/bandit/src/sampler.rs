use rand::{Rng, RngCore};
use rand_distr::StandardNormal;

use crate::error::BanditError;

/// Turns an arm's expected reward into a realized reward.
///
/// Closures `Fn(f64, &mut dyn RngCore) -> f64` implement this trait, so a
/// caller can inject any reward distribution.
pub trait RewardSampler {
    fn sample(&self, mean: f64, rng: &mut dyn RngCore) -> f64;
}

impl<F> RewardSampler for F
where
    F: Fn(f64, &mut dyn RngCore) -> f64,
{
    fn sample(&self, mean: f64, rng: &mut dyn RngCore) -> f64 {
        self(mean, rng)
    }
}

/// Reward 1 with probability `mean`, otherwise 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bernoulli;

impl RewardSampler for Bernoulli {
    fn sample(&self, mean: f64, rng: &mut dyn RngCore) -> f64 {
        if rng.gen_bool(mean.clamp(0.0, 1.0)) {
            1.0
        } else {
            0.0
        }
    }
}

/// Normally distributed reward centered on the arm's mean.
#[derive(Clone, Copy, Debug)]
pub struct Gaussian {
    std_dev: f64,
}

impl Gaussian {
    pub fn new(std_dev: f64) -> Result<Self, BanditError> {
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(BanditError::InvalidSampler(
                "gaussian standard deviation must be finite and non-negative",
            ));
        }
        Ok(Self { std_dev })
    }

    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }
}

impl Default for Gaussian {
    fn default() -> Self {
        Self { std_dev: 1.0 }
    }
}

impl RewardSampler for Gaussian {
    fn sample(&self, mean: f64, rng: &mut dyn RngCore) -> f64 {
        let z: f64 = rng.sample(StandardNormal);
        mean + self.std_dev * z
    }
}
