use rand::Rng;
use rand_distr::{Beta, Distribution};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::bandit::Bandit;
use crate::error::BanditError;
use crate::sampler::RewardSampler;
use crate::stats::{argmax, BanditRun};

/// Beta hyperparameters over one arm's success probability.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BetaPrior {
    pub alpha: f64,
    pub beta: f64,
}

impl BetaPrior {
    pub fn new(alpha: f64, beta: f64) -> Self {
        Self { alpha, beta }
    }

    /// `Beta(1, 1)` for every arm.
    pub fn uniform(n_actions: usize) -> Vec<Self> {
        vec![Self::new(1.0, 1.0); n_actions]
    }

    pub fn mean(&self) -> f64 {
        self.alpha / (self.alpha + self.beta)
    }
}

/// What to do when an arm returns a reward outside `{0, 1}`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardPolicy {
    /// Fail the run with [`BanditError::InvalidReward`].
    #[default]
    Strict,
    /// Leave the prior untouched and keep going.
    Lenient,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThompsonConfig {
    /// Beta draws averaged per arm and iteration.
    pub samples: usize,
    pub reward_policy: RewardPolicy,
}

impl Default for ThompsonConfig {
    fn default() -> Self {
        Self {
            samples: 1,
            reward_policy: RewardPolicy::Strict,
        }
    }
}

impl<S: RewardSampler> Bandit<'_, S> {
    /// Thompson sampling for Bernoulli bandits.
    ///
    /// `prior` is updated in place: a reward of 1 increments the pulled arm's
    /// `alpha`, a reward of 0 its `beta`.
    ///
    /// # Errors
    ///
    /// Fails before any pull when the prior table does not match the action
    /// count, holds a hyperparameter that is not finite and positive, or when
    /// `config.samples` is zero. Under [`RewardPolicy::Strict`] a non-binary
    /// reward stops the run; the error carries the failing iteration and
    /// `prior` keeps the updates of every earlier pull.
    pub fn thompson_sampling<R: Rng>(
        &self,
        prior: &mut [BetaPrior],
        n_iterations: usize,
        config: &ThompsonConfig,
        rng: &mut R,
    ) -> Result<BanditRun, BanditError> {
        let n_actions = self.n_actions();
        if prior.len() != n_actions {
            return Err(BanditError::PriorShape {
                expected: n_actions,
                got: prior.len(),
            });
        }
        for (action, p) in prior.iter().enumerate() {
            let valid = |v: f64| v.is_finite() && v > 0.0;
            if !valid(p.alpha) || !valid(p.beta) {
                return Err(BanditError::InvalidPrior {
                    action,
                    alpha: p.alpha,
                    beta: p.beta,
                });
            }
        }
        if config.samples == 0 {
            return Err(BanditError::InvalidSampleCount);
        }

        let mut means = vec![0.0; n_actions];
        let mut counts = vec![0; n_actions];
        let mut actions = Vec::with_capacity(n_iterations);
        let mut rewards = Vec::with_capacity(n_iterations);

        for iteration in 0..n_iterations {
            for (action, p) in prior.iter().enumerate() {
                let dist = Beta::new(p.alpha, p.beta).map_err(|_| BanditError::InvalidPrior {
                    action,
                    alpha: p.alpha,
                    beta: p.beta,
                })?;
                let total: f64 = (0..config.samples).map(|_| dist.sample(rng)).sum();
                means[action] = total / config.samples as f64;
            }

            let action = argmax(&means);
            let pull = self.pull(action, rng);
            if pull.reward == 1.0 {
                prior[action].alpha += 1.0;
            } else if pull.reward == 0.0 {
                prior[action].beta += 1.0;
            } else {
                match config.reward_policy {
                    RewardPolicy::Strict => {
                        return Err(BanditError::InvalidReward {
                            iteration,
                            action,
                            reward: pull.reward,
                        })
                    }
                    RewardPolicy::Lenient => {
                        warn!(action, reward = pull.reward, "non-binary reward ignored");
                    }
                }
            }

            counts[action] += 1;
            actions.push(action);
            rewards.push(pull.reward);
        }

        debug!(
            iterations = n_iterations,
            posterior = ?prior,
            "thompson sampling run finished"
        );

        Ok(BanditRun {
            empirical_means: means,
            counts,
            actions,
            rewards,
        })
    }
}
