//! Repeated independent runs of a strategy, averaged per iteration.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bandit::Bandit;
use crate::error::BanditError;
use crate::mdp::Mdp;
use crate::sampler::RewardSampler;
use crate::stats::BanditRun;
use crate::thompson::{BetaPrior, ThompsonConfig};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Strategy {
    EpsilonGreedy,
    Thompson {
        prior: Vec<BetaPrior>,
        config: ThompsonConfig,
    },
    Ucb,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::EpsilonGreedy => "epsilon-greedy",
            Strategy::Thompson { .. } => "thompson",
            Strategy::Ucb => "ucb",
        }
    }

    /// Runs the strategy once. Thompson sampling starts from a copy of the
    /// configured prior, so repeated calls are independent.
    pub fn run<S: RewardSampler>(
        &self,
        bandit: &Bandit<'_, S>,
        n_iterations: usize,
        rng: &mut StdRng,
    ) -> Result<BanditRun, BanditError> {
        match self {
            Strategy::EpsilonGreedy => Ok(bandit.epsilon_greedy(n_iterations, rng)),
            Strategy::Thompson { prior, config } => {
                let mut prior = prior.clone();
                bandit.thompson_sampling(&mut prior, n_iterations, config, rng)
            }
            Strategy::Ucb => Ok(bandit.ucb(n_iterations, rng)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSummary {
    pub strategy: String,
    pub trials: usize,
    /// Mean reward observed at each iteration, across trials.
    pub average_rewards: Vec<f64>,
    /// Mean of the returned empirical means per arm, across trials.
    pub average_means: Vec<f64>,
}

/// Runs `trials` independent runs; trial `i` uses an RNG seeded with `seed + i`.
///
/// # Errors
///
/// Propagates the first error returned by a run.
pub fn run_trials<S: RewardSampler>(
    mdp: &Mdp,
    sampler: S,
    strategy: &Strategy,
    n_iterations: usize,
    trials: usize,
    seed: u64,
) -> Result<TrialSummary, BanditError> {
    let bandit = Bandit::new(mdp, sampler);
    let mut reward_sums = vec![0.0; n_iterations];
    let mut mean_sums = vec![0.0; mdp.n_actions()];

    for trial in 0..trials {
        let mut rng = StdRng::seed_from_u64(seed.wrapping_add(trial as u64));
        let run = strategy.run(&bandit, n_iterations, &mut rng)?;
        for (sum, r) in reward_sums.iter_mut().zip(&run.rewards) {
            *sum += r;
        }
        for (sum, m) in mean_sums.iter_mut().zip(&run.empirical_means) {
            *sum += m;
        }
    }

    let denom = trials.max(1) as f64;
    let summary = TrialSummary {
        strategy: strategy.name().to_string(),
        trials,
        average_rewards: reward_sums.into_iter().map(|s| s / denom).collect(),
        average_means: mean_sums.into_iter().map(|s| s / denom).collect(),
    };
    info!(
        strategy = %summary.strategy,
        trials,
        iterations = n_iterations,
        means = ?summary.average_means,
        "trials finished"
    );
    Ok(summary)
}
