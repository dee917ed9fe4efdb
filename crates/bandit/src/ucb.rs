use rand::Rng;
use tracing::debug;

use crate::bandit::Bandit;
use crate::sampler::RewardSampler;
use crate::stats::{argmax, ArmStats, BanditRun};

impl<S: RewardSampler> Bandit<'_, S> {
    /// UCB1.
    ///
    /// Arms are seeded in order with one pull each (only the first
    /// `n_iterations` of them when the budget is smaller than the action
    /// count). Each later pull takes the arm maximizing
    /// `mean[a] + sqrt(2 ln t / count[a])`, with `t` the number of pulls made
    /// so far.
    pub fn ucb<R: Rng>(&self, n_iterations: usize, rng: &mut R) -> BanditRun {
        let n_actions = self.n_actions();
        let mut stats = ArmStats::new(n_actions);
        let mut actions = Vec::with_capacity(n_iterations);
        let mut rewards = Vec::with_capacity(n_iterations);

        let seeded = n_iterations.min(n_actions);
        for action in 0..seeded {
            let pull = self.pull(action, rng);
            stats.update(action, pull.reward);
            actions.push(action);
            rewards.push(pull.reward);
        }

        for t in seeded..n_iterations {
            // t >= n_actions >= 1 here, so every count is non-zero and ln(t) >= 0.
            let scores = ucb_scores(&stats, t);
            let action = argmax(&scores);
            let pull = self.pull(action, rng);
            stats.update(action, pull.reward);
            actions.push(action);
            rewards.push(pull.reward);
        }

        debug!(
            iterations = n_iterations,
            means = ?stats.means,
            counts = ?stats.counts,
            "ucb run finished"
        );

        BanditRun {
            empirical_means: stats.means,
            counts: stats.counts,
            actions,
            rewards,
        }
    }
}

/// UCB1 scores for the given statistics at pull index `t`.
///
/// Arms that were never pulled score `f64::INFINITY`.
pub fn ucb_scores(stats: &ArmStats, t: usize) -> Vec<f64> {
    let log_t = (t.max(1) as f64).ln();
    stats
        .means
        .iter()
        .zip(&stats.counts)
        .map(|(&mean, &count)| {
            if count == 0 {
                f64::INFINITY
            } else {
                mean + (2.0 * log_t / count as f64).sqrt()
            }
        })
        .collect()
}
