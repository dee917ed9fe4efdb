use rand::Rng;
use tracing::debug;

use crate::bandit::Bandit;
use crate::sampler::RewardSampler;
use crate::stats::{argmax, ArmStats, BanditRun};

impl<S: RewardSampler> Bandit<'_, S> {
    /// Epsilon-greedy with a decaying `epsilon = 1 / i` at (1-indexed) iteration `i`.
    ///
    /// The first pull is therefore always exploratory.
    pub fn epsilon_greedy<R: Rng>(&self, n_iterations: usize, rng: &mut R) -> BanditRun {
        let n_actions = self.n_actions();
        let mut stats = ArmStats::new(n_actions);
        let mut actions = Vec::with_capacity(n_iterations);
        let mut rewards = Vec::with_capacity(n_iterations);

        for i in 1..=n_iterations {
            let epsilon = 1.0 / i as f64;
            let action = if rng.gen::<f64>() < epsilon {
                rng.gen_range(0..n_actions)
            } else {
                argmax(&stats.means)
            };

            let pull = self.pull(action, rng);
            stats.update(action, pull.reward);
            actions.push(action);
            rewards.push(pull.reward);
        }

        debug!(
            iterations = n_iterations,
            means = ?stats.means,
            "epsilon-greedy run finished"
        );

        BanditRun {
            empirical_means: stats.means,
            counts: stats.counts,
            actions,
            rewards,
        }
    }
}
