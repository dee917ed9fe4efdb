use serde::{Deserialize, Serialize};

/// Running mean reward and pull count per action.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArmStats {
    pub means: Vec<f64>,
    pub counts: Vec<usize>,
}

impl ArmStats {
    pub fn new(n_actions: usize) -> Self {
        Self {
            means: vec![0.0; n_actions],
            counts: vec![0; n_actions],
        }
    }

    pub fn update(&mut self, action: usize, reward: f64) {
        let n = self.counts[action] as f64;
        self.means[action] = (self.means[action] * n + reward) / (n + 1.0);
        self.counts[action] += 1;
    }

    pub fn total_pulls(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Outcome of one bandit run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BanditRun {
    /// Per-action reward estimate at the end of the run. For Thompson
    /// sampling these are the averages of the last round of Beta draws.
    pub empirical_means: Vec<f64>,
    pub counts: Vec<usize>,
    /// Action pulled at each iteration, in order.
    pub actions: Vec<usize>,
    /// Reward observed at each iteration, in order.
    pub rewards: Vec<f64>,
}

/// Index of the largest value; ties resolve to the lowest index and NaN never wins.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] || values[best].is_nan() {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.5, 0.9, 0.9, 0.1]), 1);
        assert_eq!(argmax(&[0.0, 0.0]), 0);
    }

    #[test]
    fn incremental_mean() {
        let mut stats = ArmStats::new(2);
        stats.update(1, 1.0);
        stats.update(1, 0.0);
        stats.update(1, 0.5);
        assert!((stats.means[1] - 0.5).abs() < 1e-12);
        assert_eq!(stats.counts, vec![0, 3]);
        assert_eq!(stats.total_pulls(), 3);
    }
}
