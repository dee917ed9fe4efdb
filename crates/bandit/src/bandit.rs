use rand::Rng;

use crate::mdp::Mdp;
use crate::sampler::RewardSampler;

/// Bandit strategies always act from this state.
pub const BANDIT_STATE: usize = 0;

/// Result of pulling one arm.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pull {
    pub reward: f64,
    /// Sampled successor state. Recorded but not used by the strategies.
    pub next_state: usize,
}

/// Runs arm-selection strategies against a fixed MDP.
///
/// The strategy methods live in [`crate::epsilon_greedy`], [`crate::thompson`]
/// and [`crate::ucb`].
pub struct Bandit<'a, S> {
    pub(crate) mdp: &'a Mdp,
    pub(crate) sampler: S,
}

impl<'a, S: RewardSampler> Bandit<'a, S> {
    pub fn new(mdp: &'a Mdp, sampler: S) -> Self {
        Self { mdp, sampler }
    }

    pub fn mdp(&self) -> &Mdp {
        self.mdp
    }

    pub fn n_actions(&self) -> usize {
        self.mdp.n_actions()
    }

    /// Samples `reward ~ sampler(R[action, state])` and `s' ~ T[action, state, :]`.
    pub fn sample_reward_and_next_state<R: Rng>(
        &self,
        state: usize,
        action: usize,
        rng: &mut R,
    ) -> Pull {
        let reward = self.sampler.sample(self.mdp.reward(action, state), rng);
        let next_state = self.mdp.sample_next_state(action, state, rng);
        Pull { reward, next_state }
    }

    pub fn pull<R: Rng>(&self, action: usize, rng: &mut R) -> Pull {
        self.sample_reward_and_next_state(BANDIT_STATE, action, rng)
    }
}
