//! Finite Markov decision process used as the bandit's reward model.
//!
//! Tensors are stored flattened, action-major: `R[a, s]` lives at
//! `a * n_states + s` and `T[a, s, s']` at `(a * n_states + s) * n_states + s'`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::BanditError;

const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Nested-array form of an [`Mdp`], as read from or written to JSON.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MdpSpec {
    /// `transition[a][s][s']`
    pub transition: Vec<Vec<Vec<f64>>>,
    /// `reward[a][s]`
    pub reward: Vec<Vec<f64>>,
    #[serde(default = "default_discount")]
    pub discount: f64,
}

fn default_discount() -> f64 {
    1.0
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MdpSpec", into = "MdpSpec")]
pub struct Mdp {
    n_states: usize,
    n_actions: usize,
    discount: f64,
    reward: Vec<f64>,
    transition: Vec<f64>,
}

impl Mdp {
    /// Builds and validates an MDP from nested `T[a][s][s']` and `R[a][s]` arrays.
    ///
    /// # Errors
    ///
    /// Returns [`BanditError::InvalidMdp`] when the tensors are ragged, empty,
    /// non-finite, or when some `T[a, s, :]` is not a probability distribution.
    pub fn new(
        transition: Vec<Vec<Vec<f64>>>,
        reward: Vec<Vec<f64>>,
        discount: f64,
    ) -> Result<Self, BanditError> {
        let n_actions = transition.len();
        if n_actions == 0 {
            return Err(BanditError::InvalidMdp("no actions".into()));
        }
        let n_states = transition[0].len();
        if n_states == 0 {
            return Err(BanditError::InvalidMdp("no states".into()));
        }
        if reward.len() != n_actions {
            return Err(BanditError::InvalidMdp(format!(
                "reward has {} actions, transition has {n_actions}",
                reward.len()
            )));
        }
        if !(0.0..=1.0).contains(&discount) {
            return Err(BanditError::InvalidMdp(format!(
                "discount {discount} outside [0, 1]"
            )));
        }

        let mut flat_t = Vec::with_capacity(n_actions * n_states * n_states);
        for (a, rows) in transition.iter().enumerate() {
            if rows.len() != n_states {
                return Err(BanditError::InvalidMdp(format!(
                    "transition[{a}] has {} states, expected {n_states}",
                    rows.len()
                )));
            }
            for (s, row) in rows.iter().enumerate() {
                if row.len() != n_states {
                    return Err(BanditError::InvalidMdp(format!(
                        "transition[{a}][{s}] has {} entries, expected {n_states}",
                        row.len()
                    )));
                }
                if row.iter().any(|p| !p.is_finite() || *p < 0.0) {
                    return Err(BanditError::InvalidMdp(format!(
                        "transition[{a}][{s}] has a negative or non-finite probability"
                    )));
                }
                let sum: f64 = row.iter().sum();
                if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                    return Err(BanditError::InvalidMdp(format!(
                        "transition[{a}][{s}] sums to {sum}"
                    )));
                }
                flat_t.extend_from_slice(row);
            }
        }

        let mut flat_r = Vec::with_capacity(n_actions * n_states);
        for (a, row) in reward.iter().enumerate() {
            if row.len() != n_states {
                return Err(BanditError::InvalidMdp(format!(
                    "reward[{a}] has {} states, expected {n_states}",
                    row.len()
                )));
            }
            if row.iter().any(|r| !r.is_finite()) {
                return Err(BanditError::InvalidMdp(format!(
                    "reward[{a}] has a non-finite entry"
                )));
            }
            flat_r.extend_from_slice(row);
        }

        Ok(Self {
            n_states,
            n_actions,
            discount,
            reward: flat_r,
            transition: flat_t,
        })
    }

    /// Single-state MDP where every action loops back to the state, i.e. a
    /// plain multi-armed bandit with the given expected reward per arm.
    pub fn single_state(arm_means: &[f64], discount: f64) -> Result<Self, BanditError> {
        let transition = arm_means.iter().map(|_| vec![vec![1.0]]).collect();
        let reward = arm_means.iter().map(|&m| vec![m]).collect();
        Self::new(transition, reward, discount)
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    pub fn n_actions(&self) -> usize {
        self.n_actions
    }

    pub fn discount(&self) -> f64 {
        self.discount
    }

    /// Expected reward `R[action, state]`.
    pub fn reward(&self, action: usize, state: usize) -> f64 {
        self.reward[action * self.n_states + state]
    }

    /// Next-state distribution `T[action, state, :]`.
    pub fn transition(&self, action: usize, state: usize) -> &[f64] {
        let start = (action * self.n_states + state) * self.n_states;
        &self.transition[start..start + self.n_states]
    }

    /// Draws `s' ~ T[action, state, :]` by inverting the cumulative distribution.
    pub fn sample_next_state<R: Rng + ?Sized>(
        &self,
        action: usize,
        state: usize,
        rng: &mut R,
    ) -> usize {
        let u: f64 = rng.gen();
        let mut cumulative = 0.0;
        for (next, p) in self.transition(action, state).iter().enumerate() {
            cumulative += p;
            if cumulative >= u {
                return next;
            }
        }
        self.n_states - 1
    }
}

impl TryFrom<MdpSpec> for Mdp {
    type Error = BanditError;

    fn try_from(spec: MdpSpec) -> Result<Self, Self::Error> {
        Mdp::new(spec.transition, spec.reward, spec.discount)
    }
}

impl From<Mdp> for MdpSpec {
    fn from(mdp: Mdp) -> Self {
        let transition = (0..mdp.n_actions)
            .map(|a| {
                (0..mdp.n_states)
                    .map(|s| mdp.transition(a, s).to_vec())
                    .collect()
            })
            .collect();
        let reward = (0..mdp.n_actions)
            .map(|a| (0..mdp.n_states).map(|s| mdp.reward(a, s)).collect())
            .collect();
        MdpSpec {
            transition,
            reward,
            discount: mdp.discount,
        }
    }
}
