#![allow(dead_code)]

use bandit::Mdp;
use rand::RngCore;

/// Three Bernoulli arms, one state, as in the classic exercise.
pub fn three_arm_mdp() -> Mdp {
    Mdp::single_state(&[0.3, 0.5, 0.7], 0.999).unwrap()
}

/// Always returns the arm's expected reward.
pub fn deterministic(mean: f64, _rng: &mut dyn RngCore) -> f64 {
    mean
}
