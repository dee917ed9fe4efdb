//! # Bandit
//!
//! Multi-armed bandit strategies played against a fixed Markov decision
//! process. Every pull happens in state 0 of the [`Mdp`]: the reward is drawn
//! by a [`RewardSampler`] around `R[action, 0]` and a successor state is drawn
//! from `T[action, 0, :]`.
//!
//! Three strategies are provided on [`Bandit`]:
//!
//! -   [`Bandit::epsilon_greedy`] with `epsilon = 1 / i`;
//! -   [`Bandit::thompson_sampling`] over per-arm [`BetaPrior`]s;
//! -   [`Bandit::ucb`] (UCB1).
//!
//! No strategy touches global random state; each takes an explicit RNG so
//! runs are reproducible from a seed.
//!
//! ```rust,ignore
//! use bandit::{Bandit, Bernoulli, Mdp};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let mdp = Mdp::single_state(&[0.3, 0.5, 0.7], 0.999)?;
//! let mut rng = StdRng::seed_from_u64(0);
//! let run = Bandit::new(&mdp, Bernoulli).ucb(200, &mut rng);
//! ```

pub mod bandit;
pub mod epsilon_greedy;
pub mod error;
pub mod experiment;
pub mod mdp;
pub mod sampler;
pub mod stats;
pub mod thompson;
pub mod ucb;

pub use bandit::{Bandit, Pull, BANDIT_STATE};
pub use error::BanditError;
pub use experiment::{run_trials, Strategy, TrialSummary};
pub use mdp::{Mdp, MdpSpec};
pub use sampler::{Bernoulli, Gaussian, RewardSampler};
pub use stats::{argmax, ArmStats, BanditRun};
pub use thompson::{BetaPrior, RewardPolicy, ThompsonConfig};
pub use ucb::ucb_scores;
