//! # rl
//!
//! Discrete-action control tasks and a PPO trainer built on the `ml`
//! autodiff crate.
//!
//! - [`env`]: the [`Env`] trait, [`TimeLimit`] and [`play_episode`]
//! - [`cartpole`], [`mountain_car`]: the two control tasks
//! - [`config`]: [`EnvMode`] and the run configuration
//! - [`ppo`]: the trainer
//!
//! ```rust,ignore
//! let config = PpoConfig::for_mode("cartpole".parse()?);
//! let mut trainer = PpoTrainer::from_config(config)?;
//! let report = trainer.fit()?;
//! let eval = trainer.evaluate()?;
//! ```

pub mod cartpole;
pub mod config;
pub mod env;
pub mod error;
pub mod mountain_car;
pub mod ppo;
pub mod returns;

pub use cartpole::{CartPole, CartPoleConfig};
pub use config::{EnvMode, Hyperparams, PpoConfig};
pub use env::{play_episode, Env, Episode, Step, TimeLimit};
pub use error::RlError;
pub use mountain_car::{MountainCar, MountainCarConfig};
pub use ppo::{Batch, EpochStats, Evaluation, PpoTrainer, TrainingReport};
pub use returns::{discounted_returns, mean_std, trailing_mean};
