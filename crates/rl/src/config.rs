use crate::cartpole::CartPole;
use crate::env::{Env, Episode, TimeLimit};
use crate::error::RlError;
use crate::mountain_car::MountainCar;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which control task to train on, and how its rewards are read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnvMode {
    #[serde(rename = "cartpole")]
    CartPole,
    #[serde(rename = "mountain_car")]
    MountainCar,
    /// Mountain car trained on the car position instead of the -1 step cost.
    #[serde(rename = "mountain_car_mod")]
    MountainCarMod,
}

impl EnvMode {
    pub const ALL: [EnvMode; 3] = [EnvMode::CartPole, EnvMode::MountainCar, EnvMode::MountainCarMod];

    pub fn as_str(self) -> &'static str {
        match self {
            EnvMode::CartPole => "cartpole",
            EnvMode::MountainCar => "mountain_car",
            EnvMode::MountainCarMod => "mountain_car_mod",
        }
    }

    fn is_mountain_car(self) -> bool {
        matches!(self, EnvMode::MountainCar | EnvMode::MountainCarMod)
    }

    pub fn hyperparams(self) -> Hyperparams {
        if self.is_mountain_car() {
            Hyperparams {
                obs_size: 2,
                action_size: 3,
                gamma: 0.9,
                value_lr: 1e-3,
                policy_lr: 1e-3,
                policy_train_iters: 5,
            }
        } else {
            Hyperparams {
                obs_size: 4,
                action_size: 2,
                gamma: 1.0,
                value_lr: 5e-4,
                policy_lr: 5e-4,
                policy_train_iters: 10,
            }
        }
    }

    /// Builds the task, truncated after `max_steps` steps.
    pub fn make_env(self, max_steps: usize, seed: u64) -> Box<dyn Env> {
        if self.is_mountain_car() {
            Box::new(TimeLimit::new(MountainCar::new(seed), max_steps))
        } else {
            Box::new(TimeLimit::new(CartPole::new(seed), max_steps))
        }
    }

    /// Rewards the learner sees for a played episode.
    pub fn training_rewards(self, episode: &Episode) -> Vec<f32> {
        match self {
            EnvMode::MountainCarMod => episode.heights(),
            _ => episode.rewards.clone(),
        }
    }

    /// Rewards summed into a test score. Both mountain-car modes are scored
    /// on the height reached.
    pub fn evaluation_rewards(self, episode: &Episode) -> Vec<f32> {
        if self.is_mountain_car() {
            episode.heights()
        } else {
            episode.rewards.clone()
        }
    }

    pub fn evaluation_label(self) -> &'static str {
        if self.is_mountain_car() {
            "Height achieved"
        } else {
            "Eval score"
        }
    }
}

impl fmt::Display for EnvMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EnvMode {
    type Err = RlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EnvMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| RlError::UnknownMode(s.to_string()))
    }
}

/// Per-task network and optimiser settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hyperparams {
    pub obs_size: usize,
    pub action_size: usize,
    /// Discount factor of the episodic return.
    pub gamma: f32,
    pub value_lr: f32,
    pub policy_lr: f32,
    /// Clipped-objective steps per epoch.
    pub policy_train_iters: usize,
}

/// Complete PPO run configuration.
///
/// Every field has a default, so a JSON file only needs the fields it
/// changes. When `hyperparams` is absent the mode's own table is used.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PpoConfig {
    pub mode: EnvMode,
    pub hyperparams: Option<Hyperparams>,
    pub epochs: usize,
    pub episodes_per_epoch: usize,
    pub test_episodes: usize,
    pub hidden: usize,
    pub clip: f32,
    pub seed: u64,
    pub max_steps: usize,
    /// Episodes averaged into the trailing reward curve.
    pub window: usize,
}

impl Default for PpoConfig {
    fn default() -> Self {
        Self::for_mode(EnvMode::CartPole)
    }
}

impl PpoConfig {
    pub fn for_mode(mode: EnvMode) -> Self {
        Self {
            mode,
            hyperparams: None,
            epochs: 150,
            episodes_per_epoch: 1,
            test_episodes: 10,
            hidden: 32,
            clip: 0.1,
            seed: 1,
            max_steps: 200,
            window: 25,
        }
    }

    pub fn hyperparams(&self) -> Hyperparams {
        self.hyperparams
            .clone()
            .unwrap_or_else(|| self.mode.hyperparams())
    }

    pub fn validate(&self) -> Result<(), RlError> {
        let hp = self.hyperparams();
        let check = |ok: bool, msg: &str| {
            if ok {
                Ok(())
            } else {
                Err(RlError::InvalidConfig(msg.to_string()))
            }
        };
        check(self.episodes_per_epoch > 0, "episodes_per_epoch must be positive")?;
        check(self.hidden > 0, "hidden must be positive")?;
        check(self.max_steps > 0, "max_steps must be positive")?;
        check(self.window > 0, "window must be positive")?;
        check(self.clip > 0.0 && self.clip < 1.0, "clip must lie in (0, 1)")?;
        check(hp.obs_size > 0 && hp.action_size > 0, "obs_size and action_size must be positive")?;
        check((0.0..=1.0).contains(&hp.gamma), "gamma must lie in [0, 1]")?;
        check(hp.value_lr > 0.0 && hp.policy_lr > 0.0, "learning rates must be positive")?;
        Ok(())
    }
}
