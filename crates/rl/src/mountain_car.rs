//! Under-powered car in a valley that must rock back and forth to reach the
//! flag on the right hill. Actions: 0 push left, 1 coast, 2 push right.

use crate::env::{check_action, Env, Step};
use crate::error::RlError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MountainCarConfig {
    pub min_position: f64,
    pub max_position: f64,
    pub max_speed: f64,
    pub goal_position: f64,
    pub force: f64,
    pub gravity: f64,
    /// Reset position is drawn uniformly from this range.
    pub start_range: (f64, f64),
}

impl Default for MountainCarConfig {
    fn default() -> Self {
        Self {
            min_position: -1.2,
            max_position: 0.6,
            max_speed: 0.07,
            goal_position: 0.5,
            force: 0.001,
            gravity: 0.0025,
            start_range: (-0.6, -0.4),
        }
    }
}

/// Observation is `[position, velocity]`, reward is -1 per step.
#[derive(Clone, Debug)]
pub struct MountainCar {
    pub config: MountainCarConfig,
    position: f64,
    velocity: f64,
    rng: StdRng,
}

impl MountainCar {
    pub fn new(seed: u64) -> Self {
        Self::with_config(MountainCarConfig::default(), seed)
    }

    pub fn with_config(config: MountainCarConfig, seed: u64) -> Self {
        Self {
            position: config.start_range.0,
            velocity: 0.0,
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn set_state(&mut self, position: f64, velocity: f64) {
        self.position = position;
        self.velocity = velocity;
    }

    fn observation(&self) -> Vec<f32> {
        vec![self.position as f32, self.velocity as f32]
    }
}

impl Env for MountainCar {
    fn reset(&mut self) -> Vec<f32> {
        let (lo, hi) = self.config.start_range;
        self.position = self.rng.gen_range(lo..hi);
        self.velocity = 0.0;
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        check_action(action, 3)?;
        let c = &self.config;

        self.velocity += (action as f64 - 1.0) * c.force - (3.0 * self.position).cos() * c.gravity;
        self.velocity = self.velocity.clamp(-c.max_speed, c.max_speed);
        self.position = (self.position + self.velocity).clamp(c.min_position, c.max_position);
        // the left wall is inelastic
        if self.position <= c.min_position && self.velocity < 0.0 {
            self.velocity = 0.0;
        }

        Ok(Step {
            obs: self.observation(),
            reward: -1.0,
            done: self.position >= c.goal_position && self.velocity >= 0.0,
        })
    }

    fn obs_size(&self) -> usize {
        2
    }

    fn action_size(&self) -> usize {
        3
    }
}
