//! Cart-pole balancing task.
//!
//! A pole is attached by an unactuated joint to a cart moving along a
//! frictionless track. Action 0 pushes the cart left, action 1 pushes it
//! right. The episode ends once the pole leans past `failure_angle` or the
//! cart leaves `[-position_limit, position_limit]`; every step, including the
//! terminating one, is worth a reward of 1.

use crate::env::{check_action, Env, Step};
use crate::error::RlError;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Physical constants of a [`CartPole`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartPoleConfig {
    /// Gravitational acceleration in m/s^2
    pub gravity: f64,
    /// Cart mass in kg
    pub cart_mass: f64,
    /// Pole mass in kg
    pub pole_mass: f64,
    /// Half of the pole length in meters
    pub half_pole_length: f64,
    /// Force applied to the cart by either action
    pub force_magnitude: f64,
    /// Seconds between state updates
    pub tau: f64,
    /// Angle threshold for failure detection (radians)
    pub failure_angle: f64,
    /// Position threshold for failure detection (meters)
    pub position_limit: f64,
    /// Every state variable starts uniformly in `[-reset_noise, reset_noise]`
    pub reset_noise: f64,
}

impl Default for CartPoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.8,
            cart_mass: 1.0,
            pole_mass: 0.1,
            half_pole_length: 0.5,
            force_magnitude: 10.0,
            tau: 0.02,
            failure_angle: 12.0_f64.to_radians(),
            position_limit: 2.4,
            reset_noise: 0.05,
        }
    }
}

/// Cart-pole environment. The observation is
/// `[cart_x, cart_vel, pole_angle, pole_angular_vel]`.
#[derive(Clone, Debug)]
pub struct CartPole {
    pub config: CartPoleConfig,
    state: [f64; 4],
    rng: StdRng,
}

impl CartPole {
    pub fn new(seed: u64) -> Self {
        Self::with_config(CartPoleConfig::default(), seed)
    }

    pub fn with_config(config: CartPoleConfig, seed: u64) -> Self {
        Self {
            config,
            state: [0.0; 4],
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn state(&self) -> [f64; 4] {
        self.state
    }

    /// Overrides the current state, e.g. to start from a chosen angle.
    pub fn set_state(&mut self, state: [f64; 4]) {
        self.state = state;
    }

    fn observation(&self) -> Vec<f32> {
        self.state.iter().map(|&v| v as f32).collect()
    }

    fn failed(&self) -> bool {
        let [x, _, theta, _] = self.state;
        x.abs() > self.config.position_limit || theta.abs() > self.config.failure_angle
    }
}

impl Env for CartPole {
    fn reset(&mut self) -> Vec<f32> {
        let noise = self.config.reset_noise;
        for v in &mut self.state {
            *v = self.rng.gen_range(-noise..=noise);
        }
        self.observation()
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        check_action(action, 2)?;
        let c = &self.config;
        let [x, x_dot, theta, theta_dot] = self.state;

        let force = if action == 1 {
            c.force_magnitude
        } else {
            -c.force_magnitude
        };
        let total_mass = c.cart_mass + c.pole_mass;
        let pole_moment = c.pole_mass * c.half_pole_length;
        let (sin, cos) = theta.sin_cos();

        let temp = (force + pole_moment * theta_dot * theta_dot * sin) / total_mass;
        let theta_acc = (c.gravity * sin - cos * temp)
            / (c.half_pole_length * (4.0 / 3.0 - c.pole_mass * cos * cos / total_mass));
        let x_acc = temp - pole_moment * theta_acc * cos / total_mass;

        // explicit Euler
        self.state = [
            x + c.tau * x_dot,
            x_dot + c.tau * x_acc,
            theta + c.tau * theta_dot,
            theta_dot + c.tau * theta_acc,
        ];

        Ok(Step {
            obs: self.observation(),
            reward: 1.0,
            done: self.failed(),
        })
    }

    fn obs_size(&self) -> usize {
        4
    }

    fn action_size(&self) -> usize {
        2
    }
}
