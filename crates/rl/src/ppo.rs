//! Proximal Policy Optimization with a clipped surrogate objective.
//!
//! The trainer keeps two separate networks: a softmax policy over discrete
//! actions and a state-value baseline. Each epoch plays
//! `episodes_per_epoch` episodes, fits the baseline one state at a time, and
//! then takes `policy_train_iters` optimiser steps on the clipped objective
//! with the baseline residual as advantage.

use crate::config::{EnvMode, Hyperparams, PpoConfig};
use crate::env::{play_episode, Env};
use crate::error::RlError;
use crate::returns::{discounted_returns, mean_std, trailing_mean};
use ml::{softmax, Adam, Graph, Mlp, Recorder, Tape, Tensor};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info};

/// Experience gathered during one epoch.
#[derive(Clone, Debug, Default)]
pub struct Batch {
    pub states: Vec<Vec<f32>>,
    pub actions: Vec<usize>,
    pub returns: Vec<f32>,
    /// Summed training reward of the last episode played.
    pub last_episode_reward: f32,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EpochStats {
    pub epoch: usize,
    pub episode_reward: f32,
    pub trailing_mean: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrainingReport {
    pub mode: EnvMode,
    pub epochs: usize,
    pub episode_rewards: Vec<f32>,
    pub trailing_means: Vec<f32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Evaluation {
    pub label: String,
    pub scores: Vec<f32>,
    pub mean: f32,
    pub std: f32,
}

fn batch_tensor(rows: &[Vec<f32>], width: usize) -> Tensor {
    let data: Vec<f32> = rows.iter().flatten().copied().collect();
    Tensor::from_vec(vec![rows.len(), width], data)
}

/// Log-probability of each taken action under `policy`, one per row.
fn action_log_probs(
    policy: &Mlp,
    states: &Tensor,
    actions: &[usize],
    recorder: &mut impl Recorder,
    tensors: &mut HashMap<usize, Tensor>,
) -> Tensor {
    policy
        .forward(states, recorder, tensors)
        .log_softmax(recorder, tensors)
        .gather(actions, recorder, tensors)
}

fn action_probs(policy: &Mlp, obs: &[f32]) -> Vec<f32> {
    let x = Tensor::from_vec(vec![1, obs.len()], obs.to_vec());
    let logits = policy.forward(&x, &mut Graph::new(), &mut HashMap::new());
    softmax(logits.data())
}

fn sample_action(policy: &Mlp, obs: &[f32], rng: &mut StdRng) -> Result<usize, RlError> {
    let dist = WeightedIndex::new(action_probs(policy, obs))?;
    Ok(dist.sample(rng))
}

/// PPO trainer over any discrete-action [`Env`].
pub struct PpoTrainer<E: Env> {
    env: E,
    config: PpoConfig,
    hyper: Hyperparams,
    policy: Mlp,
    value: Mlp,
    policy_opt: Adam,
    value_opt: Adam,
    rng: StdRng,
    episode_rewards: Vec<f32>,
    trailing_means: Vec<f32>,
}

impl PpoTrainer<Box<dyn Env>> {
    /// Builds the environment named by `config.mode` and a trainer for it.
    pub fn from_config(config: PpoConfig) -> Result<Self, RlError> {
        let env = config.mode.make_env(config.max_steps, config.seed);
        Self::new(env, config)
    }
}

impl<E: Env> PpoTrainer<E> {
    pub fn new(env: E, config: PpoConfig) -> Result<Self, RlError> {
        config.validate()?;
        let hyper = config.hyperparams();
        if env.obs_size() != hyper.obs_size || env.action_size() != hyper.action_size {
            return Err(RlError::InvalidConfig(format!(
                "environment has {} observations and {} actions, configuration expects {} and {}",
                env.obs_size(),
                env.action_size(),
                hyper.obs_size,
                hyper.action_size
            )));
        }

        let mut rng = StdRng::seed_from_u64(config.seed);
        let h = config.hidden;
        let value = Mlp::new(&[hyper.obs_size, h, h, 1], &mut rng);
        let policy = Mlp::new(&[hyper.obs_size, h, h, hyper.action_size], &mut rng);
        let value_opt = Adam::new(&value.params(), hyper.value_lr);
        let policy_opt = Adam::new(&policy.params(), hyper.policy_lr);

        Ok(Self {
            env,
            config,
            hyper,
            policy,
            value,
            policy_opt,
            value_opt,
            rng,
            episode_rewards: Vec::new(),
            trailing_means: Vec::new(),
        })
    }

    pub fn config(&self) -> &PpoConfig {
        &self.config
    }

    pub fn policy(&self) -> &Mlp {
        &self.policy
    }

    pub fn value(&self) -> &Mlp {
        &self.value
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    /// Summed training reward of the last episode of every epoch so far.
    pub fn episode_rewards(&self) -> &[f32] {
        &self.episode_rewards
    }

    /// Trailing mean of [`episode_rewards`](Self::episode_rewards), one per epoch.
    pub fn trailing_means(&self) -> &[f32] {
        &self.trailing_means
    }

    pub fn action_probs(&self, obs: &[f32]) -> Vec<f32> {
        action_probs(&self.policy, obs)
    }

    pub fn value_estimate(&self, obs: &[f32]) -> f32 {
        let x = Tensor::from_vec(vec![1, obs.len()], obs.to_vec());
        self.value
            .forward(&x, &mut Graph::new(), &mut HashMap::new())
            .data()[0]
    }

    /// Samples an action from the current stochastic policy.
    pub fn act(&mut self, obs: &[f32]) -> Result<usize, RlError> {
        sample_action(&self.policy, obs, &mut self.rng)
    }

    /// Plays `episodes_per_epoch` episodes under the current policy.
    pub fn collect(&mut self) -> Result<Batch, RlError> {
        let mut batch = Batch::default();
        for _ in 0..self.config.episodes_per_epoch {
            let policy = &self.policy;
            let rng = &mut self.rng;
            let episode = play_episode(&mut self.env, |obs| sample_action(policy, obs, rng))?;

            let rewards = self.config.mode.training_rewards(&episode);
            batch.returns.extend(discounted_returns(&rewards, self.hyper.gamma));
            batch.states.extend_from_slice(episode.visited_states());
            batch.actions.extend_from_slice(&episode.actions);
            batch.last_episode_reward = rewards.iter().sum();
        }
        Ok(batch)
    }

    /// Log-probabilities of the batch's actions under the current policy.
    pub fn old_log_probs(&self, batch: &Batch) -> Vec<f32> {
        let states = batch_tensor(&batch.states, self.hyper.obs_size);
        let mut tensors = HashMap::new();
        action_log_probs(&self.policy, &states, &batch.actions, &mut Graph::new(), &mut tensors)
            .data
    }

    /// Fits the value baseline one state at a time and returns the residuals
    /// `G[t] - V(s[t])`, each measured just before its own update.
    pub fn fit_value(&mut self, batch: &Batch) -> Result<Vec<f32>, RlError> {
        let mut deltas = Vec::with_capacity(batch.len());
        for (state, &ret) in batch.states.iter().zip(&batch.returns) {
            let mut tensors = HashMap::new();
            let mut tape = Tape::new();
            self.value.register(&mut tensors);

            let x = Tensor::from_vec(vec![1, state.len()], state.clone());
            let v = self.value.forward(&x, &mut tape, &mut tensors);
            let delta = ret - v.data()[0];
            let objective = v.mul_scalar(-delta, &mut tape, &mut tensors);

            tape.backward(&objective, &mut tensors)?;
            self.value.pull_grads(&tensors);
            self.value_opt.step(&mut self.value.params_mut());
            deltas.push(delta);
        }
        Ok(deltas)
    }

    /// Runs the clipped-objective policy updates and returns the objective
    /// value of the final iteration.
    pub fn update_policy(
        &mut self,
        batch: &Batch,
        old_log_probs: &[f32],
        advantages: &[f32],
    ) -> Result<f32, RlError> {
        let n = batch.len();
        let states = batch_tensor(&batch.states, self.hyper.obs_size);
        let old = Tensor::from_vec(vec![n], old_log_probs.to_vec());
        let adv = Tensor::from_vec(vec![n], advantages.to_vec());
        let clip = self.config.clip;

        let mut last = 0.0;
        for _ in 0..self.hyper.policy_train_iters {
            let mut tensors = HashMap::new();
            let mut tape = Tape::new();
            self.policy.register(&mut tensors);

            let new = action_log_probs(&self.policy, &states, &batch.actions, &mut tape, &mut tensors);
            let ratio = new
                .sub(&old, &mut tape, &mut tensors)
                .exp(&mut tape, &mut tensors);
            let unclipped = ratio.mul(&adv, &mut tape, &mut tensors);
            let clipped = ratio
                .clamp(1.0 - clip, 1.0 + clip, &mut tape, &mut tensors)
                .mul(&adv, &mut tape, &mut tensors);
            let objective = unclipped
                .min(&clipped, &mut tape, &mut tensors)
                .reduce_mean(&mut tape, &mut tensors)
                .mul_scalar(-1.0, &mut tape, &mut tensors);

            tape.backward(&objective, &mut tensors)?;
            self.policy.pull_grads(&tensors);
            self.policy_opt.step(&mut self.policy.params_mut());
            last = objective.data()[0];
        }
        Ok(last)
    }

    /// One collect-then-train cycle.
    pub fn train_epoch(&mut self) -> Result<EpochStats, RlError> {
        let batch = self.collect()?;
        let old_log_probs = self.old_log_probs(&batch);
        let advantages = self.fit_value(&batch)?;
        let objective = self.update_policy(&batch, &old_log_probs, &advantages)?;

        self.episode_rewards.push(batch.last_episode_reward);
        let trailing = trailing_mean(&self.episode_rewards, self.config.window);
        self.trailing_means.push(trailing);

        let stats = EpochStats {
            epoch: self.episode_rewards.len(),
            episode_reward: batch.last_episode_reward,
            trailing_mean: trailing,
        };
        debug!(
            epoch = stats.epoch,
            steps = batch.len(),
            reward = stats.episode_reward,
            trailing = stats.trailing_mean,
            objective,
            "epoch finished"
        );
        Ok(stats)
    }

    /// Trains for `config.epochs` epochs.
    pub fn fit(&mut self) -> Result<TrainingReport, RlError> {
        info!(mode = %self.config.mode, epochs = self.config.epochs, "training");
        for _ in 0..self.config.epochs {
            let stats = self.train_epoch()?;
            if stats.epoch % 10 == 0 {
                info!(
                    epoch = stats.epoch,
                    window = self.config.window,
                    trailing = stats.trailing_mean,
                    "progress"
                );
            }
        }
        info!("training finished");
        Ok(self.report())
    }

    pub fn report(&self) -> TrainingReport {
        TrainingReport {
            mode: self.config.mode,
            epochs: self.episode_rewards.len(),
            episode_rewards: self.episode_rewards.clone(),
            trailing_means: self.trailing_means.clone(),
        }
    }

    /// Plays `config.test_episodes` episodes with the stochastic policy and
    /// scores each one by the mode's evaluation rewards.
    pub fn evaluate(&mut self) -> Result<Evaluation, RlError> {
        let mode = self.config.mode;
        let mut scores = Vec::with_capacity(self.config.test_episodes);
        for _ in 0..self.config.test_episodes {
            let policy = &self.policy;
            let rng = &mut self.rng;
            let episode = play_episode(&mut self.env, |obs| sample_action(policy, obs, rng))?;
            scores.push(mode.evaluation_rewards(&episode).iter().sum());
        }
        let (mean, std) = mean_std(&scores);
        info!(mode = %mode, mean, std, "evaluation finished");
        Ok(Evaluation {
            label: mode.evaluation_label().to_string(),
            scores,
            mean,
            std,
        })
    }
}
