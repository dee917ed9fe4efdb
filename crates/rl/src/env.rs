//! Episodic environment interface shared by the control tasks.

use crate::error::RlError;

/// Outcome of a single [`Env::step`].
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub obs: Vec<f32>,
    pub reward: f32,
    pub done: bool,
}

/// Reinforcement learning environment with a discrete action space.
///
/// Each call to [`step`] advances the simulation by one action and returns
/// the new observation vector, a reward signal, and whether the episode has
/// terminated.
///
/// [`step`]: Env::step
pub trait Env {
    /// Reset the environment to a starting state and return its observation.
    fn reset(&mut self) -> Vec<f32>;

    /// Advance the environment by one action.
    ///
    /// Fails with [`RlError::InvalidAction`] when `action >= action_size()`.
    fn step(&mut self, action: usize) -> Result<Step, RlError>;

    /// Size of the observation vector.
    fn obs_size(&self) -> usize;

    /// Number of discrete actions.
    fn action_size(&self) -> usize;
}

impl<E: Env + ?Sized> Env for Box<E> {
    fn reset(&mut self) -> Vec<f32> {
        (**self).reset()
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        (**self).step(action)
    }

    fn obs_size(&self) -> usize {
        (**self).obs_size()
    }

    fn action_size(&self) -> usize {
        (**self).action_size()
    }
}

pub(crate) fn check_action(action: usize, n_actions: usize) -> Result<(), RlError> {
    if action < n_actions {
        Ok(())
    } else {
        Err(RlError::InvalidAction { action, n_actions })
    }
}

/// Truncates episodes of the wrapped environment after `max_steps` steps.
#[derive(Clone, Debug)]
pub struct TimeLimit<E> {
    inner: E,
    max_steps: usize,
    elapsed: usize,
}

impl<E: Env> TimeLimit<E> {
    pub fn new(inner: E, max_steps: usize) -> Self {
        Self {
            inner,
            max_steps,
            elapsed: 0,
        }
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }
}

impl<E: Env> Env for TimeLimit<E> {
    fn reset(&mut self) -> Vec<f32> {
        self.elapsed = 0;
        self.inner.reset()
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        let mut step = self.inner.step(action)?;
        self.elapsed += 1;
        if self.elapsed >= self.max_steps {
            step.done = true;
        }
        Ok(step)
    }

    fn obs_size(&self) -> usize {
        self.inner.obs_size()
    }

    fn action_size(&self) -> usize {
        self.inner.action_size()
    }
}

/// One played episode. `states` holds every observation including the one
/// reached after the final action, so it is one longer than `actions`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Episode {
    pub states: Vec<Vec<f32>>,
    pub actions: Vec<usize>,
    pub rewards: Vec<f32>,
}

impl Episode {
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn total_reward(&self) -> f32 {
        self.rewards.iter().sum()
    }

    /// States an action was taken in, i.e. all but the final one.
    pub fn visited_states(&self) -> &[Vec<f32>] {
        &self.states[..self.len()]
    }

    /// First observation component of every visited state. For the
    /// mountain-car tasks this is the car position.
    pub fn heights(&self) -> Vec<f32> {
        self.visited_states()
            .iter()
            .map(|s| s.first().copied().unwrap_or(0.0))
            .collect()
    }
}

/// Plays one episode from a fresh reset until the environment reports `done`.
///
/// The environment must terminate on its own; wrap it in a [`TimeLimit`]
/// when it may not.
pub fn play_episode<E, F>(env: &mut E, mut policy: F) -> Result<Episode, RlError>
where
    E: Env + ?Sized,
    F: FnMut(&[f32]) -> Result<usize, RlError>,
{
    let mut episode = Episode::default();
    let mut obs = env.reset();
    loop {
        let action = policy(&obs)?;
        let step = env.step(action)?;
        episode.states.push(obs);
        episode.actions.push(action);
        episode.rewards.push(step.reward);
        obs = step.obs;
        if step.done {
            break;
        }
    }
    episode.states.push(obs);
    Ok(episode)
}
