use ml::MlError;
use rand::distributions::WeightedError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RlError {
    #[error(transparent)]
    Ml(#[from] MlError),
    #[error("cannot sample from action probabilities: {0}")]
    ActionSampling(#[from] WeightedError),
    #[error("unknown mode `{0}`, expected one of cartpole, mountain_car, mountain_car_mod")]
    UnknownMode(String),
    #[error("action {action} out of range for an environment with {n_actions} actions")]
    InvalidAction { action: usize, n_actions: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
