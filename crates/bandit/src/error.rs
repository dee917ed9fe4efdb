use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BanditError {
    #[error("invalid mdp: {0}")]
    InvalidMdp(String),
    #[error("invalid beta prior for action {action}: alpha={alpha}, beta={beta}")]
    InvalidPrior { action: usize, alpha: f64, beta: f64 },
    #[error("prior table has {got} rows but the mdp has {expected} actions")]
    PriorShape { expected: usize, got: usize },
    #[error("thompson sampling needs binary rewards, action {action} returned {reward} at iteration {iteration}")]
    InvalidReward {
        iteration: usize,
        action: usize,
        reward: f64,
    },
    #[error("at least one beta sample per action is required")]
    InvalidSampleCount,
    #[error("invalid reward sampler: {0}")]
    InvalidSampler(&'static str),
}
