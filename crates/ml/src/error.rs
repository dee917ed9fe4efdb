use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MlError {
    #[error("tensor {0} is not registered")]
    MissingTensor(usize),
    #[error("loss tensor must hold a single value, got shape {0:?}")]
    NonScalarLoss(Vec<usize>),
}
