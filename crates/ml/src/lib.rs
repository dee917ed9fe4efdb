//! # ml
//!
//! Small reverse-mode automatic differentiation library backing the PPO
//! trainer in the `rl` crate.
//!
//! Tensor ops take a [`Recorder`](recorder::Recorder) and a tensor registry
//! (`HashMap<usize, Tensor>`). Every op registers its operands and result in
//! the registry and records a [`Node`](graph::Node). Recording onto a
//! [`Graph`](graph::Graph) is a plain forward pass; recording onto a
//! [`Tape`](tape::Tape) allows [`Tape::backward`](tape::Tape::backward) to
//! fill in gradients for every tensor flagged with `requires_grad`.
//!
//! ```rust,ignore
//! let mut tensors = HashMap::new();
//! let mut tape = Tape::new();
//! net.register(&mut tensors);
//! let loss = net.forward(&x, &mut tape, &mut tensors).reduce_mean(&mut tape, &mut tensors);
//! tape.backward(&loss, &mut tensors)?;
//! net.pull_grads(&tensors);
//! adam.step(&mut net.params_mut());
//! ```

pub mod error;
pub mod graph;
pub mod nn;
pub mod optim;
pub mod recorder;
pub mod tape;
pub mod tensor;

pub use error::MlError;
pub use graph::Graph;
pub use nn::{Dense, Mlp};
pub use optim::Adam;
pub use recorder::Recorder;
pub use tape::Tape;
pub use tensor::{softmax, Tensor};
