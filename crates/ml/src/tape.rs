use crate::error::MlError;
use crate::graph::{EOp, Node};
use crate::recorder::Recorder;
use crate::tensor::Tensor;
use std::collections::HashMap;
use tracing::trace;

/// A tape that records operations for automatic differentiation.
#[derive(Default)]
pub struct Tape {
    nodes: Vec<Node>,
}

impl Recorder for Tape {
    fn record(&mut self, node: Node) {
        self.nodes.push(node);
    }

    fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

fn lookup(tensors: &HashMap<usize, Tensor>, id: usize) -> Result<&Tensor, MlError> {
    tensors.get(&id).ok_or(MlError::MissingTensor(id))
}

fn slot(grads: &mut HashMap<usize, Vec<f32>>, id: usize, len: usize) -> &mut Vec<f32> {
    grads.entry(id).or_insert_with(|| vec![0.0; len])
}

impl Tape {
    /// Creates a new, empty tape.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Computes the gradients of the tensors on the tape with respect to a loss tensor.
    ///
    /// The gradients are computed by traversing the recorded operations in reverse order.
    /// Only tensors flagged with `requires_grad` receive their gradient.
    ///
    /// # Errors
    ///
    /// Fails if `loss` is not a single value or an operand is missing from `tensors`.
    pub fn backward(
        &self,
        loss: &Tensor,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Result<(), MlError> {
        if loss.len() != 1 {
            return Err(MlError::NonScalarLoss(loss.shape.clone()));
        }
        trace!(nodes = self.nodes.len(), "backward pass");
        let mut grads: HashMap<usize, Vec<f32>> = HashMap::new();
        grads.insert(loss.id, vec![1.0]);

        for node in self.nodes.iter().rev() {
            // Nodes that do not feed the loss have no gradient to propagate.
            let Some(out_grad) = grads.get(&node.out).cloned() else {
                continue;
            };
            let a = lookup(tensors, node.a)?;
            let b = lookup(tensors, node.b)?;

            match node.op {
                EOp::Add => {
                    for (g, og) in slot(&mut grads, node.a, a.len()).iter_mut().zip(&out_grad) {
                        *g += og;
                    }
                    for (g, og) in slot(&mut grads, node.b, b.len()).iter_mut().zip(&out_grad) {
                        *g += og;
                    }
                }
                EOp::Sub => {
                    for (g, og) in slot(&mut grads, node.a, a.len()).iter_mut().zip(&out_grad) {
                        *g += og;
                    }
                    for (g, og) in slot(&mut grads, node.b, b.len()).iter_mut().zip(&out_grad) {
                        *g -= og;
                    }
                }
                EOp::Mul => {
                    let a_grad = slot(&mut grads, node.a, a.len());
                    for (g, (d, og)) in a_grad.iter_mut().zip(b.data.iter().zip(&out_grad)) {
                        *g += d * og;
                    }
                    let b_grad = slot(&mut grads, node.b, b.len());
                    for (g, (d, og)) in b_grad.iter_mut().zip(a.data.iter().zip(&out_grad)) {
                        *g += d * og;
                    }
                }
                EOp::MulScalar => {
                    let scalar = b.data[0];
                    for (g, og) in slot(&mut grads, node.a, a.len()).iter_mut().zip(&out_grad) {
                        *g += scalar * og;
                    }
                }
                EOp::MatMul => {
                    let out_dim = a.shape[0];
                    let in_dim = a.shape[1];
                    let batch_size = b.len() / in_dim;

                    let w_grad = slot(&mut grads, node.a, a.len());
                    for i in 0..out_dim {
                        for j in 0..in_dim {
                            for k in 0..batch_size {
                                w_grad[i * in_dim + j] +=
                                    out_grad[k * out_dim + i] * b.data[k * in_dim + j];
                            }
                        }
                    }

                    let x_grad = slot(&mut grads, node.b, b.len());
                    for k in 0..batch_size {
                        for j in 0..in_dim {
                            for i in 0..out_dim {
                                x_grad[k * in_dim + j] +=
                                    out_grad[k * out_dim + i] * a.data[i * in_dim + j];
                            }
                        }
                    }
                }
                EOp::AddBroadcast => {
                    for (g, og) in slot(&mut grads, node.a, a.len()).iter_mut().zip(&out_grad) {
                        *g += og;
                    }
                    let dim = b.len();
                    let b_grad = slot(&mut grads, node.b, dim);
                    for (i, og) in out_grad.iter().enumerate() {
                        b_grad[i % dim] += og;
                    }
                }
                EOp::Relu => {
                    let a_grad = slot(&mut grads, node.a, a.len());
                    for (g, (d, og)) in a_grad.iter_mut().zip(a.data.iter().zip(&out_grad)) {
                        if *d > 0.0 {
                            *g += og;
                        }
                    }
                }
                EOp::Exp => {
                    let out = lookup(tensors, node.out)?;
                    let a_grad = slot(&mut grads, node.a, a.len());
                    for (g, (d, og)) in a_grad.iter_mut().zip(out.data.iter().zip(&out_grad)) {
                        *g += d * og;
                    }
                }
                EOp::Clamp => {
                    let min = b.data[0];
                    let max = b.data[1];
                    let a_grad = slot(&mut grads, node.a, a.len());
                    for (g, (d, og)) in a_grad.iter_mut().zip(a.data.iter().zip(&out_grad)) {
                        if *d >= min && *d <= max {
                            *g += og;
                        }
                    }
                }
                EOp::Min => {
                    {
                        let a_grad = slot(&mut grads, node.a, a.len());
                        for i in 0..a.len() {
                            if a.data[i] < b.data[i] {
                                a_grad[i] += out_grad[i];
                            }
                        }
                    }
                    {
                        let b_grad = slot(&mut grads, node.b, b.len());
                        for i in 0..b.len() {
                            if b.data[i] <= a.data[i] {
                                b_grad[i] += out_grad[i];
                            }
                        }
                    }
                }
                EOp::ReduceSum => {
                    for g in slot(&mut grads, node.a, a.len()).iter_mut() {
                        *g += out_grad[0];
                    }
                }
                EOp::ReduceMean => {
                    let n = a.len() as f32;
                    for g in slot(&mut grads, node.a, a.len()).iter_mut() {
                        *g += out_grad[0] / n;
                    }
                }
                EOp::LogSoftmax => {
                    // d/dx_j = g_j - softmax_j * sum_i g_i, per row.
                    let out = lookup(tensors, node.out)?;
                    let cols = out.shape.last().copied().unwrap_or(1);
                    let a_grad = slot(&mut grads, node.a, a.len());
                    for ((g_row, y_row), og_row) in a_grad
                        .chunks_mut(cols)
                        .zip(out.data.chunks(cols))
                        .zip(out_grad.chunks(cols))
                    {
                        let total: f32 = og_row.iter().sum();
                        for ((g, y), og) in g_row.iter_mut().zip(y_row).zip(og_row) {
                            *g += og - y.exp() * total;
                        }
                    }
                }
                EOp::Gather => {
                    let rows = b.len();
                    let cols = a.len() / rows;
                    let a_grad = slot(&mut grads, node.a, a.len());
                    for (r, (&c, og)) in b.data.iter().zip(&out_grad).enumerate() {
                        a_grad[r * cols + c as usize] += og;
                    }
                }
            }
        }

        for (id, grad) in grads {
            if let Some(tensor) = tensors.get_mut(&id) {
                if tensor.requires_grad {
                    tensor.grad = Some(grad);
                }
            }
        }

        Ok(())
    }
}
