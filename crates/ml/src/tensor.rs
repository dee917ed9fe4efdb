use crate::graph::{EOp, Node};
use crate::recorder::Recorder;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

fn next_id() -> usize {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

/// Dense row-major `f32` tensor.
///
/// Every tensor gets a process-unique `id`; clones keep it, which is how the
/// tape finds operands again during the backward pass.
#[derive(Clone, Debug)]
pub struct Tensor {
    pub id: usize,
    pub data: Vec<f32>,
    pub shape: Vec<usize>,
    pub requires_grad: bool,
    pub grad: Option<Vec<f32>>,
}

impl Tensor {
    pub fn from_vec(shape: Vec<usize>, data: Vec<f32>) -> Self {
        assert_eq!(shape.iter().product::<usize>(), data.len());
        Self {
            id: next_id(),
            data,
            shape,
            requires_grad: false,
            grad: None,
        }
    }

    pub fn scalar(value: f32) -> Self {
        Self::from_vec(vec![1], vec![value])
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn set_requires_grad(&mut self) {
        self.requires_grad = true;
    }

    #[must_use]
    pub fn with_grad(mut self) -> Self {
        self.requires_grad = true;
        self
    }

    /// Size of the innermost dimension.
    fn cols(&self) -> usize {
        self.shape.last().copied().unwrap_or(1)
    }

    fn emit(
        &self,
        op: EOp,
        other: &Tensor,
        shape: Vec<usize>,
        data: Vec<f32>,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        tensors.entry(self.id).or_insert_with(|| self.clone());
        tensors.entry(other.id).or_insert_with(|| other.clone());
        let out = Tensor::from_vec(shape, data);
        recorder.record(Node {
            op,
            a: self.id,
            b: other.id,
            out: out.id,
        });
        tensors.insert(out.id, out.clone());
        out
    }

    fn zip_with(&self, other: &Tensor, f: impl Fn(f32, f32) -> f32) -> Vec<f32> {
        assert_eq!(self.len(), other.len(), "element-wise op on different lengths");
        self.data
            .iter()
            .zip(&other.data)
            .map(|(&x, &y)| f(x, y))
            .collect()
    }

    pub fn add(
        &self,
        other: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let data = self.zip_with(other, |x, y| x + y);
        self.emit(EOp::Add, other, self.shape.clone(), data, recorder, tensors)
    }

    pub fn sub(
        &self,
        other: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let data = self.zip_with(other, |x, y| x - y);
        self.emit(EOp::Sub, other, self.shape.clone(), data, recorder, tensors)
    }

    pub fn mul(
        &self,
        other: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let data = self.zip_with(other, |x, y| x * y);
        self.emit(EOp::Mul, other, self.shape.clone(), data, recorder, tensors)
    }

    /// Element-wise minimum.
    pub fn min(
        &self,
        other: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let data = self.zip_with(other, f32::min);
        self.emit(EOp::Min, other, self.shape.clone(), data, recorder, tensors)
    }

    pub fn mul_scalar(
        &self,
        scalar: f32,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let s = Tensor::scalar(scalar);
        let data = self.data.iter().map(|&x| x * scalar).collect();
        self.emit(EOp::MulScalar, &s, self.shape.clone(), data, recorder, tensors)
    }

    /// `self` is a `[out, in]` weight matrix, `x` holds `batch` rows of `in`
    /// features (a 1-D `x` is a batch of one). The result is `[batch, out]`.
    pub fn matmul(
        &self,
        x: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        assert_eq!(self.shape.len(), 2, "matmul weight must be 2-D");
        let out_dim = self.shape[0];
        let in_dim = self.shape[1];
        assert_eq!(x.len() % in_dim, 0, "matmul input width mismatch");
        let batch = x.len() / in_dim;

        let mut y = vec![0.0f32; batch * out_dim];
        for k in 0..batch {
            let row = &x.data[k * in_dim..(k + 1) * in_dim];
            for i in 0..out_dim {
                let w = &self.data[i * in_dim..(i + 1) * in_dim];
                y[k * out_dim + i] = w.iter().zip(row).map(|(a, b)| a * b).sum::<f32>();
            }
        }
        self.emit(EOp::MatMul, x, vec![batch, out_dim], y, recorder, tensors)
    }

    /// Adds the 1-D `bias` to every row of `self`.
    pub fn add_broadcast(
        &self,
        bias: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let dim = bias.len();
        assert_eq!(self.len() % dim, 0, "bias does not divide the input");
        let data = self
            .data
            .iter()
            .enumerate()
            .map(|(i, &v)| v + bias.data[i % dim])
            .collect();
        self.emit(EOp::AddBroadcast, bias, self.shape.clone(), data, recorder, tensors)
    }

    pub fn relu(&self, recorder: &mut impl Recorder, tensors: &mut HashMap<usize, Tensor>) -> Tensor {
        let data = self.data.iter().map(|&v| v.max(0.0)).collect();
        self.emit(EOp::Relu, self, self.shape.clone(), data, recorder, tensors)
    }

    pub fn exp(&self, recorder: &mut impl Recorder, tensors: &mut HashMap<usize, Tensor>) -> Tensor {
        let data = self.data.iter().map(|&v| v.exp()).collect();
        self.emit(EOp::Exp, self, self.shape.clone(), data, recorder, tensors)
    }

    pub fn clamp(
        &self,
        min: f32,
        max: f32,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let bounds = Tensor::from_vec(vec![2], vec![min, max]);
        let data = self.data.iter().map(|&v| v.clamp(min, max)).collect();
        self.emit(EOp::Clamp, &bounds, self.shape.clone(), data, recorder, tensors)
    }

    pub fn reduce_sum(
        &self,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let sum: f32 = self.data.iter().sum();
        self.emit(EOp::ReduceSum, self, vec![1], vec![sum], recorder, tensors)
    }

    pub fn reduce_mean(
        &self,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let mean = self.data.iter().sum::<f32>() / self.len() as f32;
        self.emit(EOp::ReduceMean, self, vec![1], vec![mean], recorder, tensors)
    }

    /// Row-wise log-softmax over the innermost dimension.
    pub fn log_softmax(
        &self,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let cols = self.cols();
        let mut data = Vec::with_capacity(self.len());
        for row in self.data.chunks(cols) {
            let m = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let log_sum = row.iter().map(|&v| (v - m).exp()).sum::<f32>().ln() + m;
            data.extend(row.iter().map(|&v| v - log_sum));
        }
        self.emit(EOp::LogSoftmax, self, self.shape.clone(), data, recorder, tensors)
    }

    /// Picks `self[r, indices[r]]` from each row, giving a `[rows]` tensor.
    pub fn gather(
        &self,
        indices: &[usize],
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let rows = indices.len();
        let cols = self.cols();
        assert_eq!(self.len(), rows * cols, "gather needs one index per row");
        let data = indices
            .iter()
            .enumerate()
            .map(|(r, &c)| {
                assert!(c < cols, "gather index {c} out of range");
                self.data[r * cols + c]
            })
            .collect();
        let index_tensor =
            Tensor::from_vec(vec![rows], indices.iter().map(|&c| c as f32).collect());
        self.emit(EOp::Gather, &index_tensor, vec![rows], data, recorder, tensors)
    }
}

/// Softmax of a single row of logits, without recording anything.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let m = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exp: Vec<f32> = logits.iter().map(|&v| (v - m).exp()).collect();
    let sum: f32 = exp.iter().sum();
    exp.iter().map(|&e| e / sum).collect()
}
