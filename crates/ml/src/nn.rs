use crate::recorder::Recorder;
use crate::tensor::Tensor;
use rand::distributions::Uniform;
use rand::Rng;
use std::collections::HashMap;

/// A fully connected neural network layer.
#[derive(Clone, Debug)]
pub struct Dense {
    /// The weight matrix for the layer, `[out_dim, in_dim]`.
    pub w: Tensor,
    /// The bias vector for the layer.
    pub b: Tensor,
    /// The number of input dimensions.
    pub in_dim: usize,
    /// The number of output dimensions.
    pub out_dim: usize,
}

impl Dense {
    /// Creates a new `Dense` layer with the given weights and biases.
    pub fn new(weights: Vec<f32>, bias: Vec<f32>, in_d: usize, out_d: usize) -> Self {
        assert_eq!(weights.len(), in_d * out_d);
        assert_eq!(bias.len(), out_d);
        Self {
            w: Tensor::from_vec(vec![out_d, in_d], weights),
            b: Tensor::from_vec(vec![out_d], bias),
            in_dim: in_d,
            out_dim: out_d,
        }
    }

    /// Glorot-uniform weights, zero bias.
    pub fn xavier(in_d: usize, out_d: usize, rng: &mut impl Rng) -> Self {
        let limit = (6.0f32 / (in_d as f32 + out_d as f32)).sqrt();
        let dist = Uniform::new(-limit, limit);
        let weights: Vec<f32> = (0..in_d * out_d).map(|_| rng.sample(dist)).collect();
        let bias = vec![0.0; out_d];
        Self::new(weights, bias, in_d, out_d)
    }

    /// Performs the forward pass through the layer.
    pub fn forward(
        &self,
        x: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let wx = self.w.matmul(x, recorder, tensors);
        wx.add_broadcast(&self.b, recorder, tensors)
    }
}

/// Stack of [`Dense`] layers with ReLU between them (none after the last).
#[derive(Clone, Debug)]
pub struct Mlp {
    layers: Vec<Dense>,
}

impl Mlp {
    /// `sizes` lists the width of every layer boundary, input first:
    /// `[4, 32, 32, 2]` builds three layers.
    pub fn new(sizes: &[usize], rng: &mut impl Rng) -> Self {
        assert!(sizes.len() >= 2, "an mlp needs an input and an output size");
        let layers = sizes
            .windows(2)
            .map(|w| Dense::xavier(w[0], w[1], rng))
            .collect();
        Self { layers }
    }

    pub fn from_layers(layers: Vec<Dense>) -> Self {
        Self { layers }
    }

    pub fn layers(&self) -> &[Dense] {
        &self.layers
    }

    pub fn in_dim(&self) -> usize {
        self.layers[0].in_dim
    }

    pub fn out_dim(&self) -> usize {
        self.layers[self.layers.len() - 1].out_dim
    }

    pub fn forward(
        &self,
        x: &Tensor,
        recorder: &mut impl Recorder,
        tensors: &mut HashMap<usize, Tensor>,
    ) -> Tensor {
        let last = self.layers.len() - 1;
        let mut h = x.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            h = layer.forward(&h, recorder, tensors);
            if i < last {
                h = h.relu(recorder, tensors);
            }
        }
        h
    }

    pub fn params(&self) -> Vec<&Tensor> {
        self.layers.iter().flat_map(|l| [&l.w, &l.b]).collect()
    }

    pub fn params_mut(&mut self) -> Vec<&mut Tensor> {
        self.layers
            .iter_mut()
            .flat_map(|l| [&mut l.w, &mut l.b])
            .collect()
    }

    /// Flags every parameter as trainable and makes it visible to the tape.
    pub fn register(&mut self, tensors: &mut HashMap<usize, Tensor>) {
        for p in self.params_mut() {
            p.set_requires_grad();
            tensors.insert(p.id, p.clone());
        }
    }

    /// Copies the gradients computed by [`crate::tape::Tape::backward`] back
    /// onto the parameters.
    pub fn pull_grads(&mut self, tensors: &HashMap<usize, Tensor>) {
        for p in self.params_mut() {
            p.grad = tensors.get(&p.id).and_then(|t| t.grad.clone());
        }
    }
}
