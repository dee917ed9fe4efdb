use ml::graph::Graph;
use ml::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;

const EPS: f32 = 1e-2;
const TOL: f32 = 2e-2;

fn mlp_loss(net: &Mlp, x: &Tensor) -> f32 {
    let mut g = Graph::new();
    let mut tensors = HashMap::new();
    let out = net.forward(x, &mut g, &mut tensors);
    let sq = out.mul(&out, &mut g, &mut tensors);
    sq.reduce_mean(&mut g, &mut tensors).data()[0]
}

#[test]
fn mlp_backward_matches_finite_differences() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut net = Mlp::new(&[3, 5, 2], &mut rng);
    let x = Tensor::from_vec(vec![2, 3], vec![0.5, -0.3, 0.8, -1.0, 0.2, 0.4]);

    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    net.register(&mut tensors);
    let out = net.forward(&x, &mut tape, &mut tensors);
    let sq = out.mul(&out, &mut tape, &mut tensors);
    let loss = sq.reduce_mean(&mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();
    net.pull_grads(&tensors);

    let analytic: Vec<Vec<f32>> = net
        .params()
        .iter()
        .map(|p| p.grad.clone().expect("every parameter feeds the loss"))
        .collect();

    for (pi, grads) in analytic.iter().enumerate() {
        for (j, &analytic_grad) in grads.iter().enumerate() {
            let mut plus = net.clone();
            plus.params_mut()[pi].data[j] += EPS;
            let mut minus = net.clone();
            minus.params_mut()[pi].data[j] -= EPS;

            let numeric = (mlp_loss(&plus, &x) - mlp_loss(&minus, &x)) / (2.0 * EPS);
            assert!(
                (numeric - analytic_grad).abs() < TOL,
                "param {pi}[{j}]: numeric {numeric}, analytic {analytic_grad}"
            );
        }
    }
}

#[test]
fn inputs_without_requires_grad_get_no_grad() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let w = Tensor::from_vec(vec![1, 2], vec![1.0, 2.0]).with_grad();
    let x = Tensor::from_vec(vec![1, 2], vec![3.0, 4.0]);
    let y = w.matmul(&x, &mut tape, &mut tensors);
    let loss = y.reduce_sum(&mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();

    assert_eq!(tensors[&w.id].grad.as_deref(), Some(&[3.0, 4.0][..]));
    assert!(tensors[&x.id].grad.is_none());
}

#[test]
fn shared_operand_accumulates() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let x = Tensor::from_vec(vec![2], vec![3.0, -2.0]).with_grad();
    let sq = x.mul(&x, &mut tape, &mut tensors);
    let loss = sq.reduce_sum(&mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();

    assert_eq!(tensors[&x.id].grad.as_deref(), Some(&[6.0, -4.0][..]));
}

#[test]
fn non_scalar_loss_is_rejected() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let x = Tensor::from_vec(vec![2], vec![1.0, 2.0]).with_grad();
    let y = x.relu(&mut tape, &mut tensors);

    assert_eq!(
        tape.backward(&y, &mut tensors),
        Err(MlError::NonScalarLoss(vec![2]))
    );
}
