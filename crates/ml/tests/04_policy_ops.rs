//! Gradients of the ops that make up the clipped policy objective.

use ml::*;
use std::collections::HashMap;

#[test]
fn log_softmax_gather_gradient() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let logits = Tensor::from_vec(vec![2, 3], vec![0.2, 1.0, -0.5, 0.0, 0.0, 0.0]).with_grad();
    let lp = logits.log_softmax(&mut tape, &mut tensors);
    let picked = lp.gather(&[1, 2], &mut tape, &mut tensors);
    let loss = picked.reduce_sum(&mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();

    let grad = tensors[&logits.id].grad.clone().unwrap();
    // d log p_k / d z_j = 1[j == k] - p_j
    let p0 = softmax(&[0.2, 1.0, -0.5]);
    let expected = [
        -p0[0],
        1.0 - p0[1],
        -p0[2],
        -1.0 / 3.0,
        -1.0 / 3.0,
        1.0 - 1.0 / 3.0,
    ];
    for (g, e) in grad.iter().zip(expected) {
        assert!((g - e).abs() < 1e-5, "{g} vs {e}");
    }
}

#[test]
fn clamp_blocks_gradient_outside_bounds() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let ratio = Tensor::from_vec(vec![3], vec![0.5, 1.0, 1.5]).with_grad();
    let clipped = ratio.clamp(0.9, 1.1, &mut tape, &mut tensors);
    let loss = clipped.reduce_sum(&mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();

    assert_eq!(tensors[&ratio.id].grad.as_deref(), Some(&[0.0, 1.0, 0.0][..]));
}

#[test]
fn min_routes_gradient_to_smaller_operand() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let a = Tensor::from_vec(vec![3], vec![1.0, 5.0, 2.0]).with_grad();
    let b = Tensor::from_vec(vec![3], vec![2.0, 4.0, 2.0]).with_grad();
    let m = a.min(&b, &mut tape, &mut tensors);
    let loss = m.reduce_sum(&mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();

    // ties go to the second operand
    assert_eq!(tensors[&a.id].grad.as_deref(), Some(&[1.0, 0.0, 0.0][..]));
    assert_eq!(tensors[&b.id].grad.as_deref(), Some(&[0.0, 1.0, 1.0][..]));
}

#[test]
fn ratio_through_exp_and_negated_mean() {
    let mut tensors = HashMap::new();
    let mut tape = Tape::new();
    let new_lp = Tensor::from_vec(vec![2], vec![-0.5, -1.0]).with_grad();
    let old_lp = Tensor::from_vec(vec![2], vec![-0.7, -0.9]);
    let adv = Tensor::from_vec(vec![2], vec![2.0, -1.0]);

    let diff = new_lp.sub(&old_lp, &mut tape, &mut tensors);
    let ratio = diff.exp(&mut tape, &mut tensors);
    let surrogate = ratio.mul(&adv, &mut tape, &mut tensors);
    let mean = surrogate.reduce_mean(&mut tape, &mut tensors);
    let loss = mean.mul_scalar(-1.0, &mut tape, &mut tensors);
    tape.backward(&loss, &mut tensors).unwrap();

    let grad = tensors[&new_lp.id].grad.clone().unwrap();
    let r0 = (0.2f32).exp();
    let r1 = (-0.1f32).exp();
    assert!((grad[0] - (-0.5 * r0 * 2.0)).abs() < 1e-5);
    assert!((grad[1] - (-0.5 * r1 * -1.0)).abs() < 1e-5);
}
