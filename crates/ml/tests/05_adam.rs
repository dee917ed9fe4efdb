use ml::*;

#[test]
fn first_step_moves_by_learning_rate() {
    let mut p = Tensor::from_vec(vec![1], vec![1.0]).with_grad();
    p.grad = Some(vec![0.1]);
    let mut adam = Adam::new(&[&p], 0.1);
    adam.step(&mut [&mut p]);

    // bias-corrected first step is lr * sign(grad)
    assert!((p.data()[0] - 0.9).abs() < 1e-4, "got {}", p.data()[0]);
}

#[test]
fn params_without_grad_are_untouched() {
    let mut a = Tensor::from_vec(vec![2], vec![1.0, 2.0]);
    let mut b = Tensor::from_vec(vec![1], vec![3.0]);
    b.grad = Some(vec![-1.0]);
    let mut adam = Adam::new(&[&a, &b], 0.01);
    adam.step(&mut [&mut a, &mut b]);

    assert_eq!(a.data(), &[1.0, 2.0]);
    assert!(b.data()[0] > 3.0);
}

#[test]
fn minimises_a_quadratic() {
    let mut x = Tensor::from_vec(vec![1], vec![5.0]).with_grad();
    let mut adam = Adam::new(&[&x], 0.1);
    for _ in 0..500 {
        // f(x) = (x - 2)^2
        x.grad = Some(vec![2.0 * (x.data()[0] - 2.0)]);
        adam.step(&mut [&mut x]);
    }
    assert!((x.data()[0] - 2.0).abs() < 0.1, "x = {}", x.data()[0]);
    assert_eq!(adam.lr(), 0.1);
}
