/// Per-step discounted return `G[t] = r[t] + gamma * G[t + 1]`, with
/// `G[last] = r[last]`.
pub fn discounted_returns(rewards: &[f32], gamma: f32) -> Vec<f32> {
    let mut returns = rewards.to_vec();
    for i in (0..returns.len().saturating_sub(1)).rev() {
        returns[i] += gamma * returns[i + 1];
    }
    returns
}

/// Mean and population standard deviation. Both are 0 for an empty slice.
pub fn mean_std(values: &[f32]) -> (f32, f32) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f32;
    let mean = values.iter().sum::<f32>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f32>() / n;
    (mean, var.sqrt())
}

/// Mean over the last `window` values (or all of them if there are fewer).
pub fn trailing_mean(values: &[f32], window: usize) -> f32 {
    let tail = &values[values.len().saturating_sub(window.max(1))..];
    mean_std(tail).0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_reward_is_its_own_return() {
        assert_eq!(discounted_returns(&[3.0], 0.9), vec![3.0]);
        assert!(discounted_returns(&[], 0.9).is_empty());
    }

    #[test]
    fn trailing_window() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(trailing_mean(&values, 2), 3.5);
        assert_eq!(trailing_mean(&values, 25), 2.5);
        assert_eq!(trailing_mean(&[], 25), 0.0);
    }
}
