//! Small problems where the effect of a PPO update is predictable.

use rl::*;

/// One-step episodes: action 1 pays 1, action 0 pays nothing.
struct TwoArms;

impl Env for TwoArms {
    fn reset(&mut self) -> Vec<f32> {
        vec![1.0]
    }

    fn step(&mut self, action: usize) -> Result<Step, RlError> {
        if action > 1 {
            return Err(RlError::InvalidAction { action, n_actions: 2 });
        }
        Ok(Step {
            obs: vec![1.0],
            reward: action as f32,
            done: true,
        })
    }

    fn obs_size(&self) -> usize {
        1
    }

    fn action_size(&self) -> usize {
        2
    }
}

fn two_arm_config() -> PpoConfig {
    PpoConfig {
        hyperparams: Some(Hyperparams {
            obs_size: 1,
            action_size: 2,
            gamma: 1.0,
            value_lr: 1e-2,
            policy_lr: 1e-2,
            policy_train_iters: 10,
        }),
        hidden: 8,
        epochs: 300,
        episodes_per_epoch: 4,
        test_episodes: 20,
        ..PpoConfig::default()
    }
}

#[test]
fn mismatched_env_is_rejected() {
    let err = PpoTrainer::new(TwoArms, PpoConfig::default()).err();
    assert!(matches!(err, Some(RlError::InvalidConfig(_))));
}

#[test]
fn collect_gathers_whole_episodes() {
    let mut trainer = PpoTrainer::new(TwoArms, two_arm_config()).unwrap();
    let batch = trainer.collect().unwrap();
    assert_eq!(batch.len(), 4);
    assert_eq!(batch.states, vec![vec![1.0]; 4]);
    assert_eq!(batch.returns, batch.actions.iter().map(|&a| a as f32).collect::<Vec<_>>());
}

#[test]
fn old_log_probs_match_policy() {
    let mut trainer = PpoTrainer::new(TwoArms, two_arm_config()).unwrap();
    let batch = trainer.collect().unwrap();
    let probs = trainer.action_probs(&[1.0]);
    for (lp, &a) in trainer.old_log_probs(&batch).iter().zip(&batch.actions) {
        assert!((lp.exp() - probs[a]).abs() < 1e-5);
    }
}

#[test]
fn value_step_moves_towards_return() {
    let mut trainer = PpoTrainer::new(TwoArms, two_arm_config()).unwrap();
    let batch = Batch {
        states: vec![vec![1.0]],
        actions: vec![1],
        returns: vec![5.0],
        last_episode_reward: 5.0,
    };
    let before = trainer.value_estimate(&[1.0]);
    let deltas = trainer.fit_value(&batch).unwrap();
    assert!((deltas[0] - (5.0 - before)).abs() < 1e-5);
    assert!(trainer.value_estimate(&[1.0]) > before);
}

#[test]
fn positive_advantage_raises_action_probability() {
    let mut trainer = PpoTrainer::new(TwoArms, two_arm_config()).unwrap();
    let batch = Batch {
        states: vec![vec![1.0]; 2],
        actions: vec![1, 1],
        returns: vec![1.0, 1.0],
        last_episode_reward: 1.0,
    };
    let before = trainer.action_probs(&[1.0])[1];
    let old = trainer.old_log_probs(&batch);
    trainer.update_policy(&batch, &old, &[1.0, 1.0]).unwrap();
    let after = trainer.action_probs(&[1.0])[1];
    assert!(after > before, "{before} -> {after}");
}

#[test]
fn first_objective_is_negated_mean_advantage() {
    let mut config = two_arm_config();
    config.hyperparams.as_mut().unwrap().policy_train_iters = 1;
    let mut trainer = PpoTrainer::new(TwoArms, config).unwrap();
    let batch = Batch {
        states: vec![vec![1.0]; 3],
        actions: vec![0, 1, 1],
        returns: vec![0.0, 1.0, 1.0],
        last_episode_reward: 1.0,
    };
    let old = trainer.old_log_probs(&batch);
    // ratio is exactly 1 before the first step
    let objective = trainer.update_policy(&batch, &old, &[-1.0, 0.5, 2.0]).unwrap();
    assert!((objective - (-0.5)).abs() < 1e-5, "objective {objective}");
}

#[test]
fn learns_the_better_arm() {
    let mut trainer = PpoTrainer::new(TwoArms, two_arm_config()).unwrap();
    let report = trainer.fit().unwrap();

    assert_eq!(report.epochs, 300);
    assert_eq!(report.trailing_means.len(), 300);
    let p = trainer.action_probs(&[1.0])[1];
    assert!(p > 0.7, "p(better arm) = {p}");
    assert!(trainer.value_estimate(&[1.0]) > 0.5);

    let eval = trainer.evaluate().unwrap();
    assert_eq!(eval.scores.len(), 20);
    assert_eq!(eval.label, "Eval score");
    assert!(eval.mean > 0.5);
}
