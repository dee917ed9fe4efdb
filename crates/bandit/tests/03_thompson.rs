mod common;

use bandit::{
    Bandit, BanditError, Bernoulli, BetaPrior, Gaussian, Mdp, RewardPolicy, ThompsonConfig,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

#[test]
fn each_binary_pull_bumps_exactly_one_hyperparameter() {
    let mdp = common::three_arm_mdp();
    let bandit = Bandit::new(&mdp, Bernoulli);
    let mut prior = BetaPrior::uniform(3);
    let mut rng = StdRng::seed_from_u64(1);

    for _ in 0..50 {
        let before = prior.clone();
        let run = bandit
            .thompson_sampling(&mut prior, 1, &ThompsonConfig::default(), &mut rng)
            .unwrap();
        let arm = run.actions[0];
        for a in 0..3 {
            if a == arm && run.rewards[0] == 1.0 {
                assert_eq!(prior[a].alpha, before[a].alpha + 1.0);
                assert_eq!(prior[a].beta, before[a].beta);
            } else if a == arm {
                assert_eq!(prior[a].alpha, before[a].alpha);
                assert_eq!(prior[a].beta, before[a].beta + 1.0);
            } else {
                assert_eq!(prior[a], before[a]);
            }
        }
    }
}

#[test]
fn posterior_counts_match_run() {
    let mdp = common::three_arm_mdp();
    let bandit = Bandit::new(&mdp, Bernoulli);
    let mut prior = BetaPrior::uniform(3);
    let mut rng = StdRng::seed_from_u64(2);
    let run = bandit
        .thompson_sampling(&mut prior, 300, &ThompsonConfig::default(), &mut rng)
        .unwrap();

    assert_eq!(run.counts.iter().sum::<usize>(), 300);
    for arm in 0..3 {
        let successes = run
            .actions
            .iter()
            .zip(&run.rewards)
            .filter(|(&a, &r)| a == arm && r == 1.0)
            .count() as f64;
        assert_eq!(prior[arm].alpha, 1.0 + successes);
        assert_eq!(prior[arm].alpha + prior[arm].beta, 2.0 + run.counts[arm] as f64);
    }
    for m in &run.empirical_means {
        assert!((0.0..=1.0).contains(m));
    }
}

#[test]
fn superior_arm_wins_with_high_probability() {
    let mdp = Mdp::single_state(&[0.2, 0.8], 1.0).unwrap();
    let bandit = Bandit::new(&mdp, Bernoulli);
    let mut wins = 0;
    for seed in 0..20 {
        let mut prior = BetaPrior::uniform(2);
        let mut rng = StdRng::seed_from_u64(seed);
        let run = bandit
            .thompson_sampling(&mut prior, 500, &ThompsonConfig::default(), &mut rng)
            .unwrap();
        if run.empirical_means[1] > run.empirical_means[0] && run.counts[1] > run.counts[0] {
            wins += 1;
        }
    }
    assert!(wins >= 18, "superior arm won only {wins}/20 runs");
}

#[test]
fn averaging_more_samples_is_supported() {
    let mdp = common::three_arm_mdp();
    let bandit = Bandit::new(&mdp, Bernoulli);
    let mut prior = BetaPrior::uniform(3);
    let config = ThompsonConfig {
        samples: 10,
        ..ThompsonConfig::default()
    };
    let run = bandit
        .thompson_sampling(&mut prior, 100, &config, &mut StdRng::seed_from_u64(9))
        .unwrap();
    assert_eq!(run.actions.len(), 100);
}

#[test]
fn non_binary_reward_is_rejected_by_default() {
    let mdp = common::three_arm_mdp();
    let bandit = Bandit::new(&mdp, Gaussian::default());
    let mut prior = BetaPrior::uniform(3);
    let err = bandit
        .thompson_sampling(&mut prior, 10, &ThompsonConfig::default(), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    // a Gaussian draw is never exactly 0 or 1, so the first pull fails
    assert!(
        matches!(err, BanditError::InvalidReward { iteration: 0, .. }),
        "{err}"
    );
    assert_eq!(prior, BetaPrior::uniform(3));
}

#[test]
fn strict_failure_keeps_earlier_updates() {
    let mdp = common::three_arm_mdp();
    // binary for the first three pulls, then 0.5
    let calls = std::cell::Cell::new(0);
    let sampler = |_mean: f64, _rng: &mut dyn rand::RngCore| {
        calls.set(calls.get() + 1);
        if calls.get() <= 3 {
            1.0
        } else {
            0.5
        }
    };
    let bandit = Bandit::new(&mdp, sampler);
    let mut prior = BetaPrior::uniform(3);
    let err = bandit
        .thompson_sampling(&mut prior, 10, &ThompsonConfig::default(), &mut StdRng::seed_from_u64(4))
        .unwrap_err();

    assert!(matches!(err, BanditError::InvalidReward { iteration: 3, .. }), "{err}");
    let successes: f64 = prior.iter().map(|p| p.alpha - 1.0).sum();
    assert_eq!(successes, 3.0);
    assert!(prior.iter().all(|p| p.beta == 1.0));
}

#[test]
fn lenient_policy_leaves_prior_unchanged() {
    let mdp = common::three_arm_mdp();
    let bandit = Bandit::new(&mdp, common::deterministic);
    let mut prior = BetaPrior::uniform(3);
    let config = ThompsonConfig {
        samples: 1,
        reward_policy: RewardPolicy::Lenient,
    };
    let run = bandit
        .thompson_sampling(&mut prior, 25, &config, &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(run.actions.len(), 25);
    assert_eq!(prior, BetaPrior::uniform(3));
}

#[test]
fn invalid_priors_and_sample_counts() {
    let mdp = common::three_arm_mdp();
    let bandit = Bandit::new(&mdp, Bernoulli);
    let mut rng = StdRng::seed_from_u64(0);

    let mut short = BetaPrior::uniform(2);
    assert_eq!(
        bandit
            .thompson_sampling(&mut short, 1, &ThompsonConfig::default(), &mut rng)
            .unwrap_err(),
        BanditError::PriorShape { expected: 3, got: 2 }
    );

    let mut zero = vec![BetaPrior::new(1.0, 1.0), BetaPrior::new(0.0, 1.0), BetaPrior::new(1.0, 1.0)];
    assert!(matches!(
        bandit.thompson_sampling(&mut zero, 1, &ThompsonConfig::default(), &mut rng),
        Err(BanditError::InvalidPrior { action: 1, .. })
    ));

    let mut infinite = vec![BetaPrior::new(1.0, 1.0), BetaPrior::new(1.0, 1.0), BetaPrior::new(f64::INFINITY, 1.0)];
    assert!(matches!(
        bandit.thompson_sampling(&mut infinite, 5, &ThompsonConfig::default(), &mut rng),
        Err(BanditError::InvalidPrior { action: 2, .. })
    ));

    // checked even when no pull happens
    let mut negative = vec![BetaPrior::new(-1.0, 1.0), BetaPrior::new(1.0, 1.0), BetaPrior::new(1.0, f64::NAN)];
    assert!(matches!(
        bandit.thompson_sampling(&mut negative, 0, &ThompsonConfig::default(), &mut rng),
        Err(BanditError::InvalidPrior { action: 0, .. })
    ));

    let mut prior = BetaPrior::uniform(3);
    let config = ThompsonConfig {
        samples: 0,
        ..ThompsonConfig::default()
    };
    assert_eq!(
        bandit.thompson_sampling(&mut prior, 1, &config, &mut rng).unwrap_err(),
        BanditError::InvalidSampleCount
    );
}
