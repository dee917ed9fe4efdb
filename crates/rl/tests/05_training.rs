use rl::*;

#[test]
fn short_cartpole_run_reports_every_epoch() {
    let mut config = PpoConfig::for_mode(EnvMode::CartPole);
    config.epochs = 3;
    config.test_episodes = 2;
    let mut trainer = PpoTrainer::from_config(config).unwrap();
    let report = trainer.fit().unwrap();

    assert_eq!(report.mode, EnvMode::CartPole);
    assert_eq!(report.episode_rewards.len(), 3);
    assert!(report.episode_rewards.iter().all(|&r| (1.0..=200.0).contains(&r)));
    let eval = trainer.evaluate().unwrap();
    assert_eq!(eval.scores.len(), 2);
}

#[test]
fn same_seed_same_run() {
    let run = || {
        let mut config = PpoConfig::for_mode(EnvMode::MountainCarMod);
        config.epochs = 2;
        let mut trainer = PpoTrainer::from_config(config).unwrap();
        trainer.fit().unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn mountain_car_mod_trains_on_heights() {
    let mut config = PpoConfig::for_mode(EnvMode::MountainCarMod);
    config.epochs = 1;
    let mut trainer = PpoTrainer::from_config(config).unwrap();
    let stats = trainer.train_epoch().unwrap();
    // 200 positions, each within the track and mostly left of zero
    assert!(stats.episode_reward < 0.0);
    assert!(stats.episode_reward > -1.2 * 200.0);
}

#[test]
#[ignore]
fn cartpole_improves_over_training() {
    let mut trainer = PpoTrainer::from_config(PpoConfig::for_mode(EnvMode::CartPole)).unwrap();
    let report = trainer.fit().unwrap();
    let first = report.trailing_means[24];
    let last = *report.trailing_means.last().unwrap();
    eprintln!("R25 after 25 epochs {first}, after 150 {last}");
    assert!(last > first, "no improvement: {first} -> {last}");
}
