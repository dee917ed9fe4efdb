//! Runs the two experiments and writes their outputs.

use anyhow::{Context, Result};
use bandit::{
    run_trials, BetaPrior, Bernoulli, Gaussian, Mdp, RewardPolicy, RewardSampler, Strategy,
    ThompsonConfig, TrialSummary,
};
use rl::{PpoConfig, PpoTrainer};
use std::fs;
use std::path::Path;
use tracing::{info, Level};

use crate::plot::{self, Series};
use crate::report;
use crate::{BanditArgs, PpoArgs, StrategyChoice};

pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

/// The config file (or the cart-pole defaults), then command-line overrides.
/// Changing the mode keeps the file's `hyperparams` if it set any.
pub fn resolve_ppo_config(args: &PpoArgs) -> Result<PpoConfig> {
    let mut config = match &args.config {
        Some(path) => load_json(path)?,
        None => PpoConfig::default(),
    };
    if let Some(mode) = args.mode {
        config.mode = mode;
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate().context("invalid PPO configuration")?;
    Ok(config)
}

pub fn run_ppo(args: &PpoArgs) -> Result<()> {
    let config = resolve_ppo_config(args)?;
    let mode = config.mode;
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    println!("Training:");
    let mut trainer = PpoTrainer::from_config(config.clone())?;
    let training = trainer.fit()?;
    println!("Training finished!");

    let plot_path = args.out_dir.join(format!("ppo-{mode}.png"));
    plot::save_line_plot(
        &plot_path,
        &[Series {
            values: &training.trailing_means,
            color: plot::BLUE,
        }],
    )?;
    println!("Episodic reward plot saved!");

    println!("Testing:");
    let evaluation = trainer.evaluate()?;
    for (i, score) in evaluation.scores.iter().enumerate() {
        println!("Episode{:02}: R = {}", i + 1, general(*score));
    }
    println!(
        "{}: {:.2} ± {:.2}",
        evaluation.label, evaluation.mean, evaluation.std
    );

    let report_path = args.out_dir.join(format!("ppo-{mode}.json"));
    report::write(
        &report_path,
        &report::PpoReport {
            config: &config,
            training: &training,
            evaluation: &evaluation,
        },
        &plot_path,
    )?;
    info!(plot = %plot_path.display(), report = %report_path.display(), "outputs written");
    Ok(())
}

/// Six significant digits with trailing zeros dropped, switching to an
/// exponent outside `1e-4..1e6`, like C's `%g`.
fn general(value: f32) -> String {
    let v = f64::from(value);
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let trim = |s: &str| {
        if s.contains('.') {
            s.trim_end_matches('0').trim_end_matches('.').to_string()
        } else {
            s.to_string()
        }
    };
    // the exponent after rounding to six digits decides the notation
    let sci = format!("{v:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return sci;
    };
    if (-4..6).contains(&exp) {
        let decimals = (5 - exp) as usize;
        trim(&format!("{v:.decimals$}"))
    } else {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{sign}{:02}", trim(mantissa), exp.abs())
    }
}

fn strategies(args: &BanditArgs, n_actions: usize) -> Vec<Strategy> {
    let thompson = Strategy::Thompson {
        prior: BetaPrior::uniform(n_actions),
        config: ThompsonConfig {
            samples: args.samples,
            reward_policy: if args.lenient {
                RewardPolicy::Lenient
            } else {
                RewardPolicy::Strict
            },
        },
    };
    match args.strategy {
        StrategyChoice::All => vec![Strategy::EpsilonGreedy, thompson, Strategy::Ucb],
        StrategyChoice::EpsilonGreedy => vec![Strategy::EpsilonGreedy],
        StrategyChoice::Thompson => vec![thompson],
        StrategyChoice::Ucb => vec![Strategy::Ucb],
    }
}

fn run_all<S: RewardSampler + Copy>(
    mdp: &Mdp,
    sampler: S,
    args: &BanditArgs,
) -> Result<Vec<TrialSummary>> {
    strategies(args, mdp.n_actions())
        .iter()
        .map(|strategy| {
            run_trials(mdp, sampler, strategy, args.iterations, args.trials, args.seed)
                .with_context(|| format!("running {}", strategy.name()))
        })
        .collect()
}

pub fn run_bandit(args: &BanditArgs) -> Result<()> {
    let mdp = match &args.mdp {
        Some(path) => load_json(path)?,
        None => Mdp::single_state(&[0.3, 0.5, 0.7], 0.999)?,
    };
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let summaries = match args.gaussian {
        Some(std_dev) => run_all(&mdp, Gaussian::new(std_dev)?, args)?,
        None => run_all(&mdp, Bernoulli, args)?,
    };

    for summary in &summaries {
        let means: Vec<String> = summary
            .average_means
            .iter()
            .map(|m| format!("{m:.3}"))
            .collect();
        println!("{:<15} empirical means [{}]", summary.strategy, means.join(", "));
    }

    let curves: Vec<Vec<f32>> = summaries
        .iter()
        .map(|s| s.average_rewards.iter().map(|&r| r as f32).collect())
        .collect();
    let series: Vec<Series<'_>> = curves
        .iter()
        .zip(plot::PALETTE.iter().cycle())
        .map(|(values, &color)| Series { values, color })
        .collect();
    let plot_path = args.out_dir.join("bandits.png");
    plot::save_line_plot(&plot_path, &series)?;

    let report_path = args.out_dir.join("bandits.json");
    report::write(&report_path, &summaries, &plot_path)?;
    info!(plot = %plot_path.display(), report = %report_path.display(), "outputs written");
    Ok(())
}
