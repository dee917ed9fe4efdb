//! # lab
//!
//! Entry point for the experiment runner.
//!
//! `lab bandit` compares the bandit strategies over many seeded trials and
//! plots their average reward per iteration. `lab ppo --mode <mode>` trains
//! a PPO agent on cart-pole or mountain car, plots the trailing reward curve
//! and prints the test episodes. Both write a PNG and a JSON summary to
//! `--out-dir`.

mod app;
mod plot;
mod report;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use rl::EnvMode;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lab", version, about = "Bandit strategies and PPO on classic control tasks")]
struct Cli {
    /// Log per-epoch and per-update detail
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train and test a PPO agent
    Ppo(PpoArgs),
    /// Compare bandit strategies over repeated trials
    Bandit(BanditArgs),
}

#[derive(Args, Debug)]
pub struct PpoArgs {
    /// cartpole, mountain_car or mountain_car_mod [default: cartpole]
    #[arg(long)]
    pub mode: Option<EnvMode>,

    /// JSON file overriding any run setting
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub epochs: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "images")]
    pub out_dir: PathBuf,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyChoice {
    All,
    EpsilonGreedy,
    Thompson,
    Ucb,
}

#[derive(Args, Debug)]
pub struct BanditArgs {
    #[arg(long, value_enum, default_value_t = StrategyChoice::All)]
    pub strategy: StrategyChoice,

    #[arg(long, default_value_t = 200)]
    pub iterations: usize,

    #[arg(long, default_value_t = 1000)]
    pub trials: usize,

    /// Beta draws averaged per arm in Thompson sampling
    #[arg(long, default_value_t = 1)]
    pub samples: usize,

    /// Let Thompson sampling skip rewards outside {0, 1} instead of failing
    #[arg(long)]
    pub lenient: bool,

    /// Draw Gaussian rewards with this standard deviation instead of Bernoulli
    #[arg(long)]
    pub gaussian: Option<f64>,

    /// JSON file describing the MDP; defaults to three arms at 0.3/0.5/0.7
    #[arg(long)]
    pub mdp: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    #[arg(long, default_value = "images")]
    pub out_dir: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    app::init_logging(cli.verbose);
    match cli.command {
        Command::Ppo(args) => app::run_ppo(&args),
        Command::Bandit(args) => app::run_bandit(&args),
    }
}
