use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use rl::{Evaluation, PpoConfig, TrainingReport};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Serialize)]
pub struct PpoReport<'a> {
    pub config: &'a PpoConfig,
    pub training: &'a TrainingReport,
    pub evaluation: &'a Evaluation,
}

#[derive(Serialize)]
struct Envelope<'a, T> {
    generated_at: String,
    plot: String,
    results: &'a T,
}

/// Writes `results` as pretty JSON, stamped with the current UTC time and
/// the path of the plot it belongs to.
pub fn write<T: Serialize>(path: &Path, results: &T, plot: &Path) -> Result<()> {
    let envelope = Envelope {
        generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        plot: plot.display().to_string(),
        results,
    };
    let json = serde_json::to_string_pretty(&envelope)?;
    fs::write(path, json).with_context(|| format!("writing report to {}", path.display()))
}
