use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use super::parsers::{parse_duration_arg, parse_sender_policy};
use crate::sender::SenderPolicy;

/// Deterministic test-plan execution core for load generation.
#[derive(Debug, Clone, Parser)]
#[command(name = "loadplan", version, about)]
pub struct PlanArgs {
    /// Path to the plan file (.toml or .json).
    #[arg(short, long)]
    pub plan: PathBuf,

    /// Number of virtual users, each driving its own copy of the plan.
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Plan iterations per virtual user; omit to run until the plan
    /// finishes or the duration elapses.
    #[arg(short, long)]
    pub iterations: Option<u64>,

    /// Wall-clock limit for the run, e.g. `30s`, `500ms`, `5m`.
    #[arg(short, long, value_parser = parse_duration_arg)]
    pub duration: Option<Duration>,

    /// Sample delivery policy: `immediate`, `hold` or `batch(count, millis)`.
    #[arg(short, long, value_parser = parse_sender_policy)]
    pub sender: Option<SenderPolicy>,

    /// Base seed for random-order controllers; each virtual user derives
    /// its own seed from it.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Host label attached to every sample event.
    #[arg(long)]
    pub host: Option<String>,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable ANSI colors in log output.
    #[arg(long)]
    pub no_color: bool,
}
