//! End-of-run summary printed after all drivers have joined.
use std::time::Duration;

use crate::stats::StatCalculator;

/// Merged outcome of a whole run.
#[derive(Debug)]
pub struct RunSummary {
    pub duration: Duration,
    pub threads: usize,
    pub samples: u64,
    pub failures: u64,
    pub stats: StatCalculator,
}

#[must_use]
pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push("Run summary:".to_owned());
    lines.push(format!("duration_ms: {}", summary.duration.as_millis()));
    lines.push(format!("virtual_users: {}", summary.threads));
    lines.push(format!("samples: {}", summary.samples));
    lines.push(format!("failures: {}", summary.failures));
    lines.push(format!("latency_min_ms: {}", summary.stats.min()));
    lines.push(format!("latency_max_ms: {}", summary.stats.max()));
    lines.push(format!("latency_mean_ms: {:.2}", summary.stats.mean()));
    lines.push(format!("latency_stddev_ms: {:.2}", summary.stats.std_dev()));
    lines.push(format!("latency_p50_ms: {}", summary.stats.median()));
    lines.push(format!(
        "latency_p90_ms: {}",
        summary.stats.percent_point(0.90)
    ));
    lines.push(format!(
        "latency_p99_ms: {}",
        summary.stats.percent_point(0.99)
    ));
    lines
}

pub fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{}", line);
    }
}
