use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use super::SampleResult;

/// Leaf execution contract.
///
/// A sampler produces exactly one [`SampleResult`] per call. Failures of any
/// kind are represented as a record with `success = false`; a sampler never
/// surfaces an error to the traversal engine.
#[async_trait]
pub trait Sampler: Send + Sync {
    fn label(&self) -> &str;

    async fn sample(&self) -> SampleResult;
}

/// Built-in sampler that sleeps for a fixed duration.
///
/// Lets plans run end-to-end without any protocol stack. An optional
/// `fail_every` makes every n-th execution report `success = false`, which
/// exercises the failure paths deterministically.
pub struct DelaySampler {
    label: String,
    delay: Duration,
    fail_every: Option<u64>,
    executions: AtomicU64,
}

impl DelaySampler {
    #[must_use]
    pub fn new(label: impl Into<String>, delay: Duration, fail_every: Option<u64>) -> Self {
        Self {
            label: label.into(),
            delay,
            fail_every,
            executions: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl Sampler for DelaySampler {
    fn label(&self) -> &str {
        &self.label
    }

    async fn sample(&self) -> SampleResult {
        let seq = self
            .executions
            .fetch_add(1, Ordering::Relaxed)
            .saturating_add(1);
        let start = Instant::now();
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        let success = self
            .fail_every
            .and_then(|every| seq.checked_rem(every))
            .is_none_or(|rem| rem != 0);

        let result = SampleResult::new(self.label.clone(), success, elapsed_ms);
        if success {
            result
        } else {
            result.with_message("Simulated failure")
        }
    }
}
