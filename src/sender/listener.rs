use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, info};

use crate::error::ListenerError;
use crate::sample::SampleEvent;

/// Contract of a result consumer, local or remote.
///
/// The transport behind an implementation is out of scope here; the sender
/// policies in this module are the only callers. Fallible methods report
/// delivery problems as [`ListenerError`], which callers contain and log.
pub trait RemoteSampleListener: Send + Sync {
    /// A test run is starting.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot accept the notification.
    fn test_started(&self) -> Result<(), ListenerError> {
        Ok(())
    }

    /// A test run is starting on the named host.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot accept the notification.
    fn test_started_host(&self, host: &str) -> Result<(), ListenerError> {
        let _ = host;
        Ok(())
    }

    /// The test run finished; all samples have been delivered.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot accept the notification.
    fn test_ended(&self) -> Result<(), ListenerError> {
        Ok(())
    }

    /// The test run finished on the named host.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot accept the notification.
    fn test_ended_host(&self, host: &str) -> Result<(), ListenerError> {
        let _ = host;
        Ok(())
    }

    /// One completed sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery fails; the sender logs it and
    /// continues with subsequent records.
    fn sample_occurred(&self, event: &SampleEvent) -> Result<(), ListenerError>;

    fn sample_started(&self, event: &SampleEvent) {
        let _ = event;
    }

    fn sample_stopped(&self, event: &SampleEvent) {
        let _ = event;
    }

    /// A batch of completed samples, in producer order.
    ///
    /// # Errors
    ///
    /// Returns an error if the delivery fails.
    fn process_batch(&self, events: &[SampleEvent]) -> Result<(), ListenerError> {
        for event in events {
            self.sample_occurred(event)?;
        }
        Ok(())
    }
}

/// In-process listener that logs deliveries and keeps counters.
///
/// Stands in for a remote listener in local runs.
#[derive(Debug, Default)]
pub struct LoggingListener {
    samples: AtomicU64,
    batches: AtomicU64,
    ended: AtomicU64,
}

impl LoggingListener {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn batches(&self) -> u64 {
        self.batches.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn ended(&self) -> u64 {
        self.ended.load(Ordering::Relaxed)
    }
}

impl RemoteSampleListener for LoggingListener {
    fn test_started(&self) -> Result<(), ListenerError> {
        info!("Test started");
        Ok(())
    }

    fn test_ended(&self) -> Result<(), ListenerError> {
        self.ended.fetch_add(1, Ordering::Relaxed);
        info!(
            "Test ended after {} samples",
            self.samples.load(Ordering::Relaxed)
        );
        Ok(())
    }

    fn test_ended_host(&self, host: &str) -> Result<(), ListenerError> {
        info!("Test ended on host {}", host);
        Ok(())
    }

    fn sample_occurred(&self, event: &SampleEvent) -> Result<(), ListenerError> {
        self.samples.fetch_add(1, Ordering::Relaxed);
        debug!(
            "Sample '{}' from {}: success={} elapsed={}ms",
            event.result.label, event.thread_name, event.result.success, event.result.elapsed_ms
        );
        Ok(())
    }

    fn process_batch(&self, events: &[SampleEvent]) -> Result<(), ListenerError> {
        self.batches.fetch_add(1, Ordering::Relaxed);
        for event in events {
            self.sample_occurred(event)?;
        }
        Ok(())
    }
}
