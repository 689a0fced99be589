//! Virtual-user drivers.
//!
//! Each driver task owns one [`PlanEngine`] over the shared plan tree and
//! runs it to completion, pushing every sample into the shared sender and
//! folding timings into a task-local [`StatCalculator`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::error::TryRecvError;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::control::{IterationEvent, IterationListener, Next, PlanEngine};
use crate::plan::{NodeId, PlanTree};
use crate::sample::{SampleEvent, SampleResult};
use crate::sender::{SampleSender, SenderPolicy};
use crate::shutdown::ShutdownSender;
use crate::stats::StatCalculator;

/// Effective settings for one run, after merging CLI and plan file.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub threads: usize,
    /// Plan iterations per virtual user; `None` runs until the plan is done.
    pub iterations: Option<u64>,
    pub duration: Option<Duration>,
    pub seed: u64,
    pub host: String,
    pub policy: SenderPolicy,
}

/// What one driver did before it stopped.
#[derive(Debug)]
pub struct DriverReport {
    pub thread_name: String,
    pub samples: u64,
    pub failures: u64,
    pub iterations: u64,
    pub stats: StatCalculator,
}

struct IterationLogger {
    thread_name: String,
}

impl IterationListener for IterationLogger {
    fn iteration_start(&mut self, event: &IterationEvent) {
        debug!(
            "{}: starting iteration {} of '{}'",
            self.thread_name, event.iteration, event.node
        );
    }
}

/// Spawn one driver task per configured virtual user.
///
/// Drivers observe `shutdown_tx` cooperatively between samples; each gets a
/// distinct engine seed derived from the base seed.
#[must_use]
pub fn spawn_drivers(
    tree: &Arc<PlanTree>,
    settings: &RunSettings,
    sender: &Arc<dyn SampleSender>,
    shutdown_tx: &ShutdownSender,
) -> Vec<JoinHandle<DriverReport>> {
    let mut handles = Vec::with_capacity(settings.threads);
    for index in 0..settings.threads {
        let seed = settings
            .seed
            .wrapping_add(u64::try_from(index).unwrap_or(u64::MAX));
        let driver = Driver {
            tree: Arc::clone(tree),
            seed,
            iterations: settings.iterations,
            thread_name: format!("vu-{}", index),
            host: settings.host.clone(),
            sender: Arc::clone(sender),
            shutdown_tx: shutdown_tx.clone(),
        };
        handles.push(tokio::spawn(driver.run()));
    }
    handles
}

struct Driver {
    tree: Arc<PlanTree>,
    seed: u64,
    iterations: Option<u64>,
    thread_name: String,
    host: String,
    sender: Arc<dyn SampleSender>,
    shutdown_tx: ShutdownSender,
}

impl Driver {
    async fn run(self) -> DriverReport {
        let mut engine = PlanEngine::new(Arc::clone(&self.tree), self.seed);
        engine.add_iteration_listener(
            PlanTree::ROOT,
            Box::new(IterationLogger {
                thread_name: self.thread_name.clone(),
            }),
        );

        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let mut stats = StatCalculator::new();
        let mut samples = 0u64;
        let mut failures = 0u64;
        let mut completed = 0u64;

        loop {
            match shutdown_rx.try_recv() {
                Ok(()) | Err(TryRecvError::Closed) => {
                    debug!("{}: shutdown requested, stopping", self.thread_name);
                    break;
                }
                Err(TryRecvError::Empty | TryRecvError::Lagged(_)) => {}
            }

            match engine.next() {
                Next::Work(id) => {
                    let Some(result) = self.execute(id).await else {
                        break;
                    };
                    engine.record_result(&result);
                    stats.add_value(result.elapsed_ms, 1);
                    samples = samples.saturating_add(1);
                    if !result.success {
                        failures = failures.saturating_add(1);
                    }
                    self.forward(result);
                }
                Next::Exhausted => {
                    if engine.is_done() {
                        debug!("{}: plan permanently done", self.thread_name);
                        self.drain_emitted(&mut engine);
                        break;
                    }
                    completed = completed.saturating_add(1);
                    if self.iterations.is_some_and(|limit| completed >= limit) {
                        debug!(
                            "{}: iteration limit {} reached",
                            self.thread_name, completed
                        );
                        self.drain_emitted(&mut engine);
                        break;
                    }
                }
            }

            self.drain_emitted(&mut engine);
        }

        DriverReport {
            thread_name: self.thread_name,
            samples,
            failures,
            iterations: completed,
            stats,
        }
    }

    async fn execute(&self, id: NodeId) -> Option<SampleResult> {
        let Some(sampler) = self.tree.sampler(id) else {
            warn!(
                "{}: plan node {} is not executable, stopping",
                self.thread_name, id
            );
            return None;
        };
        Some(sampler.sample().await)
    }

    /// Aggregate results from transaction controllers ride the same
    /// pipeline as real samples.
    fn drain_emitted(&self, engine: &mut PlanEngine) {
        for result in engine.take_emitted() {
            self.forward(result);
        }
    }

    fn forward(&self, result: SampleResult) {
        self.sender.send(SampleEvent::new(
            result,
            self.thread_name.clone(),
            self.host.clone(),
        ));
    }
}
