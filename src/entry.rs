//! Binary entry point: wire CLI, config, senders and drivers together.
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use tracing::{debug, info};

use crate::args::PlanArgs;
use crate::config;
use crate::driver::{self, DriverReport, RunSettings};
use crate::error::AppResult;
use crate::plan::PlanTree;
use crate::sender::{build_sender, LoggingListener, RemoteSampleListener};
use crate::shutdown::{setup_signal_shutdown_handler, shutdown_channel, ShutdownSender};
use crate::stats::StatCalculator;
use crate::summary::{print_summary, RunSummary};

/// Everything a finished run leaves behind.
#[derive(Debug)]
pub struct RunReport {
    pub summary: RunSummary,
    pub drivers: Vec<DriverReport>,
}

/// Parse the CLI, build the runtime and run the plan to completion.
///
/// # Errors
///
/// Returns an error if the CLI, plan file or runtime setup fails, or if a
/// driver task panics.
pub fn run() -> AppResult<()> {
    let args = PlanArgs::parse();
    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_async(&args))
}

async fn run_async(args: &PlanArgs) -> AppResult<()> {
    let file = config::load_plan_file(&args.plan)?;
    let tree = Arc::new(config::build_tree(&file.plan)?);
    let settings = config::resolve_settings(args, &file)?;
    info!(
        "Running plan '{}' with {} virtual user(s), sender policy {}",
        args.plan.display(),
        settings.threads,
        settings.policy
    );

    let (shutdown_tx, _shutdown_rx) = shutdown_channel();
    let signal_handle = setup_signal_shutdown_handler(&shutdown_tx);

    let listener: Arc<dyn RemoteSampleListener> = Arc::new(LoggingListener::new());
    let report = execute(&tree, &settings, listener, &shutdown_tx).await?;

    signal_handle.abort();
    print_summary(&report.summary);
    Ok(())
}

/// Run one full load test: start the sender, drive every virtual user to
/// completion, then flush the sender exactly once and merge statistics.
///
/// # Errors
///
/// Returns an error if a driver task panics or is cancelled.
pub async fn execute(
    tree: &Arc<PlanTree>,
    settings: &RunSettings,
    listener: Arc<dyn RemoteSampleListener>,
    shutdown_tx: &ShutdownSender,
) -> AppResult<RunReport> {
    let sender = build_sender(settings.policy, listener);
    sender.test_started();
    let started = Instant::now();

    if let Some(duration) = settings.duration {
        let timer_tx = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            debug!("Run duration elapsed, requesting shutdown");
            drop(timer_tx.send(()));
        });
    }

    let handles = driver::spawn_drivers(tree, settings, &sender, shutdown_tx);

    let mut drivers = Vec::with_capacity(handles.len());
    let mut stats = StatCalculator::new();
    let mut samples = 0u64;
    let mut failures = 0u64;
    for handle in handles {
        let report = handle.await?;
        stats.add_all(&report.stats);
        samples = samples.saturating_add(report.samples);
        failures = failures.saturating_add(report.failures);
        drivers.push(report);
    }

    // Every producer has joined; held and batched samples flush here, once.
    sender.test_ended();

    Ok(RunReport {
        summary: RunSummary {
            duration: started.elapsed(),
            threads: settings.threads,
            samples,
            failures,
            stats,
        },
        drivers,
    })
}
