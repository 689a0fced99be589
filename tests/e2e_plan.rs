use std::fs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tempfile::tempdir;

use loadplan::config::{build_tree, load_plan_file, resolve_settings, PlanFile};
use loadplan::driver::RunSettings;
use loadplan::entry::execute;
use loadplan::error::ListenerError;
use loadplan::sample::SampleEvent;
use loadplan::sender::{RemoteSampleListener, SenderPolicy};
use loadplan::shutdown::shutdown_channel;

/// Records the labels it receives and counts lifecycle notifications.
#[derive(Default)]
struct RecordingListener {
    labels: Mutex<Vec<String>>,
    started: AtomicU64,
    ended: AtomicU64,
}

impl RecordingListener {
    fn labels(&self) -> Vec<String> {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RemoteSampleListener for RecordingListener {
    fn test_started(&self) -> Result<(), ListenerError> {
        self.started.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn test_ended(&self) -> Result<(), ListenerError> {
        self.ended.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn sample_occurred(&self, event: &SampleEvent) -> Result<(), ListenerError> {
        self.labels
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event.result.label.clone());
        Ok(())
    }
}

const PLAN_TOML: &str = r#"
[plan]
kind = "loop"
name = "main"
loops = 2

[[plan.children]]
kind = "delay"
label = "login"
delay_ms = 0

[[plan.children]]
kind = "transaction"
name = "checkout"

[[plan.children.children]]
kind = "delay"
label = "cart"
delay_ms = 0

[[plan.children.children]]
kind = "delay"
label = "pay"
delay_ms = 0
fail_every = 3

[run]
threads = 2
seed = 5
host = "bench"

[sender]
policy = "hold"
"#;

fn load_fixture() -> Result<PlanFile, String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("plan.toml");
    fs::write(&path, PLAN_TOML).map_err(|err| format!("write failed: {}", err))?;
    load_plan_file(&path).map_err(|err| err.to_string())
}

#[tokio::test]
async fn full_run_delivers_every_sample_and_flushes_once() -> Result<(), String> {
    let file = load_fixture()?;
    let tree = Arc::new(build_tree(&file.plan).map_err(|err| err.to_string())?);

    let settings = RunSettings {
        threads: 2,
        iterations: None,
        duration: None,
        seed: 5,
        host: "bench".to_owned(),
        policy: SenderPolicy::Hold,
    };

    let listener = Arc::new(RecordingListener::default());
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();

    let report = execute(&tree, &settings, Arc::clone(&listener) as Arc<dyn RemoteSampleListener>, &shutdown_tx)
        .await
        .map_err(|err| err.to_string())?;

    // Two virtual users, two loop passes, three samplers per pass.
    assert_eq!(report.summary.samples, 12);
    assert_eq!(report.summary.threads, 2);
    assert_eq!(report.drivers.len(), 2);
    for driver in &report.drivers {
        assert_eq!(driver.samples, 6);
    }

    assert_eq!(listener.started.load(Ordering::Relaxed), 1);
    assert_eq!(listener.ended.load(Ordering::Relaxed), 1);

    // 12 real samples plus one checkout aggregate per pass per user.
    let labels = listener.labels();
    assert_eq!(labels.len(), 16);
    assert_eq!(
        labels.iter().filter(|label| *label == "checkout").count(),
        4
    );
    assert_eq!(labels.iter().filter(|label| *label == "login").count(), 4);
    Ok(())
}

#[tokio::test]
async fn failing_samples_surface_in_the_summary() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("plan.toml");
    let content = r#"
[plan]
kind = "loop"
name = "main"
loops = 4

[[plan.children]]
kind = "delay"
label = "flaky"
delay_ms = 0
fail_every = 2
"#;
    fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    let file = load_plan_file(&path).map_err(|err| err.to_string())?;
    let tree = Arc::new(build_tree(&file.plan).map_err(|err| err.to_string())?);

    let settings = RunSettings {
        threads: 1,
        iterations: None,
        duration: None,
        seed: 5,
        host: "bench".to_owned(),
        policy: SenderPolicy::Immediate,
    };

    let listener = Arc::new(RecordingListener::default());
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();

    let report = execute(&tree, &settings, Arc::clone(&listener) as Arc<dyn RemoteSampleListener>, &shutdown_tx)
        .await
        .map_err(|err| err.to_string())?;

    // Every second execution of "flaky" fails.
    assert_eq!(report.summary.samples, 4);
    assert_eq!(report.summary.failures, 2);
    assert_eq!(report.summary.stats.count(), 4);
    Ok(())
}

#[tokio::test]
async fn duration_limit_stops_an_unbounded_plan() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("plan.toml");
    let content = r#"
[plan]
kind = "generic"
name = "forever"

[[plan.children]]
kind = "delay"
label = "tick"
delay_ms = 1
"#;
    fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;
    let file = load_plan_file(&path).map_err(|err| err.to_string())?;
    let tree = Arc::new(build_tree(&file.plan).map_err(|err| err.to_string())?);

    let settings = RunSettings {
        threads: 1,
        iterations: None,
        duration: Some(Duration::from_millis(50)),
        seed: 1,
        host: "local".to_owned(),
        policy: SenderPolicy::Immediate,
    };

    let listener = Arc::new(RecordingListener::default());
    let (shutdown_tx, _shutdown_rx) = shutdown_channel();

    let report = execute(&tree, &settings, Arc::clone(&listener) as Arc<dyn RemoteSampleListener>, &shutdown_tx)
        .await
        .map_err(|err| err.to_string())?;

    assert!(report.summary.samples > 0);
    assert!(report.summary.duration >= Duration::from_millis(50));
    assert_eq!(listener.ended.load(Ordering::Relaxed), 1);
    Ok(())
}

#[tokio::test]
async fn settings_resolution_is_visible_end_to_end() -> Result<(), String> {
    use clap::Parser;
    use loadplan::args::PlanArgs;

    let file = load_fixture()?;
    let args = PlanArgs::try_parse_from(["loadplan", "--plan", "plan.toml", "--iterations", "1"])
        .map_err(|err| err.to_string())?;
    let settings = resolve_settings(&args, &file).map_err(|err| err.to_string())?;
    assert_eq!(settings.threads, 2);
    assert_eq!(settings.iterations, Some(1));
    assert_eq!(settings.policy, SenderPolicy::Hold);
    assert_eq!(settings.host, "bench");
    Ok(())
}
