use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tempfile::tempdir;

use super::{build_tree, load_plan_file, resolve_settings, NodeConfig, PlanFile};
use crate::args::PlanArgs;
use crate::control::{Next, PlanEngine};
use crate::error::{AppError, ConfigError};
use crate::plan::PlanTree;
use crate::sender::SenderPolicy;

const SAMPLE_PLAN_TOML: &str = r#"
[plan]
kind = "loop"
name = "main"
loops = 2

[[plan.children]]
kind = "delay"
label = "ping"
delay_ms = 0

[[plan.children]]
kind = "transaction"
name = "checkout"

[[plan.children.children]]
kind = "delay"
label = "pay"
delay_ms = 0

[run]
threads = 3
iterations = 5
seed = 42
host = "bench"

[sender]
policy = "hold"
"#;

fn bare_args(extra: &[&str]) -> Result<PlanArgs, String> {
    let mut argv = vec!["loadplan", "--plan", "plan.toml"];
    argv.extend_from_slice(extra);
    PlanArgs::try_parse_from(argv).map_err(|err| err.to_string())
}

#[test]
fn toml_plan_round_trips_into_a_tree() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("plan.toml");
    fs::write(&path, SAMPLE_PLAN_TOML).map_err(|err| format!("write failed: {}", err))?;

    let file = load_plan_file(&path).map_err(|err| err.to_string())?;
    let tree = build_tree(&file.plan).map_err(|err| err.to_string())?;

    // root + ping + transaction + pay
    assert_eq!(tree.len(), 4);
    let root = tree.node(PlanTree::ROOT).ok_or("missing root")?;
    assert_eq!(root.name, "main");
    assert_eq!(root.children.len(), 2);
    Ok(())
}

#[test]
fn json_plan_is_accepted() -> Result<(), String> {
    let dir = tempdir().map_err(|err| format!("tempdir failed: {}", err))?;
    let path = dir.path().join("plan.json");
    let content = r#"{
        "plan": {
            "kind": "generic",
            "name": "root",
            "children": [
                { "kind": "delay", "label": "a", "delay_ms": 0 }
            ]
        }
    }"#;
    fs::write(&path, content).map_err(|err| format!("write failed: {}", err))?;

    let file = load_plan_file(&path).map_err(|err| err.to_string())?;
    let tree = build_tree(&file.plan).map_err(|err| err.to_string())?;
    assert_eq!(tree.len(), 2);
    Ok(())
}

#[test]
fn unknown_extension_is_rejected() {
    let result = load_plan_file(&PathBuf::from("plan.yaml"));
    assert!(matches!(
        result,
        Err(ConfigError::UnsupportedExtension { .. })
    ));
}

#[test]
fn missing_extension_is_rejected() {
    let result = load_plan_file(&PathBuf::from("plan"));
    assert!(matches!(result, Err(ConfigError::MissingExtension)));
}

#[test]
fn sampler_at_root_is_rejected() {
    let config = NodeConfig::Delay {
        label: Some("lonely".to_owned()),
        delay_ms: 0,
        fail_every: None,
    };
    assert!(matches!(
        build_tree(&config),
        Err(AppError::Config(ConfigError::SamplerAtRoot))
    ));
}

#[test]
fn zero_loops_is_rejected() {
    let config = NodeConfig::Loop {
        name: Some("never".to_owned()),
        loops: Some(0),
        children: Vec::new(),
    };
    assert!(matches!(
        build_tree(&config),
        Err(AppError::Config(ConfigError::ZeroLoops { .. }))
    ));
}

#[test]
fn built_tree_traverses_in_document_order() -> Result<(), String> {
    let file: PlanFile = toml::from_str(SAMPLE_PLAN_TOML).map_err(|err| err.to_string())?;
    let tree = Arc::new(build_tree(&file.plan).map_err(|err| err.to_string())?);
    let mut engine = PlanEngine::new(Arc::clone(&tree), 1);

    let mut labels = Vec::new();
    loop {
        match engine.next() {
            Next::Work(id) => {
                let node = tree.node(id).ok_or("missing node")?;
                labels.push(node.name.clone());
            }
            Next::Exhausted => break,
        }
    }
    // Two passes over the loop body.
    assert_eq!(labels, ["ping", "pay", "ping", "pay"]);
    Ok(())
}

#[test]
fn cli_flags_override_file_settings() -> Result<(), String> {
    let file: PlanFile = toml::from_str(SAMPLE_PLAN_TOML).map_err(|err| err.to_string())?;
    let args = bare_args(&["--threads", "8", "--sender", "immediate", "--duration", "1s"])?;

    let settings = resolve_settings(&args, &file).map_err(|err| err.to_string())?;
    assert_eq!(settings.threads, 8);
    assert_eq!(settings.iterations, Some(5));
    assert_eq!(settings.duration, Some(Duration::from_secs(1)));
    assert_eq!(settings.seed, 42);
    assert_eq!(settings.host, "bench");
    assert_eq!(settings.policy, SenderPolicy::Immediate);
    Ok(())
}

#[test]
fn file_policy_is_used_when_cli_is_silent() -> Result<(), String> {
    let file: PlanFile = toml::from_str(SAMPLE_PLAN_TOML).map_err(|err| err.to_string())?;
    let settings = resolve_settings(&bare_args(&[])?, &file).map_err(|err| err.to_string())?;
    assert_eq!(settings.policy, SenderPolicy::Hold);
    Ok(())
}

#[test]
fn zero_threads_is_rejected() -> Result<(), String> {
    let file: PlanFile = toml::from_str(SAMPLE_PLAN_TOML).map_err(|err| err.to_string())?;
    let args = bare_args(&["--threads", "0"])?;
    assert!(matches!(
        resolve_settings(&args, &file),
        Err(ConfigError::FieldMustBePositive { field: "threads" })
    ));
    Ok(())
}

#[test]
fn bad_file_policy_is_rejected() -> Result<(), String> {
    let mut file: PlanFile = toml::from_str(SAMPLE_PLAN_TOML).map_err(|err| err.to_string())?;
    file.sender.policy = Some("sometimes".to_owned());
    assert!(matches!(
        resolve_settings(&bare_args(&[])?, &file),
        Err(ConfigError::InvalidSenderPolicy { .. })
    ));
    Ok(())
}
