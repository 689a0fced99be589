//! Plan file loading and run-setting resolution.
//!
//! Plan files describe the controller tree plus optional `[run]` and
//! `[sender]` sections; CLI flags override file values, which override
//! defaults.
mod loader;
mod types;

#[cfg(test)]
mod tests;

pub use loader::load_plan_file;
pub use types::{NodeConfig, PlanFile, RunSection, SenderSection};

use std::sync::Arc;
use std::time::Duration;

use crate::args::PlanArgs;
use crate::driver::RunSettings;
use crate::error::{AppResult, ConfigError};
use crate::plan::{ControllerKind, NodeId, PlanTree, PlanTreeBuilder};
use crate::sample::DelaySampler;
use crate::sender::SenderPolicy;

/// Build the immutable plan tree described by a node config.
///
/// # Errors
///
/// Returns an error if the root is a sampler or a loop controller is
/// configured with zero loops.
pub fn build_tree(config: &NodeConfig) -> AppResult<PlanTree> {
    let (name, kind, children) = controller_parts(config)?;
    let mut builder = PlanTreeBuilder::new(name, kind);
    attach_children(&mut builder, PlanTree::ROOT, children)?;
    Ok(builder.build())
}

fn attach_children(
    builder: &mut PlanTreeBuilder,
    parent: NodeId,
    children: &[NodeConfig],
) -> AppResult<()> {
    // Plan files are hand-written; recursion depth here is tiny.
    for child in children {
        match child {
            NodeConfig::Delay {
                label,
                delay_ms,
                fail_every,
            } => {
                let label = label.as_deref().unwrap_or("delay");
                let sampler = Arc::new(DelaySampler::new(
                    label,
                    Duration::from_millis(*delay_ms),
                    *fail_every,
                ));
                builder.add_sampler(parent, sampler)?;
            }
            NodeConfig::Generic { .. }
            | NodeConfig::Loop { .. }
            | NodeConfig::RandomOrder { .. }
            | NodeConfig::Transaction { .. } => {
                let (name, kind, grandchildren) = controller_parts(child)?;
                let id = builder.add_controller(parent, name, kind)?;
                attach_children(builder, id, grandchildren)?;
            }
        }
    }
    Ok(())
}

fn controller_parts(config: &NodeConfig) -> Result<(&str, ControllerKind, &[NodeConfig]), ConfigError> {
    match config {
        NodeConfig::Generic { name, children } => Ok((
            name.as_deref().unwrap_or("controller"),
            ControllerKind::Generic,
            children,
        )),
        NodeConfig::Loop {
            name,
            loops,
            children,
        } => {
            let name = name.as_deref().unwrap_or("loop");
            if *loops == Some(0) {
                return Err(ConfigError::ZeroLoops {
                    name: name.to_owned(),
                });
            }
            Ok((name, ControllerKind::Loop { loops: *loops }, children))
        }
        NodeConfig::RandomOrder { name, children } => Ok((
            name.as_deref().unwrap_or("random-order"),
            ControllerKind::RandomOrder,
            children,
        )),
        NodeConfig::Transaction { name, children } => Ok((
            name.as_deref().unwrap_or("transaction"),
            ControllerKind::Transaction,
            children,
        )),
        NodeConfig::Delay { .. } => Err(ConfigError::SamplerAtRoot),
    }
}

/// Merge CLI flags over plan-file sections into the effective run settings.
///
/// # Errors
///
/// Returns an error if a setting is out of range or the configured sender
/// policy fails to parse.
pub fn resolve_settings(args: &PlanArgs, file: &PlanFile) -> Result<RunSettings, ConfigError> {
    let threads = args.threads.or(file.run.threads).unwrap_or(1);
    if threads == 0 {
        return Err(ConfigError::FieldMustBePositive { field: "threads" });
    }
    let iterations = args.iterations.or(file.run.iterations);
    if iterations == Some(0) {
        return Err(ConfigError::FieldMustBePositive {
            field: "iterations",
        });
    }
    let duration = args
        .duration
        .or_else(|| file.run.duration_ms.map(Duration::from_millis));

    let policy = match (args.sender, file.sender.policy.as_deref()) {
        (Some(policy), _) => policy,
        (None, Some(value)) => {
            value
                .parse::<SenderPolicy>()
                .map_err(|reason| ConfigError::InvalidSenderPolicy {
                    value: value.to_owned(),
                    reason,
                })?
        }
        (None, None) => SenderPolicy::default(),
    };

    Ok(RunSettings {
        threads,
        iterations,
        duration,
        seed: args.seed.or(file.run.seed).unwrap_or_else(rand::random),
        host: args
            .host
            .clone()
            .or_else(|| file.run.host.clone())
            .unwrap_or_else(|| "local".to_owned()),
        policy,
    })
}
