//! Sample distribution pipeline.
//!
//! A [`SampleSender`] accepts completed sample events from many producer
//! tasks and forwards them to a [`RemoteSampleListener`] under one of three
//! policies: immediate forwarding, hold-until-end, or count/interval
//! batching. Listener failures are logged and contained; they never reach a
//! producer and never abort delivery of the remaining records.
mod batch;
mod hold;
mod immediate;
mod listener;
mod policy;


pub use batch::BatchSender;
pub use hold::HoldSender;
pub use immediate::ImmediateSender;
pub use listener::{LoggingListener, RemoteSampleListener};
pub use policy::{SenderPolicy, build_sender};

use tracing::warn;

use crate::error::ListenerError;
use crate::sample::SampleEvent;

/// Accepts sample events from producer tasks and forwards them per policy.
///
/// `test_ended` must be called exactly once, after every producer has
/// stopped producing; that ordering invariant is owned by the run layer.
pub trait SampleSender: Send + Sync {
    fn test_started(&self);

    fn send(&self, event: SampleEvent);

    fn test_ended(&self);

    fn test_ended_host(&self, host: &str);
}

/// Log a listener failure and move on.
pub(crate) fn contain(context: &str, outcome: Result<(), ListenerError>) {
    if let Err(err) = outcome {
        warn!("Listener failed during {}: {}", context, err);
    }
}
