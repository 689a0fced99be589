use std::sync::Arc;
use std::time::Duration;

use super::{BatchSender, HoldSender, ImmediateSender, RemoteSampleListener, SampleSender};

/// Named sender strategy selected by configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SenderPolicy {
    #[default]
    Immediate,
    Hold,
    Batch { count: usize, interval: Duration },
}

impl std::fmt::Display for SenderPolicy {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SenderPolicy::Immediate => formatter.write_str("immediate"),
            SenderPolicy::Hold => formatter.write_str("hold"),
            SenderPolicy::Batch { count, interval } => {
                write!(formatter, "batch({}, {})", count, interval.as_millis())
            }
        }
    }
}

impl std::str::FromStr for SenderPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match trimmed {
            "immediate" => return Ok(SenderPolicy::Immediate),
            "hold" => return Ok(SenderPolicy::Hold),
            _ => {}
        }

        let inner = trimmed
            .strip_prefix("batch(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| {
                "Expected 'immediate', 'hold', or 'batch(count, intervalMillis)'.".to_owned()
            })?;
        let (count_str, interval_str) = inner
            .split_once(',')
            .ok_or_else(|| "Expected batch(count, intervalMillis).".to_owned())?;
        let count: usize = count_str
            .trim()
            .parse()
            .map_err(|err| format!("Invalid batch count: {}", err))?;
        if count == 0 {
            return Err("Batch count must be >= 1.".to_owned());
        }
        let interval_ms: u64 = interval_str
            .trim()
            .parse()
            .map_err(|err| format!("Invalid batch interval: {}", err))?;
        Ok(SenderPolicy::Batch {
            count,
            interval: Duration::from_millis(interval_ms),
        })
    }
}

/// Construct the sender for a policy over the given listener.
#[must_use]
pub fn build_sender(
    policy: SenderPolicy,
    listener: Arc<dyn RemoteSampleListener>,
) -> Arc<dyn SampleSender> {
    match policy {
        SenderPolicy::Immediate => Arc::new(ImmediateSender::new(listener)),
        SenderPolicy::Hold => Arc::new(HoldSender::new(listener)),
        SenderPolicy::Batch { count, interval } => {
            Arc::new(BatchSender::new(listener, count, interval))
        }
    }
}
