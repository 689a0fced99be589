use std::sync::Arc;

use crate::sample::SampleEvent;

use super::{RemoteSampleListener, SampleSender, contain};

/// Forwards every sample synchronously. No buffering, lowest latency,
/// highest per-sample overhead.
pub struct ImmediateSender {
    listener: Arc<dyn RemoteSampleListener>,
}

impl ImmediateSender {
    #[must_use]
    pub fn new(listener: Arc<dyn RemoteSampleListener>) -> Self {
        Self { listener }
    }
}

impl SampleSender for ImmediateSender {
    fn test_started(&self) {
        contain("test start", self.listener.test_started());
    }

    fn send(&self, event: SampleEvent) {
        contain("sample delivery", self.listener.sample_occurred(&event));
    }

    fn test_ended(&self) {
        contain("test end", self.listener.test_ended());
    }

    fn test_ended_host(&self, host: &str) {
        contain("test end", self.listener.test_ended_host(host));
    }
}
