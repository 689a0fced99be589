use std::sync::{Arc, Mutex, PoisonError};

use crate::sample::SampleEvent;

use super::{RemoteSampleListener, SampleSender, contain};

/// Buffers every sample until the end of the test, then delivers the whole
/// backlog in FIFO order. Lowest network overhead, highest memory use.
///
/// Safe for concurrent producers; `test_ended` drains atomically, so every
/// record buffered at that point is delivered exactly once before the
/// end-of-test notification goes out.
pub struct HoldSender {
    listener: Arc<dyn RemoteSampleListener>,
    buffer: Mutex<Vec<SampleEvent>>,
}

impl HoldSender {
    #[must_use]
    pub fn new(listener: Arc<dyn RemoteSampleListener>) -> Self {
        Self {
            listener,
            buffer: Mutex::new(Vec::new()),
        }
    }

    fn drain(&self) -> Vec<SampleEvent> {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *buffer)
    }

    fn deliver_backlog(&self) {
        for event in self.drain() {
            contain("held sample delivery", self.listener.sample_occurred(&event));
        }
    }
}

impl SampleSender for HoldSender {
    fn test_started(&self) {
        contain("test start", self.listener.test_started());
    }

    fn send(&self, event: SampleEvent) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        buffer.push(event);
    }

    fn test_ended(&self) {
        self.deliver_backlog();
        contain("test end", self.listener.test_ended());
    }

    fn test_ended_host(&self, host: &str) {
        self.deliver_backlog();
        contain("test end", self.listener.test_ended_host(host));
    }
}
