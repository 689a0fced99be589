use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crate::sample::SampleEvent;

use super::{RemoteSampleListener, SampleSender, contain};

struct BatchState {
    buffer: Vec<SampleEvent>,
    last_flush: Instant,
}

/// Flushes the buffer as one `process_batch` delivery whenever it reaches
/// `count` records or `interval` has elapsed since the previous flush,
/// whichever happens first. `test_ended` flushes the remainder before the
/// end-of-test notification.
pub struct BatchSender {
    listener: Arc<dyn RemoteSampleListener>,
    count: usize,
    interval: Duration,
    state: Mutex<BatchState>,
}

impl BatchSender {
    #[must_use]
    pub fn new(listener: Arc<dyn RemoteSampleListener>, count: usize, interval: Duration) -> Self {
        Self {
            listener,
            count: count.max(1),
            interval,
            state: Mutex::new(BatchState {
                buffer: Vec::new(),
                last_flush: Instant::now(),
            }),
        }
    }

    /// Take the buffered records if a flush is due (or forced), resetting
    /// the interval clock. Delivery happens outside the lock.
    fn take_due(&self, force: bool) -> Vec<SampleEvent> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if state.buffer.is_empty() {
            return Vec::new();
        }
        let due =
            force || state.buffer.len() >= self.count || state.last_flush.elapsed() >= self.interval;
        if !due {
            return Vec::new();
        }
        state.last_flush = Instant::now();
        std::mem::take(&mut state.buffer)
    }

    fn flush(&self, force: bool) {
        let batch = self.take_due(force);
        if !batch.is_empty() {
            contain("batch delivery", self.listener.process_batch(&batch));
        }
    }
}

impl SampleSender for BatchSender {
    fn test_started(&self) {
        contain("test start", self.listener.test_started());
    }

    fn send(&self, event: SampleEvent) {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.buffer.push(event);
        }
        self.flush(false);
    }

    fn test_ended(&self) {
        self.flush(true);
        contain("test end", self.listener.test_ended());
    }

    fn test_ended_host(&self, host: &str) {
        self.flush(true);
        contain("test end", self.listener.test_ended_host(host));
    }
}
