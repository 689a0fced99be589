/// Immutable measurement of one unit of work.
///
/// Created by leaf execution (or by a transaction controller for its
/// synthetic aggregate) and owned by the distribution pipeline until every
/// sink has seen it. A failed execution is a record with `success = false`,
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleResult {
    pub label: String,
    pub success: bool,
    pub elapsed_ms: u64,
    pub start_timestamp_ms: i64,
    pub message: Option<String>,
}

impl SampleResult {
    #[must_use]
    pub fn new(label: impl Into<String>, success: bool, elapsed_ms: u64) -> Self {
        Self {
            label: label.into(),
            success,
            elapsed_ms,
            start_timestamp_ms: chrono::Utc::now().timestamp_millis(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A sample record paired with its producing task and host label, as handed
/// to the distribution pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEvent {
    pub result: SampleResult,
    pub thread_name: String,
    pub host: String,
}

impl SampleEvent {
    #[must_use]
    pub fn new(result: SampleResult, thread_name: impl Into<String>, host: impl Into<String>) -> Self {
        Self {
            result,
            thread_name: thread_name.into(),
            host: host.into(),
        }
    }
}
