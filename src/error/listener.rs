use thiserror::Error;

/// Failure raised by a remote sample listener while accepting a delivery.
///
/// Senders catch and log these; they never reach a producer task.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ListenerError {
    pub message: String,
}

impl ListenerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
