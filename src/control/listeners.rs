/// Fired once per controller iteration, before any child of that iteration
/// is visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IterationEvent {
    /// Name of the controller node starting the iteration.
    pub node: String,
    /// Completed-iteration count of that node at the time of the event.
    pub iteration: u64,
}

/// Observer of controller iteration boundaries.
///
/// Listeners are delivered in reverse registration order (registration
/// prepends), so the most recently registered, state-owning listener
/// observes the event before downstream listeners.
pub trait IterationListener: Send {
    fn iteration_start(&mut self, event: &IterationEvent);
}
