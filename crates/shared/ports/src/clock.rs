use agora_core::Timestamp;

/// Port for time abstraction
///
/// Simulation time only moves when the host pops the next event, so every
/// implementation is a pure reader from the agents' point of view.
pub trait Clock: Send + Sync {
    /// Get the current time according to this clock
    fn now(&self) -> Timestamp;

    /// Get the clock's name/identifier for debugging
    fn name(&self) -> &str {
        "Clock"
    }
}
