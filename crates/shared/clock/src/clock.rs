use agora_core::Timestamp;
use agora_ports::Clock;

use crate::error::ClockError;

/// Discrete simulation clock
///
/// Starts at `start` and only moves forward, to the delivery time of the
/// message being processed.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    start: Timestamp,
    current: Timestamp,
    duration: Option<Timestamp>,
}

impl SimulationClock {
    /// `duration: None` means the run has no time horizon
    pub fn new(start: Timestamp, duration: Option<Timestamp>) -> Self {
        Self {
            start,
            current: start,
            duration,
        }
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn current(&self) -> Timestamp {
        self.current
    }

    pub fn duration(&self) -> Option<Timestamp> {
        self.duration
    }

    /// Exclusive end of the run: events at or after it are never delivered
    pub fn horizon(&self) -> Option<Timestamp> {
        self.duration
            .map(|duration| self.start.saturating_add(duration))
    }

    /// Move to `timestamp`; staying put is allowed, going back is not.
    pub fn advance_to(&mut self, timestamp: Timestamp) -> Result<(), ClockError> {
        if timestamp < self.current {
            return Err(ClockError::Backwards {
                current: self.current,
                requested: timestamp,
            });
        }
        self.current = timestamp;
        Ok(())
    }
}

impl Clock for SimulationClock {
    fn now(&self) -> Timestamp {
        self.current
    }

    fn name(&self) -> &str {
        "SimulationClock"
    }
}
