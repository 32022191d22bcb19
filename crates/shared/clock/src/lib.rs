//! Agora Clock Infrastructure
//!
//! Simulation time and the pending-event queue:
//!
//! ```text
//!   dispatch ──▶ EventQueue (min by (delivery, sequence)) ──pop_next──▶ deliver
//!                                                            │
//!                                        SimulationClock::advance_to(delivery)
//! ```
//!
//! Time never flows on its own: the controller advances the clock to the
//! delivery timestamp of each popped message, so two runs over the same
//! inputs see exactly the same timeline.

mod clock;
mod error;
mod queue;

pub use clock::SimulationClock;
pub use error::{ClockError, QueueError};
pub use queue::EventQueue;

// Re-export the Clock trait for convenience
pub use agora_ports::Clock;
