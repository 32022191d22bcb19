//! Agora Ports
//!
//! Port definitions (traits) for the Agora simulation host.
//! These define the boundaries between the host, its agents and the
//! matching engine.
//!
//! ```text
//!            receive_message(&mut dyn SimulationHandle, &Message)
//!   host ───────────────────────────────────────────────────────▶ Agent
//!    ▲                                                              │
//!    └──────────── dispatch_message / publish / respond ────────────┘
//! ```

mod agent;
mod clock;
mod config;
mod error;
mod matching;

pub use agent::{Agent, SimulationHandle};
pub use clock::Clock;
pub use config::{OptionKind, OptionSpec, ParameterReader};
pub use error::{
    AgentError, AgentResult, ConfigError, ConfigResult, DispatchError, DispatchResult,
    MatchingError, MatchingResult,
};
pub use matching::{Fill, MatchingAlgorithm};
