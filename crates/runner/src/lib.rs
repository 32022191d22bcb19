//! Agora Runner - Simulation Host
//!
//! Drives a set of agents through a single deterministic event queue:
//!
//! - **Context**: clock, event queue, agent directory, target resolution
//! - **Subscriptions**: `(publisher, event) -> subscribers` registry
//! - **Runtime**: per-agent configuration status and delivery
//! - **Simulation**: run loop, step mode, stop conditions, run report
//! - **Scenario**: JSON scenario files, `${name}` parameters, agent factory
//!
//! ## Architecture
//!
//! ```text
//!   scenario.json ──▶ ScenarioConfig ──▶ AgentFactory ──▶ Simulation
//!                                                            │
//!          ┌─────────────────────────────────────────────────┘
//!          ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │                      SimulationContext                        │
//! │                                                               │
//! │  ┌──────────────┐  pop (delivery, seq)  ┌─────────────────┐   │
//! │  │  EventQueue  │ ────────────────────▶ │ SimulationClock │   │
//! │  └──────▲───────┘                       └────────┬────────┘   │
//! │         │ dispatch / publish                     │ deliver    │
//! │         │                                        ▼            │
//! │  ┌──────┴───────────────┐             ┌─────────────────┐     │
//! │  │ SubscriptionRegistry │◀─SUBSCRIBE──│  AgentRuntime[] │     │
//! │  └──────────────────────┘             └─────────────────┘     │
//! └───────────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod error;
pub mod factory;
pub mod parameters;
pub mod runtime;
pub mod scenario;
pub mod simulation;
pub mod subscriptions;

// Re-export main types
pub use context::{HOST_NAME, SimulationContext};
pub use error::{Result, ScenarioError, SimulationError};
pub use factory::{AgentConstructor, AgentFactory};
pub use parameters::ParameterStore;
pub use runtime::{AgentRuntime, AgentStatus, Delivery};
pub use scenario::{AgentSpec, ScenarioConfig};
pub use simulation::{
    AgentFailure, Simulation, SimulationReport, SimulationSettings, StopReason, TraceEntry,
};
pub use subscriptions::SubscriptionRegistry;
