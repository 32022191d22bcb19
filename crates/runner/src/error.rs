use agora_clock::{ClockError, QueueError};
use agora_ports::DispatchError;
use thiserror::Error;

/// Failures that end a run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    #[error("Agent already registered: {0}")]
    DuplicateAgent(String),

    #[error("Agent name is reserved for the host: {0}")]
    ReservedName(String),

    #[error("Agents cannot be registered once the simulation has started")]
    AlreadyStarted,

    #[error("Event queue corrupted: {0}")]
    Queue(#[from] QueueError),

    #[error("Clock error: {0}")]
    Clock(#[from] ClockError),

    #[error("Host dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

/// Failures while loading or building a scenario
#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("Cannot read scenario {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown parameter referenced: ${{{0}}}")]
    UnknownParameter(String),

    #[error("Unterminated parameter reference in {0:?}")]
    UnterminatedReference(String),

    #[error("Invalid parameter assignment {0:?}: expected name=value")]
    InvalidAssignment(String),

    #[error("Parameter {name} of agent {agent} must be a string, number or boolean")]
    InvalidParameterValue { agent: String, name: String },

    #[error("Unknown agent kind: {0}")]
    UnknownAgentKind(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),
}
