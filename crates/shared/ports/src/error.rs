use agora_core::{Message, MessageType, Timestamp};
use thiserror::Error;

/// Invalid or missing agent configuration; disables the agent for the run
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(String),

    #[error("Invalid value {value:?} for parameter {name}: expected {expected}")]
    InvalidValue {
        name: String,
        value: String,
        expected: String,
    },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Rejected dispatch; nothing is enqueued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Unknown recipient: {0}")]
    UnknownRecipient(String),

    #[error("Empty target expression")]
    EmptyTarget,

    #[error("Message scheduled in the past: occurrence {occurrence} < now {now}")]
    ScheduledInPast { occurrence: Timestamp, now: Timestamp },

    #[error("Delivery timestamp overflows: occurrence {occurrence} + delay {delay}")]
    TimestampOverflow { occurrence: Timestamp, delay: Timestamp },
}

pub type DispatchResult<T> = std::result::Result<T, DispatchError>;

/// Failure while an agent handles one delivery; the run continues
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    #[error("Malformed payload for {message_type}: expected {expected}, got {actual}")]
    MalformedPayload {
        message_type: MessageType,
        expected: &'static str,
        actual: &'static str,
    },

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Exchange error: {0}")]
    Exchange(String),
}

impl AgentError {
    /// Payload of `message` is not the `expected` variant
    pub fn malformed(message: &Message, expected: &'static str) -> Self {
        AgentError::MalformedPayload {
            message_type: message.message_type().clone(),
            expected,
            actual: message.payload().kind(),
        }
    }
}

pub type AgentResult<T> = std::result::Result<T, AgentError>;

/// Domain-level errors for matching configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatchingError {
    #[error("Unknown matching algorithm: {0}")]
    UnknownAlgorithm(String),
}

pub type MatchingResult<T> = std::result::Result<T, MatchingError>;
