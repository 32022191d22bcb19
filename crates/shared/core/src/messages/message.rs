use std::fmt;

use serde::{Deserialize, Serialize};

use super::{MessageType, Payload};
use crate::values::{AgentName, Sequence, Timestamp};

/// Envelope delivered by the host.
///
/// Built once by the dispatcher and immutable afterwards; agents only
/// ever see it by shared reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    occurrence: Timestamp,
    delivery: Timestamp,
    sequence: Sequence,
    source: AgentName,
    target: AgentName,
    message_type: MessageType,
    payload: Payload,
}

impl Message {
    pub fn new(
        occurrence: Timestamp,
        delivery: Timestamp,
        sequence: Sequence,
        source: impl Into<AgentName>,
        target: impl Into<AgentName>,
        message_type: MessageType,
        payload: Payload,
    ) -> Self {
        Self {
            occurrence,
            delivery,
            sequence,
            source: source.into(),
            target: target.into(),
            message_type,
            payload,
        }
    }

    /// Time at which the sender dispatched the message
    pub fn occurrence(&self) -> Timestamp {
        self.occurrence
    }

    /// Time at which the message is delivered (occurrence + delay)
    pub fn delivery(&self) -> Timestamp {
        self.delivery
    }

    pub fn sequence(&self) -> Sequence {
        self.sequence
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn message_type(&self) -> &MessageType {
        &self.message_type
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Latency between dispatch and delivery
    pub fn delay(&self) -> Timestamp {
        self.delivery - self.occurrence
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[t={} #{}] {} -> {} {} ({})",
            self.delivery,
            self.sequence,
            self.source,
            self.target,
            self.message_type,
            self.payload.kind()
        )
    }
}
