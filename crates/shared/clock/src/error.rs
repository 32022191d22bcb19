use agora_core::{Sequence, Timestamp};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("Sequence number {0} is already queued")]
    DuplicateSequence(Sequence),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClockError {
    #[error("Clock cannot move backwards: {current} -> {requested}")]
    Backwards {
        current: Timestamp,
        requested: Timestamp,
    },
}
