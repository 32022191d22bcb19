use std::borrow::Borrow;
use std::cmp::Reverse;
use std::hash::{Hash, Hasher};

use agora_core::{Message, Sequence, Timestamp};
use log::trace;
use priority_queue::PriorityQueue;

use crate::error::QueueError;

/// Queue entry; identity is the message's sequence number
#[derive(Debug)]
struct Queued {
    sequence: Sequence,
    message: Message,
}

impl PartialEq for Queued {
    fn eq(&self, other: &Self) -> bool {
        self.sequence == other.sequence
    }
}

impl Eq for Queued {}

impl Hash for Queued {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sequence.hash(state);
    }
}

impl Borrow<Sequence> for Queued {
    fn borrow(&self) -> &Sequence {
        &self.sequence
    }
}

/// Pending messages, earliest `(delivery, sequence)` first
///
/// `PriorityQueue` is a max-heap, so priorities are wrapped in `Reverse`.
/// Sequence numbers are unique, which makes the pop order a total order
/// independent of hashing.
#[derive(Debug, Default)]
pub struct EventQueue {
    queue: PriorityQueue<Queued, Reverse<(Timestamp, Sequence)>>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a stamped message
    pub fn schedule(&mut self, message: Message) -> Result<(), QueueError> {
        let sequence = message.sequence();
        if self.queue.get_priority(&sequence).is_some() {
            return Err(QueueError::DuplicateSequence(sequence));
        }
        let priority = Reverse((message.delivery(), sequence));
        trace!("queued {}", message);
        self.queue.push(Queued { sequence, message }, priority);
        Ok(())
    }

    /// Remove and return the earliest message
    pub fn pop_next(&mut self) -> Option<Message> {
        self.queue.pop().map(|(queued, _)| queued.message)
    }

    /// Delivery timestamp of the earliest message
    pub fn peek_delivery(&self) -> Option<Timestamp> {
        self.queue
            .peek()
            .map(|(_, Reverse((delivery, _)))| *delivery)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
