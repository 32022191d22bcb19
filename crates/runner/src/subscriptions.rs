use agora_core::{AgentName, MessageType};
use indexmap::{IndexMap, IndexSet};

/// `(publisher, event type)` -> subscribers, in subscription order
///
/// A subscriber appears at most once per key.
#[derive(Debug, Default)]
pub struct SubscriptionRegistry {
    entries: IndexMap<(AgentName, MessageType), IndexSet<AgentName>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` when the subscription already existed
    pub fn subscribe(&mut self, publisher: &str, event: MessageType, subscriber: &str) -> bool {
        self.entries
            .entry((publisher.to_string(), event))
            .or_default()
            .insert(subscriber.to_string())
    }

    /// Returns `false` when there was nothing to remove
    pub fn unsubscribe(&mut self, publisher: &str, event: &MessageType, subscriber: &str) -> bool {
        let key = (publisher.to_string(), event.clone());
        let Some(subscribers) = self.entries.get_mut(&key) else {
            return false;
        };
        // shift_remove keeps the remaining subscribers in order
        let removed = subscribers.shift_remove(subscriber);
        if subscribers.is_empty() {
            self.entries.shift_remove(&key);
        }
        removed
    }

    pub fn subscribers_of(&self, publisher: &str, event: &MessageType) -> Vec<AgentName> {
        self.entries
            .get(&(publisher.to_string(), event.clone()))
            .map(|subscribers| subscribers.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn is_subscribed(&self, publisher: &str, event: &MessageType, subscriber: &str) -> bool {
        self.entries
            .get(&(publisher.to_string(), event.clone()))
            .is_some_and(|subscribers| subscribers.contains(subscriber))
    }

    /// Number of `(publisher, event, subscriber)` triples
    pub fn len(&self) -> usize {
        self.entries.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
