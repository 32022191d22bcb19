use agora_clock::{ClockError, EventQueue, QueueError, SimulationClock};
use agora_core::{AgentName, Message, MessageType, Payload, Sequence, Timestamp};
use agora_ports::{DispatchError, DispatchResult, SimulationHandle};
use indexmap::IndexSet;
use log::{debug, error, warn};

use crate::subscriptions::SubscriptionRegistry;

/// Name the host uses as the source of `START`/`STOP` and as an
/// addressable sink for messages nobody handles.
pub const HOST_NAME: &str = "SIMULATION";

/// Dispatcher state shared by every delivery
///
/// Owns the clock, the pending-message queue, the agent directory (in
/// registration order) and the subscription registry. Agents only see it
/// through [`SimulationHandle`].
#[derive(Debug)]
pub struct SimulationContext {
    clock: SimulationClock,
    queue: EventQueue,
    registry: SubscriptionRegistry,
    directory: IndexSet<AgentName>,
    next_sequence: Sequence,
    fault: Option<QueueError>,
}

impl SimulationContext {
    pub fn new(start: Timestamp, duration: Option<Timestamp>) -> Self {
        Self {
            clock: SimulationClock::new(start, duration),
            queue: EventQueue::new(),
            registry: SubscriptionRegistry::new(),
            directory: IndexSet::new(),
            next_sequence: 0,
            fault: None,
        }
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut SubscriptionRegistry {
        &mut self.registry
    }

    /// Number of messages waiting for delivery
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Agent names in registration order
    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.directory.iter().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.directory.contains(name)
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.directory.get_index_of(name)
    }

    /// Returns `false` if the name is taken
    pub(crate) fn register_name(&mut self, name: &str) -> bool {
        self.directory.insert(name.to_string())
    }

    /// Expand a target expression into recipient names.
    ///
    /// `*` is every agent, `PREFIX*` every agent whose name starts with
    /// `PREFIX`, and `a|b` the union of the parts, each in registration
    /// order. The host name is accepted as a plain name. Any unknown plain
    /// name fails the whole expression.
    pub fn resolve_targets(&self, target: &str) -> DispatchResult<Vec<AgentName>> {
        if target.trim().is_empty() {
            return Err(DispatchError::EmptyTarget);
        }
        let mut recipients = Vec::new();
        for part in target.split('|').map(str::trim) {
            if part.is_empty() {
                return Err(DispatchError::EmptyTarget);
            }
            if let Some(prefix) = part.strip_suffix('*') {
                recipients.extend(
                    self.directory
                        .iter()
                        .filter(|name| name.starts_with(prefix))
                        .cloned(),
                );
            } else if part == HOST_NAME || self.directory.contains(part) {
                recipients.push(part.to_string());
            } else {
                return Err(DispatchError::UnknownRecipient(part.to_string()));
            }
        }
        Ok(recipients)
    }

    /// Host-originated message to every agent at the current time
    pub fn broadcast(
        &mut self,
        message_type: MessageType,
        payload: Payload,
    ) -> DispatchResult<Vec<Sequence>> {
        let now = self.clock.current();
        self.dispatch_message(now, 0, HOST_NAME, "*", message_type, payload)
    }

    pub(crate) fn peek_delivery(&self) -> Option<Timestamp> {
        self.queue.peek_delivery()
    }

    /// Pop the earliest message and move the clock to its delivery time
    pub(crate) fn pop_next(&mut self) -> Result<Option<Message>, ClockError> {
        let Some(message) = self.queue.pop_next() else {
            return Ok(None);
        };
        self.clock.advance_to(message.delivery())?;
        Ok(Some(message))
    }

    /// Queue corruption noticed while enqueueing; ends the run
    pub(crate) fn take_fault(&mut self) -> Option<QueueError> {
        self.fault.take()
    }

    fn try_dispatch(
        &mut self,
        occurrence: Timestamp,
        delay: Timestamp,
        source: &str,
        target: &str,
        message_type: MessageType,
        payload: Payload,
    ) -> DispatchResult<Vec<Sequence>> {
        let now = self.clock.current();
        if occurrence < now {
            return Err(DispatchError::ScheduledInPast { occurrence, now });
        }
        let delivery = occurrence
            .checked_add(delay)
            .ok_or(DispatchError::TimestampOverflow { occurrence, delay })?;
        let recipients = self.resolve_targets(target)?;

        let mut sequences = Vec::with_capacity(recipients.len());
        for recipient in recipients {
            let sequence = self.next_sequence;
            self.next_sequence += 1;
            let message = Message::new(
                occurrence,
                delivery,
                sequence,
                source,
                recipient,
                message_type.clone(),
                payload.clone(),
            );
            if let Err(err) = self.queue.schedule(message) {
                error!("event queue rejected message #{}: {}", sequence, err);
                self.fault.get_or_insert(err);
            }
            sequences.push(sequence);
        }
        Ok(sequences)
    }
}

impl SimulationHandle for SimulationContext {
    fn current_timestamp(&self) -> Timestamp {
        self.clock.current()
    }

    fn dispatch_message(
        &mut self,
        occurrence: Timestamp,
        delay: Timestamp,
        source: &str,
        target: &str,
        message_type: MessageType,
        payload: Payload,
    ) -> DispatchResult<Vec<Sequence>> {
        self.try_dispatch(occurrence, delay, source, target, message_type.clone(), payload)
            .inspect_err(|err| {
                warn!(
                    "{} -> {:?} {} not dispatched: {}",
                    source, target, message_type, err
                )
            })
    }

    fn publish(
        &mut self,
        source: &str,
        event_type: MessageType,
        payload: Payload,
        delay: Timestamp,
    ) -> DispatchResult<Vec<Sequence>> {
        let now = self.clock.current();
        let subscribers = self.registry.subscribers_of(source, &event_type);
        debug!(
            "{} publishes {} to {} subscriber(s)",
            source,
            event_type,
            subscribers.len()
        );

        let mut sequences = Vec::with_capacity(subscribers.len());
        for subscriber in subscribers {
            // A subscriber that cannot be reached does not stop the fan-out
            match self.dispatch_message(
                now,
                delay,
                source,
                &subscriber,
                event_type.clone(),
                payload.clone(),
            ) {
                Ok(assigned) => sequences.extend(assigned),
                Err(DispatchError::UnknownRecipient(_)) => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(sequences)
    }
}
