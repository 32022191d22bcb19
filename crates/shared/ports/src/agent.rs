use agora_core::{
    GenericPayload, Message, MessageType, ParameterMap, Payload, Sequence, Timestamp,
};

use crate::error::{AgentResult, ConfigResult, DispatchError, DispatchResult};

/// Plugin contract implemented by every simulated participant
///
/// An agent is configured exactly once before the first delivery, then
/// receives messages one at a time. It never blocks: to wait, it schedules
/// a `WAKE_UP` to itself.
pub trait Agent {
    /// Unique, stable name used for addressing
    fn name(&self) -> &str;

    /// Read the agent's parameters. An error disables the agent for the run.
    fn configure(&mut self, params: &ParameterMap) -> ConfigResult<()>;

    /// Handle one delivered message. Types the agent does not care about
    /// must be ignored, not reported as errors.
    fn receive_message(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()>;

    /// Whether the host should record subscriptions to `event` on this
    /// agent. Subscriptions to anything else are still delivered, but the
    /// host keeps no subscriber list for them.
    fn publishes(&self, _event: &MessageType) -> bool {
        true
    }
}

/// Host services available to an agent during a delivery
pub trait SimulationHandle {
    /// Delivery time of the message being handled
    fn current_timestamp(&self) -> Timestamp;

    /// Enqueue a message for delivery at `occurrence + delay`.
    ///
    /// `target` is an agent name, `"*"` (every agent), `"PREFIX*"` or a
    /// `|`-separated list. One message per resolved recipient is stamped
    /// with the next sequence number; the assigned numbers are returned.
    fn dispatch_message(
        &mut self,
        occurrence: Timestamp,
        delay: Timestamp,
        source: &str,
        target: &str,
        message_type: MessageType,
        payload: Payload,
    ) -> DispatchResult<Vec<Sequence>>;

    /// Same contract as [`dispatch_message`](Self::dispatch_message) with an
    /// untyped payload; used for `WAKE_UP`.
    fn dispatch_generic_message(
        &mut self,
        occurrence: Timestamp,
        delay: Timestamp,
        source: &str,
        target: &str,
        message_type: MessageType,
        payload: GenericPayload,
    ) -> DispatchResult<Vec<Sequence>> {
        self.dispatch_message(
            occurrence,
            delay,
            source,
            target,
            message_type,
            Payload::Generic(payload),
        )
    }

    /// Fan an event out to every subscriber of `(source, event_type)`, in
    /// subscription order, at the current timestamp plus `delay`.
    fn publish(
        &mut self,
        source: &str,
        event_type: MessageType,
        payload: Payload,
        delay: Timestamp,
    ) -> DispatchResult<Vec<Sequence>>;

    /// Answer `request` with `RESPONSE_<TYPE>`.
    ///
    /// The reply leaves `processing_delay` after the request arrived and
    /// travels back with the request's own latency.
    fn respond(
        &mut self,
        responder: &str,
        request: &Message,
        payload: Payload,
        processing_delay: Timestamp,
    ) -> DispatchResult<Vec<Sequence>> {
        let occurrence = request
            .delivery()
            .checked_add(processing_delay)
            .ok_or(DispatchError::TimestampOverflow {
                occurrence: request.delivery(),
                delay: processing_delay,
            })?;
        self.dispatch_message(
            occurrence,
            request.delay(),
            responder,
            request.source(),
            request.message_type().response_type(),
            payload,
        )
    }

    /// Answer `request` immediately, with zero latency
    fn fast_respond(
        &mut self,
        responder: &str,
        request: &Message,
        payload: Payload,
    ) -> DispatchResult<Vec<Sequence>> {
        let now = self.current_timestamp();
        self.dispatch_message(
            now,
            0,
            responder,
            request.source(),
            request.message_type().response_type(),
            payload,
        )
    }
}
