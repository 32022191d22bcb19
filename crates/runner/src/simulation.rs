//! Simulation - run loop over the event queue
//!
//! Lifecycle:
//! - agents are registered (names must be unique)
//! - every agent is configured once, in registration order; a failure
//!   disables that agent only
//! - `SIMULATION_START` is broadcast at the start time and, with a
//!   duration, `SIMULATION_STOP` at `start + duration - 1`
//! - messages are delivered one at a time in `(delivery, sequence)` order
//!   until the queue empties, the horizon is reached or the event limit hits

use agora_core::{
    AgentName, Message, MessageType, ParameterMap, Payload, Sequence, Timestamp,
};
use agora_ports::{Agent, AgentError, SimulationHandle};
use log::{debug, info, warn};

use crate::context::{HOST_NAME, SimulationContext};
use crate::error::{Result, SimulationError};
use crate::runtime::{AgentRuntime, AgentStatus, Delivery};

/// Run settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationSettings {
    pub start: Timestamp,
    /// `None` runs until the queue is exhausted
    pub duration: Option<Timestamp>,
    /// Stop after this many processed messages
    pub max_events: Option<u64>,
    /// Keep a [`TraceEntry`] per processed message
    pub record_trace: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            start: 0,
            duration: None,
            max_events: None,
            record_trace: true,
        }
    }
}

/// Why a run (or a step) returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QueueExhausted,
    /// Next message is at or after `start + duration`
    TimeHorizon,
    EventLimit,
    /// The step window elapsed before the horizon; the run can continue
    Paused,
}

/// One processed message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub delivery: Timestamp,
    pub sequence: Sequence,
    pub source: AgentName,
    pub target: AgentName,
    pub message_type: MessageType,
}

impl From<&Message> for TraceEntry {
    fn from(message: &Message) -> Self {
        Self {
            delivery: message.delivery(),
            sequence: message.sequence(),
            source: message.source().to_string(),
            target: message.target().to_string(),
            message_type: message.message_type().clone(),
        }
    }
}

/// An error returned by an agent's handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentFailure {
    pub agent: AgentName,
    pub delivery: Timestamp,
    pub message_type: MessageType,
    pub error: AgentError,
}

/// Summary of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationReport {
    pub stop_reason: StopReason,
    pub final_timestamp: Timestamp,
    /// Messages handed to an agent or absorbed by the host
    pub events_delivered: u64,
    /// Messages addressed to a disabled agent
    pub events_dropped: u64,
    /// Messages still queued when the run returned
    pub events_pending: usize,
    pub agent_errors: Vec<AgentFailure>,
    pub disabled_agents: Vec<(AgentName, String)>,
    pub trace: Vec<TraceEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Setup,
    Running,
}

/// The simulation host
///
/// ```text
///   register ──▶ configure ──▶ START ──▶ [ pop ─▶ advance clock ─▶ deliver ]* ──▶ report
/// ```
#[derive(Debug)]
pub struct Simulation {
    settings: SimulationSettings,
    ctx: SimulationContext,
    /// Same order as the context's directory
    runtimes: Vec<AgentRuntime>,
    phase: Phase,
    /// End of the last `step` window
    stepped_to: Timestamp,
    events_delivered: u64,
    events_dropped: u64,
    agent_errors: Vec<AgentFailure>,
    trace: Vec<TraceEntry>,
}

impl Simulation {
    pub fn new(settings: SimulationSettings) -> Self {
        let ctx = SimulationContext::new(settings.start, settings.duration);
        Self {
            stepped_to: settings.start,
            settings,
            ctx,
            runtimes: Vec::new(),
            phase: Phase::Setup,
            events_delivered: 0,
            events_dropped: 0,
            agent_errors: Vec::new(),
            trace: Vec::new(),
        }
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn context(&self) -> &SimulationContext {
        &self.ctx
    }

    /// Direct dispatcher access, e.g. to inject messages before a run
    pub fn context_mut(&mut self) -> &mut SimulationContext {
        &mut self.ctx
    }

    pub fn current_timestamp(&self) -> Timestamp {
        self.ctx.current_timestamp()
    }

    /// Add an agent with its parameters; names are unique.
    pub fn register(&mut self, agent: Box<dyn Agent>, params: ParameterMap) -> Result<()> {
        if self.phase != Phase::Setup {
            return Err(SimulationError::AlreadyStarted);
        }
        let name = agent.name().to_string();
        if name == HOST_NAME {
            return Err(SimulationError::ReservedName(name));
        }
        if !self.ctx.register_name(&name) {
            return Err(SimulationError::DuplicateAgent(name));
        }
        debug!("registered {}", name);
        self.runtimes.push(AgentRuntime::new(agent, params));
        Ok(())
    }

    pub fn agent_names(&self) -> impl Iterator<Item = &str> {
        self.ctx.agent_names()
    }

    pub fn agent_status(&self, name: &str) -> Option<&AgentStatus> {
        self.ctx
            .index_of(name)
            .map(|index| self.runtimes[index].status())
    }

    /// Configure agents and queue `START` (and `STOP`). Idempotent.
    pub fn start(&mut self) -> Result<()> {
        if self.phase != Phase::Setup {
            return Ok(());
        }
        self.phase = Phase::Running;

        for runtime in &mut self.runtimes {
            // Failures are recorded in the runtime status
            let _ = runtime.configure();
        }

        let start = self.settings.start;
        info!(
            "starting simulation at t={} with {} agent(s), duration {:?}",
            start,
            self.runtimes.len(),
            self.settings.duration
        );
        self.ctx
            .broadcast(MessageType::SimulationStart, Payload::Empty)?;
        if let Some(duration) = self.settings.duration.filter(|d| *d > 0) {
            self.ctx.dispatch_message(
                start,
                duration - 1,
                HOST_NAME,
                "*",
                MessageType::SimulationStop,
                Payload::Empty,
            )?;
        }
        self.check_queue()
    }

    /// Run to completion
    pub fn run(&mut self) -> Result<SimulationReport> {
        self.start()?;
        let reason = self.drain(self.ctx.clock().horizon())?;
        info!(
            "simulation stopped ({:?}) at t={} after {} event(s)",
            reason,
            self.ctx.current_timestamp(),
            self.events_delivered + self.events_dropped
        );
        Ok(self.report(reason))
    }

    /// Deliver messages due in the next `how_much` time units, then pause.
    pub fn step(&mut self, how_much: Timestamp) -> Result<SimulationReport> {
        self.start()?;
        let from = self.stepped_to.max(self.ctx.current_timestamp());
        let window_end = from.saturating_add(how_much);
        self.stepped_to = window_end;

        let horizon = self.ctx.clock().horizon();
        let cutoff = horizon.map_or(window_end, |horizon| horizon.min(window_end));
        let reason = match self.drain(Some(cutoff))? {
            StopReason::TimeHorizon if horizon != Some(cutoff) => StopReason::Paused,
            other => other,
        };
        Ok(self.report(reason))
    }

    fn drain(&mut self, cutoff: Option<Timestamp>) -> Result<StopReason> {
        loop {
            if let Some(limit) = self.settings.max_events {
                if self.events_delivered + self.events_dropped >= limit {
                    return Ok(StopReason::EventLimit);
                }
            }
            let Some(next) = self.ctx.peek_delivery() else {
                return Ok(StopReason::QueueExhausted);
            };
            if cutoff.is_some_and(|cutoff| next >= cutoff) {
                return Ok(StopReason::TimeHorizon);
            }
            let Some(message) = self.ctx.pop_next()? else {
                return Ok(StopReason::QueueExhausted);
            };
            self.deliver(message);
            self.check_queue()?;
        }
    }

    fn check_queue(&mut self) -> Result<()> {
        match self.ctx.take_fault() {
            Some(fault) => Err(fault.into()),
            None => Ok(()),
        }
    }

    fn deliver(&mut self, message: Message) {
        if self.settings.record_trace {
            self.trace.push(TraceEntry::from(&message));
        }

        if let Some(event) = message.message_type().subscribed_event() {
            if message.target() == HOST_NAME {
                self.refuse(&message, format!("{event} is not published by {HOST_NAME}"));
                return;
            }
            let recorded = self
                .ctx
                .index_of(message.target())
                .is_some_and(|index| self.runtimes[index].publishes(event));
            if recorded
                && !self.ctx.registry_mut().subscribe(
                    message.target(),
                    event.clone(),
                    message.source(),
                )
            {
                debug!(
                    "{} already subscribed to {} of {}",
                    message.source(),
                    event,
                    message.target()
                );
                // The publisher is not bothered with duplicates
                self.refuse(&message, "already subscribed".to_string());
                return;
            }
        }

        if message.target() == HOST_NAME {
            debug!("host absorbed {}", message);
            self.events_delivered += 1;
            return;
        }

        let Some(index) = self.ctx.index_of(message.target()) else {
            warn!("no agent named {}, dropping {}", message.target(), message);
            self.events_dropped += 1;
            return;
        };
        match self.runtimes[index].deliver(&mut self.ctx, &message) {
            Delivery::Handled => self.events_delivered += 1,
            Delivery::Skipped => self.events_dropped += 1,
            Delivery::Failed(error) => {
                warn!("{} failed on {}: {}", message.target(), message, error);
                self.events_delivered += 1;
                self.agent_errors.push(AgentFailure {
                    agent: message.target().to_string(),
                    delivery: message.delivery(),
                    message_type: message.message_type().clone(),
                    error,
                });
            }
        }
    }

    /// Answer a subscription on the target's behalf without delivering it
    fn refuse(&mut self, message: &Message, reason: String) {
        if let Err(err) = self
            .ctx
            .fast_respond(message.target(), message, Payload::Error(reason))
        {
            warn!("cannot answer {}: {}", message, err);
        }
        self.events_delivered += 1;
    }

    fn report(&self, stop_reason: StopReason) -> SimulationReport {
        let disabled_agents = self
            .runtimes
            .iter()
            .filter_map(|runtime| match runtime.status() {
                AgentStatus::Disabled(reason) => Some((runtime.name().to_string(), reason.clone())),
                _ => None,
            })
            .collect();
        SimulationReport {
            stop_reason,
            final_timestamp: self.ctx.current_timestamp(),
            events_delivered: self.events_delivered,
            events_dropped: self.events_dropped,
            events_pending: self.ctx.pending(),
            agent_errors: self.agent_errors.clone(),
            disabled_agents,
            trace: self.trace.clone(),
        }
    }
}
