use agora_core::{Message, MessageType, ParameterMap};
use agora_ports::{Agent, AgentError, ConfigError};
use log::{debug, info, warn};

use crate::context::SimulationContext;

/// Lifecycle of a registered agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentStatus {
    /// Registered, not configured yet
    Registered,
    Active,
    /// Configuration failed; deliveries are dropped for the rest of the run
    Disabled(String),
}

/// Outcome of handing one message to an agent
#[derive(Debug)]
pub enum Delivery {
    Handled,
    /// The agent is not active
    Skipped,
    Failed(AgentError),
}

/// An agent plus its parameters and status
pub struct AgentRuntime {
    agent: Box<dyn Agent>,
    params: ParameterMap,
    status: AgentStatus,
    received: u64,
}

impl AgentRuntime {
    pub fn new(agent: Box<dyn Agent>, params: ParameterMap) -> Self {
        Self {
            agent,
            params,
            status: AgentStatus::Registered,
            received: 0,
        }
    }

    pub fn name(&self) -> &str {
        self.agent.name()
    }

    pub fn status(&self) -> &AgentStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == AgentStatus::Active
    }

    pub fn params(&self) -> &ParameterMap {
        &self.params
    }

    /// Active and willing to have `event` subscriptions recorded
    pub fn publishes(&self, event: &MessageType) -> bool {
        self.is_active() && self.agent.publishes(event)
    }

    /// Messages handed to the agent so far
    pub fn received(&self) -> u64 {
        self.received
    }

    /// Configure the agent; only the first call has an effect.
    pub fn configure(&mut self) -> Result<(), ConfigError> {
        if self.status != AgentStatus::Registered {
            return Ok(());
        }
        match self.agent.configure(&self.params) {
            Ok(()) => {
                info!("{} configured ({} parameter(s))", self.name(), self.params.len());
                self.status = AgentStatus::Active;
                Ok(())
            }
            Err(err) => {
                warn!("{} disabled: {}", self.name(), err);
                self.status = AgentStatus::Disabled(err.to_string());
                Err(err)
            }
        }
    }

    pub fn deliver(&mut self, ctx: &mut SimulationContext, message: &Message) -> Delivery {
        if !self.is_active() {
            debug!("{} is not active, dropping {}", self.name(), message);
            return Delivery::Skipped;
        }
        self.received += 1;
        match self.agent.receive_message(ctx, message) {
            Ok(()) => Delivery::Handled,
            Err(err) => Delivery::Failed(err),
        }
    }
}

impl std::fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("name", &self.name())
            .field("status", &self.status)
            .field("received", &self.received)
            .finish()
    }
}
