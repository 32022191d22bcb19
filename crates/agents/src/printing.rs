//! Logs its configuration and every message it receives.

use agora_core::{Message, ParameterMap};
use agora_ports::{Agent, AgentResult, ConfigResult, SimulationHandle};
use log::info;

pub struct PrintingAgent {
    name: String,
    received: u64,
}

impl PrintingAgent {
    /// Accepts any parameter; they are only printed
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            received: 0,
        }
    }

    pub fn received(&self) -> u64 {
        self.received
    }
}

impl Agent for PrintingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, params: &ParameterMap) -> ConfigResult<()> {
        info!("{}: configured with {} parameter(s)", self.name, params.len());
        for (key, value) in params.iter() {
            info!("{}:   {} = {}", self.name, key, value);
        }
        Ok(())
    }

    fn receive_message(
        &mut self,
        _sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        self.received += 1;
        let payload = serde_json::to_string(message.payload())
            .unwrap_or_else(|err| format!("<unprintable payload: {err}>"));
        info!("{}: {} {}", self.name, message, payload);
        Ok(())
    }
}
