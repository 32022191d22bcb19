//! Trade tape recorder
//!
//! Subscribes to an exchange's `EVENT_TRADE` feed and keeps every trade
//! it is told about, in delivery order.

use agora_core::{Message, MessageType, Money, ParameterMap, Payload, Trade, Volume};
use agora_ports::{
    Agent, AgentError, AgentResult, ConfigResult, OptionKind, OptionSpec, ParameterReader,
    SimulationHandle,
};
use log::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeLogConfig {
    pub exchange: String,
}

pub struct TradeLogAgent {
    name: String,
    config: Option<TradeLogConfig>,
    trades: Vec<Trade>,
}

impl TradeLogAgent {
    pub const OPTIONS: &'static [OptionSpec] = &[OptionSpec::required(
        "exchange",
        OptionKind::String,
        "exchange whose trades are recorded",
    )];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
            trades: Vec::new(),
        }
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    pub fn traded_volume(&self) -> Volume {
        self.trades.iter().map(|t| t.volume).sum()
    }

    pub fn last_price(&self) -> Option<Money> {
        self.trades.last().map(|t| t.price)
    }
}

impl Agent for TradeLogAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, params: &ParameterMap) -> ConfigResult<()> {
        let reader = ParameterReader::new(&self.name, params, Self::OPTIONS)?;
        self.config = Some(TradeLogConfig {
            exchange: reader.require_str("exchange")?,
        });
        Ok(())
    }

    fn receive_message(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        match message.message_type() {
            MessageType::SimulationStart => {
                let Some(config) = &self.config else {
                    return Ok(());
                };
                let now = sim.current_timestamp();
                sim.dispatch_message(
                    now,
                    0,
                    &self.name,
                    &config.exchange,
                    MessageType::subscribe(MessageType::EventTrade),
                    Payload::Empty,
                )?;
            }
            MessageType::EventTrade => {
                let Payload::EventTrade(trade) = message.payload() else {
                    return Err(AgentError::malformed(message, "EventTrade"));
                };
                info!(
                    "{}: t={} {} {} @ {} ({} -> {})",
                    self.name,
                    trade.timestamp,
                    trade.direction,
                    trade.volume,
                    trade.price,
                    trade.aggressing_owner,
                    trade.resting_owner
                );
                self.trades.push(trade.clone());
            }
            _ => {}
        }
        Ok(())
    }
}
