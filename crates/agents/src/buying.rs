//! Reactive Market Buyer
//!
//! Subscribes to the exchange's `EVENT_ORDER_LIMIT` feed at start and
//! answers every new limit order with a market buy of `quantity`, sent at
//! the same timestamp.

use agora_core::{
    Message, MessageType, ParameterMap, Payload, PlaceOrderMarketPayload, Side, Volume,
};
use agora_ports::{
    Agent, AgentResult, ConfigResult, OptionKind, OptionSpec, ParameterReader, SimulationHandle,
};
use log::{debug, info, warn};

/// Configuration for the buyer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuyingConfig {
    pub exchange: String,
    /// Market order volume per observed limit order
    pub quantity: Volume,
}

impl BuyingConfig {
    fn from_params(agent: &str, params: &ParameterMap) -> ConfigResult<Self> {
        let reader = ParameterReader::new(agent, params, BuyingAgent::OPTIONS)?;
        Ok(Self {
            exchange: reader.require_str("exchange")?,
            quantity: reader.require("quantity")?,
        })
    }
}

pub struct BuyingAgent {
    name: String,
    config: Option<BuyingConfig>,
    orders_sent: u64,
    /// Volume actually bought, from market order responses
    bought: Volume,
}

impl BuyingAgent {
    pub const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::required("exchange", OptionKind::String, "exchange to watch and buy on"),
        OptionSpec::required("quantity", OptionKind::Integer, "volume per market order"),
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
            orders_sent: 0,
            bought: 0,
        }
    }

    pub fn config(&self) -> Option<&BuyingConfig> {
        self.config.as_ref()
    }

    pub fn orders_sent(&self) -> u64 {
        self.orders_sent
    }

    pub fn bought(&self) -> Volume {
        self.bought
    }
}

impl Agent for BuyingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, params: &ParameterMap) -> ConfigResult<()> {
        let config = BuyingConfig::from_params(&self.name, params)?;
        info!(
            "{}: buying {} on every limit order at {}",
            self.name, config.quantity, config.exchange
        );
        self.config = Some(config);
        Ok(())
    }

    fn receive_message(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let Some(config) = &self.config else {
            return Ok(());
        };
        let now = sim.current_timestamp();

        match message.message_type() {
            MessageType::SimulationStart => {
                sim.dispatch_message(
                    now,
                    0,
                    &self.name,
                    &config.exchange,
                    MessageType::subscribe(MessageType::EventOrderLimit),
                    Payload::Empty,
                )?;
            }
            MessageType::EventOrderLimit => {
                sim.dispatch_message(
                    now,
                    0,
                    &self.name,
                    &config.exchange,
                    MessageType::PlaceOrderMarket,
                    Payload::PlaceOrderMarket(PlaceOrderMarketPayload {
                        direction: Side::Buy,
                        volume: config.quantity,
                    }),
                )?;
                self.orders_sent += 1;
                debug!("{}: market buy {} at t={}", self.name, config.quantity, now);
            }
            MessageType::Response(_) => match message.payload() {
                Payload::PlaceOrderMarketResponse(response) => self.bought += response.filled,
                Payload::Error(reason) => warn!("{}: {} failed: {}", self.name, message.message_type(), reason),
                _ => {}
            },
            _ => {}
        }
        Ok(())
    }
}
