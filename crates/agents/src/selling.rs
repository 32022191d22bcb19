//! Periodic Limit Seller
//!
//! On start and on every wake-up the seller:
//! - schedules its next `WAKE_UP` `interval` units ahead
//! - posts a limit sell of `quantity` at `price`
//! - asks the exchange which of its earlier orders are still resting
//!
//! Order ids come back in `RESPONSE_PLACE_ORDER_LIMIT`; remaining volumes
//! are refreshed from `RESPONSE_RETRIEVE_ORDERS`.

use std::collections::{BTreeMap, VecDeque};

use agora_core::{
    GenericPayload, Message, MessageType, Money, OrderId, ParameterMap, Payload,
    PlaceOrderLimitPayload, RetrieveOrdersPayload, Side, Timestamp, Volume,
};
use agora_ports::{
    Agent, AgentError, AgentResult, ConfigError, ConfigResult, OptionKind, OptionSpec,
    ParameterReader, SimulationHandle,
};
use log::{debug, info, warn};

/// Configuration for the seller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellingConfig {
    /// Exchange to post orders on
    pub exchange: String,
    pub price: Money,
    pub quantity: Volume,
    /// Time units between two postings
    pub interval: Timestamp,
}

impl SellingConfig {
    fn from_params(agent: &str, params: &ParameterMap) -> ConfigResult<Self> {
        let reader = ParameterReader::new(agent, params, SellingAgent::OPTIONS)?;
        let config = Self {
            exchange: reader.require_str("exchange")?,
            price: reader.require("price")?,
            quantity: reader.require("quantity")?,
            interval: reader.require("interval")?,
        };
        if config.interval == 0 {
            return Err(ConfigError::InvalidValue {
                name: "interval".to_string(),
                value: "0".to_string(),
                expected: "positive integer".to_string(),
            });
        }
        Ok(config)
    }
}

pub struct SellingAgent {
    name: String,
    config: Option<SellingConfig>,
    /// Resting order id -> last known remaining volume
    resting: BTreeMap<OrderId, Volume>,
    /// Ids sent in each outstanding `RETRIEVE_ORDERS`, oldest first
    pending_queries: VecDeque<Vec<OrderId>>,
    orders_placed: u64,
}

impl SellingAgent {
    pub const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::required("exchange", OptionKind::String, "exchange to sell on"),
        OptionSpec::required("price", OptionKind::Money, "limit price"),
        OptionSpec::required("quantity", OptionKind::Integer, "volume per order"),
        OptionSpec::required("interval", OptionKind::Integer, "time between orders"),
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
            resting: BTreeMap::new(),
            pending_queries: VecDeque::new(),
            orders_placed: 0,
        }
    }

    pub fn config(&self) -> Option<&SellingConfig> {
        self.config.as_ref()
    }

    /// Orders believed to be resting, with their remaining volume
    pub fn resting_orders(&self) -> &BTreeMap<OrderId, Volume> {
        &self.resting
    }

    pub fn resting_volume(&self) -> Volume {
        self.resting.values().sum()
    }

    pub fn orders_placed(&self) -> u64 {
        self.orders_placed
    }

    fn on_wake_up(
        &mut self,
        sim: &mut dyn SimulationHandle,
        config: &SellingConfig,
    ) -> AgentResult<()> {
        let now = sim.current_timestamp();

        sim.dispatch_generic_message(
            now,
            config.interval,
            &self.name,
            &self.name,
            MessageType::WakeUp,
            GenericPayload::new(),
        )?;
        sim.dispatch_message(
            now,
            0,
            &self.name,
            &config.exchange,
            MessageType::PlaceOrderLimit,
            Payload::PlaceOrderLimit(PlaceOrderLimitPayload {
                direction: Side::Sell,
                volume: config.quantity,
                price: config.price,
            }),
        )?;
        self.orders_placed += 1;

        if !self.resting.is_empty() {
            let ids: Vec<OrderId> = self.resting.keys().copied().collect();
            sim.dispatch_message(
                now,
                0,
                &self.name,
                &config.exchange,
                MessageType::RetrieveOrders,
                Payload::RetrieveOrders(RetrieveOrdersPayload { ids: ids.clone() }),
            )?;
            self.pending_queries.push_back(ids);
        }
        debug!(
            "{}: selling {} @ {} at t={}, {} resting",
            self.name,
            config.quantity,
            config.price,
            now,
            self.resting_volume()
        );
        Ok(())
    }

    fn on_response(&mut self, message: &Message, request: &MessageType) -> AgentResult<()> {
        match (request, message.payload()) {
            (_, Payload::Error(reason)) => {
                warn!("{}: {} failed: {}", self.name, request, reason);
                if request == &MessageType::RetrieveOrders {
                    self.pending_queries.pop_front();
                }
            }
            (MessageType::PlaceOrderLimit, Payload::PlaceOrderLimitResponse(response)) => {
                self.resting.insert(response.id, response.request.volume);
            }
            (MessageType::PlaceOrderLimit, _) => {
                return Err(AgentError::malformed(message, "PlaceOrderLimitResponse"));
            }
            (MessageType::RetrieveOrders, Payload::RetrieveOrdersResponse(response)) => {
                let queried = self.pending_queries.pop_front().unwrap_or_default();
                // Queried orders missing from the answer were filled or cancelled
                for id in queried {
                    match response.orders.iter().find(|o| o.id == id) {
                        Some(order) => {
                            self.resting.insert(id, order.volume);
                        }
                        None => {
                            self.resting.remove(&id);
                        }
                    }
                }
            }
            (MessageType::RetrieveOrders, _) => {
                return Err(AgentError::malformed(message, "RetrieveOrdersResponse"));
            }
            _ => {}
        }
        Ok(())
    }
}

impl Agent for SellingAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, params: &ParameterMap) -> ConfigResult<()> {
        let config = SellingConfig::from_params(&self.name, params)?;
        info!(
            "{}: selling {} @ {} on {} every {}",
            self.name, config.quantity, config.price, config.exchange, config.interval
        );
        self.config = Some(config);
        Ok(())
    }

    fn receive_message(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        match message.message_type() {
            MessageType::SimulationStart | MessageType::WakeUp => {
                let Some(config) = self.config.clone() else {
                    return Ok(());
                };
                self.on_wake_up(sim, &config)
            }
            MessageType::Response(request) => self.on_response(message, request),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> ParameterMap {
        ParameterMap::new()
            .with("exchange", "EX1")
            .with("price", "10.00")
            .with("quantity", 5)
            .with("interval", 20)
    }

    #[test]
    fn test_config_from_params() {
        let config = SellingConfig::from_params("SELLER", &params()).unwrap();
        assert_eq!(
            config,
            SellingConfig {
                exchange: "EX1".into(),
                price: Money::from_units(10),
                quantity: 5,
                interval: 20,
            }
        );
    }

    #[test]
    fn test_zero_interval_is_rejected() {
        let params = params().with("interval", 0);
        assert!(matches!(
            SellingConfig::from_params("SELLER", &params),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_missing_price_is_rejected() {
        let params = ParameterMap::new()
            .with("exchange", "EX1")
            .with("quantity", 5)
            .with("interval", 20);
        assert_eq!(
            SellingConfig::from_params("SELLER", &params),
            Err(ConfigError::MissingParameter("price".into()))
        );
    }
}
