use std::collections::HashMap;

use agora_core::{
    AgentName, CancelOrdersResponsePayload, EventOrderLimitPayload, EventOrderMarketPayload,
    Message, MessageType, OrderId, ParameterMap, Payload, PlaceOrderLimitResponsePayload,
    PlaceOrderMarketResponsePayload, RetrieveBookResponsePayload, RetrieveOrdersResponsePayload,
};
use agora_matching::{ALGORITHM_NAMES, create_matching_algorithm};
use indexmap::IndexSet;
use agora_ports::{
    Agent, AgentError, AgentResult, ConfigError, ConfigResult, OptionKind, OptionSpec,
    ParameterReader, SimulationHandle,
};
use log::{debug, info, warn};

use crate::error::{ExchangeError, Result};
use crate::infrastructure::OrderBook;
use crate::model::{ExchangeState, Side, Timestamp, Trade};

const UNRECOGNIZED_REQUEST: &str = "unrecognized request type";

/// Message-driven exchange around a single order book
///
/// Requests are answered with `RESPONSE_<TYPE>` to their sender; order
/// and trade events are published to the subscribers registered with the
/// host for this exchange's name. Trades of a single order can be followed
/// with `SUBSCRIBE_EVENT_ORDER_TRADE`; those subscriptions live here.
pub struct ExchangeAgent {
    name: String,
    book: OrderBook,
    /// Delay applied to order handling responses and published events
    processing_delay: Timestamp,
    state: ExchangeState,
    /// Order id -> agents following its trades, in subscription order
    order_trade_subscribers: HashMap<OrderId, IndexSet<AgentName>>,
}

impl ExchangeAgent {
    pub const OPTIONS: &'static [OptionSpec] = &[
        OptionSpec::optional(
            "algorithm",
            OptionKind::Choice(ALGORITHM_NAMES),
            "level allocation algorithm (default PriceTime)",
        ),
        OptionSpec::optional(
            "processingDelay",
            OptionKind::Integer,
            "time units between a request and its response (default 0)",
        ),
    ];

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            book: OrderBook::new(),
            processing_delay: 0,
            state: ExchangeState::Idle,
            order_trade_subscribers: HashMap::new(),
        }
    }

    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn state(&self) -> ExchangeState {
        self.state
    }

    pub fn processing_delay(&self) -> Timestamp {
        self.processing_delay
    }

    /// Agents following the trades of `order_id`
    pub fn order_trade_subscribers(&self, order_id: OrderId) -> Vec<&str> {
        self.order_trade_subscribers
            .get(&order_id)
            .map(|subscribers| subscribers.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    fn begin_matching(&mut self) -> Result<()> {
        if self.state == ExchangeState::MatchingInProgress {
            return Err(ExchangeError::Busy);
        }
        self.state = ExchangeState::MatchingInProgress;
        Ok(())
    }

    fn end_matching(&mut self) {
        self.state = ExchangeState::Idle;
    }

    fn handle_place_limit(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let Payload::PlaceOrderLimit(request) = message.payload() else {
            return Err(AgentError::malformed(message, "PlaceOrderLimit"));
        };
        let request = *request;

        self.begin_matching()?;
        let placement = self.book.place_limit(
            message.source(),
            request.direction,
            message.delivery(),
            request.volume,
            request.price,
        );
        self.end_matching();

        let placement = match placement {
            Ok(placement) => placement,
            Err(err) => return self.reject(sim, message, err),
        };
        debug!(
            "{}: limit #{} from {} {} {}@{} ({} trades)",
            self.name,
            placement.order.id,
            message.source(),
            request.direction,
            request.volume,
            request.price,
            placement.trades.len()
        );

        self.publish_trades(sim, &placement.trades)?;
        self.forget_filled(&placement.trades);
        if !placement.rested() {
            self.order_trade_subscribers.remove(&placement.order.id);
        }
        sim.respond(
            &self.name,
            message,
            Payload::PlaceOrderLimitResponse(PlaceOrderLimitResponsePayload {
                id: placement.order.id,
                request,
            }),
            self.processing_delay,
        )?;
        sim.publish(
            &self.name,
            MessageType::EventOrderLimit,
            Payload::EventOrderLimit(EventOrderLimitPayload {
                order: placement.order,
                trades: placement.trades,
            }),
            self.processing_delay,
        )?;
        Ok(())
    }

    fn handle_place_market(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let Payload::PlaceOrderMarket(request) = message.payload() else {
            return Err(AgentError::malformed(message, "PlaceOrderMarket"));
        };
        let request = *request;

        self.begin_matching()?;
        let placement = self.book.place_market(
            message.source(),
            request.direction,
            message.delivery(),
            request.volume,
        );
        self.end_matching();

        let placement = match placement {
            Ok(placement) => placement,
            Err(err) => return self.reject(sim, message, err),
        };
        debug!(
            "{}: market #{} from {} {} {} (filled {}, discarded {})",
            self.name,
            placement.order.id,
            message.source(),
            request.direction,
            request.volume,
            placement.filled(),
            placement.discarded()
        );

        self.publish_trades(sim, &placement.trades)?;
        self.forget_filled(&placement.trades);
        self.order_trade_subscribers.remove(&placement.order.id);
        sim.respond(
            &self.name,
            message,
            Payload::PlaceOrderMarketResponse(PlaceOrderMarketResponsePayload {
                id: placement.order.id,
                request,
                filled: placement.filled(),
                discarded: placement.discarded(),
            }),
            self.processing_delay,
        )?;
        sim.publish(
            &self.name,
            MessageType::EventOrderMarket,
            Payload::EventOrderMarket(EventOrderMarketPayload {
                order: placement.order,
                trades: placement.trades,
            }),
            self.processing_delay,
        )?;
        Ok(())
    }

    fn handle_cancel(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let Payload::CancelOrders(request) = message.payload() else {
            return Err(AgentError::malformed(message, "CancelOrders"));
        };

        let remaining: Vec<_> = request
            .cancellations
            .iter()
            .map(|c| (c.id, self.book.cancel(c.id, c.volume)))
            .collect();
        for (id, _) in remaining.iter().filter(|(_, volume)| *volume == 0) {
            self.order_trade_subscribers.remove(id);
        }
        sim.respond(
            &self.name,
            message,
            Payload::CancelOrdersResponse(CancelOrdersResponsePayload { remaining }),
            self.processing_delay,
        )?;
        Ok(())
    }

    fn handle_retrieve_orders(
        &self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let Payload::RetrieveOrders(request) = message.payload() else {
            return Err(AgentError::malformed(message, "RetrieveOrders"));
        };

        let orders = request
            .ids
            .iter()
            .filter_map(|id| self.book.get_order(*id).cloned())
            .collect();
        sim.respond(
            &self.name,
            message,
            Payload::RetrieveOrdersResponse(RetrieveOrdersResponsePayload { orders }),
            0,
        )?;
        Ok(())
    }

    fn handle_retrieve_book(
        &self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
        side: Side,
    ) -> AgentResult<()> {
        let Payload::RetrieveBook(request) = message.payload() else {
            return Err(AgentError::malformed(message, "RetrieveBook"));
        };

        let levels = self.book.levels(side, request.depth);
        sim.respond(
            &self.name,
            message,
            Payload::RetrieveBookResponse(RetrieveBookResponsePayload {
                time: message.delivery(),
                side,
                levels,
            }),
            0,
        )?;
        Ok(())
    }

    fn handle_retrieve_l1(
        &self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let snapshot = self.book.l1(message.delivery());
        sim.respond(
            &self.name,
            message,
            Payload::RetrieveL1Response(snapshot),
            0,
        )?;
        Ok(())
    }

    fn subscribe_order_trades(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        let Payload::SubscribeEventOrderTrade(request) = message.payload() else {
            return Err(AgentError::malformed(message, "SubscribeEventOrderTrade"));
        };

        let added = self
            .order_trade_subscribers
            .entry(request.id)
            .or_default()
            .insert(message.source().to_string());
        let payload = if added {
            debug!("{}: {} follows trades of #{}", self.name, message.source(), request.id);
            Payload::Success(format!("subscribed to trades of order {}", request.id))
        } else {
            Payload::Error(format!("already subscribed to trades of order {}", request.id))
        };
        sim.fast_respond(&self.name, message, payload)?;
        Ok(())
    }

    /// Subscriptions to published events are already recorded by the host;
    /// only acknowledge them
    fn acknowledge_subscription(
        &self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
        event: &MessageType,
    ) -> AgentResult<()> {
        let payload = match event {
            MessageType::EventOrderLimit | MessageType::EventOrderMarket | MessageType::EventTrade => {
                debug!("{}: {} subscribed to {}", self.name, message.source(), event);
                Payload::Success(format!("subscribed to {event}"))
            }
            other => Payload::Error(format!("{other} is not published by an exchange")),
        };
        sim.fast_respond(&self.name, message, payload)?;
        Ok(())
    }

    fn publish_trades(&self, sim: &mut dyn SimulationHandle, trades: &[Trade]) -> AgentResult<()> {
        let now = sim.current_timestamp();
        for trade in trades {
            sim.publish(
                &self.name,
                MessageType::EventTrade,
                Payload::EventTrade(trade.clone()),
                self.processing_delay,
            )?;
            for order_id in [trade.aggressing_order_id, trade.resting_order_id] {
                let Some(subscribers) = self.order_trade_subscribers.get(&order_id) else {
                    continue;
                };
                for subscriber in subscribers {
                    sim.dispatch_message(
                        now,
                        self.processing_delay,
                        &self.name,
                        subscriber,
                        MessageType::EventTrade,
                        Payload::EventTrade(trade.clone()),
                    )?;
                }
            }
        }
        Ok(())
    }

    /// Drop per-order subscriptions of resting orders the trades used up
    fn forget_filled(&mut self, trades: &[Trade]) {
        for trade in trades {
            if self.book.get_order(trade.resting_order_id).is_none() {
                self.order_trade_subscribers.remove(&trade.resting_order_id);
            }
        }
    }

    /// Answer a request the book refused; not an agent failure
    fn reject(
        &self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
        err: ExchangeError,
    ) -> AgentResult<()> {
        warn!("{}: rejected {} from {}: {}", self.name, message.message_type(), message.source(), err);
        sim.respond(
            &self.name,
            message,
            Payload::Error(err.to_string()),
            self.processing_delay,
        )?;
        Ok(())
    }
}

impl Agent for ExchangeAgent {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&mut self, params: &ParameterMap) -> ConfigResult<()> {
        let reader = ParameterReader::new(&self.name, params, Self::OPTIONS)?;

        if let Some(algorithm) = reader.optional_choice("algorithm")? {
            let matcher =
                create_matching_algorithm(algorithm).map_err(|_| ConfigError::InvalidValue {
                    name: "algorithm".to_string(),
                    value: algorithm.to_string(),
                    expected: OptionKind::Choice(ALGORITHM_NAMES).expected(),
                })?;
            self.book.set_matcher(matcher);
        }
        if let Some(delay) = reader.optional("processingDelay")? {
            self.processing_delay = delay;
        }

        info!(
            "{}: matching with {}, processing delay {}",
            self.name,
            self.book.matcher_name(),
            self.processing_delay
        );
        Ok(())
    }

    fn publishes(&self, event: &MessageType) -> bool {
        matches!(
            event,
            MessageType::EventOrderLimit | MessageType::EventOrderMarket | MessageType::EventTrade
        )
    }

    fn receive_message(
        &mut self,
        sim: &mut dyn SimulationHandle,
        message: &Message,
    ) -> AgentResult<()> {
        match message.message_type() {
            MessageType::PlaceOrderLimit => self.handle_place_limit(sim, message),
            MessageType::PlaceOrderMarket => self.handle_place_market(sim, message),
            MessageType::CancelOrders => self.handle_cancel(sim, message),
            MessageType::RetrieveOrders => self.handle_retrieve_orders(sim, message),
            MessageType::RetrieveL1 => self.handle_retrieve_l1(sim, message),
            MessageType::RetrieveBookBid => self.handle_retrieve_book(sim, message, Side::Buy),
            MessageType::RetrieveBookAsk => self.handle_retrieve_book(sim, message, Side::Sell),
            MessageType::Subscribe(event) if **event == MessageType::EventOrderTrade => {
                self.subscribe_order_trades(sim, message)
            }
            MessageType::Subscribe(event) => self.acknowledge_subscription(sim, message, event),
            MessageType::SimulationStart | MessageType::SimulationStop | MessageType::Response(_) => {
                Ok(())
            }
            other => {
                debug!("{}: {} from {} not handled", self.name, other, message.source());
                sim.fast_respond(
                    &self.name,
                    message,
                    Payload::Error(UNRECOGNIZED_REQUEST.to_string()),
                )?;
                Ok(())
            }
        }
    }
}
