use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entities::{L1Snapshot, LimitOrder, MarketOrder, OrderId, PriceLevel, Side, Trade};
use crate::values::{Money, Timestamp, Volume};

/// Untyped string-to-string bag, used for `WAKE_UP` and custom messages
pub type GenericPayload = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderLimitPayload {
    pub direction: Side,
    pub volume: Volume,
    pub price: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderMarketPayload {
    pub direction: Side,
    pub volume: Volume,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderLimitResponsePayload {
    pub id: OrderId,
    pub request: PlaceOrderLimitPayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceOrderMarketResponsePayload {
    pub id: OrderId,
    pub request: PlaceOrderMarketPayload,
    pub filled: Volume,
    /// Unmatched remainder thrown away by the exchange
    pub discarded: Volume,
}

/// Reduce one resting order by `volume`, or remove it entirely when `None`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    pub id: OrderId,
    pub volume: Option<Volume>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelOrdersPayload {
    pub cancellations: Vec<Cancellation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CancelOrdersResponsePayload {
    /// `(id, remaining volume)` per requested cancellation; 0 for unknown ids
    pub remaining: Vec<(OrderId, Volume)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetrieveOrdersPayload {
    pub ids: Vec<OrderId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RetrieveOrdersResponsePayload {
    /// Still-resting orders among the requested ids, in request order
    pub orders: Vec<LimitOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveBookPayload {
    pub depth: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrieveBookResponsePayload {
    pub time: Timestamp,
    pub side: Side,
    /// Best level first
    pub levels: Vec<PriceLevel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOrderLimitPayload {
    /// Order state after matching
    pub order: LimitOrder,
    pub trades: Vec<Trade>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventOrderMarketPayload {
    pub order: MarketOrder,
    pub trades: Vec<Trade>,
}

/// Body of `SUBSCRIBE_EVENT_ORDER_TRADE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeEventOrderTradePayload {
    pub id: OrderId,
}

/// Typed message body.
///
/// Which variant accompanies which [`MessageType`](super::MessageType) is a
/// convention between sender and receiver; receivers check it and report a
/// mismatch as a malformed payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Payload {
    #[default]
    Empty,
    Generic(GenericPayload),
    PlaceOrderLimit(PlaceOrderLimitPayload),
    PlaceOrderMarket(PlaceOrderMarketPayload),
    PlaceOrderLimitResponse(PlaceOrderLimitResponsePayload),
    PlaceOrderMarketResponse(PlaceOrderMarketResponsePayload),
    CancelOrders(CancelOrdersPayload),
    CancelOrdersResponse(CancelOrdersResponsePayload),
    RetrieveOrders(RetrieveOrdersPayload),
    RetrieveOrdersResponse(RetrieveOrdersResponsePayload),
    RetrieveBook(RetrieveBookPayload),
    RetrieveBookResponse(RetrieveBookResponsePayload),
    RetrieveL1Response(L1Snapshot),
    EventOrderLimit(EventOrderLimitPayload),
    EventOrderMarket(EventOrderMarketPayload),
    EventTrade(Trade),
    SubscribeEventOrderTrade(SubscribeEventOrderTradePayload),
    Success(String),
    Error(String),
}

impl Payload {
    /// Variant name, for diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Empty => "Empty",
            Payload::Generic(_) => "Generic",
            Payload::PlaceOrderLimit(_) => "PlaceOrderLimit",
            Payload::PlaceOrderMarket(_) => "PlaceOrderMarket",
            Payload::PlaceOrderLimitResponse(_) => "PlaceOrderLimitResponse",
            Payload::PlaceOrderMarketResponse(_) => "PlaceOrderMarketResponse",
            Payload::CancelOrders(_) => "CancelOrders",
            Payload::CancelOrdersResponse(_) => "CancelOrdersResponse",
            Payload::RetrieveOrders(_) => "RetrieveOrders",
            Payload::RetrieveOrdersResponse(_) => "RetrieveOrdersResponse",
            Payload::RetrieveBook(_) => "RetrieveBook",
            Payload::RetrieveBookResponse(_) => "RetrieveBookResponse",
            Payload::RetrieveL1Response(_) => "RetrieveL1Response",
            Payload::EventOrderLimit(_) => "EventOrderLimit",
            Payload::EventOrderMarket(_) => "EventOrderMarket",
            Payload::EventTrade(_) => "EventTrade",
            Payload::SubscribeEventOrderTrade(_) => "SubscribeEventOrderTrade",
            Payload::Success(_) => "Success",
            Payload::Error(_) => "Error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Payload::Error(_))
    }
}
