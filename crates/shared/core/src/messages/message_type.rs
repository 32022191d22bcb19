use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

const SUBSCRIBE_PREFIX: &str = "SUBSCRIBE_";
const RESPONSE_PREFIX: &str = "RESPONSE_";

/// Message type vocabulary shared by the host and its agents.
///
/// Every variant has a stable string tag; `Display` and `FromStr`
/// round-trip. Tags outside the reserved vocabulary parse as
/// [`MessageType::Custom`] and pass through the host untouched.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MessageType {
    SimulationStart,
    SimulationStop,
    WakeUp,
    PlaceOrderLimit,
    PlaceOrderMarket,
    CancelOrders,
    RetrieveOrders,
    RetrieveL1,
    RetrieveBookBid,
    RetrieveBookAsk,
    EventOrderLimit,
    EventOrderMarket,
    EventTrade,
    /// Trades of one order; subscribed to with the order id, delivered as
    /// `EVENT_TRADE`
    EventOrderTrade,
    /// `SUBSCRIBE_<EVENT>`
    Subscribe(Box<MessageType>),
    /// `RESPONSE_<TYPE>`
    Response(Box<MessageType>),
    Custom(String),
}

impl MessageType {
    pub fn subscribe(event: MessageType) -> Self {
        MessageType::Subscribe(Box::new(event))
    }

    pub fn response(request: MessageType) -> Self {
        MessageType::Response(Box::new(request))
    }

    /// Response type answering a message of this type
    pub fn response_type(&self) -> Self {
        Self::response(self.clone())
    }

    /// Event type targeted by a `SUBSCRIBE_*` message
    pub fn subscribed_event(&self) -> Option<&MessageType> {
        match self {
            MessageType::Subscribe(event) => Some(event),
            _ => None,
        }
    }

    fn reserved_tag(&self) -> Option<&'static str> {
        let tag = match self {
            MessageType::SimulationStart => "EVENT_SIMULATION_START",
            MessageType::SimulationStop => "EVENT_SIMULATION_STOP",
            MessageType::WakeUp => "WAKE_UP",
            MessageType::PlaceOrderLimit => "PLACE_ORDER_LIMIT",
            MessageType::PlaceOrderMarket => "PLACE_ORDER_MARKET",
            MessageType::CancelOrders => "CANCEL_ORDERS",
            MessageType::RetrieveOrders => "RETRIEVE_ORDERS",
            MessageType::RetrieveL1 => "RETRIEVE_L1",
            MessageType::RetrieveBookBid => "RETRIEVE_BOOK_BID",
            MessageType::RetrieveBookAsk => "RETRIEVE_BOOK_ASK",
            MessageType::EventOrderLimit => "EVENT_ORDER_LIMIT",
            MessageType::EventOrderMarket => "EVENT_ORDER_MARKET",
            MessageType::EventTrade => "EVENT_TRADE",
            MessageType::EventOrderTrade => "EVENT_ORDER_TRADE",
            MessageType::Subscribe(_) | MessageType::Response(_) | MessageType::Custom(_) => {
                return None;
            }
        };
        Some(tag)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = self.reserved_tag() {
            return f.write_str(tag);
        }
        match self {
            MessageType::Subscribe(event) => write!(f, "{SUBSCRIBE_PREFIX}{event}"),
            MessageType::Response(request) => write!(f, "{RESPONSE_PREFIX}{request}"),
            MessageType::Custom(tag) => f.write_str(tag),
            _ => Ok(()),
        }
    }
}

impl FromStr for MessageType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(request) = s.strip_prefix(RESPONSE_PREFIX) {
            return Ok(MessageType::response(request.parse()?));
        }
        if let Some(event) = s.strip_prefix(SUBSCRIBE_PREFIX) {
            return Ok(MessageType::subscribe(event.parse()?));
        }
        let parsed = match s {
            "EVENT_SIMULATION_START" => MessageType::SimulationStart,
            "EVENT_SIMULATION_STOP" => MessageType::SimulationStop,
            "WAKE_UP" => MessageType::WakeUp,
            "PLACE_ORDER_LIMIT" => MessageType::PlaceOrderLimit,
            "PLACE_ORDER_MARKET" => MessageType::PlaceOrderMarket,
            "CANCEL_ORDERS" => MessageType::CancelOrders,
            "RETRIEVE_ORDERS" => MessageType::RetrieveOrders,
            "RETRIEVE_L1" => MessageType::RetrieveL1,
            "RETRIEVE_BOOK_BID" => MessageType::RetrieveBookBid,
            "RETRIEVE_BOOK_ASK" => MessageType::RetrieveBookAsk,
            "EVENT_ORDER_LIMIT" => MessageType::EventOrderLimit,
            "EVENT_ORDER_MARKET" => MessageType::EventOrderMarket,
            "EVENT_TRADE" => MessageType::EventTrade,
            "EVENT_ORDER_TRADE" => MessageType::EventOrderTrade,
            other => MessageType::Custom(other.to_string()),
        };
        Ok(parsed)
    }
}

impl From<MessageType> for String {
    fn from(value: MessageType) -> Self {
        value.to_string()
    }
}

impl From<String> for MessageType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(parsed) => parsed,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for MessageType {
    fn from(value: &str) -> Self {
        MessageType::from(value.to_string())
    }
}
