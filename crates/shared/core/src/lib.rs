//! Agora Core Domain
//!
//! Pure domain types for the Agora market simulation host.
//! This crate contains no I/O and no scheduling logic, and is 100% unit testable.
//!
//! ```text
//!   ┌──────────┐  Message { delivery, sequence, source → target, type, payload }
//!   │  agent   │ ─────────────────────────────────────────────────────────────▶ host
//!   └──────────┘
//! ```

pub mod entities;
pub mod messages;
pub mod params;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    L1Snapshot,
    // Core trading entities
    LimitOrder,
    MarketOrder,
    OrderId,
    PriceLevel,
    Side,
    Trade,
    TradeId,
};
pub use messages::{
    CancelOrdersPayload, CancelOrdersResponsePayload, Cancellation, EventOrderLimitPayload, EventOrderMarketPayload,
    GenericPayload, Message, MessageType, Payload, PlaceOrderLimitPayload,
    PlaceOrderLimitResponsePayload, PlaceOrderMarketPayload, PlaceOrderMarketResponsePayload,
    RetrieveBookPayload, RetrieveBookResponsePayload, RetrieveOrdersPayload,
    RetrieveOrdersResponsePayload, SubscribeEventOrderTradePayload,
};
pub use params::ParameterMap;
pub use values::{AgentName, Money, MoneyParseError, Sequence, Timestamp, Volume};
