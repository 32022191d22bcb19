//! Message envelope, message type vocabulary and payloads.

mod message;
mod message_type;
mod payload;

pub use message::Message;
pub use message_type::MessageType;
pub use payload::{
    CancelOrdersPayload, CancelOrdersResponsePayload, Cancellation, EventOrderLimitPayload,
    EventOrderMarketPayload, GenericPayload, Payload, PlaceOrderLimitPayload,
    PlaceOrderLimitResponsePayload, PlaceOrderMarketPayload, PlaceOrderMarketResponsePayload,
    RetrieveBookPayload, RetrieveBookResponsePayload, RetrieveOrdersPayload,
    RetrieveOrdersResponsePayload, SubscribeEventOrderTradePayload,
};
