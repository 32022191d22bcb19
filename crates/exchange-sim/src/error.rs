use agora_core::{Money, OrderId};
use agora_ports::{AgentError, MatchingError};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Invalid price: {0}")]
    InvalidPrice(Money),

    #[error("Order not found: {0}")]
    OrderNotFound(OrderId),

    #[error("Exchange is busy matching another order")]
    Busy,

    #[error("Matching error: {0}")]
    Matching(#[from] MatchingError),
}

pub type Result<T> = std::result::Result<T, ExchangeError>;

impl From<ExchangeError> for AgentError {
    fn from(err: ExchangeError) -> Self {
        AgentError::Exchange(err.to_string())
    }
}
