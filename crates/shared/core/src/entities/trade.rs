use serde::{Deserialize, Serialize};

use super::{OrderId, Side};
use crate::values::{AgentName, Money, Timestamp, Volume};

/// Sequential per exchange, starting at 1
pub type TradeId = u64;

/// Trade resulting from matching an aggressing order against a resting one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub timestamp: Timestamp,
    /// Side of the aggressing order
    pub direction: Side,
    pub aggressing_order_id: OrderId,
    pub aggressing_owner: AgentName,
    pub resting_order_id: OrderId,
    pub resting_owner: AgentName,
    pub volume: Volume,
    /// Always the resting order's price
    pub price: Money,
}

impl Trade {
    pub fn buy_order_id(&self) -> OrderId {
        match self.direction {
            Side::Buy => self.aggressing_order_id,
            Side::Sell => self.resting_order_id,
        }
    }

    pub fn sell_order_id(&self) -> OrderId {
        match self.direction {
            Side::Buy => self.resting_order_id,
            Side::Sell => self.aggressing_order_id,
        }
    }
}
