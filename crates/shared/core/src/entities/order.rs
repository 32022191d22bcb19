use serde::{Deserialize, Serialize};

use super::Side;
use crate::values::{AgentName, Money, Timestamp, Volume};

/// Exchange-assigned order identifier.
///
/// Sequential per exchange starting at 1; 0 is never assigned.
pub type OrderId = u64;

/// Limit order resting on (or about to enter) a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitOrder {
    pub id: OrderId,
    /// Name of the agent that submitted the order
    pub owner: AgentName,
    pub side: Side,
    /// Delivery time of the placement message
    pub timestamp: Timestamp,
    /// Remaining (unfilled) volume
    pub volume: Volume,
    pub initial_volume: Volume,
    pub price: Money,
}

impl LimitOrder {
    pub fn new(
        id: OrderId,
        owner: impl Into<AgentName>,
        side: Side,
        timestamp: Timestamp,
        volume: Volume,
        price: Money,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            side,
            timestamp,
            volume,
            initial_volume: volume,
            price,
        }
    }

    /// Reduce the remaining volume, saturating at zero
    pub fn fill(&mut self, volume: Volume) {
        self.volume = self.volume.saturating_sub(volume);
    }

    pub fn filled_volume(&self) -> Volume {
        self.initial_volume - self.volume
    }

    /// Returns true if nothing remains to be filled
    pub fn is_filled(&self) -> bool {
        self.volume == 0
    }
}

/// Market order; never rests, any unmatched remainder is discarded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketOrder {
    pub id: OrderId,
    pub owner: AgentName,
    pub side: Side,
    pub timestamp: Timestamp,
    /// Volume left unmatched after the sweep
    pub volume: Volume,
    pub initial_volume: Volume,
}

impl MarketOrder {
    pub fn new(
        id: OrderId,
        owner: impl Into<AgentName>,
        side: Side,
        timestamp: Timestamp,
        volume: Volume,
    ) -> Self {
        Self {
            id,
            owner: owner.into(),
            side,
            timestamp,
            volume,
            initial_volume: volume,
        }
    }

    pub fn fill(&mut self, volume: Volume) {
        self.volume = self.volume.saturating_sub(volume);
    }

    pub fn filled_volume(&self) -> Volume {
        self.initial_volume - self.volume
    }

    pub fn is_filled(&self) -> bool {
        self.volume == 0
    }
}
