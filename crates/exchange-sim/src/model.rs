// Re-export domain types from agora-core
pub use agora_core::{
    L1Snapshot, LimitOrder, MarketOrder, Money, OrderId, PriceLevel, Side, Timestamp, Trade,
    TradeId, Volume,
};

/// Matching state machine of one exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExchangeState {
    #[default]
    Idle,
    MatchingInProgress,
}

/// Outcome of a limit order placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimitPlacement {
    /// Order state after matching; rests in the book unless filled
    pub order: LimitOrder,
    pub trades: Vec<Trade>,
}

impl LimitPlacement {
    pub fn rested(&self) -> bool {
        !self.order.is_filled()
    }
}

/// Outcome of a market order placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketPlacement {
    /// `volume` holds the discarded remainder
    pub order: MarketOrder,
    pub trades: Vec<Trade>,
}

impl MarketPlacement {
    pub fn filled(&self) -> Volume {
        self.order.filled_volume()
    }

    pub fn discarded(&self) -> Volume {
        self.order.volume
    }
}
