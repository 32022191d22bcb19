use serde::{Deserialize, Serialize};

use crate::values::{Money, Timestamp, Volume};

/// Aggregated view of one price on one side of a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub price: Money,
    pub volume: Volume,
    pub order_count: usize,
}

/// Top-of-book snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct L1Snapshot {
    pub time: Timestamp,
    pub best_bid: Option<PriceLevel>,
    pub best_ask: Option<PriceLevel>,
    pub total_bid_volume: Volume,
    pub total_ask_volume: Volume,
}
