mod order;
mod price_level;
mod side;
mod trade;

pub use order::{LimitOrder, MarketOrder, OrderId};
pub use price_level::{L1Snapshot, PriceLevel};
pub use side::Side;
pub use trade::{Trade, TradeId};
