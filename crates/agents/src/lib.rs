//! Agora Reference Agents
//!
//! Small agents that exercise the host contract end to end:
//! - `SellingAgent` posts a limit sell every `interval` time units
//! - `BuyingAgent` lifts every new limit order with a market buy
//! - `PrintingAgent` logs everything it receives
//! - `TradeLogAgent` keeps the exchange's trade tape
//!
//! ## Interaction
//!
//! ```text
//!   SellingAgent ──PLACE_ORDER_LIMIT──▶ ExchangeAgent ──EVENT_ORDER_LIMIT──▶ BuyingAgent
//!        ▲    │                              ▲   │                              │
//!        └────┘ WAKE_UP (interval)           │   └──EVENT_TRADE──▶ TradeLogAgent │
//!                                            └──────────PLACE_ORDER_MARKET───────┘
//! ```
//!
//! Every agent declares its recognized options in an `OPTIONS` table and
//! reads them through `ParameterReader` into a typed config.

pub mod buying;
pub mod printing;
pub mod selling;
pub mod trade_log;

// Re-export main types
pub use buying::{BuyingAgent, BuyingConfig};
pub use printing::PrintingAgent;
pub use selling::{SellingAgent, SellingConfig};
pub use trade_log::{TradeLogAgent, TradeLogConfig};
