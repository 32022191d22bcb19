//! Exchange Simulator
//!
//! An order-matching engine that lives inside the simulation as an agent:
//!
//! ```text
//!   PLACE_ORDER_* ──▶ ExchangeAgent ──▶ OrderBook ──▶ MatchingAlgorithm (per level)
//!                          │
//!                          ├── RESPONSE_* ──────────▶ sender
//!                          └── EVENT_ORDER_* / EVENT_TRADE ──▶ subscribers
//! ```

// Application layer
pub mod application;

// Infrastructure layer
pub mod infrastructure;

// Cross-cutting concerns
pub mod error;
pub mod model;

// Re-export main types for convenience
pub use application::ExchangeAgent;
pub use error::ExchangeError;
pub use infrastructure::OrderBook;
pub use model::{ExchangeState, LimitPlacement, MarketPlacement};
