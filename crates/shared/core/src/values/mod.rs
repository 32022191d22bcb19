mod money;

pub use money::{Money, MoneyParseError};

/// Simulation time in abstract, non-negative units
pub type Timestamp = u64;

/// Quantity of the traded asset, in whole units
pub type Volume = u64;

/// Global enqueue order of a message; breaks ties between equal timestamps
pub type Sequence = u64;

/// Unique, stable agent identifier
pub type AgentName = String;
