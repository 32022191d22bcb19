mod exchange;

pub use exchange::ExchangeAgent;
