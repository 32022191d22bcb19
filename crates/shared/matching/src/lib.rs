//! Agora Matching Algorithms
//!
//! Level allocation algorithms used by the exchange's order book.

mod allocation;
mod price_time;
mod priority_pro_rata;
mod pro_rata;
mod time_pro_rata;

pub use price_time::PriceTimeMatcher;
pub use priority_pro_rata::PriorityProRataMatcher;
pub use pro_rata::ProRataMatcher;
pub use time_pro_rata::TimeProRataMatcher;

// Re-export the trait from ports for convenience
pub use agora_ports::{Fill, MatchingAlgorithm, MatchingError, MatchingResult};

/// Names accepted by [`create_matching_algorithm`], as configured on an exchange
pub const ALGORITHM_NAMES: &[&str] = &[
    "PriceTime",
    "ProRata",
    "PureProRata",
    "PriorityProRata",
    "TimeProRata",
];

/// Factory function to create matching algorithms by name
pub fn create_matching_algorithm(algorithm_type: &str) -> MatchingResult<Box<dyn MatchingAlgorithm>> {
    match algorithm_type.to_lowercase().as_str() {
        "pricetime" | "price-time" | "fifo" => Ok(Box::new(PriceTimeMatcher::new())),
        "prorata" | "pro-rata" | "pureprorata" => Ok(Box::new(ProRataMatcher::new())),
        "priorityprorata" => Ok(Box::new(PriorityProRataMatcher::new())),
        "timeprorata" => Ok(Box::new(TimeProRataMatcher::new())),
        _ => Err(MatchingError::UnknownAlgorithm(algorithm_type.to_string())),
    }
}
