use std::collections::VecDeque;

use agora_core::{LimitOrder, Volume};
use agora_ports::{Fill, MatchingAlgorithm};

use crate::allocation::{absorbable, level_volume, settle};

/// Pro-Rata Matching
///
/// Orders at a price level are filled proportionally to their remaining
/// size: `floor(order_volume * available / level_volume)`. The rounding
/// remainder is then handed out FIFO.
#[derive(Debug, Default)]
pub struct ProRataMatcher {
    /// Proportional shares below this are dropped (prevents dust fills)
    min_allocation: Volume,
}

impl ProRataMatcher {
    pub fn new() -> Self {
        Self { min_allocation: 0 }
    }

    pub fn with_min_allocation(mut self, min: Volume) -> Self {
        self.min_allocation = min;
        self
    }
}

impl MatchingAlgorithm for ProRataMatcher {
    fn name(&self) -> &str {
        "Pro-Rata"
    }

    fn match_at_level(&self, volume: Volume, resting: &mut VecDeque<LimitOrder>) -> Vec<Fill> {
        let total_resting = level_volume(resting);
        if total_resting == 0 || volume == 0 {
            return Vec::new();
        }

        let available = absorbable(volume, total_resting);
        let shares = resting
            .iter()
            .map(|order| {
                // u128 keeps the product exact; the quotient never exceeds the order volume
                let share = (u128::from(order.volume) * u128::from(available) / total_resting)
                    as Volume;
                if share >= self.min_allocation { share } else { 0 }
            })
            .collect();

        settle(available, shares, resting)
    }
}
