use std::collections::VecDeque;

use agora_core::{LimitOrder, Volume};
use agora_ports::{Fill, MatchingAlgorithm};

/// Price-Time Priority (FIFO) Matching
///
/// Orders are filled in the order they arrived. The first order
/// at a price level gets filled first.
#[derive(Debug, Default)]
pub struct PriceTimeMatcher;

impl PriceTimeMatcher {
    pub fn new() -> Self {
        Self
    }
}

impl MatchingAlgorithm for PriceTimeMatcher {
    fn name(&self) -> &str {
        "Price-Time (FIFO)"
    }

    fn match_at_level(&self, volume: Volume, resting: &mut VecDeque<LimitOrder>) -> Vec<Fill> {
        let mut fills = Vec::new();
        let mut remaining = volume;

        while remaining > 0 {
            let Some(order) = resting.front_mut() else {
                break;
            };

            let fill_qty = remaining.min(order.volume);
            if fill_qty == 0 {
                // Zero-volume orders never rest; drop a stray one rather than spin
                resting.pop_front();
                continue;
            }

            fills.push(Fill {
                order_id: order.id,
                owner: order.owner.clone(),
                volume: fill_qty,
            });
            order.fill(fill_qty);
            remaining -= fill_qty;

            if order.is_filled() {
                resting.pop_front();
            }
        }

        fills
    }
}
