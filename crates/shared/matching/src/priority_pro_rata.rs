use std::collections::VecDeque;

use agora_core::{LimitOrder, OrderId, Volume};
use agora_ports::{Fill, MatchingAlgorithm};

use crate::pro_rata::ProRataMatcher;

/// Pro-Rata with Priority
///
/// The order that most recently opened a price level on the resting side is
/// filled first when it rests at this level, as far as the incoming volume
/// allows; whatever is left is shared pro-rata across the
/// level, that order included.
#[derive(Debug, Default)]
pub struct PriorityProRataMatcher {
    pro_rata: ProRataMatcher,
}

impl PriorityProRataMatcher {
    pub fn new() -> Self {
        Self {
            pro_rata: ProRataMatcher::new(),
        }
    }
}

impl MatchingAlgorithm for PriorityProRataMatcher {
    fn name(&self) -> &str {
        "Priority Pro-Rata"
    }

    fn match_at_level(&self, volume: Volume, resting: &mut VecDeque<LimitOrder>) -> Vec<Fill> {
        self.match_with_priority(volume, resting, None)
    }

    fn match_with_priority(
        &self,
        volume: Volume,
        resting: &mut VecDeque<LimitOrder>,
        priority: Option<OrderId>,
    ) -> Vec<Fill> {
        let mut fills = Vec::new();
        let mut remaining = volume;

        if let Some(pos) = priority.and_then(|id| resting.iter().position(|o| o.id == id)) {
            let order = &mut resting[pos];
            let fill_qty = remaining.min(order.volume);
            if fill_qty > 0 {
                fills.push(Fill {
                    order_id: order.id,
                    owner: order.owner.clone(),
                    volume: fill_qty,
                });
                order.fill(fill_qty);
                remaining -= fill_qty;
            }
            if order.is_filled() {
                resting.remove(pos);
            }
        }

        fills.extend(self.pro_rata.match_at_level(remaining, resting));
        fills
    }
}
