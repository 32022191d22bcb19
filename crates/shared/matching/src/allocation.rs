use std::collections::VecDeque;

use agora_core::{LimitOrder, Volume};
use agora_ports::Fill;

/// Exact volume resting at a level; the sum of `u64` volumes can exceed `u64`
pub(crate) fn level_volume(resting: &VecDeque<LimitOrder>) -> u128 {
    resting.iter().map(|o| u128::from(o.volume)).sum()
}

/// Incoming volume the level can absorb
pub(crate) fn absorbable(volume: Volume, level_volume: u128) -> Volume {
    // Bounded by `volume`, so the narrowing is lossless
    u128::from(volume).min(level_volume) as Volume
}

/// Settle one proportional pass over a level.
///
/// `shares` holds one proposed allocation per resting order (oldest
/// first). Each is capped by the order's size and by what is left of
/// `available`; the leftover is then handed out FIFO. Fully filled orders
/// are removed from the queue.
pub(crate) fn settle(
    available: Volume,
    shares: Vec<Volume>,
    resting: &mut VecDeque<LimitOrder>,
) -> Vec<Fill> {
    let mut budget = available;
    let mut allocations: Vec<Volume> = shares
        .into_iter()
        .zip(resting.iter())
        .map(|(share, order)| {
            let granted = share.min(order.volume).min(budget);
            budget -= granted;
            granted
        })
        .collect();

    for (allocation, order) in allocations.iter_mut().zip(resting.iter()) {
        if budget == 0 {
            break;
        }
        let extra = (order.volume - *allocation).min(budget);
        *allocation += extra;
        budget -= extra;
    }

    let mut fills = Vec::new();
    for (order, fill_qty) in resting.iter_mut().zip(allocations) {
        if fill_qty == 0 {
            continue;
        }
        fills.push(Fill {
            order_id: order.id,
            owner: order.owner.clone(),
            volume: fill_qty,
        });
        order.fill(fill_qty);
    }

    resting.retain(|o| !o.is_filled());
    fills
}
