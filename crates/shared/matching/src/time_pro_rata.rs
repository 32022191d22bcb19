use std::collections::VecDeque;

use agora_core::{LimitOrder, Volume};
use agora_ports::{Fill, MatchingAlgorithm};

use crate::allocation::{absorbable, level_volume, settle};

/// Time-Weighted Pro-Rata Matching
///
/// Each order's share grows with its size and with how early it queued.
/// With `A` the level volume and `back` the volume from an order to the
/// end of the queue (the order included), the order of size `v` is
/// allocated
///
/// ```text
/// floor(available * (back² - (back - v)²) / A²)
/// ```
///
/// The weights of a level add up to one. The rounding remainder goes FIFO.
#[derive(Debug, Default)]
pub struct TimeProRataMatcher;

impl TimeProRataMatcher {
    pub fn new() -> Self {
        Self
    }
}

/// `available * v * (2 * back - v) / total²`, exact when it fits in u128
fn time_weighted_share(available: Volume, own: u128, back: u128, total: u128) -> Volume {
    let weight = 2 * back - own;
    let exact = own
        .checked_mul(weight)
        .and_then(|scaled| scaled.checked_mul(u128::from(available)))
        .zip(total.checked_mul(total))
        .map(|(scaled, square)| scaled / square);
    let share = exact.unwrap_or_else(|| {
        let fraction = own as f64 * weight as f64 / (total as f64 * total as f64);
        (fraction * available as f64).floor() as u128
    });
    // Bounded by the order's own u64 volume
    share.min(own) as Volume
}

impl MatchingAlgorithm for TimeProRataMatcher {
    fn name(&self) -> &str {
        "Time Pro-Rata"
    }

    fn match_at_level(&self, volume: Volume, resting: &mut VecDeque<LimitOrder>) -> Vec<Fill> {
        let total = level_volume(resting);
        if total == 0 || volume == 0 {
            return Vec::new();
        }

        let available = absorbable(volume, total);
        let mut ahead: u128 = 0;
        let shares = resting
            .iter()
            .map(|order| {
                let own = u128::from(order.volume);
                let back = total - ahead;
                ahead += own;
                time_weighted_share(available, own, back, total)
            })
            .collect();

        settle(available, shares, resting)
    }
}
