use std::collections::VecDeque;

use agora_core::{AgentName, LimitOrder, OrderId, Volume};

/// Volume taken from one resting order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fill {
    pub order_id: OrderId,
    pub owner: AgentName,
    pub volume: Volume,
}

/// Port for order matching algorithms
///
/// Decides how an incoming volume is shared among the orders queued at a
/// single price level. Price priority is the book's job; implementations
/// only see one level:
/// - Price-Time Priority (FIFO)
/// - Pro-Rata allocation, plain, time-weighted or with priority for the latest level opener
pub trait MatchingAlgorithm: Send {
    /// Allocate up to `volume` against `resting` (oldest first).
    ///
    /// Fully filled orders are removed from the queue, partially filled
    /// ones keep their position. Fills are returned in allocation order and
    /// never sum to more than `volume`.
    fn match_at_level(&self, volume: Volume, resting: &mut VecDeque<LimitOrder>) -> Vec<Fill>;

    /// Same contract as [`match_at_level`](Self::match_at_level); `priority`
    /// is the order that most recently opened a level on the resting side.
    /// It only counts when it rests in `resting`.
    fn match_with_priority(
        &self,
        volume: Volume,
        resting: &mut VecDeque<LimitOrder>,
        _priority: Option<OrderId>,
    ) -> Vec<Fill> {
        self.match_at_level(volume, resting)
    }

    /// Get the name of the algorithm
    fn name(&self) -> &str;
}
