use std::collections::{BTreeMap, HashMap, VecDeque};

use agora_matching::{MatchingAlgorithm, PriceTimeMatcher};
use log::trace;

use crate::error::{ExchangeError, Result};
use crate::model::{
    L1Snapshot, LimitOrder, LimitPlacement, MarketOrder, MarketPlacement, Money, OrderId,
    PriceLevel, Side, Timestamp, Trade, TradeId, Volume,
};

/// Order book for a single instrument with configurable matching algorithm
pub struct OrderBook {
    /// Bids sorted by price descending (highest first)
    bids: BTreeMap<PriceKey, VecDeque<LimitOrder>>,
    /// Asks sorted by price ascending (lowest first)
    asks: BTreeMap<PriceKey, VecDeque<LimitOrder>>,
    /// Quick lookup for resting orders by ID
    order_index: HashMap<OrderId, (Side, Money)>,
    /// Per side, the latest order that opened a new price level
    last_opener: HashMap<Side, OrderId>,
    last_order_id: OrderId,
    last_trade_id: TradeId,
    /// Level allocation algorithm
    matcher: Box<dyn MatchingAlgorithm>,
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("bids_count", &self.bids.len())
            .field("asks_count", &self.asks.len())
            .field("order_count", &self.order_index.len())
            .field("last_order_id", &self.last_order_id)
            .field("matcher", &self.matcher.name())
            .finish()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

/// Price key for BTreeMap ordering
/// For bids: reversed so the highest price comes first
/// For asks: natural order (ascending)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PriceKey {
    price: Money,
    is_bid: bool,
}

impl PriceKey {
    fn new(side: Side, price: Money) -> Self {
        PriceKey {
            price,
            is_bid: side == Side::Buy,
        }
    }
}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        if self.is_bid {
            // Bids: higher price first (reverse order)
            other.price.cmp(&self.price)
        } else {
            // Asks: lower price first (natural order)
            self.price.cmp(&other.price)
        }
    }
}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// The incoming order while it sweeps the opposite side
struct Aggressor<'a> {
    id: OrderId,
    owner: &'a str,
    side: Side,
    timestamp: Timestamp,
    /// `None` for market orders
    limit: Option<Money>,
}

impl Aggressor<'_> {
    fn crosses(&self, level_price: Money) -> bool {
        match (self.side, self.limit) {
            (_, None) => true,
            (Side::Buy, Some(limit)) => limit >= level_price,
            (Side::Sell, Some(limit)) => limit <= level_price,
        }
    }
}

impl OrderBook {
    /// Create a new order book with default Price-Time Priority matching
    pub fn new() -> Self {
        Self::with_matcher(Box::new(PriceTimeMatcher::new()))
    }

    /// Create a new order book with a specific matching algorithm
    pub fn with_matcher(matcher: Box<dyn MatchingAlgorithm>) -> Self {
        OrderBook {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            order_index: HashMap::new(),
            last_opener: HashMap::new(),
            last_order_id: 0,
            last_trade_id: 0,
            matcher,
        }
    }

    pub fn set_matcher(&mut self, matcher: Box<dyn MatchingAlgorithm>) {
        self.matcher = matcher;
    }

    /// Get the name of the matching algorithm
    pub fn matcher_name(&self) -> &str {
        self.matcher.name()
    }

    /// Best bid level (highest buy price)
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids
            .first_key_value()
            .map(|(k, queue)| Self::level(k.price, queue))
    }

    /// Best ask level (lowest sell price)
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks
            .first_key_value()
            .map(|(k, queue)| Self::level(k.price, queue))
    }

    /// Spread between best ask and best bid
    pub fn spread(&self) -> Option<Money> {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => Some(ask.price - bid.price),
            _ => None,
        }
    }

    /// True if the best bid reaches the best ask; never holds between placements
    pub fn is_crossed(&self) -> bool {
        match (self.best_bid(), self.best_ask()) {
            (Some(bid), Some(ask)) => bid.price >= ask.price,
            _ => false,
        }
    }

    /// Top `depth` levels of one side, best first
    pub fn levels(&self, side: Side, depth: usize) -> Vec<PriceLevel> {
        self.side(side)
            .iter()
            .take(depth)
            .map(|(k, queue)| Self::level(k.price, queue))
            .collect()
    }

    /// Resting volume of one side, saturating at `Volume::MAX`
    pub fn total_volume(&self, side: Side) -> Volume {
        self.side(side)
            .values()
            .flat_map(|queue| queue.iter())
            .fold(0, |total: Volume, o| total.saturating_add(o.volume))
    }

    pub fn l1(&self, time: Timestamp) -> L1Snapshot {
        L1Snapshot {
            time,
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            total_bid_volume: self.total_volume(Side::Buy),
            total_ask_volume: self.total_volume(Side::Sell),
        }
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    /// Get a resting order by ID
    pub fn get_order(&self, order_id: OrderId) -> Option<&LimitOrder> {
        let (side, price) = self.order_index.get(&order_id)?;
        self.side(*side)
            .get(&PriceKey::new(*side, *price))?
            .iter()
            .find(|o| o.id == order_id)
    }

    /// Place a limit order: match what crosses, rest the remainder
    pub fn place_limit(
        &mut self,
        owner: &str,
        side: Side,
        timestamp: Timestamp,
        volume: Volume,
        price: Money,
    ) -> Result<LimitPlacement> {
        if volume == 0 {
            return Err(ExchangeError::InvalidOrder(
                "volume must be positive".to_string(),
            ));
        }
        if !price.is_positive() {
            return Err(ExchangeError::InvalidPrice(price));
        }

        let mut order = LimitOrder::new(self.next_order_id(), owner, side, timestamp, volume, price);
        let trades = self.sweep(
            &Aggressor {
                id: order.id,
                owner,
                side,
                timestamp,
                limit: Some(price),
            },
            volume,
        );
        order.fill(trades.iter().map(|t| t.volume).sum());

        if !order.is_filled() {
            self.insert(order.clone());
        }
        trace!(
            "limit #{} {} {}@{}: {} trades, {} resting",
            order.id,
            side,
            volume,
            price,
            trades.len(),
            order.volume
        );

        Ok(LimitPlacement { order, trades })
    }

    /// Place a market order; whatever the opposite side cannot absorb is discarded
    pub fn place_market(
        &mut self,
        owner: &str,
        side: Side,
        timestamp: Timestamp,
        volume: Volume,
    ) -> Result<MarketPlacement> {
        if volume == 0 {
            return Err(ExchangeError::InvalidOrder(
                "volume must be positive".to_string(),
            ));
        }

        let mut order = MarketOrder::new(self.next_order_id(), owner, side, timestamp, volume);
        let trades = self.sweep(
            &Aggressor {
                id: order.id,
                owner,
                side,
                timestamp,
                limit: None,
            },
            volume,
        );
        order.fill(trades.iter().map(|t| t.volume).sum());
        trace!(
            "market #{} {} {}: {} trades, {} discarded",
            order.id,
            side,
            volume,
            trades.len(),
            order.volume
        );

        Ok(MarketPlacement { order, trades })
    }

    /// Reduce a resting order by `volume`, or remove it when `None` or
    /// when the reduction covers everything left. Returns the remaining
    /// volume; unknown ids are a no-op returning 0.
    pub fn cancel(&mut self, order_id: OrderId, volume: Option<Volume>) -> Volume {
        let Some(&(side, price)) = self.order_index.get(&order_id) else {
            return 0;
        };
        let key = PriceKey::new(side, price);
        let book = self.side_mut(side);
        let Some(queue) = book.get_mut(&key) else {
            return 0;
        };
        let Some(pos) = queue.iter().position(|o| o.id == order_id) else {
            return 0;
        };

        let remaining = match volume {
            Some(reduce) if reduce < queue[pos].volume => {
                queue[pos].volume -= reduce;
                queue[pos].volume
            }
            _ => 0,
        };

        if remaining == 0 {
            queue.remove(pos);
            if queue.is_empty() {
                book.remove(&key);
            }
            self.order_index.remove(&order_id);
        }
        remaining
    }

    fn next_order_id(&mut self) -> OrderId {
        self.last_order_id += 1;
        self.last_order_id
    }

    fn insert(&mut self, order: LimitOrder) {
        let key = PriceKey::new(order.side, order.price);
        if !self.side(order.side).contains_key(&key) {
            self.last_opener.insert(order.side, order.id);
        }
        self.order_index.insert(order.id, (order.side, order.price));
        self.side_mut(order.side)
            .entry(key)
            .or_default()
            .push_back(order);
    }

    /// Walk the opposite side best level first until `volume` is used up,
    /// the book is empty, or (for limit orders) prices stop crossing.
    fn sweep(&mut self, aggressor: &Aggressor<'_>, volume: Volume) -> Vec<Trade> {
        let mut remaining = volume;
        let mut trades = Vec::new();

        let resting_side = aggressor.side.opposite();

        while remaining > 0 {
            let opposite = match resting_side {
                Side::Buy => &mut self.bids,
                Side::Sell => &mut self.asks,
            };
            let Some(mut level) = opposite.first_entry() else {
                break;
            };
            let level_price = level.key().price;
            if !aggressor.crosses(level_price) {
                break;
            }

            // Ignored by the matcher unless it rests at this level
            let opener = self.last_opener.get(&resting_side).copied();
            let fills = self
                .matcher
                .match_with_priority(remaining, level.get_mut(), opener);
            let exhausted: Vec<OrderId> = fills
                .iter()
                .filter(|fill| !level.get().iter().any(|o| o.id == fill.order_id))
                .map(|fill| fill.order_id)
                .collect();
            if level.get().is_empty() {
                level.remove();
            }
            if fills.is_empty() {
                break;
            }

            for order_id in exhausted {
                self.order_index.remove(&order_id);
            }
            for fill in fills {
                remaining = remaining.saturating_sub(fill.volume);
                self.last_trade_id += 1;
                trades.push(Trade {
                    id: self.last_trade_id,
                    timestamp: aggressor.timestamp,
                    direction: aggressor.side,
                    aggressing_order_id: aggressor.id,
                    aggressing_owner: aggressor.owner.to_string(),
                    resting_order_id: fill.order_id,
                    resting_owner: fill.owner,
                    volume: fill.volume,
                    price: level_price,
                });
            }
        }

        trades
    }

    fn side(&self, side: Side) -> &BTreeMap<PriceKey, VecDeque<LimitOrder>> {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn side_mut(&mut self, side: Side) -> &mut BTreeMap<PriceKey, VecDeque<LimitOrder>> {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    fn level(price: Money, queue: &VecDeque<LimitOrder>) -> PriceLevel {
        PriceLevel {
            price,
            volume: queue
                .iter()
                .fold(0, |total: Volume, o| total.saturating_add(o.volume)),
            order_count: queue.len(),
        }
    }
}
