//! Trade History: append-only record of executions, read newest first.

use propguard_domain::Trade;
use std::collections::VecDeque;

/// Executed trades, newest at the front.
#[derive(Debug, Clone, Default)]
pub struct TradeHistory {
    trades: VecDeque<Trade>,
}

impl TradeHistory {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a trade. It becomes the newest entry.
    pub fn record(&mut self, trade: Trade) {
        self.trades.push_front(trade);
    }

    /// Most recent trade.
    pub fn latest(&self) -> Option<&Trade> {
        self.trades.front()
    }

    /// Trades, newest first.
    pub fn iter(&self) -> impl Iterator<Item = &Trade> {
        self.trades.iter()
    }

    /// Number of recorded trades.
    pub fn len(&self) -> usize {
        self.trades.len()
    }

    /// True when no trade has been recorded.
    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }
}
