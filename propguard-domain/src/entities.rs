//! Domain Entities for PropGuard
//!
//! Core business entities with identity.
//! Positions are mutable while open; trades are immutable once recorded.

use crate::policy::{Breach, TierLimits};
use crate::value_objects::{OrderSide, Price, Quantity, Symbol};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// IDs
// =============================================================================

/// Unique identifier for a Position
pub type PositionId = Uuid;

/// Unique identifier for a Trade
pub type TradeId = Uuid;

/// Unique identifier for a Session
pub type SessionId = Uuid;

// =============================================================================
// Position
// =============================================================================

/// Open exposure on one `(symbol, side)` pair
///
/// Gross model: a BUY and a SELL position on the same symbol are tracked
/// independently and never netted.
///
/// `quantity` stays within `Quantity::MAX_LOTS` (the gateway refuses fills
/// that would grow past it), so `mark` and `increase` cannot overflow for any
/// valid `Price`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: PositionId,
    pub symbol: Symbol,
    pub side: OrderSide,
    /// Volume-weighted average entry price
    pub avg_price: Price,
    pub quantity: Quantity,
    /// Unrealized P&L at the last mark
    pub pnl: Decimal,
    pub opened_at: DateTime<Utc>,
}

impl Position {
    /// Open a new position at `price` with zero P&L
    pub fn open(symbol: Symbol, side: OrderSide, quantity: Quantity, price: Price) -> Self {
        Self {
            id: Uuid::now_v7(),
            symbol,
            side,
            avg_price: price,
            quantity,
            pnl: Decimal::ZERO,
            opened_at: Utc::now(),
        }
    }

    /// Whether an order for `(symbol, side)` merges into this position
    pub fn matches(&self, symbol: &Symbol, side: OrderSide) -> bool {
        self.side == side && &self.symbol == symbol
    }

    /// Add a same-side fill, re-weighting the average entry price
    ///
    /// ```text
    /// avg' = (avg × qty + price × add) / (qty + add)
    /// qty' = qty + add
    /// ```
    pub fn increase(&mut self, quantity: Quantity, price: Price) {
        let old_qty = self.quantity.as_decimal();
        let add_qty = quantity.as_decimal();
        let weighted = self.avg_price.as_decimal() * old_qty + price.as_decimal() * add_qty;

        // Both terms are positive, so the average stays a valid Price
        self.avg_price = Price::new(weighted / (old_qty + add_qty)).unwrap_or(self.avg_price);
        self.quantity = self.quantity.plus(quantity);
    }

    /// Recompute unrealized P&L against `price`
    ///
    /// Idempotent for a fixed price.
    pub fn mark(&mut self, price: Price) {
        self.pnl = self.side.unit_pnl(self.avg_price, price) * self.quantity.as_decimal();
    }
}

// =============================================================================
// Trade
// =============================================================================

/// Trade status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    /// Executed
    Completed,
    /// Never executed
    Cancelled,
}

/// Immutable record of an execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: TradeId,
    pub symbol: Symbol,
    pub side: OrderSide,
    /// Execution price (market price at order time)
    pub price: Price,
    pub quantity: Quantity,
    pub executed_at: DateTime<Utc>,
    pub status: TradeStatus,
}

impl Trade {
    /// Record a completed execution
    pub fn completed(symbol: Symbol, side: OrderSide, quantity: Quantity, price: Price) -> Self {
        Self {
            id: Uuid::now_v7(),
            symbol,
            side,
            price,
            quantity,
            executed_at: Utc::now(),
            status: TradeStatus::Completed,
        }
    }

    /// Synthesize the trade that flattens `position` at `price`
    pub fn offsetting(position: &Position, price: Price) -> Self {
        Self::completed(position.symbol.clone(), position.side.opposite(), position.quantity, price)
    }
}

// =============================================================================
// Account Stats
// =============================================================================

/// Lifecycle of a funded account
///
/// `Active → Locked` happens at most once; `Locked` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountState {
    /// Trading allowed
    Active,
    /// A risk limit was breached, trading disabled for the session
    Locked,
}

/// Account figures for one session
///
/// # Invariants
/// - `equity == balance + Σ unrealized pnl`
/// - `daily_loss_limit` and `max_drawdown` never change after funding
/// - `is_locked` only goes false → true
/// - `fail_reason.is_some() == is_locked`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountStats {
    /// Funding amount; basis of every limit and of the drawdown floor
    pub starting_capital: Decimal,
    /// Realized capital
    pub balance: Decimal,
    /// Tracked, not enforced
    pub buying_power: Decimal,
    pub equity: Decimal,
    /// Floating P&L of the session (`equity - balance`)
    pub daily_pnl: Decimal,
    pub daily_loss_limit: Decimal,
    pub max_drawdown: Decimal,
    pub is_locked: bool,
    /// First breach detected, never overwritten
    pub fail_reason: Option<Breach>,
}

impl AccountStats {
    /// Fresh stats for a newly funded account
    pub fn funded(starting_capital: Decimal, limits: &TierLimits) -> Self {
        Self {
            starting_capital,
            balance: starting_capital,
            buying_power: starting_capital,
            equity: starting_capital,
            daily_pnl: Decimal::ZERO,
            daily_loss_limit: limits.daily_loss_limit(starting_capital),
            max_drawdown: limits.max_drawdown(starting_capital),
            is_locked: false,
            fail_reason: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> AccountState {
        if self.is_locked {
            AccountState::Locked
        } else {
            AccountState::Active
        }
    }

    /// Human-readable fail reason, if locked
    pub fn fail_message(&self) -> Option<String> {
        self.fail_reason.map(|breach| breach.to_string())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ChallengeTier;
    use rust_decimal_macros::dec;

    fn nifty() -> Symbol {
        Symbol::parse("NSE:NIFTY").unwrap()
    }

    fn price(value: Decimal) -> Price {
        Price::new(value).unwrap()
    }

    fn qty(value: Decimal) -> Quantity {
        Quantity::new(value).unwrap()
    }

    #[test]
    fn test_position_open() {
        let position = Position::open(nifty(), OrderSide::Buy, qty(dec!(50)), price(dec!(100)));

        assert_eq!(position.avg_price.as_decimal(), dec!(100));
        assert_eq!(position.pnl, Decimal::ZERO);
        assert!(position.matches(&nifty(), OrderSide::Buy));
        assert!(!position.matches(&nifty(), OrderSide::Sell));
    }

    #[test]
    fn test_position_increase_weights_average() {
        let mut position = Position::open(nifty(), OrderSide::Buy, qty(dec!(50)), price(dec!(100)));
        position.increase(qty(dec!(50)), price(dec!(110)));

        assert_eq!(position.quantity.as_decimal(), dec!(100));
        assert_eq!(position.avg_price.as_decimal(), dec!(105));
    }

    #[test]
    fn test_position_increase_uneven_sizes() {
        let mut position =
            Position::open(nifty(), OrderSide::Sell, qty(dec!(30)), price(dec!(200)));
        position.increase(qty(dec!(10)), price(dec!(240)));

        // (200*30 + 240*10) / 40 = 210
        assert_eq!(position.avg_price.as_decimal(), dec!(210));
    }

    #[test]
    fn test_position_mark_long_and_short() {
        let mut long = Position::open(nifty(), OrderSide::Buy, qty(dec!(10)), price(dec!(100)));
        let mut short = Position::open(nifty(), OrderSide::Sell, qty(dec!(10)), price(dec!(100)));

        long.mark(price(dec!(97)));
        short.mark(price(dec!(97)));

        assert_eq!(long.pnl, dec!(-30));
        assert_eq!(short.pnl, dec!(30));

        // Idempotent
        long.mark(price(dec!(97)));
        assert_eq!(long.pnl, dec!(-30));
    }

    #[test]
    fn test_offsetting_trade() {
        let position = Position::open(nifty(), OrderSide::Buy, qty(dec!(5)), price(dec!(100)));
        let trade = Trade::offsetting(&position, price(dec!(120)));

        assert_eq!(trade.side, OrderSide::Sell);
        assert_eq!(trade.quantity, position.quantity);
        assert_eq!(trade.price.as_decimal(), dec!(120));
        assert_eq!(trade.status, TradeStatus::Completed);
    }

    #[test]
    fn test_funded_stats() {
        let stats = AccountStats::funded(dec!(1000000), &ChallengeTier::Student.limits());

        assert_eq!(stats.balance, dec!(1000000));
        assert_eq!(stats.buying_power, dec!(1000000));
        assert_eq!(stats.equity, dec!(1000000));
        assert_eq!(stats.daily_loss_limit, dec!(50000));
        assert_eq!(stats.max_drawdown, dec!(100000));
        assert_eq!(stats.state(), AccountState::Active);
        assert!(stats.fail_message().is_none());
    }
}
