//! Account Ledger: the account state machine.
//!
//! Owns the account figures and the lock latch. After every change to the
//! position book (tick, fill, close) the ledger recomputes equity and checks
//! the risk limits.
//!
//! # State Machine
//!
//! ```text
//! Active ──(daily loss or drawdown breach)──▶ Locked   (terminal)
//! ```
//!
//! # Breach Rules
//!
//! ```text
//! equity    = balance + Σ unrealized pnl
//! daily_pnl = equity - balance
//!
//! A: daily_pnl <= -daily_loss_limit                 → Daily Loss Limit Reached
//! B: equity    <= capital × (1 - max_drawdown_pct)  → Maximum Drawdown Limit Exceeded
//! ```
//!
//! A is checked first and wins a tie. The floor in B is static.

use propguard_domain::{AccountStats, Breach, Position, PositionId, TierLimits};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use crate::book::PositionBook;
use crate::error::{EngineError, EngineResult};

/// Check both risk limits against the given figures.
///
/// Pure function. Returns the breach that fires, daily loss first.
pub fn evaluate_breach(
    equity: Decimal,
    daily_pnl: Decimal,
    daily_loss_limit: Decimal,
    drawdown_floor: Decimal,
    max_drawdown: Decimal,
) -> Option<Breach> {
    if daily_pnl <= -daily_loss_limit {
        return Some(Breach::DailyLossLimit { limit: daily_loss_limit });
    }

    if equity <= drawdown_floor {
        return Some(Breach::MaxDrawdown { limit: max_drawdown });
    }

    None
}

/// Ledger for one funded account.
#[derive(Debug, Clone)]
pub struct AccountLedger {
    stats: AccountStats,
    /// Fixed at funding time from starting capital
    drawdown_floor: Decimal,
}

impl AccountLedger {
    /// Fund a new account with `starting_capital` under `limits`.
    pub fn new(starting_capital: Decimal, limits: &TierLimits) -> Self {
        Self {
            stats: AccountStats::funded(starting_capital, limits),
            drawdown_floor: limits.drawdown_floor(starting_capital),
        }
    }

    /// Recompute equity and daily P&L from the book and evaluate risk limits.
    ///
    /// Returns the breach only on the call that locks the account. Later
    /// breaches are ignored; the first fail reason stays.
    pub fn recompute_and_evaluate(&mut self, book: &PositionBook) -> Option<Breach> {
        let total_unrealized = book.total_unrealized_pnl();
        let equity = self.stats.balance + total_unrealized;
        let daily_pnl = equity - self.stats.balance;

        self.stats.equity = equity;
        self.stats.daily_pnl = daily_pnl;

        debug!(%equity, %daily_pnl, positions = book.len(), "Ledger recomputed");

        if self.stats.is_locked {
            return None;
        }

        let breach = evaluate_breach(
            equity,
            daily_pnl,
            self.stats.daily_loss_limit,
            self.drawdown_floor,
            self.stats.max_drawdown,
        )?;

        self.stats.is_locked = true;
        self.stats.fail_reason = Some(breach);

        warn!(
            reason = %breach,
            %equity,
            %daily_pnl,
            balance = %self.stats.balance,
            "Account locked"
        );

        Some(breach)
    }

    /// Close a position, realize its P&L into balance, and re-evaluate.
    ///
    /// Allowed while locked: closing never adds exposure.
    ///
    /// # Errors
    /// `EngineError::PositionNotFound` if `id` is not open. Nothing changes.
    pub fn close_position(
        &mut self,
        book: &mut PositionBook,
        id: PositionId,
    ) -> EngineResult<(Position, Option<Breach>)> {
        let closed = book.close(id)?;
        self.stats.balance += closed.pnl;

        info!(
            position_id = %closed.id,
            symbol = %closed.symbol,
            side = %closed.side,
            realized_pnl = %closed.pnl,
            balance = %self.stats.balance,
            "Position closed"
        );

        let breach = self.recompute_and_evaluate(book);
        Ok((closed, breach))
    }

    /// Fail unless the account can still trade.
    ///
    /// # Errors
    /// `EngineError::AccountLocked` with the recorded fail reason.
    pub fn ensure_active(&self) -> EngineResult<()> {
        if self.stats.is_locked {
            return Err(EngineError::AccountLocked {
                reason: self.stats.fail_message().unwrap_or_default(),
            });
        }
        Ok(())
    }

    /// True once a risk limit has been breached.
    pub fn is_locked(&self) -> bool {
        self.stats.is_locked
    }

    /// Equity level at or below which the account locks.
    pub fn drawdown_floor(&self) -> Decimal {
        self.drawdown_floor
    }

    /// Current account figures.
    pub fn stats(&self) -> &AccountStats {
        &self.stats
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use propguard_domain::{ChallengeTier, OrderSide, Price, Quantity, Symbol};
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn ledger(capital: Decimal) -> AccountLedger {
        AccountLedger::new(capital, &ChallengeTier::Master.limits())
    }

    fn price(value: Decimal) -> Price {
        Price::new(value).unwrap()
    }

    fn open(book: &mut PositionBook, side: OrderSide, qty: Decimal, at: Decimal) -> PositionId {
        let symbol = Symbol::parse("NSE:NIFTY").unwrap();
        book.open_or_increase(side, &symbol, Quantity::new(qty).unwrap(), price(at))
    }

    /// 1M account: 50k daily limit, 900k floor, 100k max drawdown.
    fn evaluate(equity: Decimal, daily_pnl: Decimal) -> Option<Breach> {
        evaluate_breach(equity, daily_pnl, dec!(50000), dec!(900000), dec!(100000))
    }

    #[test]
    fn test_evaluate_no_breach() {
        let breach = evaluate(dec!(990000), dec!(-10000));
        assert_eq!(breach, None);
    }

    #[test]
    fn test_evaluate_daily_loss_at_boundary() {
        let breach = evaluate(dec!(950000), dec!(-50000));
        assert_eq!(breach, Some(Breach::DailyLossLimit { limit: dec!(50000) }));
    }

    #[test]
    fn test_evaluate_drawdown_at_boundary() {
        let breach = evaluate(dec!(900000), dec!(-1));
        assert_eq!(breach, Some(Breach::MaxDrawdown { limit: dec!(100000) }));
    }

    #[test]
    fn test_evaluate_tie_prefers_daily_loss() {
        let breach = evaluate(dec!(850000), dec!(-150000));
        assert!(matches!(breach, Some(Breach::DailyLossLimit { .. })));
    }

    #[test]
    fn test_equity_identity_after_tick() {
        let mut ledger = ledger(dec!(1000000));
        let mut book = PositionBook::new();
        open(&mut book, OrderSide::Buy, dec!(100), dec!(100));
        open(&mut book, OrderSide::Sell, dec!(40), dec!(100));

        book.apply_price_tick(price(dec!(103)));
        ledger.recompute_and_evaluate(&book);

        let stats = ledger.stats();
        assert_eq!(stats.equity, stats.balance + book.total_unrealized_pnl());
        assert_eq!(stats.daily_pnl, dec!(180)); // 300 - 120
    }

    #[test]
    fn test_daily_loss_locks_account() {
        let mut ledger = ledger(dec!(1000000));
        let mut book = PositionBook::new();
        // 1000 lots, 50.001 per lot → -50,001
        open(&mut book, OrderSide::Buy, dec!(1000), dec!(100));
        book.apply_price_tick(price(dec!(49.999)));

        let breach = ledger.recompute_and_evaluate(&book);

        assert!(matches!(breach, Some(Breach::DailyLossLimit { .. })));
        assert!(ledger.is_locked());
        let reason = ledger.stats().fail_message().unwrap();
        assert!(reason.contains("Daily Loss Limit Reached"));
    }

    #[test]
    fn test_lock_is_reported_once_and_reason_kept() {
        let mut ledger = ledger(dec!(1000000));
        let mut book = PositionBook::new();
        open(&mut book, OrderSide::Buy, dec!(1000), dec!(100));

        book.apply_price_tick(price(dec!(40)));
        assert!(ledger.recompute_and_evaluate(&book).is_some());

        // Deeper loss, now both limits breach: reason must not change
        book.apply_price_tick(price(dec!(1)));
        assert!(ledger.recompute_and_evaluate(&book).is_none());
        assert_eq!(
            ledger.stats().fail_reason,
            Some(Breach::DailyLossLimit { limit: dec!(50000) })
        );

        // Recovery does not unlock
        book.apply_price_tick(price(dec!(500)));
        ledger.recompute_and_evaluate(&book);
        assert!(ledger.is_locked());
        assert!(ledger.stats().equity > dec!(1000000));
    }

    #[test]
    fn test_close_realizes_pnl_into_balance() {
        let mut ledger = ledger(dec!(1000000));
        let mut book = PositionBook::new();
        let id = open(&mut book, OrderSide::Buy, dec!(100), dec!(100));
        book.apply_price_tick(price(dec!(150)));
        ledger.recompute_and_evaluate(&book);

        let (closed, breach) = ledger.close_position(&mut book, id).unwrap();

        assert_eq!(closed.pnl, dec!(5000));
        assert!(breach.is_none());
        assert_eq!(ledger.stats().balance, dec!(1005000));
        assert_eq!(ledger.stats().equity, dec!(1005000));
        assert_eq!(ledger.stats().daily_pnl, Decimal::ZERO);
    }

    #[test]
    fn test_close_unknown_leaves_ledger_untouched() {
        let mut ledger = ledger(dec!(1000000));
        let mut book = PositionBook::new();
        let before = ledger.stats().clone();
        let missing = Uuid::now_v7();

        let result = ledger.close_position(&mut book, missing);

        assert_eq!(result.unwrap_err(), EngineError::PositionNotFound(missing));
        assert_eq!(ledger.stats(), &before);
    }

    #[test]
    fn test_static_floor_does_not_trail_profits() {
        let mut ledger = ledger(dec!(1000000));
        let mut book = PositionBook::new();
        let floor = ledger.drawdown_floor();

        let id = open(&mut book, OrderSide::Buy, dec!(1000), dec!(100));
        book.apply_price_tick(price(dec!(140)));
        ledger.close_position(&mut book, id).unwrap();

        assert_eq!(ledger.stats().balance, dec!(1040000));
        assert_eq!(ledger.drawdown_floor(), floor);
        assert_eq!(ledger.stats().max_drawdown, dec!(100000));
    }

    #[test]
    fn test_ensure_active() {
        let mut ledger = ledger(dec!(1000000));
        assert!(ledger.ensure_active().is_ok());

        let mut book = PositionBook::new();
        open(&mut book, OrderSide::Sell, dec!(1000), dec!(100));
        book.apply_price_tick(price(dec!(200)));
        ledger.recompute_and_evaluate(&book);

        match ledger.ensure_active() {
            Err(EngineError::AccountLocked { reason }) => {
                assert!(reason.starts_with("Daily Loss Limit Reached"));
            }
            other => panic!("Expected AccountLocked, got {:?}", other),
        }
    }
}
