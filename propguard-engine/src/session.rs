//! Session: one funded account from funding to lock or reset.
//!
//! The session bundles the ledger, the position book and the trade history
//! and is the only way to change them. Every input is a [`SessionEvent`]; the
//! pure transition is
//!
//! ```text
//! apply(event) → SessionSnapshot
//! ```
//!
//! so any front end (polling, push, request/response) can drive it.
//!
//! # Example
//!
//! ```
//! use propguard_domain::{OrderRequest, Price, SessionEvent, Symbol};
//! use propguard_engine::Session;
//! use rust_decimal_macros::dec;
//!
//! let mut session = Session::new(dec!(1000000)).unwrap();
//! let nifty = Symbol::parse("NSE:NIFTY").unwrap();
//!
//! session.apply(SessionEvent::PriceTick { price: Price::new(dec!(100)).unwrap() }).unwrap();
//! session.apply(SessionEvent::PlaceOrder(OrderRequest::buy(nifty, dec!(10)))).unwrap();
//! let snapshot = session
//!     .apply(SessionEvent::PriceTick { price: Price::new(dec!(105)).unwrap() })
//!     .unwrap();
//!
//! assert_eq!(snapshot.stats.daily_pnl, dec!(50));
//! assert_eq!(snapshot.stats.equity, dec!(1000050));
//! ```

use chrono::{DateTime, Utc};
use propguard_domain::{
    AccountStats, Breach, ChallengeTier, DomainError, OrderRequest, Position, PositionId, Price,
    SessionEvent, SessionId, StepMode, TierLimits, Trade,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::book::PositionBook;
use crate::error::EngineResult;
use crate::gateway::{Fill, OrderGateway};
use crate::history::TradeHistory;
use crate::ledger::AccountLedger;
use crate::metrics::RiskMetrics;

/// Market price before the first tick arrives
pub const DEFAULT_REFERENCE_PRICE: Decimal = dec!(22450.50);

/// Largest funding amount a session accepts
pub const MAX_STARTING_CAPITAL: Decimal = dec!(1000000000000000);

// =============================================================================
// Configuration
// =============================================================================

/// Parameters fixed when an account is funded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Funding amount, > 0
    pub starting_capital: Decimal,
    /// Evaluation path (decides the starting tier)
    pub step_mode: StepMode,
    /// Market price used until the first tick
    pub initial_price: Price,
}

impl SessionConfig {
    /// Default config for the given capital: two-step path, reference price.
    pub fn with_capital(starting_capital: Decimal) -> EngineResult<Self> {
        Ok(Self {
            starting_capital,
            step_mode: StepMode::TwoStep,
            initial_price: Price::new(DEFAULT_REFERENCE_PRICE)?,
        })
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// Result of closing a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Closed {
    /// Position as it was when closed; `pnl` is the realized amount
    pub position: Position,
    /// Synthetic offsetting trade appended to history
    pub trade: Trade,
    /// Breach triggered by the post-close recompute, if it locked the account
    pub breach: Option<Breach>,
}

/// Consistent read-only view of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub tier: ChallengeTier,
    pub step_mode: StepMode,
    pub market_price: Price,
    pub stats: AccountStats,
    /// Open positions in opening order
    pub positions: Vec<Position>,
    /// Trades, newest first
    pub trades: Vec<Trade>,
    pub risk: RiskMetrics,
    pub taken_at: DateTime<Utc>,
}

impl SessionSnapshot {
    /// Equity identity check: `equity == balance + Σ pnl`.
    pub fn equity_is_consistent(&self) -> bool {
        let unrealized: Decimal = self.positions.iter().map(|p| p.pnl).sum();
        self.stats.equity == self.stats.balance + unrealized
    }
}

// =============================================================================
// Session
// =============================================================================

/// One simulated funded account.
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    config: SessionConfig,
    tier: ChallengeTier,
    limits: TierLimits,
    market_price: Price,
    book: PositionBook,
    ledger: AccountLedger,
    history: TradeHistory,
    gateway: OrderGateway,
}

impl Session {
    /// Fund a session with default settings.
    ///
    /// # Errors
    /// `DomainError::InvalidCapital` if `starting_capital <= 0` or above
    /// `MAX_STARTING_CAPITAL`
    pub fn new(starting_capital: Decimal) -> EngineResult<Self> {
        Self::with_config(SessionConfig::with_capital(starting_capital)?)
    }

    /// Fund a session from explicit parameters.
    ///
    /// # Errors
    /// `DomainError::InvalidCapital` if `starting_capital <= 0` or above
    /// `MAX_STARTING_CAPITAL`
    pub fn with_config(config: SessionConfig) -> EngineResult<Self> {
        if config.starting_capital <= Decimal::ZERO {
            return Err(DomainError::InvalidCapital(format!(
                "Starting capital must be positive, got {}",
                config.starting_capital
            ))
            .into());
        }
        if config.starting_capital > MAX_STARTING_CAPITAL {
            return Err(DomainError::InvalidCapital(format!(
                "Starting capital must be at most {}, got {}",
                MAX_STARTING_CAPITAL, config.starting_capital
            ))
            .into());
        }

        let tier = config.step_mode.starting_tier();
        let limits = tier.limits();
        let session = Self {
            id: Uuid::now_v7(),
            config,
            tier,
            limits,
            market_price: config.initial_price,
            book: PositionBook::new(),
            ledger: AccountLedger::new(config.starting_capital, &limits),
            history: TradeHistory::new(),
            gateway: OrderGateway,
        };

        info!(
            session_id = %session.id,
            starting_capital = %config.starting_capital,
            step_mode = %config.step_mode,
            %tier,
            daily_loss_limit = %session.ledger.stats().daily_loss_limit,
            drawdown_floor = %session.ledger.drawdown_floor(),
            "Session funded"
        );

        Ok(session)
    }

    /// Apply one event and return the resulting snapshot.
    ///
    /// Rejected events leave the session unchanged.
    pub fn apply(&mut self, event: SessionEvent) -> EngineResult<SessionSnapshot> {
        debug!(session_id = %self.id, kind = event.kind(), "Applying event");

        match event {
            SessionEvent::PriceTick { price } => {
                self.apply_price_tick(price);
            }
            SessionEvent::PlaceOrder(request) => {
                self.place_order(&request)?;
            }
            SessionEvent::ClosePosition { position_id } => {
                self.close_position(position_id)?;
            }
        }

        Ok(self.snapshot())
    }

    /// Mark every position at `price` and re-evaluate risk.
    ///
    /// Returns the breach if this tick locked the account.
    pub fn apply_price_tick(&mut self, price: Price) -> Option<Breach> {
        self.market_price = price;
        self.book.apply_price_tick(price);
        self.ledger.recompute_and_evaluate(&self.book)
    }

    /// Place an order at the current market price.
    ///
    /// # Errors
    /// - `EngineError::AccountLocked` once the account is locked
    /// - `EngineError::Domain(InvalidQuantity)` for a non-positive or fractional quantity
    pub fn place_order(&mut self, request: &OrderRequest) -> EngineResult<Fill> {
        self.gateway.place(
            &mut self.ledger,
            &mut self.book,
            &mut self.history,
            request,
            self.market_price,
        )
    }

    /// Close a position at the current market price.
    ///
    /// Realized P&L goes to balance and an offsetting trade is recorded.
    ///
    /// # Errors
    /// `EngineError::PositionNotFound` if `id` is not open. Nothing changes.
    pub fn close_position(&mut self, id: PositionId) -> EngineResult<Closed> {
        let (position, breach) = self.ledger.close_position(&mut self.book, id)?;
        let trade = Trade::offsetting(&position, self.market_price);
        self.history.record(trade.clone());

        Ok(Closed { position, trade, breach })
    }

    /// Consistent view of the whole session.
    pub fn snapshot(&self) -> SessionSnapshot {
        let stats = self.ledger.stats().clone();
        SessionSnapshot {
            session_id: self.id,
            tier: self.tier,
            step_mode: self.config.step_mode,
            market_price: self.market_price,
            risk: RiskMetrics::compute(&stats, &self.limits),
            stats,
            positions: self.book.positions().to_vec(),
            trades: self.history.iter().cloned().collect(),
            taken_at: Utc::now(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Parameters the session was funded with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current tier.
    pub fn tier(&self) -> ChallengeTier {
        self.tier
    }

    /// Limits in force for the current tier.
    pub fn limits(&self) -> &TierLimits {
        &self.limits
    }

    /// Last observed market price.
    pub fn market_price(&self) -> Price {
        self.market_price
    }

    /// Current account figures.
    pub fn stats(&self) -> &AccountStats {
        self.ledger.stats()
    }

    /// Open positions in opening order.
    pub fn positions(&self) -> &[Position] {
        self.book.positions()
    }

    /// Trade history, newest first.
    pub fn trades(&self) -> &TradeHistory {
        &self.history
    }

    /// True once a risk limit has been breached.
    pub fn is_locked(&self) -> bool {
        self.ledger.is_locked()
    }
}

// =============================================================================
// Tests
// =============================================================================
