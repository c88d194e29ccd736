//! PropGuard Engine Layer
//!
//! Risk-guarded position/account ledger. Pure and deterministic, no I/O.
//! Takes an event → returns the new session snapshot.
//!
//! # Components
//!
//! - **PositionBook**: open positions, re-marked on every tick (gross model)
//! - **AccountLedger**: balance, equity, daily P&L and the one-way lock latch
//! - **OrderGateway**: validate-then-commit order placement
//! - **TradeHistory**: append-only executions, newest first
//! - **Session**: owns all of the above and applies `SessionEvent`s
//! - **RiskMetrics**: read-only usage gauges for dashboards
//!
//! # Data Flow
//!
//! ```text
//! PriceTick   → PositionBook (mark) → AccountLedger (recompute, maybe lock)
//! PlaceOrder  → OrderGateway → PositionBook + TradeHistory → AccountLedger
//! Close       → AccountLedger (realize) → PositionBook + TradeHistory
//! ```

#![warn(clippy::all)]

pub mod book;
pub mod error;
pub mod gateway;
pub mod history;
pub mod ledger;
pub mod metrics;
pub mod session;

// Re-exports for convenience
pub use book::PositionBook;
pub use error::{EngineError, EngineResult};
pub use gateway::{Fill, OrderGateway, ValidatedOrder};
pub use history::TradeHistory;
pub use ledger::{evaluate_breach, AccountLedger};
pub use metrics::RiskMetrics;
pub use session::{
    Closed, Session, SessionConfig, SessionSnapshot, DEFAULT_REFERENCE_PRICE, MAX_STARTING_CAPITAL,
};
