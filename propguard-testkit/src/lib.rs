//! Test helpers for PropGuard sessions.
//!
//! Provides fixture builders (sessions, prices, events) and invariant checks
//! shared by the integration tests of the sim and daemon crates.

mod helpers;
mod invariants;

pub use helpers::{
    buy, close, drive, funded_session, nifty, price, sell, session_at, tick, STARTING_CAPITAL,
};
pub use invariants::{assert_equity_identity, LockWatch};

pub use anyhow::Result;
