//! Simulation error types.

use propguard_domain::DomainError;
use propguard_engine::EngineError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors raised while building feeds or replaying them into a session.
#[derive(Debug, Error)]
pub enum SimError {
    /// Engine rejected an event
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Invalid value object (e.g. non-positive starting price)
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Random-walk step must be positive
    #[error("Invalid step: {0} (must be > 0)")]
    InvalidStep(Decimal),
}

/// Result type for simulation operations.
pub type SimResult<T> = Result<T, SimError>;
