//! Engine error types.

use propguard_domain::{DomainError, PositionId};
use thiserror::Error;

/// Errors surfaced by ledger operations.
///
/// None of these leave partial state behind: every operation validates
/// before it mutates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Validation failure (bad quantity, price, symbol, capital)
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Close requested for an id the book does not hold
    #[error("Position not found: {0}")]
    PositionNotFound(PositionId),

    /// The account breached a risk limit; no further orders this session
    #[error("Account locked: {reason}")]
    AccountLocked {
        /// Fail reason recorded when the account locked
        reason: String,
    },
}

impl EngineError {
    /// True when the error is the invalid-quantity validation failure
    pub fn is_invalid_quantity(&self) -> bool {
        matches!(self, EngineError::Domain(DomainError::InvalidQuantity(_)))
    }
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
