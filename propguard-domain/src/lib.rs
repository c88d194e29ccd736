//! PropGuard Domain Layer
//!
//! Pure domain logic with zero I/O dependencies.
//! Contains value objects, entities, the tier policy table, and session events.

#![warn(missing_docs)]
#![warn(clippy::all)]

// Public modules
#[allow(missing_docs)]
pub mod entities;
pub mod events;
pub mod policy;
pub mod value_objects;

// Re-export commonly used types
pub use entities::{
    AccountState, AccountStats, Position, PositionId, SessionId, Trade, TradeId, TradeStatus,
};
pub use events::{OrderRequest, SessionEvent};
pub use policy::{Breach, ChallengeTier, StepMode, TierLimits};
pub use value_objects::{DomainError, OrderSide, Price, Quantity, Symbol};
