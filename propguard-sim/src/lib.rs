//! PropGuard Simulation Layer
//!
//! Market price sources and an in-process replay driver.
//!
//! ```text
//! RandomWalk ──▶ PacedFeed ──▶ (daemon feed task)
//! ScriptedFeed ──▶ replay(session, feed) ──▶ SessionSnapshot
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod feed;
pub mod replay;

pub use error::{SimError, SimResult};
pub use feed::{PacedFeed, PriceFeed, RandomWalk, ScriptedFeed, DEFAULT_STEP};
pub use replay::replay;
