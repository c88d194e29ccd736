//! PropGuard Daemon Library
//!
//! Runtime shell around one risk-guarded session.
//!
//! # Architecture
//!
//! ```text
//! PriceFeed → Feed Task ─┐
//!                        ├→ Session Actor (Session) → Event Bus → subscribers
//! SessionHandle ─────────┘
//! ```
//!
//! # Components
//!
//! - **Daemon**: Main runtime orchestrator
//! - **Session Actor**: Single writer; applies ticks, orders and closes in order
//! - **Event Bus**: Snapshot and lock-transition fan-out
//! - **Config**: Environment-based configuration
//!
//! # Example
//!
//! ```rust,ignore
//! use propguardd::{Config, Daemon};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = Config::from_env().expect("Failed to load config");
//!     let daemon = Daemon::from_config(config).expect("Failed to fund session");
//!     daemon.run().await.expect("Daemon error");
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod daemon;
pub mod error;
pub mod event_bus;
pub mod session_actor;

// Re-exports for convenience
pub use config::{AccountConfig, Config, Environment, FeedConfig};
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
pub use event_bus::{AccountLocked, DaemonEvent, EventBus, EventReceiver};
pub use session_actor::{Command, SessionActor, SessionHandle};
