//! Daemon error types.

use propguard_domain::DomainError;
use propguard_engine::EngineError;
use propguard_sim::SimError;
use thiserror::Error;

/// Daemon-level errors.
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Domain error
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Engine error (rejected order, unknown position, locked account)
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Price feed construction error
    #[error("Simulation error: {0}")]
    Sim(#[from] SimError),

    /// Session actor channel closed or reply dropped
    #[error("Channel error: {0}")]
    Channel(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Shutdown requested
    #[error("Shutdown requested")]
    Shutdown,
}

/// Result type for daemon operations.
pub type DaemonResult<T> = Result<T, DaemonError>;
