//! PropGuard Daemon
//!
//! Runs one simulated funded account against a synthetic price feed.
//!
//! # Usage
//!
//! ```bash
//! # Start with default configuration
//! cargo run -p propguardd
//!
//! # Reproducible walk, faster ticks
//! PROPGUARD_FEED_SEED=42 PROPGUARD_TICK_INTERVAL_MS=100 cargo run -p propguardd
//! ```
//!
//! # Environment Variables
//!
//! - `PROPGUARD_ENV`: Environment (test, development, production)
//! - `PROPGUARD_STARTING_CAPITAL`: Funding amount (default: 1000000)
//! - `PROPGUARD_STEP_MODE`: Evaluation path: zero, 1 step, 2 step (default: 2 step)
//! - `PROPGUARD_INITIAL_PRICE`: Price before the first tick (default: 22450.50)
//! - `PROPGUARD_TICK_INTERVAL_MS`: Feed cadence (default: 1000)
//! - `PROPGUARD_PRICE_STEP`: Random-walk step (default: 0.5)
//! - `PROPGUARD_FEED_SEED`: Fixed seed (default: OS entropy)
//! - `PROPGUARD_SYMBOL`: Instrument (default: NSE:NIFTY)

use propguardd::{Config, Daemon, Environment};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize tracing (JSON lines in production)
    let filter = EnvFilter::from_default_env().add_directive("propguardd=info".parse()?);
    let registry = tracing_subscriber::registry().with(filter);
    if config.environment == Environment::Production {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = %config.environment,
        starting_capital = %config.account.starting_capital,
        step_mode = %config.account.step_mode,
        initial_price = %config.account.initial_price,
        "PropGuard Daemon"
    );

    // Create and run daemon
    let daemon = Daemon::from_config(config)?;
    let snapshot = daemon.run().await?;

    println!("{}", serde_json::to_string_pretty(&snapshot.stats)?);

    Ok(())
}
