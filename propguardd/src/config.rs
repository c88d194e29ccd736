//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use propguard_domain::{Price, StepMode, Symbol};
use propguard_engine::{SessionConfig, DEFAULT_REFERENCE_PRICE, MAX_STARTING_CAPITAL};
use propguard_sim::DEFAULT_STEP;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::{DaemonError, DaemonResult};

/// Default funding amount
pub const DEFAULT_STARTING_CAPITAL: Decimal = dec!(1000000);

/// Default instrument
pub const DEFAULT_SYMBOL: &str = "NSE:NIFTY";

const DEFAULT_TICK_INTERVAL_MS: u64 = 1000;

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Account funding parameters
    pub account: AccountConfig,

    /// Synthetic price feed parameters
    pub feed: FeedConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// Account funding configuration.
#[derive(Debug, Clone)]
pub struct AccountConfig {
    /// Funding amount (> 0)
    pub starting_capital: Decimal,
    /// Evaluation path
    pub step_mode: StepMode,
    /// Market price before the first tick (> 0)
    pub initial_price: Decimal,
    /// Instrument label for the feed, `EXCHANGE:TICKER`
    ///
    /// Informational: it appears in logs only. Ticks carry no symbol and mark
    /// every open position.
    pub symbol: String,
}

/// Price feed configuration.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Time between ticks
    pub tick_interval: Duration,
    /// Random-walk step (each tick moves at most ±step/2)
    pub price_step: Decimal,
    /// Fixed seed for a reproducible walk; `None` uses OS entropy
    pub seed: Option<u64>,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let account = Self::load_account_config()?;
        let feed = Self::load_feed_config()?;

        Ok(Self { account, feed, environment })
    }

    /// Create test configuration: fast ticks, fixed seed.
    pub fn test() -> Self {
        let mut config = Self::default();
        config.environment = Environment::Test;
        config.feed.tick_interval = Duration::from_millis(1);
        config.feed.seed = Some(7);
        config
    }

    /// Engine parameters for funding a session.
    pub fn session_config(&self) -> DaemonResult<SessionConfig> {
        Ok(SessionConfig {
            starting_capital: self.account.starting_capital,
            step_mode: self.account.step_mode,
            initial_price: Price::new(self.account.initial_price)?,
        })
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("PROPGUARD_ENV").unwrap_or_else(|_| "development".to_string());
        env_str.parse()
    }

    fn load_account_config() -> DaemonResult<AccountConfig> {
        let starting_capital =
            Self::load_decimal_env("PROPGUARD_STARTING_CAPITAL", DEFAULT_STARTING_CAPITAL)?;
        if starting_capital <= Decimal::ZERO || starting_capital > MAX_STARTING_CAPITAL {
            return Err(DaemonError::Config(format!(
                "PROPGUARD_STARTING_CAPITAL must be in (0, {}], got {}",
                MAX_STARTING_CAPITAL, starting_capital
            )));
        }

        let step_mode = match env::var("PROPGUARD_STEP_MODE") {
            Ok(val) => StepMode::from_str(&val)
                .map_err(|_| DaemonError::Config(format!("Invalid PROPGUARD_STEP_MODE: {}", val)))?,
            Err(_) => StepMode::TwoStep,
        };

        let initial_price =
            Self::load_decimal_env("PROPGUARD_INITIAL_PRICE", DEFAULT_REFERENCE_PRICE)?;
        Price::new(initial_price).map_err(|_| {
            DaemonError::Config(format!("Invalid PROPGUARD_INITIAL_PRICE: {}", initial_price))
        })?;

        let symbol = env::var("PROPGUARD_SYMBOL").unwrap_or_else(|_| DEFAULT_SYMBOL.to_string());
        let symbol = Symbol::parse(&symbol)
            .map_err(|_| DaemonError::Config(format!("Invalid PROPGUARD_SYMBOL: {}", symbol)))?
            .to_string();

        Ok(AccountConfig {
            starting_capital,
            step_mode,
            initial_price,
            symbol,
        })
    }

    fn load_feed_config() -> DaemonResult<FeedConfig> {
        let interval_ms = Self::load_u64_env("PROPGUARD_TICK_INTERVAL_MS")?
            .unwrap_or(DEFAULT_TICK_INTERVAL_MS);
        if interval_ms == 0 {
            return Err(DaemonError::Config(
                "PROPGUARD_TICK_INTERVAL_MS must be at least 1".to_string(),
            ));
        }

        let price_step = Self::load_decimal_env("PROPGUARD_PRICE_STEP", DEFAULT_STEP)?;
        if price_step <= Decimal::ZERO {
            return Err(DaemonError::Config(format!(
                "PROPGUARD_PRICE_STEP must be positive, got {}",
                price_step
            )));
        }

        Ok(FeedConfig {
            tick_interval: Duration::from_millis(interval_ms),
            price_step,
            seed: Self::load_u64_env("PROPGUARD_FEED_SEED")?,
        })
    }

    fn load_decimal_env(key: &str, default: Decimal) -> DaemonResult<Decimal> {
        match env::var(key) {
            Ok(val) => Decimal::from_str(&val)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(default),
        }
    }

    fn load_u64_env(key: &str) -> DaemonResult<Option<u64>> {
        match env::var(key) {
            Ok(val) => val
                .parse::<u64>()
                .map(Some)
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            Err(_) => Ok(None),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            account: AccountConfig {
                starting_capital: DEFAULT_STARTING_CAPITAL,
                step_mode: StepMode::TwoStep,
                initial_price: DEFAULT_REFERENCE_PRICE,
                symbol: DEFAULT_SYMBOL.to_string(),
            },
            feed: FeedConfig {
                tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
                price_step: DEFAULT_STEP,
                seed: None,
            },
            environment: Environment::Development,
        }
    }
}

impl FromStr for Environment {
    type Err = DaemonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid PROPGUARD_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
