//! Price feeds.
//!
//! The engine never pulls prices on its own; something outside the session
//! produces ticks and hands them in. `PriceFeed` is that seam.
//!
//! Implementations:
//! - `RandomWalk` - seeded synthetic index, one step per call
//! - `PacedFeed` - wraps another feed with a fixed cadence (1 Hz by default in the daemon)
//! - `ScriptedFeed` - fixed sequence, for tests and replays

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use propguard_domain::Price;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::trace;

use crate::error::{SimError, SimResult};

/// Default random-walk step: each tick moves by at most ±0.25
pub const DEFAULT_STEP: Decimal = dec!(0.5);

/// Resolution of the uniform draw in `[0, 1)`
const UNIT_SCALE: i64 = 1_000_000;
const UNIT_DP: u32 = 6;

/// Prices are quoted to two decimal places
const PRICE_DP: u32 = 2;

// =============================================================================
// Port
// =============================================================================

/// Source of market prices.
#[async_trait]
pub trait PriceFeed: Send {
    /// Next price, or `None` once the feed has ended.
    async fn next_price(&mut self) -> Option<Price>;
}

// =============================================================================
// Random Walk
// =============================================================================

/// Seeded random walk: `next = prev + (u - 0.5) × step`, `u ∈ [0, 1)`.
///
/// A step that would take the price to zero or below is discarded and the
/// previous price is repeated.
#[derive(Debug, Clone)]
pub struct RandomWalk {
    price: Price,
    step: Decimal,
    rng: StdRng,
}

impl RandomWalk {
    /// Create a walk starting at `initial`.
    ///
    /// `seed = None` draws the seed from OS entropy.
    ///
    /// # Errors
    /// - `DomainError::InvalidPrice` if `initial <= 0`
    /// - `SimError::InvalidStep` if `step <= 0`
    pub fn new(initial: Decimal, step: Decimal, seed: Option<u64>) -> SimResult<Self> {
        let price = Price::new(initial)?;
        if step <= Decimal::ZERO {
            return Err(SimError::InvalidStep(step));
        }

        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self { price, step, rng })
    }

    /// Advance one tick and return the new price.
    pub fn step(&mut self) -> Price {
        let u = Decimal::new(self.rng.gen_range(0..UNIT_SCALE), UNIT_DP);
        let next = (self.price.as_decimal() + (u - dec!(0.5)) * self.step).round_dp(PRICE_DP);

        match Price::new(next) {
            Ok(price) => self.price = price,
            Err(_) => trace!(%next, "Discarding non-positive step"),
        }

        self.price
    }

    /// Advance `ticks` times and collect the path.
    pub fn path(&mut self, ticks: usize) -> Vec<Price> {
        (0..ticks).map(|_| self.step()).collect()
    }

    /// Last produced price (the initial price before the first step).
    pub fn current(&self) -> Price {
        self.price
    }
}

#[async_trait]
impl PriceFeed for RandomWalk {
    async fn next_price(&mut self) -> Option<Price> {
        Some(self.step())
    }
}

// =============================================================================
// Paced Feed
// =============================================================================

/// Feed that yields at most one price per `period`.
///
/// Must be created inside a tokio runtime.
#[derive(Debug)]
pub struct PacedFeed<F> {
    inner: F,
    interval: Interval,
}

impl<F: PriceFeed> PacedFeed<F> {
    /// Wrap `inner`, pacing it to `period` (minimum 1ms).
    pub fn new(inner: F, period: Duration) -> Self {
        let mut interval = tokio::time::interval(period.max(Duration::from_millis(1)));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { inner, interval }
    }

    /// Tick period.
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl<F: PriceFeed> PriceFeed for PacedFeed<F> {
    async fn next_price(&mut self) -> Option<Price> {
        self.interval.tick().await;
        self.inner.next_price().await
    }
}

// =============================================================================
// Scripted Feed
// =============================================================================

/// Feed that replays a fixed sequence, then ends.
#[derive(Debug, Clone, Default)]
pub struct ScriptedFeed {
    prices: VecDeque<Price>,
}

impl ScriptedFeed {
    /// Feed yielding `prices` in order.
    pub fn new(prices: impl IntoIterator<Item = Price>) -> Self {
        Self {
            prices: prices.into_iter().collect(),
        }
    }

    /// Feed from raw decimals.
    ///
    /// # Errors
    /// `DomainError::InvalidPrice` if any value is not positive.
    pub fn from_decimals(values: &[Decimal]) -> SimResult<Self> {
        let prices = values
            .iter()
            .map(|v| Price::new(*v))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(prices))
    }

    /// Prices not yet delivered.
    pub fn remaining(&self) -> usize {
        self.prices.len()
    }
}

#[async_trait]
impl PriceFeed for ScriptedFeed {
    async fn next_price(&mut self) -> Option<Price> {
        self.prices.pop_front()
    }
}

// =============================================================================
// Tests
// =============================================================================
