//! Risk gauges derived from account figures.
//!
//! Read-only view used by dashboards: how much of each limit is used, how far
//! the phase target is, and what the trader's share of profit would be.
//! Percentages are clamped to `0..=100`.

use propguard_domain::{AccountStats, TierLimits};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Usage above this percentage is flagged as a warning
pub const WARNING_THRESHOLD_PCT: Decimal = dec!(80);

const HUNDRED: Decimal = dec!(100);

/// Snapshot of risk usage for one account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Floating loss as a share of the daily loss limit
    pub daily_loss_usage_pct: Decimal,
    /// Equity below starting capital as a share of allowed drawdown
    pub drawdown_usage_pct: Decimal,
    /// Profit as a share of the phase target (None for funded tiers)
    pub profit_target_progress_pct: Option<Decimal>,
    /// Trader's share of profit above starting capital
    pub estimated_payout: Decimal,
    /// A usage gauge crossed the warning threshold
    pub warning: bool,
    /// Phase target met
    pub target_reached: bool,
}

impl RiskMetrics {
    /// Compute gauges from account figures under `limits`.
    pub fn compute(stats: &AccountStats, limits: &TierLimits) -> Self {
        let capital = stats.starting_capital;

        let floating_loss = stats.daily_pnl.min(Decimal::ZERO).abs();
        let daily_loss_usage_pct = ratio_pct(floating_loss, stats.daily_loss_limit);
        let drawdown_usage_pct = ratio_pct(capital - stats.equity, stats.max_drawdown);

        let profit = (stats.equity - capital).max(Decimal::ZERO);
        let profit_target_progress_pct =
            limits.profit_target(capital).map(|target| ratio_pct(profit, target));

        Self {
            daily_loss_usage_pct,
            drawdown_usage_pct,
            profit_target_progress_pct,
            estimated_payout: profit * limits.payout_split_pct,
            warning: daily_loss_usage_pct > WARNING_THRESHOLD_PCT
                || drawdown_usage_pct > WARNING_THRESHOLD_PCT,
            target_reached: profit_target_progress_pct.is_some_and(|p| p >= HUNDRED),
        }
    }
}

/// `part / whole × 100`, clamped to `0..=100`; zero when `whole` is not positive.
fn ratio_pct(part: Decimal, whole: Decimal) -> Decimal {
    if whole <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    (part / whole * HUNDRED).clamp(Decimal::ZERO, HUNDRED)
}
