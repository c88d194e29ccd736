//! Firm Risk Policy
//!
//! The evaluation paths a trader can buy (`StepMode`), the tiers they move
//! through (`ChallengeTier`), and the single table mapping each tier to its
//! numeric limits. Every percentage used by the ledger comes from
//! [`ChallengeTier::limits`].
//!
//! ```text
//! TwoStep:  Student → Practitioner → Master
//! OneStep:  Student → Master
//! Zero:     Master
//! ```

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::value_objects::DomainError;

// =============================================================================
// Challenge Tier
// =============================================================================

/// Account tier within the funding challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChallengeTier {
    /// First evaluation phase
    Student,
    /// Verification phase (two-step path only)
    Practitioner,
    /// Funded account
    Master,
    /// Free practice account, no target
    Practice,
}

/// Numeric limits attached to a tier
///
/// All percentages are fractions of starting capital (0.05 = 5%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierLimits {
    /// Maximum floating loss before the account locks
    pub daily_loss_pct: Decimal,
    /// Static drawdown floor, measured from starting capital
    pub max_drawdown_pct: Decimal,
    /// Profit needed to pass the phase (None for funded/practice accounts)
    pub profit_target_pct: Option<Decimal>,
    /// Trader's share of profits
    pub payout_split_pct: Decimal,
}

impl TierLimits {
    /// Daily loss limit in currency for the given capital
    pub fn daily_loss_limit(&self, capital: Decimal) -> Decimal {
        capital * self.daily_loss_pct
    }

    /// Maximum drawdown in currency for the given capital
    pub fn max_drawdown(&self, capital: Decimal) -> Decimal {
        capital * self.max_drawdown_pct
    }

    /// Equity level at or below which the account locks
    ///
    /// Static: always derived from starting capital, never from peak equity.
    pub fn drawdown_floor(&self, capital: Decimal) -> Decimal {
        capital * (Decimal::ONE - self.max_drawdown_pct)
    }

    /// Profit target in currency, if the tier has one
    pub fn profit_target(&self, capital: Decimal) -> Option<Decimal> {
        self.profit_target_pct.map(|pct| capital * pct)
    }
}

impl ChallengeTier {
    /// Canonical tier → limits table
    pub fn limits(&self) -> TierLimits {
        const DAILY_LOSS: Decimal = dec!(0.05);
        const MAX_DRAWDOWN: Decimal = dec!(0.10);
        const PAYOUT_SPLIT: Decimal = dec!(0.80);

        let profit_target_pct = match self {
            ChallengeTier::Student => Some(dec!(0.08)),
            ChallengeTier::Practitioner => Some(dec!(0.05)),
            ChallengeTier::Master | ChallengeTier::Practice => None,
        };

        TierLimits {
            daily_loss_pct: DAILY_LOSS,
            max_drawdown_pct: MAX_DRAWDOWN,
            profit_target_pct,
            payout_split_pct: PAYOUT_SPLIT,
        }
    }

    /// Name of the tier for display
    pub fn name(&self) -> &'static str {
        match self {
            ChallengeTier::Student => "Student",
            ChallengeTier::Practitioner => "Practitioner",
            ChallengeTier::Master => "Master",
            ChallengeTier::Practice => "Practice",
        }
    }
}

impl fmt::Display for ChallengeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Step Mode
// =============================================================================

/// Evaluation path chosen at funding time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepMode {
    /// Instant funding, starts as Master
    Zero,
    /// Single evaluation phase
    OneStep,
    /// Student and Practitioner phases
    TwoStep,
}

impl StepMode {
    /// Tier the account starts in
    pub fn starting_tier(&self) -> ChallengeTier {
        match self {
            StepMode::Zero => ChallengeTier::Master,
            StepMode::OneStep | StepMode::TwoStep => ChallengeTier::Student,
        }
    }

    /// Ordered tiers the trader passes through on this path
    pub fn phases(&self) -> &'static [ChallengeTier] {
        match self {
            StepMode::Zero => &[ChallengeTier::Master],
            StepMode::OneStep => &[ChallengeTier::Student, ChallengeTier::Master],
            StepMode::TwoStep => {
                &[ChallengeTier::Student, ChallengeTier::Practitioner, ChallengeTier::Master]
            }
        }
    }

    /// Tier that follows `tier` on this path (None when funded or off-path)
    pub fn next_tier(&self, tier: ChallengeTier) -> Option<ChallengeTier> {
        let phases = self.phases();
        let idx = phases.iter().position(|t| *t == tier)?;
        phases.get(idx + 1).copied()
    }
}

impl FromStr for StepMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "zero" | "0" => Ok(StepMode::Zero),
            "1 step" | "one" | "1" | "one-step" => Ok(StepMode::OneStep),
            "2 step" | "two" | "2" | "two-step" => Ok(StepMode::TwoStep),
            other => Err(DomainError::InvalidStepMode(format!(
                "{}. Expected: zero, 1 step, 2 step",
                other
            ))),
        }
    }
}

impl fmt::Display for StepMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepMode::Zero => write!(f, "Zero"),
            StepMode::OneStep => write!(f, "1 step"),
            StepMode::TwoStep => write!(f, "2 step"),
        }
    }
}

// =============================================================================
// Breach
// =============================================================================

/// Risk limit that locked the account
///
/// Carries the limit amount so the reason stays meaningful after the fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Breach {
    /// Floating loss reached the daily loss limit
    DailyLossLimit {
        /// Limit in currency
        limit: Decimal,
    },
    /// Equity fell to the static drawdown floor
    MaxDrawdown {
        /// Allowed drawdown in currency
        limit: Decimal,
    },
}

impl fmt::Display for Breach {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Breach::DailyLossLimit { limit } => {
                write!(f, "Daily Loss Limit Reached ({})", limit.normalize())
            }
            Breach::MaxDrawdown { limit } => {
                write!(f, "Maximum Drawdown Limit Exceeded ({})", limit.normalize())
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_limits_table() {
        let student = ChallengeTier::Student.limits();
        assert_eq!(student.daily_loss_pct, dec!(0.05));
        assert_eq!(student.max_drawdown_pct, dec!(0.10));
        assert_eq!(student.profit_target_pct, Some(dec!(0.08)));
        assert_eq!(student.payout_split_pct, dec!(0.80));

        assert_eq!(ChallengeTier::Practitioner.limits().profit_target_pct, Some(dec!(0.05)));
        assert_eq!(ChallengeTier::Master.limits().profit_target_pct, None);
        assert_eq!(ChallengeTier::Practice.limits().profit_target_pct, None);
    }

    #[test]
    fn test_limit_amounts() {
        let limits = ChallengeTier::Master.limits();
        let capital = dec!(1000000);

        assert_eq!(limits.daily_loss_limit(capital), dec!(50000));
        assert_eq!(limits.max_drawdown(capital), dec!(100000));
        assert_eq!(limits.drawdown_floor(capital), dec!(900000));
        assert_eq!(limits.profit_target(capital), None);
        assert_eq!(
            ChallengeTier::Student.limits().profit_target(dec!(50000)),
            Some(dec!(4000))
        );
    }

    #[test]
    fn test_step_mode_parsing() {
        assert_eq!("Zero".parse::<StepMode>().unwrap(), StepMode::Zero);
        assert_eq!("1 step".parse::<StepMode>().unwrap(), StepMode::OneStep);
        assert_eq!("2 STEP".parse::<StepMode>().unwrap(), StepMode::TwoStep);
        assert_eq!("two".parse::<StepMode>().unwrap(), StepMode::TwoStep);
        assert!(matches!("three".parse::<StepMode>(), Err(DomainError::InvalidStepMode(_))));
    }

    #[test]
    fn test_step_mode_display_round_trip() {
        for mode in [StepMode::Zero, StepMode::OneStep, StepMode::TwoStep] {
            assert_eq!(mode.to_string().parse::<StepMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_starting_tier() {
        assert_eq!(StepMode::Zero.starting_tier(), ChallengeTier::Master);
        assert_eq!(StepMode::OneStep.starting_tier(), ChallengeTier::Student);
        assert_eq!(StepMode::TwoStep.starting_tier(), ChallengeTier::Student);
    }

    #[test]
    fn test_phase_progression() {
        assert_eq!(
            StepMode::TwoStep.next_tier(ChallengeTier::Student),
            Some(ChallengeTier::Practitioner)
        );
        assert_eq!(
            StepMode::TwoStep.next_tier(ChallengeTier::Practitioner),
            Some(ChallengeTier::Master)
        );
        assert_eq!(
            StepMode::OneStep.next_tier(ChallengeTier::Student),
            Some(ChallengeTier::Master)
        );
        assert_eq!(StepMode::OneStep.next_tier(ChallengeTier::Practitioner), None);
        assert_eq!(StepMode::Zero.next_tier(ChallengeTier::Master), None);
    }

    #[test]
    fn test_breach_messages() {
        let daily = Breach::DailyLossLimit { limit: dec!(50000.00) };
        let drawdown = Breach::MaxDrawdown { limit: dec!(100000) };

        assert_eq!(daily.to_string(), "Daily Loss Limit Reached (50000)");
        assert_eq!(drawdown.to_string(), "Maximum Drawdown Limit Exceeded (100000)");
    }
}
