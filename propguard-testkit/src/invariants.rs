//! Invariant checks that must hold after every applied event.

use propguard_domain::Breach;
use propguard_engine::SessionSnapshot;
use rust_decimal::Decimal;

/// Panics unless `equity == balance + Σ pnl`.
pub fn assert_equity_identity(snapshot: &SessionSnapshot) {
    let unrealized: Decimal = snapshot.positions.iter().map(|p| p.pnl).sum();
    assert_eq!(
        snapshot.stats.equity,
        snapshot.stats.balance + unrealized,
        "equity identity broken: balance {} + unrealized {} != equity {}",
        snapshot.stats.balance,
        unrealized,
        snapshot.stats.equity
    );
}

/// Tracks a session across snapshots and checks the one-way invariants:
/// the lock never clears, its reason never changes, and the limits fixed at
/// funding never move.
#[derive(Debug, Clone, Default)]
pub struct LockWatch {
    limits: Option<(Decimal, Decimal)>,
    reason: Option<Breach>,
    observed: usize,
}

impl LockWatch {
    /// Fresh watch; the first observed snapshot fixes the limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check `snapshot` against everything seen so far.
    pub fn observe(&mut self, snapshot: &SessionSnapshot) {
        let stats = &snapshot.stats;
        let limits = (stats.daily_loss_limit, stats.max_drawdown);

        match self.limits {
            Some(fixed) => assert_eq!(fixed, limits, "limits moved after funding"),
            None => self.limits = Some(limits),
        }

        match self.reason {
            Some(reason) => {
                assert!(stats.is_locked, "account unlocked after {:?}", reason);
                assert_eq!(stats.fail_reason, Some(reason), "fail reason changed");
            }
            None if stats.is_locked => {
                assert!(stats.fail_reason.is_some(), "locked without a reason");
                self.reason = stats.fail_reason;
            }
            None => assert!(stats.fail_reason.is_none(), "reason set while active"),
        }

        assert_equity_identity(snapshot);
        self.observed += 1;
    }

    /// Breach that locked the account, if any.
    pub fn reason(&self) -> Option<Breach> {
        self.reason
    }

    /// Number of snapshots checked.
    pub fn observed(&self) -> usize {
        self.observed
    }
}
