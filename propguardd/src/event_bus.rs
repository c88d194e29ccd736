//! Event bus for internal daemon communication.
//!
//! The session actor publishes here after every applied event:
//! - Session Actor → subscribers (snapshots, lock transition)
//! - Feed Task → Daemon (feed ended)
//! - anyone → Daemon (shutdown)
//!
//! Uses tokio broadcast channels for fan-out to multiple receivers.

use chrono::{DateTime, Utc};
use propguard_domain::SessionId;
use propguard_engine::SessionSnapshot;
use rust_decimal::Decimal;
use tokio::sync::broadcast;

// =============================================================================
// Event Types
// =============================================================================

/// Events that flow through the daemon event bus.
#[derive(Debug, Clone)]
pub enum DaemonEvent {
    /// Session state after an applied tick, fill or close
    Snapshot(Box<SessionSnapshot>),

    /// The account just locked (sent once per session)
    AccountLocked(AccountLocked),

    /// The price feed has no more prices
    FeedEnded,

    /// Shutdown signal
    Shutdown,
}

/// Lock transition notice.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountLocked {
    /// Session that locked
    pub session_id: SessionId,
    /// Human-readable fail reason
    pub reason: String,
    /// Equity at the moment of locking
    pub equity: Decimal,
    /// Daily P&L at the moment of locking
    pub daily_pnl: Decimal,
    /// When the lock was observed
    pub timestamp: DateTime<Utc>,
}

// =============================================================================
// Event Bus
// =============================================================================

/// Snapshots kept for a slow subscriber before it starts lagging
pub const DEFAULT_EVENT_CAPACITY: usize = 1000;

/// Fan-out of [`DaemonEvent`]s to every subscriber.
pub struct EventBus {
    sender: broadcast::Sender<DaemonEvent>,
}

impl EventBus {
    /// Bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish `event`; returns how many subscribers will see it.
    pub fn send(&self, event: DaemonEvent) -> usize {
        // Zero subscribers is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// New subscriber; sees only events published after this call.
    pub fn subscribe(&self) -> EventReceiver {
        EventReceiver {
            receiver: self.sender.subscribe(),
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

/// One subscription to an [`EventBus`].
///
/// `None` means the bus is gone (or, for `try_recv`, nothing is queued);
/// `Some(Err(_))` reports events dropped because this subscriber fell behind.
pub struct EventReceiver {
    receiver: broadcast::Receiver<DaemonEvent>,
}

impl EventReceiver {
    /// Wait for the next event.
    pub async fn recv(&mut self) -> Option<Result<DaemonEvent, String>> {
        match self.receiver.recv().await {
            Ok(event) => Some(Ok(event)),
            Err(broadcast::error::RecvError::Closed) => None,
            Err(broadcast::error::RecvError::Lagged(missed)) => Some(Err(lagged(missed))),
        }
    }

    /// Next queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<Result<DaemonEvent, String>> {
        match self.receiver.try_recv() {
            Ok(event) => Some(Ok(event)),
            Err(broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed) => {
                None
            }
            Err(broadcast::error::TryRecvError::Lagged(missed)) => Some(Err(lagged(missed))),
        }
    }
}

fn lagged(missed: u64) -> String {
    format!("Receiver lagged, missed {} events", missed)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use propguard_engine::Session;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_event_bus_send_recv() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();

        let snapshot = Session::new(dec!(1000000)).unwrap().snapshot();
        let session_id = snapshot.session_id;

        bus.send(DaemonEvent::Snapshot(Box::new(snapshot)));

        match receiver.recv().await.unwrap().unwrap() {
            DaemonEvent::Snapshot(s) => assert_eq!(s.session_id, session_id),
            _ => panic!("Expected Snapshot event"),
        }
    }

    #[tokio::test]
    async fn test_event_bus_multiple_receivers() {
        let bus = EventBus::new(10);
        let mut receiver1 = bus.subscribe();
        let mut receiver2 = bus.subscribe();

        let delivered = bus.send(DaemonEvent::AccountLocked(AccountLocked {
            session_id: Uuid::now_v7(),
            reason: "Daily Loss Limit Reached (50000)".to_string(),
            equity: dec!(949999),
            daily_pnl: dec!(-50001),
            timestamp: Utc::now(),
        }));
        assert_eq!(delivered, 2);

        let event1 = receiver1.recv().await.unwrap().unwrap();
        let event2 = receiver2.recv().await.unwrap().unwrap();

        assert!(matches!(event1, DaemonEvent::AccountLocked(_)));
        assert!(matches!(event2, DaemonEvent::AccountLocked(_)));
    }

    #[tokio::test]
    async fn test_event_bus_no_receivers() {
        let bus = EventBus::new(10);

        let count = bus.send(DaemonEvent::Shutdown);
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_lagged_receiver_reports_missed_events() {
        let bus = EventBus::new(2);
        let mut receiver = bus.subscribe();

        for _ in 0..5 {
            bus.send(DaemonEvent::FeedEnded);
        }

        let lagged = receiver.recv().await.unwrap();
        assert!(lagged.unwrap_err().contains("missed 3"));
    }

    #[test]
    fn test_try_recv_empty() {
        let bus = EventBus::new(10);
        let mut receiver = bus.subscribe();

        assert!(receiver.try_recv().is_none());
    }
}
