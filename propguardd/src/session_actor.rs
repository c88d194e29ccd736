//! Session Actor: single writer for one session.
//!
//! The session lives inside one tokio task. Everything that changes it (price
//! ticks from the feed task, orders and closes from submitters) arrives as a
//! `Command` on one mpsc channel and runs to completion before the next.
//!
//! ```text
//! Feed Task ──┐
//!             ├──▶ mpsc<Command> ──▶ SessionActor ──▶ EventBus (snapshots, lock)
//! Submitters ─┘                          │
//!                                        └──▶ oneshot replies
//! ```

use std::sync::Arc;

use chrono::Utc;
use propguard_domain::{OrderRequest, PositionId, Price};
use propguard_engine::{Closed, EngineResult, Fill, Session, SessionSnapshot};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{DaemonError, DaemonResult};
use crate::event_bus::{AccountLocked, DaemonEvent, EventBus};

// =============================================================================
// Commands
// =============================================================================

/// Requests handled by the session actor.
#[derive(Debug)]
pub enum Command {
    /// Mark positions at a new market price
    Tick(Price),

    /// Place an order at the current market price
    PlaceOrder {
        request: OrderRequest,
        reply: oneshot::Sender<EngineResult<Fill>>,
    },

    /// Close a position at the current market price
    ClosePosition {
        position_id: PositionId,
        reply: oneshot::Sender<EngineResult<Closed>>,
    },

    /// Read a consistent snapshot
    Snapshot { reply: oneshot::Sender<SessionSnapshot> },

    /// Stop the actor and hand back the session
    Stop,
}

// =============================================================================
// Actor
// =============================================================================

/// Owns the session and applies commands one at a time.
pub struct SessionActor {
    session: Session,
    commands: mpsc::Receiver<Command>,
    event_bus: Arc<EventBus>,
}

impl SessionActor {
    /// Spawn the actor task.
    ///
    /// The task ends on `Command::Stop` or when every handle is dropped, and
    /// yields the session back through the join handle.
    pub fn spawn(
        session: Session,
        event_bus: Arc<EventBus>,
        capacity: usize,
    ) -> (SessionHandle, JoinHandle<Session>) {
        let (sender, commands) = mpsc::channel(capacity.max(1));
        let actor = Self { session, commands, event_bus };
        let task = tokio::spawn(actor.run());

        (SessionHandle { sender }, task)
    }

    async fn run(mut self) -> Session {
        info!(session_id = %self.session.id(), "Session actor started");

        while let Some(command) = self.commands.recv().await {
            if matches!(command, Command::Stop) {
                break;
            }
            self.handle(command);
        }

        info!(
            session_id = %self.session.id(),
            balance = %self.session.stats().balance,
            equity = %self.session.stats().equity,
            locked = self.session.is_locked(),
            "Session actor stopped"
        );
        self.session
    }

    fn handle(&mut self, command: Command) {
        let was_locked = self.session.is_locked();

        match command {
            Command::Tick(price) => {
                self.session.apply_price_tick(price);
                self.publish(was_locked);
            }
            Command::PlaceOrder { request, reply } => {
                let result = self.session.place_order(&request);
                let applied = result.is_ok();
                if let Err(e) = &result {
                    debug!(error = %e, "Order rejected");
                }
                // Submitter may have gone away; the order stands either way
                let _ = reply.send(result);
                if applied {
                    self.publish(was_locked);
                }
            }
            Command::ClosePosition { position_id, reply } => {
                let result = self.session.close_position(position_id);
                let applied = result.is_ok();
                let _ = reply.send(result);
                if applied {
                    self.publish(was_locked);
                }
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(self.session.snapshot());
            }
            Command::Stop => {}
        }
    }

    fn publish(&self, was_locked: bool) {
        let snapshot = self.session.snapshot();

        if !was_locked && snapshot.stats.is_locked {
            let reason = snapshot.stats.fail_message().unwrap_or_default();
            warn!(
                session_id = %snapshot.session_id,
                %reason,
                equity = %snapshot.stats.equity,
                daily_pnl = %snapshot.stats.daily_pnl,
                "Account locked"
            );
            self.event_bus.send(DaemonEvent::AccountLocked(AccountLocked {
                session_id: snapshot.session_id,
                reason,
                equity: snapshot.stats.equity,
                daily_pnl: snapshot.stats.daily_pnl,
                timestamp: Utc::now(),
            }));
        }

        self.event_bus.send(DaemonEvent::Snapshot(Box::new(snapshot)));
    }
}

// =============================================================================
// Handle
// =============================================================================

/// Cloneable front door to the session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    sender: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Submit a price tick.
    pub async fn tick(&self, price: Price) -> DaemonResult<()> {
        self.send(Command::Tick(price)).await
    }

    /// Place an order and wait for the fill.
    ///
    /// # Errors
    /// `DaemonError::Engine` when the engine rejects the order.
    pub async fn place_order(&self, request: OrderRequest) -> DaemonResult<Fill> {
        let (reply, response) = oneshot::channel();
        self.send(Command::PlaceOrder { request, reply }).await?;
        Ok(Self::await_reply(response).await??)
    }

    /// Close a position and wait for the result.
    pub async fn close_position(&self, position_id: PositionId) -> DaemonResult<Closed> {
        let (reply, response) = oneshot::channel();
        self.send(Command::ClosePosition { position_id, reply }).await?;
        Ok(Self::await_reply(response).await??)
    }

    /// Consistent snapshot of the session.
    pub async fn snapshot(&self) -> DaemonResult<SessionSnapshot> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Snapshot { reply }).await?;
        Self::await_reply(response).await
    }

    /// Ask the actor to stop after the commands already queued.
    pub async fn stop(&self) -> DaemonResult<()> {
        self.send(Command::Stop).await
    }

    /// True once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, command: Command) -> DaemonResult<()> {
        self.sender
            .send(command)
            .await
            .map_err(|_| DaemonError::Channel("Session actor is not running".to_string()))
    }

    async fn await_reply<T>(response: oneshot::Receiver<T>) -> DaemonResult<T> {
        response
            .await
            .map_err(|_| DaemonError::Channel("Session actor dropped the reply".to_string()))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use propguard_domain::Symbol;
    use propguard_engine::EngineError;
    use rust_decimal_macros::dec;

    fn spawn() -> (SessionHandle, JoinHandle<Session>, Arc<EventBus>) {
        let bus = Arc::new(EventBus::new(100));
        let session = Session::new(dec!(1000000)).unwrap();
        let (handle, task) = SessionActor::spawn(session, bus.clone(), 16);
        (handle, task, bus)
    }

    fn nifty() -> Symbol {
        Symbol::parse("NSE:NIFTY").unwrap()
    }

    #[tokio::test]
    async fn test_order_reply_and_snapshot() {
        let (handle, _task, _bus) = spawn();
        handle.tick(Price::new(dec!(100)).unwrap()).await.unwrap();

        let fill = handle.place_order(OrderRequest::buy(nifty(), dec!(10))).await.unwrap();
        let snapshot = handle.snapshot().await.unwrap();

        assert_eq!(fill.trade.price.as_decimal(), dec!(100));
        assert_eq!(snapshot.positions.len(), 1);
        assert_eq!(snapshot.positions[0].id, fill.position_id);
    }

    #[tokio::test]
    async fn test_engine_rejection_is_returned() {
        let (handle, _task, _bus) = spawn();

        let err = handle.place_order(OrderRequest::buy(nifty(), dec!(0))).await.unwrap_err();

        assert!(matches!(err, DaemonError::Engine(ref e) if e.is_invalid_quantity()));
    }

    #[tokio::test]
    async fn test_unknown_close_is_returned() {
        let (handle, _task, _bus) = spawn();

        let err = handle.close_position(uuid::Uuid::now_v7()).await.unwrap_err();

        assert!(matches!(err, DaemonError::Engine(EngineError::PositionNotFound(_))));
    }

    #[tokio::test]
    async fn test_stop_returns_session() {
        let (handle, task, _bus) = spawn();
        handle.tick(Price::new(dec!(123)).unwrap()).await.unwrap();

        handle.stop().await.unwrap();
        let session = task.await.unwrap();

        assert_eq!(session.market_price().as_decimal(), dec!(123));
        assert!(handle.snapshot().await.is_err());
    }
}
