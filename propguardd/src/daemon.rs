//! Daemon: Main runtime orchestrator.
//!
//! The Daemon ties together all components:
//! - Session Actor (single writer for the account)
//! - Feed Task (price ticks into the actor)
//! - Event Bus (snapshots, lock transition, feed end)
//!
//! # Lifecycle
//!
//! 1. Load configuration
//! 2. Fund the session and spawn the actor
//! 3. Start the price feed
//! 4. Main event loop (stop the feed once the account locks)
//! 5. Graceful shutdown on SIGINT or a `Shutdown` event

use std::sync::Arc;

use propguard_engine::{Session, SessionSnapshot};
use propguard_sim::{PacedFeed, PriceFeed, RandomWalk};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{DaemonError, DaemonResult};
use crate::event_bus::{DaemonEvent, EventBus};
use crate::session_actor::{SessionActor, SessionHandle};

/// Queued commands before submitters wait
const COMMAND_CAPACITY: usize = 256;

// =============================================================================
// Daemon
// =============================================================================

/// The main PropGuard daemon.
pub struct Daemon<F: PriceFeed + 'static> {
    /// Configuration
    config: Config,
    /// Front door to the session actor
    handle: SessionHandle,
    /// Actor task; yields the session on stop
    actor: JoinHandle<Session>,
    /// Price source, consumed when the feed task starts
    feed: F,
    /// Event bus
    event_bus: Arc<EventBus>,
}

impl Daemon<PacedFeed<RandomWalk>> {
    /// Create a daemon with a paced random-walk feed from `config`.
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_config(config: Config) -> DaemonResult<Self> {
        let session = Session::with_config(config.session_config()?)?;
        let walk = RandomWalk::new(
            config.account.initial_price,
            config.feed.price_step,
            config.feed.seed,
        )?;
        let feed = PacedFeed::new(walk, config.feed.tick_interval);

        Ok(Self::new(config, session, feed))
    }
}

impl<F: PriceFeed + 'static> Daemon<F> {
    /// Create a daemon around an existing session and feed.
    ///
    /// Spawns the session actor immediately so handles can be taken before `run`.
    pub fn new(config: Config, session: Session, feed: F) -> Self {
        let event_bus = Arc::new(EventBus::default());
        let (handle, actor) = SessionActor::spawn(session, event_bus.clone(), COMMAND_CAPACITY);

        Self {
            config,
            handle,
            actor,
            feed,
            event_bus,
        }
    }

    /// Handle for submitting orders and closes.
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    /// Shared event bus.
    pub fn event_bus(&self) -> Arc<EventBus> {
        self.event_bus.clone()
    }

    /// Run the daemon.
    ///
    /// Blocks until shutdown is requested (SIGINT or a `Shutdown` event) and
    /// returns the final session snapshot.
    pub async fn run(self) -> DaemonResult<SessionSnapshot> {
        info!(
            version = env!("CARGO_PKG_VERSION"),
            environment = %self.config.environment,
            symbol = %self.config.account.symbol,
            "Starting PropGuard daemon"
        );

        let Self { config, handle, actor, feed, event_bus } = self;
        let mut event_receiver = event_bus.subscribe();

        // 1. Start the feed unless the account is already locked
        let mut feed_task = if handle.snapshot().await?.stats.is_locked {
            warn!("Account already locked, price feed not started");
            None
        } else {
            info!(tick_interval = ?config.feed.tick_interval, "Starting price feed");
            Some(tokio::spawn(drive_feed(feed, handle.clone(), event_bus.clone())))
        };

        // 2. Main event loop
        info!("Entering main event loop");
        loop {
            tokio::select! {
                Some(event_result) = event_receiver.recv() => {
                    match event_result {
                        Ok(event) => match handle_event(event, &mut feed_task) {
                            Ok(()) => {}
                            Err(DaemonError::Shutdown) => break,
                            Err(e) => error!(error = %e, "Error handling event"),
                        },
                        Err(lag_msg) => {
                            warn!(%lag_msg, "Event receiver lagged");
                        }
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Received shutdown signal");
                    break;
                }
            }
        }

        // 3. Graceful shutdown
        shutdown(handle, actor, feed_task).await
    }
}

/// Pull prices from `feed` into the actor until the feed ends or the actor stops.
async fn drive_feed<F: PriceFeed>(mut feed: F, handle: SessionHandle, event_bus: Arc<EventBus>) {
    let mut ticks = 0u64;

    while let Some(price) = feed.next_price().await {
        if handle.tick(price).await.is_err() {
            info!(ticks, "Session actor gone, price feed stopping");
            return;
        }
        ticks += 1;
    }

    info!(ticks, "Price feed ended");
    event_bus.send(DaemonEvent::FeedEnded);
}

/// Handle an event from the event bus.
fn handle_event(event: DaemonEvent, feed_task: &mut Option<JoinHandle<()>>) -> DaemonResult<()> {
    match event {
        DaemonEvent::Snapshot(_) => {}

        DaemonEvent::AccountLocked(locked) => {
            info!(
                session_id = %locked.session_id,
                reason = %locked.reason,
                "Account locked, stopping price feed"
            );
            if let Some(task) = feed_task.take() {
                task.abort();
            }
        }

        DaemonEvent::FeedEnded => {
            info!("Price feed finished; waiting for shutdown");
            feed_task.take();
        }

        DaemonEvent::Shutdown => {
            info!("Shutdown event received");
            return Err(DaemonError::Shutdown);
        }
    }

    Ok(())
}

/// Stop the feed, drain the actor, and report the final state.
async fn shutdown(
    handle: SessionHandle,
    actor: JoinHandle<Session>,
    feed_task: Option<JoinHandle<()>>,
) -> DaemonResult<SessionSnapshot> {
    info!("Initiating graceful shutdown");

    if let Some(task) = feed_task {
        task.abort();
    }

    handle.stop().await?;
    let session = actor
        .await
        .map_err(|e| DaemonError::Channel(format!("Session actor task failed: {}", e)))?;

    let snapshot = session.snapshot();
    info!(
        balance = %snapshot.stats.balance,
        equity = %snapshot.stats.equity,
        open_positions = snapshot.positions.len(),
        trades = snapshot.trades.len(),
        locked = snapshot.stats.is_locked,
        "Shutdown complete"
    );

    Ok(snapshot)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use propguard_sim::ScriptedFeed;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_daemon_from_config() {
        let daemon = Daemon::from_config(Config::test()).unwrap();

        let snapshot = daemon.handle().snapshot().await.unwrap();
        assert_eq!(snapshot.stats.starting_capital, dec!(1000000));
        assert_eq!(snapshot.market_price.as_decimal(), dec!(22450.50));
    }

    #[tokio::test]
    async fn test_daemon_shutdown_event_returns_snapshot() {
        let session = Session::new(dec!(1000000)).unwrap();
        let feed = ScriptedFeed::from_decimals(&[dec!(100), dec!(101)]).unwrap();
        let daemon = Daemon::new(Config::test(), session, feed);
        let bus = daemon.event_bus();
        let mut events = bus.subscribe();

        let run = tokio::spawn(daemon.run());

        // Wait for the scripted feed to drain, then ask for shutdown
        loop {
            if let Some(Ok(DaemonEvent::FeedEnded)) = events.recv().await {
                break;
            }
        }
        bus.send(DaemonEvent::Shutdown);

        let snapshot = run.await.unwrap().unwrap();
        assert_eq!(snapshot.market_price.as_decimal(), dec!(101));
        assert!(!snapshot.stats.is_locked);
    }

    #[test]
    fn test_handle_event_shutdown() {
        let mut feed_task = None;

        assert!(handle_event(DaemonEvent::FeedEnded, &mut feed_task).is_ok());
        assert!(matches!(
            handle_event(DaemonEvent::Shutdown, &mut feed_task),
            Err(DaemonError::Shutdown)
        ));
    }
}
