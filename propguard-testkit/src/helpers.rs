//! Fixture builders for sessions and events.

use propguard_domain::{OrderRequest, PositionId, Price, SessionEvent, StepMode, Symbol};
use propguard_engine::{Session, SessionConfig, SessionSnapshot};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::Result;

/// Capital used by `funded_session`
pub const STARTING_CAPITAL: Decimal = dec!(1000000);

/// The default instrument, `NSE:NIFTY`.
pub fn nifty() -> Symbol {
    match Symbol::parse("NSE:NIFTY") {
        Ok(symbol) => symbol,
        Err(e) => panic!("invalid test symbol: {}", e),
    }
}

/// Build a price. Panics on non-positive input (test fixtures only).
pub fn price(value: Decimal) -> Price {
    match Price::new(value) {
        Ok(price) => price,
        Err(e) => panic!("invalid test price {}: {}", value, e),
    }
}

/// Price tick event.
pub fn tick(value: Decimal) -> SessionEvent {
    SessionEvent::PriceTick { price: price(value) }
}

/// BUY order event on NIFTY.
pub fn buy(quantity: Decimal) -> SessionEvent {
    SessionEvent::PlaceOrder(OrderRequest::buy(nifty(), quantity))
}

/// SELL order event on NIFTY.
pub fn sell(quantity: Decimal) -> SessionEvent {
    SessionEvent::PlaceOrder(OrderRequest::sell(nifty(), quantity))
}

/// Close event for a position.
pub fn close(position_id: PositionId) -> SessionEvent {
    SessionEvent::ClosePosition { position_id }
}

/// Two-step session with `STARTING_CAPITAL`, market at 100.
pub fn funded_session() -> Result<Session> {
    session_at(STARTING_CAPITAL, dec!(100))
}

/// Two-step session with the given capital and opening market price.
pub fn session_at(capital: Decimal, initial_price: Decimal) -> Result<Session> {
    let config = SessionConfig {
        starting_capital: capital,
        step_mode: StepMode::TwoStep,
        initial_price: Price::new(initial_price)?,
    };
    Ok(Session::with_config(config)?)
}

/// Apply `events` in order; fails on the first rejected event.
pub fn drive(
    session: &mut Session,
    events: impl IntoIterator<Item = SessionEvent>,
) -> Result<SessionSnapshot> {
    let mut snapshot = session.snapshot();
    for event in events {
        snapshot = session.apply(event)?;
    }
    Ok(snapshot)
}
