//! Session Events for PropGuard
//!
//! Inputs the ledger consumes. Every state change in a session is caused by
//! exactly one of these, applied in arrival order.

use crate::entities::PositionId;
use crate::value_objects::{OrderSide, Price, Symbol};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Order request as submitted by the trader
///
/// `quantity` is unvalidated here; the gateway rejects anything that is not a
/// positive whole number of lots before touching state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// BUY or SELL
    pub side: OrderSide,
    /// Instrument to trade
    pub symbol: Symbol,
    /// Lots requested
    pub quantity: Decimal,
}

impl OrderRequest {
    /// Create a buy request
    pub fn buy(symbol: Symbol, quantity: Decimal) -> Self {
        Self { side: OrderSide::Buy, symbol, quantity }
    }

    /// Create a sell request
    pub fn sell(symbol: Symbol, quantity: Decimal) -> Self {
        Self { side: OrderSide::Sell, symbol, quantity }
    }
}

/// Events applied to a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// New market price from the feed
    PriceTick {
        /// Observed price
        price: Price,
    },

    /// Trader submitted an order
    PlaceOrder(OrderRequest),

    /// Trader closed an open position at market
    ClosePosition {
        /// Position to flatten
        position_id: PositionId,
    },
}

impl SessionEvent {
    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            SessionEvent::PriceTick { .. } => "price_tick",
            SessionEvent::PlaceOrder(_) => "place_order",
            SessionEvent::ClosePosition { .. } => "close_position",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    #[test]
    fn test_event_serialization_tagged() {
        let event = SessionEvent::PriceTick { price: Price::new(dec!(22450.5)).unwrap() };
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["type"], "price_tick");

        let parsed: SessionEvent = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_order_request_event() {
        let symbol = Symbol::parse("NSE:BANKNIFTY").unwrap();
        let event = SessionEvent::PlaceOrder(OrderRequest::sell(symbol, dec!(15)));

        assert_eq!(event.kind(), "place_order");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["side"], "SELL");
    }

    #[test]
    fn test_close_event_kind() {
        let event = SessionEvent::ClosePosition { position_id: Uuid::now_v7() };
        assert_eq!(event.kind(), "close_position");
    }
}
