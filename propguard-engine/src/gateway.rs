//! Order Gateway: validate-then-commit order placement.
//!
//! ```text
//! OrderRequest → validate (lock, quantity, size)
//!              → PositionBook → TradeHistory → AccountLedger
//! ```
//!
//! Validation happens before any component is touched, so a rejected order
//! leaves the session exactly as it was. Once validation passes the three
//! mutations run back to back inside the caller's critical section.

use propguard_domain::{
    Breach, DomainError, OrderRequest, OrderSide, PositionId, Price, Quantity, Symbol, Trade,
};
use tracing::{debug, info};

use crate::book::PositionBook;
use crate::error::EngineResult;
use crate::history::TradeHistory;
use crate::ledger::AccountLedger;

/// Order that passed validation and may be committed.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedOrder {
    /// BUY or SELL
    pub side: OrderSide,
    /// Instrument
    pub symbol: Symbol,
    /// Whole number of lots, > 0
    pub quantity: Quantity,
}

/// Result of a committed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    /// Trade appended to history
    pub trade: Trade,
    /// Position opened or increased
    pub position_id: PositionId,
    /// Breach triggered by the post-fill recompute, if it locked the account
    pub breach: Option<Breach>,
}

/// Entry point for order placement.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrderGateway;

impl OrderGateway {
    /// Check an order request against the current account state.
    ///
    /// # Errors
    /// - `EngineError::AccountLocked` if the account has been locked
    /// - `EngineError::Domain(InvalidQuantity)` if quantity is not a positive
    ///   whole number, or the merged position would exceed `Quantity::MAX_LOTS`
    pub fn validate(
        &self,
        ledger: &AccountLedger,
        book: &PositionBook,
        request: &OrderRequest,
    ) -> EngineResult<ValidatedOrder> {
        if let Err(e) = ledger.ensure_active() {
            debug!(
                side = %request.side,
                symbol = %request.symbol,
                "Order rejected: account locked"
            );
            return Err(e);
        }

        let quantity = Quantity::whole(request.quantity).map_err(|e| {
            debug!(quantity = %request.quantity, "Order rejected: invalid quantity");
            e
        })?;

        if let Some(existing) = book.find(&request.symbol, request.side) {
            let merged = existing.quantity.as_decimal() + quantity.as_decimal();
            if merged > Quantity::MAX_LOTS {
                debug!(%merged, "Order rejected: position too large");
                return Err(DomainError::InvalidQuantity(format!(
                    "Position would reach {} lots, limit is {}",
                    merged,
                    Quantity::MAX_LOTS
                ))
                .into());
            }
        }

        Ok(ValidatedOrder {
            side: request.side,
            symbol: request.symbol.clone(),
            quantity,
        })
    }

    /// Validate and execute an order at `market_price`.
    ///
    /// Applies the book mutation, records the trade, and recomputes the
    /// ledger as one unit.
    pub fn place(
        &self,
        ledger: &mut AccountLedger,
        book: &mut PositionBook,
        history: &mut TradeHistory,
        request: &OrderRequest,
        market_price: Price,
    ) -> EngineResult<Fill> {
        let order = self.validate(ledger, book, request)?;

        let position_id =
            book.open_or_increase(order.side, &order.symbol, order.quantity, market_price);
        let trade = Trade::completed(order.symbol, order.side, order.quantity, market_price);
        history.record(trade.clone());
        let breach = ledger.recompute_and_evaluate(book);

        info!(
            trade_id = %trade.id,
            %position_id,
            side = %trade.side,
            symbol = %trade.symbol,
            quantity = %trade.quantity,
            price = %market_price,
            "Order filled"
        );

        Ok(Fill { trade, position_id, breach })
    }
}

// =============================================================================
// Tests
// =============================================================================
