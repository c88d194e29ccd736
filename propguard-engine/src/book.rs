//! Position Book: the set of open positions.
//!
//! Gross model. Each `(symbol, side)` pair has at most one position, and
//! opposite sides on the same symbol are kept apart. Positions are held in
//! opening order so views are stable.

use propguard_domain::{OrderSide, Position, PositionId, Price, Quantity, Symbol};
use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Open positions, in the order they were opened.
#[derive(Debug, Clone, Default)]
pub struct PositionBook {
    positions: Vec<Position>,
}

impl PositionBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Re-mark every position at `price`.
    ///
    /// Only the stored pnl changes. Applying the same price twice is a no-op.
    pub fn apply_price_tick(&mut self, price: Price) {
        for position in &mut self.positions {
            position.mark(price);
        }
    }

    /// Open a position or add to the matching `(symbol, side)` one.
    ///
    /// A merged position is re-marked at the fill price so its pnl reflects the
    /// new average immediately. Returns the id of the affected position.
    pub fn open_or_increase(
        &mut self,
        side: OrderSide,
        symbol: &Symbol,
        quantity: Quantity,
        price: Price,
    ) -> PositionId {
        if let Some(existing) = self.positions.iter_mut().find(|p| p.matches(symbol, side)) {
            existing.increase(quantity, price);
            existing.mark(price);
            return existing.id;
        }

        let position = Position::open(symbol.clone(), side, quantity, price);
        let id = position.id;
        self.positions.push(position);
        id
    }

    /// The open position an order for `(symbol, side)` would merge into.
    pub fn find(&self, symbol: &Symbol, side: OrderSide) -> Option<&Position> {
        self.positions.iter().find(|p| p.matches(symbol, side))
    }

    /// Remove a position and return it.
    ///
    /// The returned position's `pnl` is the realized P&L of the close.
    ///
    /// # Errors
    /// `EngineError::PositionNotFound` if `id` is not open. The book is unchanged.
    pub fn close(&mut self, id: PositionId) -> EngineResult<Position> {
        let idx = self
            .positions
            .iter()
            .position(|p| p.id == id)
            .ok_or(EngineError::PositionNotFound(id))?;
        Ok(self.positions.remove(idx))
    }

    /// Sum of unrealized P&L across all positions.
    pub fn total_unrealized_pnl(&self) -> Decimal {
        self.positions.iter().map(|p| p.pnl).sum()
    }

    /// Look up a position by id.
    pub fn get(&self, id: PositionId) -> Option<&Position> {
        self.positions.iter().find(|p| p.id == id)
    }

    /// Open positions in opening order.
    pub fn positions(&self) -> &[Position] {
        &self.positions
    }

    /// Number of open positions.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when nothing is open.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
