//! Value Objects for the PropGuard Domain
//!
//! Immutable, validated domain primitives.
//! All value objects enforce invariants at construction time.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Domain errors for value object validation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Price must be positive
    #[error("Invalid price: {0}")]
    InvalidPrice(String),

    /// Quantity must be positive (and a whole lot for orders)
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),

    /// Symbol must be a non-empty instrument code
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// Starting capital must be positive
    #[error("Invalid capital: {0}")]
    InvalidCapital(String),

    /// Order side must be BUY or SELL
    #[error("Invalid order side: {0}")]
    InvalidOrderSide(String),

    /// Unknown evaluation path
    #[error("Invalid step mode: {0}")]
    InvalidStepMode(String),
}

// =============================================================================
// Price
// =============================================================================

/// Price represents a positive decimal price
///
/// # Invariants
/// - Must be > 0
/// - Must be <= `Price::MAX`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Price(Decimal);

impl Price {
    /// Highest accepted price.
    ///
    /// Together with `Quantity::MAX_LOTS` this keeps `price × quantity` near
    /// 1e21, far inside the range of `Decimal`.
    pub const MAX: Decimal = dec!(1000000000000);

    /// Create a new Price with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidPrice` if value <= 0 or value > `Price::MAX`
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidPrice(format!("Price must be positive, got {}", value)));
        }
        if value > Self::MAX {
            return Err(DomainError::InvalidPrice(format!(
                "Price must be at most {}, got {}",
                Self::MAX,
                value
            )));
        }
        Ok(Self(value))
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| DomainError::InvalidPrice(format!("Not a number: {}", s)))?;
        Self::new(value)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Quantity
// =============================================================================

/// Quantity represents a positive decimal quantity
///
/// # Invariants
/// - Must be > 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Quantity(Decimal);

impl Quantity {
    /// Largest order, and largest merged position, in lots
    pub const MAX_LOTS: Decimal = dec!(1000000000);

    /// Create a new Quantity with validation
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value <= 0
    pub fn new(value: Decimal) -> Result<Self, DomainError> {
        if value <= Decimal::ZERO {
            return Err(DomainError::InvalidQuantity(format!(
                "Quantity must be positive, got {}",
                value
            )));
        }
        Ok(Self(value))
    }

    /// Create a Quantity that is also a whole number of lots
    ///
    /// Orders are placed in integral units.
    ///
    /// # Errors
    /// Returns `DomainError::InvalidQuantity` if value <= 0, has a fractional
    /// part, or exceeds `Quantity::MAX_LOTS`
    pub fn whole(value: Decimal) -> Result<Self, DomainError> {
        let quantity = Self::new(value)?;
        if !value.fract().is_zero() {
            return Err(DomainError::InvalidQuantity(format!(
                "Quantity must be a whole number of lots, got {}",
                value
            )));
        }
        if value > Self::MAX_LOTS {
            return Err(DomainError::InvalidQuantity(format!(
                "Quantity must be at most {} lots, got {}",
                Self::MAX_LOTS,
                value
            )));
        }
        Ok(quantity)
    }

    /// Get the underlying Decimal value
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Sum of two quantities (always positive)
    pub fn plus(&self, other: Quantity) -> Quantity {
        Self(self.0 + other.0)
    }
}

impl FromStr for Quantity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = Decimal::from_str(s.trim())
            .map_err(|_| DomainError::InvalidQuantity(format!("Not a number: {}", s)))?;
        Self::new(value)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Symbol
// =============================================================================

/// Symbol represents a traded instrument (e.g., `NSE:NIFTY`)
///
/// # Invariants
/// - Ticker must be non-empty
/// - Exchange prefix, when present, must be non-empty
/// - Stored upper-case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    exchange: Option<String>,
    ticker: String,
}

impl Symbol {
    /// Parse an instrument code, optionally qualified with an exchange
    ///
    /// # Examples
    /// ```
    /// # use propguard_domain::value_objects::Symbol;
    /// let symbol = Symbol::parse("nse:banknifty").unwrap();
    /// assert_eq!(symbol.exchange(), Some("NSE"));
    /// assert_eq!(symbol.ticker(), "BANKNIFTY");
    /// assert_eq!(symbol.to_string(), "NSE:BANKNIFTY");
    /// ```
    ///
    /// # Errors
    /// Returns `DomainError::InvalidSymbol` if the code is blank
    pub fn parse(code: &str) -> Result<Self, DomainError> {
        let code = code.trim().to_uppercase();

        match code.split_once(':') {
            Some((exchange, ticker)) => {
                let (exchange, ticker) = (exchange.trim(), ticker.trim());
                if exchange.is_empty() || ticker.is_empty() {
                    return Err(DomainError::InvalidSymbol(format!(
                        "Exchange and ticker must be non-empty: {}",
                        code
                    )));
                }
                Ok(Self {
                    exchange: Some(exchange.to_string()),
                    ticker: ticker.to_string(),
                })
            }
            None if code.is_empty() => {
                Err(DomainError::InvalidSymbol("Symbol must be non-empty".to_string()))
            }
            None => Ok(Self { exchange: None, ticker: code }),
        }
    }

    /// Get the exchange prefix, if any
    pub fn exchange(&self) -> Option<&str> {
        self.exchange.as_deref()
    }

    /// Get the bare ticker
    pub fn ticker(&self) -> &str {
        &self.ticker
    }
}

impl FromStr for Symbol {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.exchange {
            Some(exchange) => write!(f, "{}:{}", exchange, self.ticker),
            None => write!(f, "{}", self.ticker),
        }
    }
}

// =============================================================================
// OrderSide
// =============================================================================

/// OrderSide represents the order (and position) direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    /// Buy order, long exposure
    Buy,
    /// Sell order, short exposure
    Sell,
}

impl OrderSide {
    /// The side that offsets this one
    ///
    /// Buy → Sell, Sell → Buy
    pub fn opposite(&self) -> OrderSide {
        match self {
            OrderSide::Buy => OrderSide::Sell,
            OrderSide::Sell => OrderSide::Buy,
        }
    }

    /// Unrealized P&L per unit when entered at `entry` and marked at `mark`
    pub fn unit_pnl(&self, entry: Price, mark: Price) -> Decimal {
        let diff = mark.as_decimal() - entry.as_decimal();
        match self {
            OrderSide::Buy => diff,
            OrderSide::Sell => -diff,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

impl FromStr for OrderSide {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "BUY" => Ok(OrderSide::Buy),
            "SELL" => Ok(OrderSide::Sell),
            other => Err(DomainError::InvalidOrderSide(other.to_string())),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_validation() {
        assert!(Price::new(dec!(22450.50)).is_ok());
        assert!(Price::new(dec!(0)).is_err());
        assert!(Price::new(dec!(-1)).is_err());
    }

    #[test]
    fn test_price_upper_bound() {
        assert!(Price::new(Price::MAX).is_ok());
        assert!(matches!(
            Price::new(Price::MAX + Decimal::ONE),
            Err(DomainError::InvalidPrice(_))
        ));
    }

    #[test]
    fn test_price_from_str() {
        let price: Price = "105.25".parse().unwrap();
        assert_eq!(price.as_decimal(), dec!(105.25));

        assert!(matches!("abc".parse::<Price>(), Err(DomainError::InvalidPrice(_))));
    }

    #[test]
    fn test_quantity_validation() {
        assert!(Quantity::new(dec!(0.5)).is_ok());
        assert!(matches!(Quantity::new(dec!(0)), Err(DomainError::InvalidQuantity(_))));
        assert!(matches!(Quantity::new(dec!(-10)), Err(DomainError::InvalidQuantity(_))));
    }

    #[test]
    fn test_quantity_whole_lots() {
        assert_eq!(Quantity::whole(dec!(50)).unwrap().as_decimal(), dec!(50));
        assert!(matches!(Quantity::whole(dec!(1.5)), Err(DomainError::InvalidQuantity(_))));
        assert!(matches!(Quantity::whole(dec!(0)), Err(DomainError::InvalidQuantity(_))));
    }

    #[test]
    fn test_quantity_whole_lot_ceiling() {
        assert!(Quantity::whole(Quantity::MAX_LOTS).is_ok());
        assert!(matches!(
            Quantity::whole(dec!(100000000000000000000000000)),
            Err(DomainError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn test_quantity_non_numeric() {
        assert!(matches!("ten".parse::<Quantity>(), Err(DomainError::InvalidQuantity(_))));
        assert_eq!("25".parse::<Quantity>().unwrap().as_decimal(), dec!(25));
    }

    #[test]
    fn test_symbol_parse_qualified() {
        let symbol = Symbol::parse("NSE:NIFTY").unwrap();
        assert_eq!(symbol.exchange(), Some("NSE"));
        assert_eq!(symbol.ticker(), "NIFTY");
        assert_eq!(symbol.to_string(), "NSE:NIFTY");
    }

    #[test]
    fn test_symbol_parse_bare_and_case() {
        let symbol = Symbol::parse(" reliance ").unwrap();
        assert_eq!(symbol.exchange(), None);
        assert_eq!(symbol.to_string(), "RELIANCE");
        assert_eq!(symbol, Symbol::parse("RELIANCE").unwrap());
    }

    #[test]
    fn test_symbol_invalid() {
        assert!(Symbol::parse("").is_err());
        assert!(Symbol::parse("   ").is_err());
        assert!(Symbol::parse("NSE:").is_err());
        assert!(Symbol::parse(":NIFTY").is_err());
    }

    #[test]
    fn test_order_side_opposite() {
        assert_eq!(OrderSide::Buy.opposite(), OrderSide::Sell);
        assert_eq!(OrderSide::Sell.opposite(), OrderSide::Buy);
        assert_eq!(OrderSide::Buy.to_string(), "BUY");
        assert_eq!("sell".parse::<OrderSide>().unwrap(), OrderSide::Sell);
    }

    #[test]
    fn test_unit_pnl_by_side() {
        let entry = Price::new(dec!(100)).unwrap();
        let mark = Price::new(dec!(104)).unwrap();

        assert_eq!(OrderSide::Buy.unit_pnl(entry, mark), dec!(4));
        assert_eq!(OrderSide::Sell.unit_pnl(entry, mark), dec!(-4));
    }

    #[test]
    fn test_order_side_serialization() {
        let json = serde_json::to_string(&OrderSide::Buy).unwrap();
        assert_eq!(json, "\"BUY\"");
    }
}
