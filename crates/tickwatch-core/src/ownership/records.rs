use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Symbol, ValidationError};

/// A symbol the user follows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchlistEntry {
    pub symbol: Symbol,
}

impl WatchlistEntry {
    pub fn new(symbol: Symbol) -> Self {
        Self { symbol }
    }
}

/// A holding: `quantity` shares bought at `purchase_price` each.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPosition")]
pub struct PortfolioPosition {
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
}

impl PortfolioPosition {
    pub fn new(
        symbol: Symbol,
        quantity: Decimal,
        purchase_price: Decimal,
    ) -> Result<Self, ValidationError> {
        if quantity <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveValue { field: "quantity" });
        }
        if purchase_price < Decimal::ZERO {
            return Err(ValidationError::NegativeValue {
                field: "purchase_price",
            });
        }

        Ok(Self {
            symbol,
            quantity,
            purchase_price,
        })
    }
}

#[derive(Deserialize)]
struct RawPosition {
    symbol: Symbol,
    quantity: Decimal,
    purchase_price: Decimal,
}

impl TryFrom<RawPosition> for PortfolioPosition {
    type Error = ValidationError;

    fn try_from(raw: RawPosition) -> Result<Self, Self::Error> {
        Self::new(raw.symbol, raw.quantity, raw.purchase_price)
    }
}

/// Notify when `symbol` trades at or above `target_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawAlert")]
pub struct PriceAlert {
    pub symbol: Symbol,
    pub target_price: Decimal,
}

impl PriceAlert {
    pub fn new(symbol: Symbol, target_price: Decimal) -> Result<Self, ValidationError> {
        if target_price <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveValue {
                field: "target_price",
            });
        }

        Ok(Self {
            symbol,
            target_price,
        })
    }
}

#[derive(Deserialize)]
struct RawAlert {
    symbol: Symbol,
    target_price: Decimal,
}

impl TryFrom<RawAlert> for PriceAlert {
    type Error = ValidationError;

    fn try_from(raw: RawAlert) -> Result<Self, Self::Error> {
        Self::new(raw.symbol, raw.target_price)
    }
}
