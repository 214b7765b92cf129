//! # Enrichment Views
//!
//! Display shapes for enriched ownership records. Prices that could not be
//! resolved serialise as `null`, never zero, and the record carries an
//! `error` object instead.
//!
//! ```json
//! { "symbol": "AAPL", "quantity": 10, "purchasePrice": 100, "currentPrice": 110, "profitLoss": 100, "name": "AAPL" }
//! { "symbol": "TSLA", "targetPrice": 150, "currentPrice": null, "triggered": false, "name": "TSLA",
//!   "error": { "code": "provider.rate_limited", "message": "..." } }
//! ```

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::aggregator::{Aggregator, EnrichedRecord};
use crate::error::AggregateError;
use crate::ownership::{OwnershipStore, PortfolioPosition, PriceAlert, UserId, WatchlistEntry};
use crate::provider::ProviderFailure;
use crate::resolver::ResolvedQuote;

/// `(current - purchase) * quantity`, exact.
///
/// Absent when there is no price or the result does not fit in a `Decimal`.
pub fn profit_loss(purchase_price: Decimal, quantity: Decimal, current: Option<Decimal>) -> Option<Decimal> {
    current?
        .checked_sub(purchase_price)?
        .checked_mul(quantity)
}

/// An alert fires once the current price reaches the target.
pub fn alert_triggered(target: Decimal, current: Option<Decimal>) -> bool {
    current.is_some_and(|current| current >= target)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewError {
    pub code: String,
    pub message: String,
}

impl From<&ProviderFailure> for ViewError {
    fn from(failure: &ProviderFailure) -> Self {
        Self {
            code: failure.code().to_owned(),
            message: failure.message().to_owned(),
        }
    }
}

fn view_error(resolved: &ResolvedQuote) -> Option<ViewError> {
    resolved.failure().map(ViewError::from)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistView {
    pub symbol: String,
    pub name: String,
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ViewError>,
}

impl From<EnrichedRecord<WatchlistEntry>> for WatchlistView {
    fn from(enriched: EnrichedRecord<WatchlistEntry>) -> Self {
        let EnrichedRecord { record, resolved } = enriched;
        Self {
            symbol: record.symbol.to_string(),
            price: resolved.price(),
            error: view_error(&resolved),
            name: resolved.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub symbol: String,
    pub name: String,
    pub quantity: Decimal,
    pub purchase_price: Decimal,
    pub current_price: Option<Decimal>,
    pub profit_loss: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ViewError>,
}

impl From<EnrichedRecord<PortfolioPosition>> for PortfolioView {
    fn from(enriched: EnrichedRecord<PortfolioPosition>) -> Self {
        let EnrichedRecord { record, resolved } = enriched;
        let current_price = resolved.price();
        let profit_loss = profit_loss(record.purchase_price, record.quantity, current_price);
        let error = match (&current_price, &profit_loss) {
            (Some(_), None) => Some(ViewError {
                code: String::from("portfolio.profit_loss_overflow"),
                message: format!(
                    "profit/loss for {} x {} is out of range",
                    record.quantity, record.symbol
                ),
            }),
            _ => view_error(&resolved),
        };
        Self {
            symbol: record.symbol.to_string(),
            quantity: record.quantity,
            purchase_price: record.purchase_price,
            current_price,
            profit_loss,
            error,
            name: resolved.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertView {
    pub symbol: String,
    pub name: String,
    pub target_price: Decimal,
    pub current_price: Option<Decimal>,
    pub triggered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ViewError>,
}

impl From<EnrichedRecord<PriceAlert>> for AlertView {
    fn from(enriched: EnrichedRecord<PriceAlert>) -> Self {
        let EnrichedRecord { record, resolved } = enriched;
        let current_price = resolved.price();
        Self {
            symbol: record.symbol.to_string(),
            target_price: record.target_price,
            current_price,
            triggered: alert_triggered(record.target_price, current_price),
            error: view_error(&resolved),
            name: resolved.name,
        }
    }
}

/// Loads a user's records, resolves their symbols and projects the views.
#[derive(Clone)]
pub struct EnrichmentService {
    store: Arc<dyn OwnershipStore>,
    aggregator: Aggregator,
}

impl EnrichmentService {
    pub fn new(store: Arc<dyn OwnershipStore>, aggregator: Aggregator) -> Self {
        Self { store, aggregator }
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub async fn watchlist(&self, user: &UserId) -> Result<Vec<WatchlistView>, AggregateError> {
        let entries = self.store.watchlist(user).await?;
        let enriched = self
            .aggregator
            .resolve_batch(&entries, |entry| &entry.symbol)
            .await?;
        Ok(enriched.into_iter().map(WatchlistView::from).collect())
    }

    pub async fn portfolio(&self, user: &UserId) -> Result<Vec<PortfolioView>, AggregateError> {
        let positions = self.store.positions(user).await?;
        let enriched = self
            .aggregator
            .resolve_batch(&positions, |position| &position.symbol)
            .await?;
        Ok(enriched.into_iter().map(PortfolioView::from).collect())
    }

    pub async fn alerts(&self, user: &UserId) -> Result<Vec<AlertView>, AggregateError> {
        let alerts = self.store.alerts(user).await?;
        let enriched = self
            .aggregator
            .resolve_batch(&alerts, |alert| &alert.symbol)
            .await?;
        Ok(enriched.into_iter().map(AlertView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PricePoint, Symbol};
    use rust_decimal_macros::dec;
    use time::macros::date;

    fn resolved_at(raw: &str, price: Decimal) -> ResolvedQuote {
        let symbol = Symbol::parse(raw).expect("valid symbol");
        ResolvedQuote::resolved(
            &symbol,
            raw,
            PricePoint::new(date!(2024 - 03 - 01), price).expect("valid point"),
        )
    }

    #[test]
    fn profit_loss_is_exact_and_absent_without_price() {
        assert_eq!(profit_loss(dec!(100), dec!(10), Some(dec!(110))), Some(dec!(100.00)));
        assert_eq!(profit_loss(dec!(0.1), dec!(3), Some(dec!(0.3))), Some(dec!(0.6)));
        assert_eq!(profit_loss(dec!(120), dec!(2), Some(dec!(100))), Some(dec!(-40)));
        assert_eq!(profit_loss(dec!(100), dec!(10), None), None);
    }

    #[test]
    fn oversized_position_has_no_profit_loss_instead_of_panicking() {
        let symbol = Symbol::parse("BRK.A").expect("valid symbol");
        let quantity = Decimal::from_i128_with_scale(10_i128.pow(21), 0);
        let record = PortfolioPosition::new(symbol, quantity, dec!(1)).expect("valid");
        let view = PortfolioView::from(EnrichedRecord {
            record,
            resolved: resolved_at("BRK.A", dec!(600000000)),
        });

        assert_eq!(view.current_price, Some(dec!(600000000)));
        assert_eq!(view.profit_loss, None);
        assert_eq!(
            view.error.as_ref().map(|error| error.code.as_str()),
            Some("portfolio.profit_loss_overflow")
        );
        assert_eq!(profit_loss(Decimal::MIN, dec!(1), Some(Decimal::MAX)), None);
    }

    #[test]
    fn alerts_trigger_at_or_above_target() {
        assert!(alert_triggered(dec!(150), Some(dec!(150))));
        assert!(alert_triggered(dec!(150), Some(dec!(151))));
        assert!(!alert_triggered(dec!(150), Some(dec!(149.99))));
        assert!(!alert_triggered(dec!(150), None));
    }

    #[test]
    fn portfolio_view_serialises_camel_case_with_nulls() {
        let symbol = Symbol::parse("AAPL").expect("valid symbol");
        let record = PortfolioPosition::new(symbol, dec!(10), dec!(100)).expect("valid");
        let view = PortfolioView::from(EnrichedRecord {
            record,
            resolved: ResolvedQuote::failed("AAPL", ProviderFailure::rate_limited("quota")),
        });

        let json = serde_json::to_value(&view).expect("json");
        assert!(json["currentPrice"].is_null());
        assert!(json["profitLoss"].is_null());
        assert_eq!(json["error"]["code"], "provider.rate_limited");
        assert!(json.get("purchasePrice").is_some());
        assert!(json.get("purchase_price").is_none());
    }

    #[test]
    fn watchlist_view_omits_error_when_resolved() {
        let symbol = Symbol::parse("MSFT").expect("valid symbol");
        let view = WatchlistView::from(EnrichedRecord {
            record: WatchlistEntry::new(symbol),
            resolved: resolved_at("MSFT", dec!(414.92)),
        });

        assert_eq!(view.price, Some(dec!(414.92)));
        let json = serde_json::to_value(&view).expect("json");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn alert_view_uses_inclusive_threshold() {
        let symbol = Symbol::parse("TSLA").expect("valid symbol");
        let view = AlertView::from(EnrichedRecord {
            record: PriceAlert::new(symbol, dec!(150)).expect("valid"),
            resolved: resolved_at("TSLA", dec!(150)),
        });

        assert!(view.triggered);
        assert_eq!(view.current_price, Some(dec!(150)));
    }
}
