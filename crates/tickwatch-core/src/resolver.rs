use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

use crate::provider::{PriceProvider, ProviderFailure};
use crate::{PricePoint, ProviderId, Symbol};

/// Outcome of resolving one symbol: its latest close or why there is none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteOutcome {
    Latest(PricePoint),
    Failure(ProviderFailure),
}

/// Latest price (or failure) for one symbol, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedQuote {
    pub symbol: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: QuoteOutcome,
}

impl ResolvedQuote {
    pub fn resolved(symbol: &Symbol, name: impl Into<String>, point: PricePoint) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.into(),
            outcome: QuoteOutcome::Latest(point),
        }
    }

    /// A failed lookup; the display name falls back to the raw symbol text.
    pub fn failed(symbol: impl Into<String>, failure: ProviderFailure) -> Self {
        let symbol = symbol.into();
        Self {
            name: symbol.clone(),
            symbol,
            outcome: QuoteOutcome::Failure(failure),
        }
    }

    pub fn latest(&self) -> Option<&PricePoint> {
        match &self.outcome {
            QuoteOutcome::Latest(point) => Some(point),
            QuoteOutcome::Failure(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ProviderFailure> {
        match &self.outcome {
            QuoteOutcome::Latest(_) => None,
            QuoteOutcome::Failure(failure) => Some(failure),
        }
    }

    pub fn price(&self) -> Option<Decimal> {
        self.latest().map(|point| point.price)
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.outcome, QuoteOutcome::Latest(_))
    }
}

/// Turns one symbol into a [`ResolvedQuote`]. Never fails.
#[derive(Clone)]
pub struct Resolver {
    provider: Arc<dyn PriceProvider>,
}

impl Resolver {
    pub fn new(provider: Arc<dyn PriceProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }

    pub async fn resolve(&self, symbol: &Symbol) -> ResolvedQuote {
        let outcome = self.provider.fetch_series(symbol).await;

        let resolved = match outcome {
            Ok(lookup) => match lookup.series.latest() {
                Some(point) => {
                    let name = lookup
                        .name
                        .filter(|name| !name.trim().is_empty())
                        .unwrap_or_else(|| symbol.to_string());
                    ResolvedQuote::resolved(symbol, name, *point)
                }
                None => ResolvedQuote::failed(
                    symbol.as_str(),
                    ProviderFailure::unknown_symbol(format!("no daily closes for {symbol}")),
                ),
            },
            Err(failure) => ResolvedQuote::failed(symbol.as_str(), failure),
        };

        if let Some(failure) = resolved.failure() {
            warn!(
                symbol = %symbol,
                provider = %self.provider.id(),
                code = failure.code(),
                message = failure.message(),
                "symbol could not be resolved"
            );
        }

        resolved
    }

    /// Resolves raw user input; invalid tickers never reach the provider.
    pub async fn resolve_ticker(&self, ticker: &str) -> ResolvedQuote {
        match Symbol::parse(ticker) {
            Ok(symbol) => self.resolve(&symbol).await,
            Err(error) => {
                let failure = ProviderFailure::invalid_symbol(error.to_string());
                warn!(ticker, code = failure.code(), "rejected ticker");
                ResolvedQuote::failed(ticker.trim(), failure)
            }
        }
    }
}
