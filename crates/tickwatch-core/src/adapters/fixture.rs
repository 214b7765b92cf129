use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::provider::{FailureKind, PriceProvider, ProviderFailure, SeriesFuture, SeriesLookup};
use crate::{CoreError, PricePoint, PriceSeries, ProviderId, Symbol};

/// Offline provider answering from a fixed table.
///
/// Symbols missing from the table answer `UnknownSymbol`.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    entries: BTreeMap<Symbol, Result<SeriesLookup, ProviderFailure>>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_series(mut self, series: PriceSeries, name: Option<&str>) -> Self {
        let symbol = series.symbol().clone();
        self.entries.insert(
            symbol,
            Ok(SeriesLookup::new(series, name.map(str::to_owned))),
        );
        self
    }

    pub fn with_failure(mut self, symbol: Symbol, failure: ProviderFailure) -> Self {
        self.entries.insert(symbol, Err(failure));
        self
    }

    /// Loads a fixture document.
    ///
    /// ```json
    /// {
    ///   "AAPL": { "name": "Apple Inc.", "points": [{ "date": "2024-03-01", "price": 179.66 }] },
    ///   "BAD":  { "failure": "rate_limited", "message": "slow down" }
    /// }
    /// ```
    pub fn from_json_str(raw: &str) -> Result<Self, CoreError> {
        let document: BTreeMap<String, FixtureEntry> = serde_json::from_str(raw)?;

        let mut provider = Self::new();
        for (ticker, entry) in document {
            let symbol = Symbol::parse(&ticker)?;
            provider = match entry {
                FixtureEntry::Series { name, points } => {
                    let series = PriceSeries::new(symbol, points)?;
                    provider.with_series(series, name.as_deref())
                }
                FixtureEntry::Failure { failure, message } => {
                    let message = message.unwrap_or_else(|| format!("fixture failure for {ticker}"));
                    provider.with_failure(symbol, ProviderFailure::new(failure, message))
                }
            };
        }

        Ok(provider)
    }

    pub async fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FixtureLoadError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FixtureLoadError::Io {
                path: path.display().to_string(),
                source,
            })?;
        Self::from_json_str(&raw).map_err(|source| FixtureLoadError::Invalid {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PriceProvider for FixtureProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn fetch_series<'a>(&'a self, symbol: &'a Symbol) -> SeriesFuture<'a> {
        let answer = self.entries.get(symbol).cloned().unwrap_or_else(|| {
            Err(ProviderFailure::unknown_symbol(format!(
                "no fixture data for {symbol}"
            )))
        });
        Box::pin(async move { answer })
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureEntry {
    Failure {
        failure: FailureKind,
        #[serde(default)]
        message: Option<String>,
    },
    Series {
        #[serde(default)]
        name: Option<String>,
        points: Vec<PricePoint>,
    },
}

/// Errors raised while loading a fixture file.
#[derive(Debug, thiserror::Error)]
pub enum FixtureLoadError {
    #[error("failed to read fixture file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid fixture file '{path}': {source}")]
    Invalid {
        path: String,
        #[source]
        source: CoreError,
    },
}
