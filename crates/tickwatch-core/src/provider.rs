//! Provider client contract and per-symbol failure taxonomy.
//!
//! A [`PriceProvider`] answers one question: "what is the daily close series
//! for this symbol?". Every way that question can go wrong is classified into
//! a [`FailureKind`] so callers can treat failures as data.
//!
//! | Kind | Code | Retryable |
//! |------|------|-----------|
//! | [`FailureKind::InvalidSymbol`] | `symbol.invalid` | no |
//! | [`FailureKind::RateLimited`] | `provider.rate_limited` | yes |
//! | [`FailureKind::UnknownSymbol`] | `symbol.unknown` | no |
//! | [`FailureKind::MalformedResponse`] | `provider.malformed_response` | no |
//! | [`FailureKind::Unreachable`] | `provider.unreachable` | yes |
//!
//! # Example
//!
//! ```rust,ignore
//! use tickwatch_core::{PriceProvider, Symbol};
//!
//! async fn latest(provider: &dyn PriceProvider) {
//!     let symbol = Symbol::parse("AAPL").expect("valid");
//!     match provider.fetch_series(&symbol).await {
//!         Ok(lookup) => println!("{:?}", lookup.series.latest()),
//!         Err(failure) => eprintln!("{}: {failure}", failure.code()),
//!     }
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{PriceSeries, ProviderId, Symbol};

/// Classification of a failed per-symbol lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    InvalidSymbol,
    RateLimited,
    UnknownSymbol,
    MalformedResponse,
    Unreachable,
}

impl FailureKind {
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidSymbol => "symbol.invalid",
            Self::RateLimited => "provider.rate_limited",
            Self::UnknownSymbol => "symbol.unknown",
            Self::MalformedResponse => "provider.malformed_response",
            Self::Unreachable => "provider.unreachable",
        }
    }

    pub const fn retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Unreachable)
    }
}

impl Display for FailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// A classified provider failure for one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderFailure {
    kind: FailureKind,
    message: String,
}

impl ProviderFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_symbol(message: impl Into<String>) -> Self {
        Self::new(FailureKind::InvalidSymbol, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(FailureKind::RateLimited, message)
    }

    pub fn unknown_symbol(message: impl Into<String>) -> Self {
        Self::new(FailureKind::UnknownSymbol, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(FailureKind::MalformedResponse, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Unreachable, message)
    }

    pub const fn kind(&self) -> FailureKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub const fn retryable(&self) -> bool {
        self.kind.retryable()
    }
}

impl Display for ProviderFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderFailure {}

/// Successful provider answer: the close series plus optional display metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesLookup {
    pub series: PriceSeries,
    pub name: Option<String>,
}

impl SeriesLookup {
    pub fn new(series: PriceSeries, name: Option<String>) -> Self {
        Self { series, name }
    }
}

pub type SeriesFuture<'a> =
    Pin<Box<dyn Future<Output = Result<SeriesLookup, ProviderFailure>> + Send + 'a>>;

/// Provider client contract.
///
/// One call issues at most one outbound request and has no other side effect.
/// Implementations must be `Send + Sync`; the aggregator shares one instance
/// across all concurrent lookups.
pub trait PriceProvider: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches the daily close series for `symbol`.
    ///
    /// # Errors
    ///
    /// Returns a [`ProviderFailure`] classified as rate limited, unknown
    /// symbol, malformed response or unreachable. Implementations never panic
    /// on unexpected payloads.
    fn fetch_series<'a>(&'a self, symbol: &'a Symbol) -> SeriesFuture<'a>;
}
