//! # Tickwatch Core
//!
//! Market-data aggregation for watchlists, portfolios and price alerts.
//!
//! ## Overview
//!
//! A user's ownership records (watched symbols, open positions, price
//! alerts) are enriched with the latest daily close from a price provider:
//!
//! - **Provider clients** fetch a daily close series per symbol and classify
//!   every failure (rate limited, unknown symbol, malformed response,
//!   unreachable)
//! - **Resolver** turns one symbol into a [`ResolvedQuote`] and never fails
//! - **Aggregator** fans out over a batch with a bounded number of calls in
//!   flight and preserves input order
//! - **Views** merge records with their quotes and compute profit/loss and
//!   alert state
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Alpha Vantage and fixture providers |
//! | [`aggregator`] | Bounded, order-preserving fan-out |
//! | [`config`] | Provider and aggregator settings |
//! | [`domain`] | Symbol, PricePoint, PriceSeries |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`ownership`] | Ownership records and stores |
//! | [`provider`] | Provider contract and failure taxonomy |
//! | [`provider_policy`] | Fan-out and call budgets per provider |
//! | [`resolver`] | Per-symbol resolution |
//! | [`source`] | Provider identifiers |
//! | [`throttling`] | Client-side call budget |
//! | [`views`] | Watchlist, portfolio and alert views |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickwatch_core::{
//!     AggregatorConfig, AlphaVantageAdapter, AlphaVantageConfig, Aggregator, EnrichmentService,
//!     InMemoryOwnershipStore, UserId,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AlphaVantageConfig::from_env();
//!     let aggregator = Aggregator::new(
//!         Arc::new(AlphaVantageAdapter::new(config.clone())),
//!         AggregatorConfig::from_policy(&config.policy),
//!     );
//!     let service = EnrichmentService::new(Arc::new(InMemoryOwnershipStore::new()), aggregator);
//!
//!     for view in service.portfolio(&UserId::parse("alice")?).await? {
//!         println!("{} {:?}", view.symbol, view.profit_loss);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Enrichment      │────▶│ Ownership Store  │
//! │ Service         │     └──────────────────┘
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Aggregator      │────▶│ Resolver         │
//! │ (fan-out limit) │     └────────┬─────────┘
//! └─────────────────┘              │
//!                                  ▼
//!                         ┌──────────────────┐     ┌──────────────┐
//!                         │ Price Provider   │────▶│ HTTP Client  │
//!                         └──────────────────┘     └──────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Per-symbol problems are data, not errors:
//!
//! ```rust
//! use tickwatch_core::{FailureKind, ResolvedQuote};
//!
//! fn describe(quote: &ResolvedQuote) -> String {
//!     match quote.failure().map(|failure| failure.kind()) {
//!         None => format!("{} resolved", quote.symbol),
//!         Some(FailureKind::RateLimited) => String::from("try again later"),
//!         Some(other) => format!("{}: {other}", quote.symbol),
//!     }
//! }
//! ```
//!
//! Only a failed ownership read or an expired request deadline fails a whole
//! batch ([`AggregateError`]).
//!
//! ## Security
//!
//! - API keys are read from the environment and redacted from logs and `Debug`
//! - Transport errors are stripped of request URLs before they surface

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod ownership;
pub mod provider;
pub mod provider_policy;
pub mod resolver;
pub mod source;
pub mod throttling;
pub mod views;

// Provider implementations
pub use adapters::{parse_daily_series, AlphaVantageAdapter, FixtureLoadError, FixtureProvider};

// Aggregation
pub use aggregator::{Aggregator, EnrichedRecord};

// Configuration
pub use config::{AggregatorConfig, AlphaVantageConfig};

// Domain models
pub use domain::{PricePoint, PriceSeries, Symbol};

// Error types
pub use error::{AggregateError, CoreError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient};

// Ownership
pub use ownership::{
    InMemoryOwnershipStore, JsonFileStore, OwnershipError, OwnershipStore, PortfolioPosition,
    PriceAlert, UserId, WatchlistEntry,
};

// Provider contract
pub use provider::{FailureKind, PriceProvider, ProviderFailure, SeriesLookup};

// Provider policies
pub use provider_policy::ProviderPolicy;

// Resolution
pub use resolver::{QuoteOutcome, ResolvedQuote, Resolver};

// Source identifiers
pub use source::ProviderId;

// Throttling
pub use throttling::ThrottlingQueue;

// Views
pub use views::{alert_triggered, profit_loss, AlertView, EnrichmentService, PortfolioView, ViewError, WatchlistView};
