//! Bounded fan-out of per-symbol lookups.
//!
//! The [`Aggregator`] resolves a batch of ownership records concurrently,
//! never keeping more than `max_concurrency` provider calls in flight, and
//! returns one [`EnrichedRecord`] per input record in input order. Per-symbol
//! failures are data; the only batch-level failure is the optional request
//! deadline.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::info;

use crate::config::AggregatorConfig;
use crate::error::AggregateError;
use crate::provider::{PriceProvider, ProviderFailure};
use crate::resolver::{ResolvedQuote, Resolver};
use crate::{ProviderId, Symbol};

/// An ownership record merged with the quote resolved for its symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnrichedRecord<T> {
    #[serde(flatten)]
    pub record: T,
    pub resolved: ResolvedQuote,
}

/// Concurrent, order-preserving batch resolver.
///
/// Clones share one permit pool.
#[derive(Clone)]
pub struct Aggregator {
    resolver: Resolver,
    permits: Arc<Semaphore>,
    config: AggregatorConfig,
}

impl Aggregator {
    pub fn new(provider: Arc<dyn PriceProvider>, config: AggregatorConfig) -> Self {
        let config = AggregatorConfig {
            max_concurrency: config.max_concurrency.max(1),
            ..config
        };
        Self {
            resolver: Resolver::new(provider),
            permits: Arc::new(Semaphore::new(config.max_concurrency)),
            config,
        }
    }

    pub fn provider_id(&self) -> ProviderId {
        self.resolver.provider_id()
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn max_concurrency(&self) -> usize {
        self.config.max_concurrency
    }

    /// Permits not currently held by an in-flight lookup.
    pub fn available_permits(&self) -> usize {
        self.permits.available_permits()
    }

    /// Resolves every record's symbol and merges the outcome back in order.
    ///
    /// Waits for every lookup to settle. Never fails: provider problems end
    /// up in each record's [`ResolvedQuote`].
    pub async fn resolve_all<T, F>(&self, records: &[T], symbol_of: F) -> Vec<EnrichedRecord<T>>
    where
        T: Clone,
        F: Fn(&T) -> &Symbol,
    {
        let lookups = records.iter().map(|record| {
            let symbol = symbol_of(record);
            (symbol.as_str(), self.resolver.resolve(symbol))
        });

        let resolved = self.settle(lookups).await;

        records
            .iter()
            .cloned()
            .zip(resolved)
            .map(|(record, resolved)| EnrichedRecord { record, resolved })
            .collect()
    }

    /// Resolves raw tickers; invalid input becomes an `InvalidSymbol` entry
    /// at the same position.
    pub async fn resolve_tickers(&self, tickers: &[String]) -> Vec<ResolvedQuote> {
        let lookups = tickers
            .iter()
            .map(|ticker| (ticker.trim(), self.resolver.resolve_ticker(ticker)));
        self.settle(lookups).await
    }

    /// [`resolve_all`](Self::resolve_all) bounded by a deadline.
    ///
    /// On expiry every in-flight lookup is dropped, its permit returns to the
    /// pool and the whole batch fails with
    /// [`AggregateError::DeadlineExceeded`].
    pub async fn resolve_all_within<T, F>(
        &self,
        records: &[T],
        symbol_of: F,
        timeout: Duration,
    ) -> Result<Vec<EnrichedRecord<T>>, AggregateError>
    where
        T: Clone,
        F: Fn(&T) -> &Symbol,
    {
        tokio::time::timeout(timeout, self.resolve_all(records, symbol_of))
            .await
            .map_err(|_| AggregateError::DeadlineExceeded {
                timeout_ms: duration_ms(timeout),
            })
    }

    /// Uses the configured request timeout, if any.
    pub async fn resolve_batch<T, F>(
        &self,
        records: &[T],
        symbol_of: F,
    ) -> Result<Vec<EnrichedRecord<T>>, AggregateError>
    where
        T: Clone,
        F: Fn(&T) -> &Symbol,
    {
        match self.config.request_timeout {
            Some(timeout) => self.resolve_all_within(records, symbol_of, timeout).await,
            None => Ok(self.resolve_all(records, symbol_of).await),
        }
    }

    async fn settle<'a, I, Fut>(&'a self, lookups: I) -> Vec<ResolvedQuote>
    where
        I: IntoIterator<Item = (&'a str, Fut)>,
        Fut: Future<Output = ResolvedQuote> + 'a,
    {
        let started = Instant::now();

        let mut in_flight = lookups
            .into_iter()
            .enumerate()
            .map(|(index, (symbol, lookup))| async move {
                // the permit is held until the lookup settles or is dropped
                let resolved = match self.permits.acquire().await {
                    Ok(_permit) => lookup.await,
                    Err(_) => ResolvedQuote::failed(
                        symbol,
                        ProviderFailure::unreachable("fan-out limiter is closed"),
                    ),
                };
                (index, resolved)
            })
            .collect::<FuturesUnordered<_>>();

        let mut slots: Vec<Option<ResolvedQuote>> = vec![None; in_flight.len()];
        while let Some((index, resolved)) = in_flight.next().await {
            slots[index] = Some(resolved);
        }

        let resolved: Vec<ResolvedQuote> = slots.into_iter().flatten().collect();
        let failed = resolved.iter().filter(|quote| !quote.is_resolved()).count();
        info!(
            provider = %self.provider_id(),
            total = resolved.len(),
            resolved = resolved.len() - failed,
            failed,
            elapsed_ms = duration_ms(started.elapsed()),
            "batch settled"
        );

        resolved
    }
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
