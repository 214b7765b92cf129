mod alerts;
mod portfolio;
mod quote;
mod series;
mod watchlist;

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde_json::Value;
use tickwatch_core::{
    Aggregator, AggregatorConfig, AlphaVantageAdapter, AlphaVantageConfig, EnrichmentService,
    FixtureProvider, JsonFileStore, OwnershipStore, PriceProvider, ProviderId, ProviderPolicy,
    UserId, ViewError,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::Envelope;

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// Everything a command needs, wired once per invocation.
pub struct Context {
    pub user: UserId,
    pub provider: Arc<dyn PriceProvider>,
    pub store: Arc<dyn OwnershipStore>,
    pub service: EnrichmentService,
}

impl Context {
    pub async fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let user = UserId::parse(&cli.user)?;

        let (provider, policy) = match &cli.fixtures {
            Some(path) => {
                let fixtures = FixtureProvider::from_json_file(path).await?;
                let provider: Arc<dyn PriceProvider> = Arc::new(fixtures);
                (provider, ProviderPolicy::fixture_default())
            }
            None => {
                let config = AlphaVantageConfig::from_env().with_timeout_ms(cli.timeout_ms);
                let policy = config.policy.clone();
                let provider: Arc<dyn PriceProvider> = Arc::new(AlphaVantageAdapter::new(config));
                (provider, policy)
            }
        };

        let mut aggregator_config = match cli.concurrency {
            Some(limit) => AggregatorConfig::new(limit),
            None => AggregatorConfig::from_policy(&policy),
        };
        if let Some(timeout_ms) = cli.request_timeout_ms {
            aggregator_config = aggregator_config.with_request_timeout(Duration::from_millis(timeout_ms));
        }

        let store: Arc<dyn OwnershipStore> = Arc::new(JsonFileStore::new(&cli.store));
        let aggregator = Aggregator::new(Arc::clone(&provider), aggregator_config);
        tracing::debug!(
            provider = %provider.id(),
            max_concurrency = aggregator.max_concurrency(),
            store = %cli.store.display(),
            "context ready"
        );

        Ok(Self {
            user,
            service: EnrichmentService::new(Arc::clone(&store), aggregator),
            provider,
            store,
        })
    }

    pub fn provider_id(&self) -> ProviderId {
        self.provider.id()
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let started = Instant::now();
    let context = Context::from_cli(cli).await?;

    let CommandResult { data, warnings } = match &cli.command {
        Command::Watchlist(args) => watchlist::run(args, &context).await?,
        Command::Portfolio(args) => portfolio::run(args, &context).await?,
        Command::Alerts(args) => alerts::run(args, &context).await?,
        Command::Series(args) => series::run(args, &context).await?,
        Command::Quote(args) => quote::run(args, &context).await?,
    };

    let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let mut meta = Metadata::new(context.provider_id(), latency_ms);
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope { meta, data })
}

/// One warning per failed symbol, e.g. `IBM: quota spent (provider.rate_limited)`.
pub(crate) fn failure_warnings<'a>(
    failures: impl IntoIterator<Item = (&'a str, Option<&'a ViewError>)>,
) -> Vec<String> {
    failures
        .into_iter()
        .filter_map(|(symbol, error)| {
            error.map(|error| format!("{symbol}: {} ({})", error.message, error.code))
        })
        .collect()
}
