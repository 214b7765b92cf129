use std::time::Duration;

use crate::ProviderId;

/// Rate and fan-out budget for one provider.
///
/// `max_concurrency` bounds how many lookups the aggregator keeps in flight;
/// `quota_limit` calls per `quota_window` bounds how many the provider client
/// sends at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    pub provider_id: ProviderId,
    pub max_concurrency: usize,
    pub quota_window: Duration,
    pub quota_limit: u32,
}

impl ProviderPolicy {
    /// Alpha Vantage free tier: 5 calls per minute.
    pub fn alphavantage_default() -> Self {
        Self {
            provider_id: ProviderId::Alphavantage,
            max_concurrency: 2,
            quota_window: Duration::from_secs(60),
            quota_limit: 5,
        }
    }

    pub fn fixture_default() -> Self {
        Self {
            provider_id: ProviderId::Fixture,
            max_concurrency: 8,
            quota_window: Duration::from_secs(1),
            quota_limit: 10_000,
        }
    }

    pub fn default_for(provider_id: ProviderId) -> Self {
        match provider_id {
            ProviderId::Alphavantage => Self::alphavantage_default(),
            ProviderId::Fixture => Self::fixture_default(),
        }
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}
