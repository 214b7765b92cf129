//! Runtime configuration for provider clients and the aggregator.
//!
//! # Environment Variables
//!
//! | Variable | Fallback | Default |
//! |----------|----------|---------|
//! | `TICKWATCH_ALPHAVANTAGE_API_KEY` | `ALPHA_VANTAGE_API_KEY` | `demo` |
//! | `TICKWATCH_ALPHAVANTAGE_BASE_URL` | - | `https://www.alphavantage.co/query` |
//!
//! API keys are never logged; the `Debug` output of [`AlphaVantageConfig`]
//! redacts them.

use std::env;
use std::fmt::{Debug, Formatter};
use std::time::Duration;

use crate::provider_policy::ProviderPolicy;

pub const DEFAULT_ALPHAVANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";
pub const DEFAULT_PROVIDER_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_MAX_CONCURRENCY: usize = 4;

const API_KEY_ENV: &str = "TICKWATCH_ALPHAVANTAGE_API_KEY";
const API_KEY_FALLBACK_ENV: &str = "ALPHA_VANTAGE_API_KEY";
const BASE_URL_ENV: &str = "TICKWATCH_ALPHAVANTAGE_BASE_URL";

/// Credentials, endpoint and budget for the Alpha Vantage client.
#[derive(Clone, PartialEq, Eq)]
pub struct AlphaVantageConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout_ms: u64,
    pub policy: ProviderPolicy,
}

impl Default for AlphaVantageConfig {
    fn default() -> Self {
        Self {
            api_key: String::from("demo"),
            base_url: String::from(DEFAULT_ALPHAVANTAGE_BASE_URL),
            timeout_ms: DEFAULT_PROVIDER_TIMEOUT_MS,
            policy: ProviderPolicy::alphavantage_default(),
        }
    }
}

impl AlphaVantageConfig {
    /// Reads credentials and endpoint overrides from the environment.
    pub fn from_env() -> Self {
        let api_key = first_non_empty_env(&[API_KEY_ENV, API_KEY_FALLBACK_ENV])
            .unwrap_or_else(|| String::from("demo"));
        let base_url = first_non_empty_env(&[BASE_URL_ENV])
            .unwrap_or_else(|| String::from(DEFAULT_ALPHAVANTAGE_BASE_URL));

        Self {
            api_key,
            base_url,
            ..Self::default()
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_policy(mut self, policy: ProviderPolicy) -> Self {
        self.policy = policy;
        self
    }
}

impl Debug for AlphaVantageConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Fan-out and deadline settings for [`Aggregator`](crate::Aggregator).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Maximum number of provider lookups in flight at once. Always >= 1.
    pub max_concurrency: usize,
    /// Deadline for a whole batch; `None` waits for every lookup to settle.
    pub request_timeout: Option<Duration>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            request_timeout: None,
        }
    }
}

impl AggregatorConfig {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            request_timeout: None,
        }
    }

    pub fn from_policy(policy: &ProviderPolicy) -> Self {
        Self::new(policy.max_concurrency)
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

fn first_non_empty_env(keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| env::var(key).ok())
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
}
