mod alphavantage;
mod fixture;

pub use alphavantage::{parse_daily_series, AlphaVantageAdapter};
pub use fixture::{FixtureLoadError, FixtureProvider};
