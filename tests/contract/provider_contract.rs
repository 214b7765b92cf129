use std::collections::BTreeMap;
use std::sync::Arc;

use rust_decimal_macros::dec;
use tickwatch_core::http_client::HttpFuture;
use tickwatch_core::{
    AlphaVantageAdapter, AlphaVantageConfig, FailureKind, FixtureProvider, HttpClient, HttpRequest,
    HttpResponse, PricePoint, PriceProvider, PriceSeries, ProviderId, Symbol,
};

/// Replays canned Alpha Vantage bodies keyed by the `symbol` query parameter.
struct CannedAlphaVantage {
    bodies: BTreeMap<String, String>,
}

impl HttpClient for CannedAlphaVantage {
    fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
        let symbol = request
            .url
            .split('&')
            .find_map(|pair| pair.strip_prefix("symbol="))
            .unwrap_or_default()
            .to_owned();
        let body = self
            .bodies
            .get(&symbol)
            .cloned()
            .unwrap_or_else(|| String::from(r#"{"Error Message": "Invalid API call."}"#));
        Box::pin(async move { Ok(HttpResponse::ok_json(body)) })
    }
}

const AAPL_BODY: &str = r#"{
    "Meta Data": {"2. Symbol": "AAPL"},
    "Time Series (Daily)": {
        "2024-03-04": {"4. close": "175.10"},
        "2024-03-05": {"4. close": "170.12"},
        "2024-03-01": {"4. close": "179.66"}
    }
}"#;

const GARBAGE_BODY: &str = r#"{"Time Series (Daily)": {"not-a-date": {"4. close": null}}}"#;

struct ProviderCase {
    id: ProviderId,
    provider: Arc<dyn PriceProvider>,
}

fn symbol(raw: &str) -> Symbol {
    Symbol::parse(raw).expect("valid symbol")
}

fn provider_cases() -> Vec<ProviderCase> {
    let bodies = BTreeMap::from([
        (String::from("AAPL"), String::from(AAPL_BODY)),
        (String::from("JUNK"), String::from(GARBAGE_BODY)),
    ]);
    let alphavantage = AlphaVantageAdapter::with_http_client(
        Arc::new(CannedAlphaVantage { bodies }),
        AlphaVantageConfig::default().with_base_url("https://av.test/query"),
    );

    let series = PriceSeries::new(
        symbol("AAPL"),
        vec![
            PricePoint::new(time::macros::date!(2024 - 03 - 05), dec!(170.12)).expect("valid"),
            PricePoint::new(time::macros::date!(2024 - 03 - 01), dec!(179.66)).expect("valid"),
            PricePoint::new(time::macros::date!(2024 - 03 - 04), dec!(175.10)).expect("valid"),
        ],
    )
    .expect("valid series");
    let fixture = FixtureProvider::new()
        .with_series(series, None)
        .with_failure(
            symbol("JUNK"),
            tickwatch_core::ProviderFailure::malformed("unreadable fixture"),
        );

    vec![
        ProviderCase {
            id: ProviderId::Alphavantage,
            provider: Arc::new(alphavantage),
        },
        ProviderCase {
            id: ProviderId::Fixture,
            provider: Arc::new(fixture),
        },
    ]
}

#[tokio::test]
async fn series_is_ascending_and_latest_is_most_recent_for_all_providers() {
    for case in provider_cases() {
        assert_eq!(case.provider.id(), case.id);

        let lookup = case
            .provider
            .fetch_series(&symbol("AAPL"))
            .await
            .unwrap_or_else(|failure| panic!("provider '{}' failed: {failure}", case.id));

        let dates: Vec<_> = lookup.series.points().iter().map(|p| p.date).collect();
        let mut sorted = dates.clone();
        sorted.sort();
        assert_eq!(dates, sorted, "provider '{}': ascending dates", case.id);
        assert_eq!(
            lookup.series.latest().map(|p| p.price),
            Some(dec!(170.12)),
            "provider '{}': latest close",
            case.id
        );
        assert_eq!(lookup.series.symbol(), &symbol("AAPL"));
    }
}

#[tokio::test]
async fn unknown_symbols_are_classified_for_all_providers() {
    for case in provider_cases() {
        let failure = case
            .provider
            .fetch_series(&symbol("NOPE"))
            .await
            .expect_err("unknown symbol must fail");
        assert_eq!(
            failure.kind(),
            FailureKind::UnknownSymbol,
            "provider '{}'",
            case.id
        );
        assert!(!failure.retryable());
    }
}

#[tokio::test]
async fn unreadable_payloads_are_malformed_not_panics() {
    for case in provider_cases() {
        let failure = case
            .provider
            .fetch_series(&symbol("JUNK"))
            .await
            .expect_err("garbage must fail");
        assert_eq!(
            failure.kind(),
            FailureKind::MalformedResponse,
            "provider '{}'",
            case.id
        );
    }
}
