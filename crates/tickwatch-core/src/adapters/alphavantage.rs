use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::AlphaVantageConfig;
use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest, ReqwestHttpClient};
use crate::provider::{PriceProvider, ProviderFailure, SeriesFuture, SeriesLookup};
use crate::provider_policy::ProviderPolicy;
use crate::throttling::ThrottlingQueue;
use crate::{PricePoint, PriceSeries, ProviderId, Symbol};

const TIME_SERIES_KEY: &str = "Time Series (Daily)";
const CLOSE_KEY: &str = "4. close";
const HTTP_TOO_MANY_REQUESTS: u16 = 429;

/// Alpha Vantage `TIME_SERIES_DAILY` client.
///
/// Holds its own credentials and call budget; clones share the budget.
#[derive(Clone)]
pub struct AlphaVantageAdapter {
    http_client: Arc<dyn HttpClient>,
    config: AlphaVantageConfig,
    throttling: ThrottlingQueue,
}

impl AlphaVantageAdapter {
    pub fn new(config: AlphaVantageConfig) -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::new()), config)
    }

    pub fn with_http_client(http_client: Arc<dyn HttpClient>, config: AlphaVantageConfig) -> Self {
        let throttling = ThrottlingQueue::from_policy(&config.policy);
        Self {
            http_client,
            config,
            throttling,
        }
    }

    pub fn policy(&self) -> &ProviderPolicy {
        &self.config.policy
    }

    fn series_url(&self, symbol: &Symbol) -> String {
        format!(
            "{}?function=TIME_SERIES_DAILY&symbol={}&apikey={}",
            self.config.base_url,
            urlencoding::encode(symbol.as_str()),
            urlencoding::encode(&self.config.api_key)
        )
    }

    fn redacted(&self, url: &str) -> String {
        let encoded_key = urlencoding::encode(&self.config.api_key);
        if encoded_key.is_empty() {
            return url.to_owned();
        }
        url.replace(encoded_key.as_ref(), "***")
    }

    async fn fetch_daily_series(&self, symbol: &Symbol) -> Result<SeriesLookup, ProviderFailure> {
        if let Err(delay) = self.throttling.acquire() {
            return Err(ProviderFailure::rate_limited(format!(
                "alphavantage free-tier limit exceeded; retry in {:.2}s",
                delay.as_secs_f64()
            )));
        }

        let url = self.series_url(symbol);
        debug!(symbol = %symbol, url = %self.redacted(&url), "alphavantage request");

        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout_ms(self.config.timeout_ms);

        let response = self.http_client.execute(request).await.map_err(|error| {
            let reason = match error.kind() {
                HttpErrorKind::Timeout => "timed out",
                HttpErrorKind::Connect => "connection failed",
                HttpErrorKind::Other => "transport error",
            };
            ProviderFailure::unreachable(format!(
                "alphavantage {reason}: {}",
                self.redacted(error.message())
            ))
        })?;

        if response.status == HTTP_TOO_MANY_REQUESTS {
            return Err(ProviderFailure::rate_limited(
                "alphavantage returned status 429",
            ));
        }

        if !response.is_success() {
            return Err(ProviderFailure::unreachable(format!(
                "alphavantage returned status {}",
                response.status
            )));
        }

        parse_daily_series(symbol, &response.body)
    }
}

impl PriceProvider for AlphaVantageAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Alphavantage
    }

    fn fetch_series<'a>(&'a self, symbol: &'a Symbol) -> SeriesFuture<'a> {
        Box::pin(self.fetch_daily_series(symbol))
    }
}

/// `TIME_SERIES_DAILY` payload. Every field is optional; presence is checked
/// before anything nested is read.
#[derive(Debug, Deserialize)]
struct DailySeriesResponse {
    #[serde(rename = "Meta Data", default)]
    meta_data: Option<Map<String, Value>>,
    #[serde(rename = "Time Series (Daily)", default)]
    time_series: Option<Value>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<Value>,
    #[serde(rename = "Note", default)]
    note: Option<Value>,
    #[serde(rename = "Information", default)]
    information: Option<Value>,
}

/// Classifies and normalizes a raw `TIME_SERIES_DAILY` body.
pub fn parse_daily_series(symbol: &Symbol, body: &str) -> Result<SeriesLookup, ProviderFailure> {
    let payload: Value = serde_json::from_str(body).map_err(|error| {
        ProviderFailure::malformed(format!("alphavantage body is not valid JSON: {error}"))
    })?;
    if !payload.is_object() {
        return Err(ProviderFailure::malformed(
            "alphavantage body is not a JSON object",
        ));
    }

    let response: DailySeriesResponse = serde_json::from_value(payload).map_err(|error| {
        ProviderFailure::malformed(format!("unexpected alphavantage payload shape: {error}"))
    })?;

    check_api_notice(symbol, &response)?;

    let time_series = response
        .time_series
        .ok_or_else(|| ProviderFailure::malformed(format!("response is missing '{TIME_SERIES_KEY}'")))?;
    let time_series = time_series.as_object().ok_or_else(|| {
        ProviderFailure::malformed(format!("'{TIME_SERIES_KEY}' is not an object"))
    })?;

    if time_series.is_empty() {
        return Err(ProviderFailure::unknown_symbol(format!(
            "alphavantage reported no daily closes for {symbol}"
        )));
    }

    let points = time_series
        .iter()
        .map(|(date, bar)| parse_point(date, bar))
        .collect::<Result<Vec<_>, _>>()?;

    let series = PriceSeries::new(symbol.clone(), points)
        .map_err(|error| ProviderFailure::malformed(error.to_string()))?;

    let name = response.meta_data.as_ref().and_then(display_name);

    Ok(SeriesLookup::new(series, name))
}

fn check_api_notice(symbol: &Symbol, response: &DailySeriesResponse) -> Result<(), ProviderFailure> {
    // "Note" is how the API signals call-frequency limits
    if let Some(note) = &response.note {
        return Err(ProviderFailure::rate_limited(format!(
            "alphavantage note: {}",
            notice_text(note)
        )));
    }

    if let Some(information) = &response.information {
        let text = notice_text(information);
        if mentions_rate_limit(&text) {
            return Err(ProviderFailure::rate_limited(format!(
                "alphavantage information: {text}"
            )));
        }
        return Err(ProviderFailure::malformed(format!(
            "alphavantage information: {text}"
        )));
    }

    if let Some(message) = &response.error_message {
        let text = notice_text(message);
        if text.to_ascii_lowercase().contains("apikey") {
            // credential problem; the symbol was never looked up
            return Err(ProviderFailure::malformed(format!(
                "alphavantage rejected the api key: {text}"
            )));
        }
        return Err(ProviderFailure::unknown_symbol(format!(
            "alphavantage has no data for {symbol}: {text}"
        )));
    }

    Ok(())
}

fn parse_point(date: &str, bar: &Value) -> Result<PricePoint, ProviderFailure> {
    let date = PricePoint::parse_date(date)
        .map_err(|error| ProviderFailure::malformed(error.to_string()))?;

    let close = bar
        .get(CLOSE_KEY)
        .ok_or_else(|| ProviderFailure::malformed(format!("bar {date} is missing '{CLOSE_KEY}'")))?;

    let price = match close {
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        Value::Number(number) => Decimal::from_str(&number.to_string()).ok(),
        _ => None,
    }
    .ok_or_else(|| ProviderFailure::malformed(format!("bar {date} has an unreadable close")))?;

    PricePoint::new(date, price).map_err(|error| ProviderFailure::malformed(error.to_string()))
}

fn display_name(meta_data: &Map<String, Value>) -> Option<String> {
    meta_data
        .iter()
        .find(|(key, _)| key.to_ascii_lowercase().contains("name"))
        .and_then(|(_, value)| value.as_str())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

fn notice_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn mentions_rate_limit(text: &str) -> bool {
    let lower = text.to_ascii_lowercase();
    ["call frequency", "rate limit", "requests per day", "requests per minute"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpFuture, HttpResponse};
    use crate::provider::FailureKind;
    use rust_decimal_macros::dec;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Debug)]
    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn replying(response: Result<HttpResponse, HttpError>) -> Self {
            Self {
                response,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn recorded_requests(&self) -> Vec<HttpRequest> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .clone()
        }
    }

    impl HttpClient for RecordingHttpClient {
        fn execute<'a>(&'a self, request: HttpRequest) -> HttpFuture<'a> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    const DAILY_BODY: &str = r#"{
        "Meta Data": {
            "1. Information": "Daily Prices (open, high, low, close) and Volumes",
            "2. Symbol": "IBM",
            "3. Last Refreshed": "2024-03-05"
        },
        "Time Series (Daily)": {
            "2024-03-05": {"1. open": "192.00", "4. close": "191.95", "5. volume": "100"},
            "2024-03-01": {"1. open": "185.49", "4. close": "185.03", "5. volume": "100"},
            "2024-03-04": {"1. open": "187.76", "4. close": "193.06", "5. volume": "100"}
        }
    }"#;

    fn ibm() -> Symbol {
        Symbol::parse("IBM").expect("valid symbol")
    }

    fn adapter(client: Arc<RecordingHttpClient>) -> AlphaVantageAdapter {
        AlphaVantageAdapter::with_http_client(
            client,
            AlphaVantageConfig::default()
                .with_api_key("alpha-key")
                .with_base_url("https://av.test/query"),
        )
    }

    #[test]
    fn parses_series_ascending_with_latest_close_last() {
        let lookup = parse_daily_series(&ibm(), DAILY_BODY).expect("valid payload");

        let closes: Vec<Decimal> = lookup.series.points().iter().map(|p| p.price).collect();
        assert_eq!(closes, vec![dec!(185.03), dec!(193.06), dec!(191.95)]);
        assert_eq!(lookup.series.latest().map(|p| p.price), Some(dec!(191.95)));
        assert_eq!(lookup.name, None);
    }

    #[test]
    fn note_is_classified_as_rate_limited() {
        let body = r#"{"Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."}"#;
        let failure = parse_daily_series(&ibm(), body).expect_err("must fail");
        assert_eq!(failure.kind(), FailureKind::RateLimited);
    }

    #[test]
    fn information_about_daily_quota_is_rate_limited_otherwise_malformed() {
        let quota = r#"{"Information": "You have reached the 25 requests per day limit."}"#;
        assert_eq!(
            parse_daily_series(&ibm(), quota).expect_err("must fail").kind(),
            FailureKind::RateLimited
        );

        let premium = r#"{"Information": "This is a premium endpoint."}"#;
        assert_eq!(
            parse_daily_series(&ibm(), premium).expect_err("must fail").kind(),
            FailureKind::MalformedResponse
        );
    }

    #[test]
    fn error_message_is_classified_as_unknown_symbol() {
        let body = r#"{"Error Message": "Invalid API call. Please retry or visit the documentation."}"#;
        let failure = parse_daily_series(&ibm(), body).expect_err("must fail");
        assert_eq!(failure.kind(), FailureKind::UnknownSymbol);
    }

    #[test]
    fn api_key_rejection_is_not_an_unknown_symbol() {
        let body = r#"{"Error Message": "the parameter apikey is invalid or missing. Please claim your free API key on (https://www.alphavantage.co/support/#api-key)."}"#;
        let failure = parse_daily_series(&ibm(), body).expect_err("must fail");
        assert_eq!(failure.kind(), FailureKind::MalformedResponse);
        assert!(failure.message().contains("api key"));
    }

    #[test]
    fn missing_or_broken_series_is_malformed() {
        for body in [
            r#"{"Meta Data": {"2. Symbol": "IBM"}}"#,
            r#"{"Time Series (Daily)": []}"#,
            r#"{"Time Series (Daily)": {"2024-03-01": {"1. open": "1.0"}}}"#,
            r#"{"Time Series (Daily)": {"2024-03-01": {"4. close": "abc"}}}"#,
            r#"{"Time Series (Daily)": {"03/01/2024": {"4. close": "1.0"}}}"#,
            r#"{"Time Series (Daily)": {"2024-03-01": {"4. close": "-1.0"}}}"#,
            r#"[1, 2, 3]"#,
            "<html>gateway</html>",
        ] {
            let failure = parse_daily_series(&ibm(), body).expect_err("must fail");
            assert_eq!(
                failure.kind(),
                FailureKind::MalformedResponse,
                "body {body} should be malformed, got {failure}"
            );
        }
    }

    #[test]
    fn empty_series_means_unknown_symbol() {
        let body = r#"{"Time Series (Daily)": {}}"#;
        let failure = parse_daily_series(&ibm(), body).expect_err("must fail");
        assert_eq!(failure.kind(), FailureKind::UnknownSymbol);
    }

    #[test]
    fn display_name_is_read_from_metadata_when_present() {
        let body = r#"{
            "Meta Data": {"2. Symbol": "IBM", "6. Name": "International Business Machines"},
            "Time Series (Daily)": {"2024-03-01": {"4. close": 185.03}}
        }"#;
        let lookup = parse_daily_series(&ibm(), body).expect("valid payload");
        assert_eq!(lookup.name.as_deref(), Some("International Business Machines"));
        assert_eq!(lookup.series.latest().map(|p| p.price), Some(dec!(185.03)));
    }

    #[tokio::test]
    async fn request_targets_daily_endpoint_with_encoded_key() {
        let client = Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::ok_json(DAILY_BODY))));
        let adapter = adapter(Arc::clone(&client));

        let lookup = adapter.fetch_series(&ibm()).await.expect("series");
        assert_eq!(lookup.series.len(), 3);

        let requests = client.recorded_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].url,
            "https://av.test/query?function=TIME_SERIES_DAILY&symbol=IBM&apikey=alpha-key"
        );
        assert_eq!(requests[0].timeout_ms, 5_000);
    }

    #[tokio::test]
    async fn transport_failures_are_unreachable() {
        let client = Arc::new(RecordingHttpClient::replying(Err(HttpError::timeout(
            "request timeout: operation timed out",
        ))));
        let failure = adapter(client)
            .fetch_series(&ibm())
            .await
            .expect_err("must fail");

        assert_eq!(failure.kind(), FailureKind::Unreachable);
        assert!(failure.message().contains("timed out"));
    }

    #[tokio::test]
    async fn http_status_codes_are_classified() {
        let throttled = Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::new(429, ""))));
        assert_eq!(
            adapter(throttled).fetch_series(&ibm()).await.expect_err("429").kind(),
            FailureKind::RateLimited
        );

        let outage = Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::new(503, ""))));
        assert_eq!(
            adapter(outage).fetch_series(&ibm()).await.expect_err("503").kind(),
            FailureKind::Unreachable
        );
    }

    #[tokio::test]
    async fn local_budget_short_circuits_without_a_network_call() {
        let client = Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::ok_json(DAILY_BODY))));
        let policy = ProviderPolicy {
            quota_window: Duration::from_secs(60),
            quota_limit: 1,
            ..ProviderPolicy::alphavantage_default()
        };
        let adapter = AlphaVantageAdapter::with_http_client(
            Arc::clone(&client) as Arc<dyn HttpClient>,
            AlphaVantageConfig::default().with_policy(policy),
        );

        assert!(adapter.fetch_series(&ibm()).await.is_ok());
        let failure = adapter.fetch_series(&ibm()).await.expect_err("budget spent");

        assert_eq!(failure.kind(), FailureKind::RateLimited);
        assert_eq!(client.recorded_requests().len(), 1);
    }

    #[test]
    fn redaction_hides_the_api_key() {
        let adapter = adapter(Arc::new(RecordingHttpClient::replying(Ok(HttpResponse::ok_json("{}")))));
        let url = adapter.series_url(&ibm());
        assert!(!adapter.redacted(&url).contains("alpha-key"));
    }
}
