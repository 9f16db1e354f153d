//! Yahoo Finance quoteSummary client

use super::{QuoteSource, USER_AGENT};
use crate::config::AnalystConfig;
use crate::error::{Result, StockError};
use crate::model::{MetricValue, QuoteSnapshot};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use url::Url;

const PROVIDER: &str = "Yahoo Finance";
const MODULES: &str = "price,summaryDetail,financialData";

/// Yahoo Finance API client
///
/// The crumb from the cookie handshake is kept for the life of the client
/// and refreshed whenever Yahoo rejects it.
pub struct YahooFinanceClient {
    client: Client,
    quote_base: Url,
    cookie_url: Url,
    crumb_url: Url,
    crumb: RwLock<Option<String>>,
    retry: RetryPolicy,
}

impl YahooFinanceClient {
    /// Create a client from the analyst configuration
    pub fn new(config: &AnalystConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            quote_base: Url::parse(&config.quote_base_url)?,
            cookie_url: Url::parse(&config.cookie_url)?,
            crumb_url: Url::parse(&config.crumb_url)?,
            crumb: RwLock::new(None),
            retry: config.retry_policy(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn summary_url(&self, symbol: &str, crumb: Option<&str>) -> Result<Url> {
        let mut url = self.quote_base.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StockError::ConfigError(format!("unusable quote base URL {}", self.quote_base))
            })?
            .pop_if_empty()
            .extend(["v10", "finance", "quoteSummary", symbol]);
        url.query_pairs_mut().append_pair("modules", MODULES);
        if let Some(crumb) = crumb {
            url.query_pairs_mut().append_pair("crumb", crumb);
        }
        Ok(url)
    }

    /// Cookie + crumb handshake Yahoo asks for when it answers 401/403
    async fn refresh_crumb(&self) -> Result<String> {
        debug!("Requesting Yahoo session cookie");
        // Only the Set-Cookie header matters here; fc.yahoo.com answers 404
        self.client.get(self.cookie_url.clone()).send().await?;

        let response = self.client.get(self.crumb_url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(StockError::HttpStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let crumb = response.text().await?.trim().to_string();
        if crumb.is_empty() || crumb.contains('<') || crumb.contains('{') {
            return Err(StockError::ParseError(
                "Yahoo returned an unusable crumb".to_string(),
            ));
        }

        *self.crumb.write().await = Some(crumb.clone());
        Ok(crumb)
    }

    async fn fetch_once(&self, symbol: &str) -> Result<QuoteSnapshot> {
        let crumb = self.crumb.read().await.clone();
        let mut response = self
            .client
            .get(self.summary_url(symbol, crumb.as_deref())?)
            .send()
            .await?;

        if matches!(
            response.status(),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        ) {
            debug!("Yahoo answered {}; retrying with a fresh crumb", response.status());
            let crumb = self.refresh_crumb().await?;
            response = self
                .client
                .get(self.summary_url(symbol, Some(&crumb))?)
                .send()
                .await?;
        }

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(StockError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "symbol not found".to_string(),
            });
        }
        if !status.is_success() {
            return Err(StockError::HttpStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let body: Value = serde_json::from_str(&response.text().await?)?;
        parse_snapshot(symbol, &body)
    }
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot> {
        self.retry
            .execute("yahoo quoteSummary", || self.fetch_once(symbol))
            .await
    }

    fn name(&self) -> &str {
        "yahoo"
    }
}

/// Build a snapshot from a quoteSummary payload
fn parse_snapshot(symbol: &str, body: &Value) -> Result<QuoteSnapshot> {
    let summary = body.get("quoteSummary").unwrap_or(body);

    let Some(result) = summary
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
    else {
        let reason = summary
            .pointer("/error/description")
            .and_then(Value::as_str)
            .unwrap_or("empty quoteSummary result");
        return Err(StockError::DataUnavailable {
            symbol: symbol.to_string(),
            reason: reason.to_string(),
        });
    };

    Ok(QuoteSnapshot {
        symbol: symbol.to_string(),
        current_price: metric(
            result,
            &["/financialData/currentPrice", "/price/regularMarketPrice"],
        ),
        pe_ratio: metric(result, &["/summaryDetail/trailingPE"]),
        market_cap: metric(result, &["/price/marketCap", "/summaryDetail/marketCap"]),
        analyst_rating: metric(result, &["/financialData/recommendationMean"]),
        dividend_yield: metric(result, &["/summaryDetail/dividendYield"]),
        week_52_high: metric(result, &["/summaryDetail/fiftyTwoWeekHigh"]),
        week_52_low: metric(result, &["/summaryDetail/fiftyTwoWeekLow"]),
    })
}

/// First available value among the JSON pointers
fn metric(result: &Value, pointers: &[&str]) -> MetricValue {
    pointers
        .iter()
        .filter_map(|p| result.pointer(p))
        .map(to_metric)
        .find(MetricValue::is_available)
        .unwrap_or(MetricValue::Unavailable)
}

/// Yahoo wraps most numbers as `{ "raw": 1.0, "fmt": "1.00" }`
fn to_metric(node: &Value) -> MetricValue {
    match node {
        Value::Number(n) => n.as_f64().map_or(MetricValue::Unavailable, MetricValue::Number),
        Value::String(s) if !s.trim().is_empty() => MetricValue::Text(s.trim().to_string()),
        Value::Object(map) => map
            .get("raw")
            .or_else(|| map.get("fmt"))
            .map_or(MetricValue::Unavailable, to_metric),
        _ => MetricValue::Unavailable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "quoteSummary": {
                "result": [{
                    "price": {
                        "regularMarketPrice": { "raw": 2948.1, "fmt": "2,948.10" },
                        "marketCap": { "raw": 19_960_000_000_000_i64, "fmt": "19.96T" }
                    },
                    "summaryDetail": {
                        "trailingPE": { "raw": 28.4, "fmt": "28.40" },
                        "dividendYield": { "raw": 0.0034, "fmt": "0.34%" },
                        "fiftyTwoWeekHigh": { "raw": 3217.6, "fmt": "3,217.60" },
                        "fiftyTwoWeekLow": { "raw": 2220.3, "fmt": "2,220.30" }
                    },
                    "financialData": {
                        "currentPrice": { "raw": 2950.5, "fmt": "2,950.50" },
                        "recommendationMean": { "raw": 2.1, "fmt": "2.10" }
                    }
                }],
                "error": null
            }
        })
    }

    fn client_for(server: &MockServer) -> YahooFinanceClient {
        let config = AnalystConfig::builder()
            .openai_api_key("sk-test")
            .quote_base_url(server.base_url())
            .auth_urls(server.url("/consent"), server.url("/v1/test/getcrumb"))
            .build()
            .unwrap();
        YahooFinanceClient::new(&config)
            .unwrap()
            .with_retry(RetryPolicy::fast())
    }

    #[test]
    fn test_complete_payload_populates_all_fields() {
        let snapshot = parse_snapshot("RELIANCE.NS", &full_payload()).unwrap();

        assert_eq!(snapshot.symbol, "RELIANCE.NS");
        assert_eq!(snapshot.current_price, MetricValue::Number(2950.5));
        assert_eq!(snapshot.pe_ratio, MetricValue::Number(28.4));
        assert_eq!(snapshot.market_cap, MetricValue::Number(19_960_000_000_000.0));
        assert_eq!(snapshot.analyst_rating, MetricValue::Number(2.1));
        assert_eq!(snapshot.dividend_yield, MetricValue::Number(0.0034));
        assert_eq!(snapshot.week_52_high, MetricValue::Number(3217.6));
        assert_eq!(snapshot.week_52_low, MetricValue::Number(2220.3));
    }

    #[test]
    fn test_missing_fields_become_unavailable() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "price": { "regularMarketPrice": { "raw": 101.25 } },
                    "summaryDetail": { "trailingPE": {}, "dividendYield": null }
                }]
            }
        });

        let snapshot = parse_snapshot("SMALL.BO", &body).unwrap();

        assert_eq!(snapshot.current_price, MetricValue::Number(101.25));
        assert_eq!(snapshot.pe_ratio, MetricValue::Unavailable);
        assert_eq!(snapshot.dividend_yield, MetricValue::Unavailable);
        assert_eq!(snapshot.market_cap, MetricValue::Unavailable);
        assert_eq!(snapshot.analyst_rating, MetricValue::Unavailable);
        assert_eq!(snapshot.week_52_high, MetricValue::Unavailable);
        assert_eq!(snapshot.week_52_low, MetricValue::Unavailable);
    }

    #[test]
    fn test_current_price_prefers_financial_data() {
        let snapshot = parse_snapshot("RELIANCE.NS", &full_payload()).unwrap();
        assert_eq!(snapshot.current_price, MetricValue::Number(2950.5));
    }

    #[test]
    fn test_market_cap_falls_back_to_summary_detail() {
        let body = json!({
            "quoteSummary": {
                "result": [{
                    "price": { "marketCap": {} },
                    "summaryDetail": {
                        "marketCap": { "raw": 14_080_000_000_000_i64 },
                        "trailingPE": { "raw": "Infinity" }
                    }
                }]
            }
        });

        let snapshot = parse_snapshot("TCS.NS", &body).unwrap();

        assert_eq!(snapshot.market_cap, MetricValue::Number(14_080_000_000_000.0));
        assert_eq!(snapshot.pe_ratio, MetricValue::Text("Infinity".to_string()));
    }

    #[test]
    fn test_empty_result_is_unavailable() {
        let body = json!({
            "quoteSummary": {
                "result": null,
                "error": { "code": "Not Found", "description": "Quote not found for symbol: FAKE.NS" }
            }
        });

        match parse_snapshot("FAKE.NS", &body) {
            Err(StockError::DataUnavailable { symbol, reason }) => {
                assert_eq!(symbol, "FAKE.NS");
                assert!(reason.contains("Quote not found"));
            }
            other => panic!("expected DataUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_to_metric_shapes() {
        assert_eq!(to_metric(&json!(3.5)), MetricValue::Number(3.5));
        assert_eq!(to_metric(&json!({ "raw": 7 })), MetricValue::Number(7.0));
        assert_eq!(to_metric(&json!({ "fmt": "Infinity" })), MetricValue::Text("Infinity".to_string()));
        assert_eq!(to_metric(&json!("")), MetricValue::Unavailable);
        assert_eq!(to_metric(&json!({})), MetricValue::Unavailable);
        assert_eq!(to_metric(&Value::Null), MetricValue::Unavailable);
    }

    #[test]
    fn test_summary_url_encodes_symbol() {
        let server = MockServer::start();
        let client = client_for(&server);
        let url = client.summary_url("M&M.NS", Some("abc")).unwrap();

        assert!(url.path().ends_with("/v10/finance/quoteSummary/M&M.NS"));
        assert!(url.query().unwrap().contains("modules=price%2CsummaryDetail%2CfinancialData"));
        assert!(url.query().unwrap().contains("crumb=abc"));
    }

    #[tokio::test]
    async fn test_fetch_snapshot_over_http() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/v10/finance/quoteSummary/RELIANCE.NS")
                .query_param("modules", MODULES);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(full_payload());
        });

        let snapshot = client_for(&server)
            .fetch_snapshot("RELIANCE.NS")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(snapshot.pe_ratio, MetricValue::Number(28.4));
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_not_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/FAKE.NS");
            then.status(404)
                .header("content-type", "application/json")
                .body(r#"{"quoteSummary":{"result":null,"error":{"code":"Not Found"}}}"#);
        });

        let result = client_for(&server).fetch_snapshot("FAKE.NS").await;

        assert!(matches!(result, Err(StockError::DataUnavailable { .. })));
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/TCS.NS");
            then.status(503);
        });

        let result = client_for(&server).fetch_snapshot("TCS.NS").await;

        assert!(matches!(
            result,
            Err(StockError::HttpStatus { status: 503, .. })
        ));
        mock.assert_hits(3);
    }

    #[tokio::test]
    async fn test_unauthorized_triggers_crumb_handshake() {
        let server = MockServer::start();

        // Defined first so the crumb-carrying request matches here
        let ok = server.mock(|when, then| {
            when.method(GET)
                .path("/v10/finance/quoteSummary/INFY.NS")
                .query_param("crumb", "crumb-value");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(full_payload());
        });
        let first = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/INFY.NS");
            then.status(401).body("unauthorized");
        });
        let cookie = server.mock(|when, then| {
            when.method(GET).path("/consent");
            then.status(200).header(
                "set-cookie",
                "A3=d=AQABBA; Max-Age=31557600; Path=/; SameSite=None",
            );
        });
        let crumb = server.mock(|when, then| {
            when.method(GET).path("/v1/test/getcrumb");
            then.status(200).body("crumb-value");
        });

        let snapshot = client_for(&server).fetch_snapshot("INFY.NS").await.unwrap();

        first.assert();
        cookie.assert();
        crumb.assert();
        ok.assert();
        assert_eq!(snapshot.symbol, "INFY.NS");
    }

    #[tokio::test]
    async fn test_crumb_is_reused_across_fetches() {
        let server = MockServer::start();

        let ok = server.mock(|when, then| {
            when.method(GET)
                .path("/v10/finance/quoteSummary/TCS.NS")
                .query_param("crumb", "crumb-value");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(full_payload());
        });
        let rejected = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/TCS.NS");
            then.status(401);
        });
        let cookie = server.mock(|when, then| {
            when.method(GET).path("/consent");
            then.status(404);
        });
        let crumb = server.mock(|when, then| {
            when.method(GET).path("/v1/test/getcrumb");
            then.status(200).body("crumb-value");
        });

        let client = client_for(&server);
        client.fetch_snapshot("TCS.NS").await.unwrap();
        client.fetch_snapshot("TCS.NS").await.unwrap();

        rejected.assert_hits(1);
        cookie.assert_hits(1);
        crumb.assert_hits(1);
        ok.assert_hits(2);
    }

    #[tokio::test]
    async fn test_html_crumb_is_a_parse_error() {
        let server = MockServer::start();
        let quote = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/INFY.NS");
            then.status(401);
        });
        server.mock(|when, then| {
            when.method(GET).path("/consent");
            then.status(200);
        });
        let crumb = server.mock(|when, then| {
            when.method(GET).path("/v1/test/getcrumb");
            then.status(200).body("<html><body>consent</body></html>");
        });

        let result = client_for(&server).fetch_snapshot("INFY.NS").await;

        assert!(matches!(result, Err(StockError::ParseError(_))));
        quote.assert_hits(1);
        crumb.assert_hits(1);
    }

    #[tokio::test]
    async fn test_crumb_endpoint_failure_is_an_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/INFY.NS");
            then.status(403);
        });
        server.mock(|when, then| {
            when.method(GET).path("/consent");
            then.status(200);
        });
        let crumb = server.mock(|when, then| {
            when.method(GET).path("/v1/test/getcrumb");
            then.status(400).body("bad request");
        });

        let result = client_for(&server).fetch_snapshot("INFY.NS").await;

        assert!(matches!(
            result,
            Err(StockError::HttpStatus { status: 400, .. })
        ));
        crumb.assert_hits(1);
    }

    #[tokio::test]
    async fn test_rejected_crumb_surfaces_unauthorized() {
        let server = MockServer::start();
        let quote = server.mock(|when, then| {
            when.method(GET).path("/v10/finance/quoteSummary/INFY.NS");
            then.status(401);
        });
        server.mock(|when, then| {
            when.method(GET).path("/consent");
            then.status(200);
        });
        let crumb = server.mock(|when, then| {
            when.method(GET).path("/v1/test/getcrumb");
            then.status(200).body("stale-crumb");
        });

        let result = client_for(&server).fetch_snapshot("INFY.NS").await;

        assert!(matches!(
            result,
            Err(StockError::HttpStatus { status: 401, .. })
        ));
        quote.assert_hits(2);
        crumb.assert_hits(1);
    }
}
