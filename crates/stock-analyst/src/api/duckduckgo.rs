//! DuckDuckGo HTML search client

use super::{NewsSource, USER_AGENT};
use crate::config::AnalystConfig;
use crate::error::{Result, StockError};
use crate::model::NewsItem;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use regex::{Captures, Regex};
use reqwest::Client;
use std::sync::LazyLock;
use tracing::{debug, instrument};
use url::Url;

const PROVIDER: &str = "DuckDuckGo";

/// Result title anchors and snippet blocks, in page order
static RESULT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)<(?:a|div)\b([^>]*\bclass="[^"]*\bresult__(a|snippet)\b[^"]*"[^>]*)>(.*?)</(?:a|div)>"#,
    )
    .expect("valid result regex")
});

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bhref="([^"]*)""#).expect("valid href regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static ENTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").expect("valid entity regex")
});

static SPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid space regex"));

/// DuckDuckGo client scraping the no-JS results page
pub struct DuckDuckGoClient {
    client: Client,
    base: Url,
    retry: RetryPolicy,
}

impl DuckDuckGoClient {
    /// Create a client from the analyst configuration
    pub fn new(config: &AnalystConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base: Url::parse(&config.news_base_url)?,
            retry: config.retry_policy(),
        })
    }

    /// Replace the retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn search_url(&self, query: &str) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| StockError::ConfigError(format!("unusable news base URL {}", self.base)))?
            .pop_if_empty()
            .extend(["html", ""]);
        url.query_pairs_mut().append_pair("q", query);
        Ok(url)
    }

    async fn search_once(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        let response = self.client.get(self.search_url(query)?).send().await?;

        // 202 is the bot-challenge page, not results
        let status = response.status();
        if !status.is_success() || status == reqwest::StatusCode::ACCEPTED {
            return Err(StockError::HttpStatus {
                provider: PROVIDER,
                status: status.as_u16(),
            });
        }

        let html = response.text().await?;
        let items = parse_results(&html, max_results);
        debug!("Parsed {} results from {} bytes", items.len(), html.len());
        Ok(items)
    }
}

#[async_trait]
impl NewsSource for DuckDuckGoClient {
    #[instrument(skip(self), fields(provider = PROVIDER))]
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
        if max_results == 0 {
            return Ok(Vec::new());
        }
        self.retry
            .execute("duckduckgo search", || self.search_once(query, max_results))
            .await
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

/// Extract organic results from a results page, keeping page order
fn parse_results(html: &str, max_results: usize) -> Vec<NewsItem> {
    let mut items: Vec<NewsItem> = Vec::new();
    // snippet belongs to the last organic title seen
    let mut open = false;

    for caps in RESULT_RE.captures_iter(html) {
        let attrs = &caps[1];
        let text = clean_text(&caps[3]);

        if &caps[2] == "a" {
            if items.len() == max_results {
                break;
            }
            open = !is_ad(attrs) && !text.is_empty();
            if open {
                items.push(NewsItem::new(text, String::new()));
            }
        } else if open {
            if let Some(last) = items.last_mut() {
                last.snippet = text;
            }
            open = false;
        }
    }

    items
}

fn is_ad(attrs: &str) -> bool {
    HREF_RE
        .captures(attrs)
        .is_some_and(|c| c[1].contains("duckduckgo.com/y.js"))
}

/// Strip markup, decode entities and collapse whitespace
fn clean_text(fragment: &str) -> String {
    let stripped = TAG_RE.replace_all(fragment, "");
    let decoded = ENTITY_RE.replace_all(&stripped, |caps: &Captures| decode_entity(&caps[1], &caps[0]));
    SPACE_RE.replace_all(decoded.trim(), " ").into_owned()
}

fn decode_entity(name: &str, raw: &str) -> String {
    let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        u32::from_str_radix(hex, 16).ok()
    } else if let Some(dec) = name.strip_prefix('#') {
        dec.parse().ok()
    } else {
        return match name {
            "amp" => "&",
            "lt" => "<",
            "gt" => ">",
            "quot" => "\"",
            "apos" => "'",
            "nbsp" => " ",
            _ => raw,
        }
        .to_string();
    };

    code.and_then(char::from_u32)
        .map_or_else(|| raw.to_string(), |c| c.to_string())
}
