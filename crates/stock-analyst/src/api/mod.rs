//! API clients for quote and news providers

pub mod duckduckgo;
pub mod yahoo;

pub use duckduckgo::DuckDuckGoClient;
pub use yahoo::YahooFinanceClient;

use crate::error::Result;
use crate::model::{NewsItem, QuoteSnapshot};
use async_trait::async_trait;

/// Browser-like user agent; both providers reject the reqwest default
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Source of quote snapshots
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch the seven-field snapshot for `symbol`
    ///
    /// Any failure (unknown symbol, provider unreachable, unexpected
    /// payload) is an error; missing fields are not.
    async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot>;

    /// Provider name for logs
    fn name(&self) -> &str;
}

/// Source of news headlines
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Run a text search, returning at most `max_results` items in provider order
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>>;

    /// Provider name for logs
    fn name(&self) -> &str;
}
