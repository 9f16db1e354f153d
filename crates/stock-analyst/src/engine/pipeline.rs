//! Quote, news, prompt and model steps run in order

use super::{AnalysisGenerator, AnalysisReport};
use crate::api::{DuckDuckGoClient, NewsSource, QuoteSource, YahooFinanceClient};
use crate::config::AnalystConfig;
use crate::error::Result;
use crate::model::{NewsItem, company_name};
use crate::prompts::build_prompt;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Warning attached to a report whose news search failed
pub const NEWS_UNAVAILABLE: &str = "Recent news could not be retrieved; the analysis uses market data only.";

/// Coordinates the data sources and the generator for one request at a time
///
/// Steps are awaited strictly in sequence, so a failed quote fetch issues
/// no news search and no model call.
pub struct AnalysisEngine {
    quotes: Arc<dyn QuoteSource>,
    news: Arc<dyn NewsSource>,
    generator: AnalysisGenerator,
    news_max_results: usize,
}

impl AnalysisEngine {
    pub fn new(
        quotes: Arc<dyn QuoteSource>,
        news: Arc<dyn NewsSource>,
        generator: AnalysisGenerator,
    ) -> Self {
        Self {
            quotes,
            news,
            generator,
            news_max_results: 5,
        }
    }

    /// Engine wired to Yahoo Finance, DuckDuckGo and OpenAI
    pub fn from_config(config: &AnalystConfig) -> Result<Self> {
        config.validate()?;
        let quotes = Arc::new(YahooFinanceClient::new(config)?);
        let news = Arc::new(DuckDuckGoClient::new(config)?);
        let generator = AnalysisGenerator::from_config(config)?;

        Ok(Self::new(quotes, news, generator).with_news_max_results(config.news_max_results))
    }

    pub fn with_news_max_results(mut self, max_results: usize) -> Self {
        self.news_max_results = max_results;
        self
    }

    /// Run the full analysis for an already normalised symbol and query
    #[instrument(skip(self, query))]
    pub async fn run(&self, symbol: &str, query: &str) -> Result<AnalysisReport> {
        info!("Fetching quote snapshot from {}", self.quotes.name());
        let snapshot = self.quotes.fetch_snapshot(symbol).await?;

        let mut warnings = Vec::new();
        let news = self.fetch_news(symbol, &mut warnings).await;

        let prompt = build_prompt(query, &snapshot, &news)?;
        info!("Requesting analysis from {}", self.generator.model());
        let analysis = self.generator.generate(&prompt).await?;

        Ok(AnalysisReport {
            symbol: symbol.to_string(),
            query: query.to_string(),
            analysis,
            snapshot,
            news,
            warnings,
            model: self.generator.model().to_string(),
            generated_at: Utc::now(),
        })
    }

    /// News is best effort: a failed search yields no items plus a warning
    async fn fetch_news(&self, symbol: &str, warnings: &mut Vec<String>) -> Vec<NewsItem> {
        let query = format!("{} stock news", company_name(symbol));
        info!("Searching {} for \"{}\"", self.news.name(), query);

        match self.news.search(&query, self.news_max_results).await {
            Ok(mut items) => {
                items.truncate(self.news_max_results);
                items
            }
            Err(e) => {
                warn!(error = %e, "News search failed, continuing without headlines");
                warnings.push(NEWS_UNAVAILABLE.to_string());
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Counting fakes shared by engine and session tests

    use crate::api::{NewsSource, QuoteSource};
    use crate::error::{Result, StockError};
    use crate::model::{MetricValue, NewsItem, QuoteSnapshot};
    use analyst_llm::{
        CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason,
        TokenUsage,
    };
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Knows one symbol; everything else is unavailable
    pub struct FakeQuotes {
        pub known: &'static str,
        pub calls: AtomicUsize,
    }

    impl FakeQuotes {
        pub fn knowing(known: &'static str) -> Self {
            Self {
                known,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl QuoteSource for FakeQuotes {
        async fn fetch_snapshot(&self, symbol: &str) -> Result<QuoteSnapshot> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if symbol != self.known {
                return Err(StockError::DataUnavailable {
                    symbol: symbol.to_string(),
                    reason: "Quote not found".to_string(),
                });
            }
            Ok(QuoteSnapshot {
                current_price: MetricValue::Number(2950.5),
                pe_ratio: MetricValue::Number(28.4),
                market_cap: MetricValue::Number(19_960_000_000_000.0),
                analyst_rating: MetricValue::Number(2.1),
                ..QuoteSnapshot::empty(symbol)
            })
        }

        fn name(&self) -> &str {
            "fake-quotes"
        }
    }

    pub struct FakeNews {
        pub items: Vec<NewsItem>,
        pub fail: bool,
        pub queries: Mutex<Vec<(String, usize)>>,
    }

    impl FakeNews {
        pub fn with_items(count: usize) -> Self {
            Self {
                items: (1..=count)
                    .map(|i| NewsItem::new(format!("Headline {i}"), format!("Snippet {i}")))
                    .collect(),
                fail: false,
                queries: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::with_items(0)
            }
        }

        pub fn queries(&self) -> Vec<(String, usize)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NewsSource for FakeNews {
        async fn search(&self, query: &str, max_results: usize) -> Result<Vec<NewsItem>> {
            self.queries
                .lock()
                .unwrap()
                .push((query.to_string(), max_results));
            if self.fail {
                return Err(StockError::HttpStatus {
                    provider: "DuckDuckGo",
                    status: 503,
                });
            }
            Ok(self.items.clone())
        }

        fn name(&self) -> &str {
            "fake-news"
        }
    }

    pub struct FakeModel {
        pub reply: Option<&'static str>,
        pub calls: AtomicUsize,
        pub last_system: Mutex<Option<String>>,
    }

    impl FakeModel {
        pub fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                calls: AtomicUsize::new(0),
                last_system: Mutex::new(None),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                ..Self::replying("")
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LLMProvider for FakeModel {
        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> analyst_llm::Result<CompletionResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_system.lock().unwrap() =
                request.messages.first().map(|m| m.text().to_string());
            match self.reply {
                Some(text) => Ok(CompletionResponse {
                    message: Message::assistant(text),
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                None => Err(LLMError::AuthenticationFailed),
            }
        }

        fn name(&self) -> &str {
            "fake-model"
        }
    }
}
