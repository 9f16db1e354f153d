//! Configuration for stock analysis operations

use crate::error::{Result, StockError};
use crate::retry::RetryPolicy;
use analyst_llm::providers::OpenAIConfig;
use std::time::Duration;

const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4-turbo";
const DEFAULT_QUOTE_BASE: &str = "https://query2.finance.yahoo.com";
const DEFAULT_COOKIE_URL: &str = "https://fc.yahoo.com";
const DEFAULT_CRUMB_URL: &str = "https://query1.finance.yahoo.com/v1/test/getcrumb";
const DEFAULT_NEWS_BASE: &str = "https://html.duckduckgo.com";

/// Configuration for stock analysis operations
#[derive(Clone)]
pub struct AnalystConfig {
    /// Language model API key
    pub openai_api_key: String,

    /// Chat completions base URL
    pub openai_api_base: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Decoding temperature
    pub temperature: f32,

    /// Optional cap on generated tokens
    pub max_tokens: Option<usize>,

    /// Timeout for the language model call
    pub llm_timeout: Duration,

    /// Timeout for quote and news requests
    pub request_timeout: Duration,

    /// Attempts per quote/news call (1 = no retry)
    pub max_retries: u32,

    /// Initial backoff duration for retries
    pub retry_backoff_base: Duration,

    /// Results requested from the search provider
    pub news_max_results: usize,

    /// News items shown on screen
    pub news_display_limit: usize,

    /// Yahoo Finance API host
    pub quote_base_url: String,

    /// Yahoo cookie bootstrap URL
    pub cookie_url: String,

    /// Yahoo crumb URL
    pub crumb_url: String,

    /// DuckDuckGo HTML search host
    pub news_base_url: String,
}

impl Default for AnalystConfig {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.3,
            max_tokens: None,
            llm_timeout: Duration::from_secs(120),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff_base: Duration::from_millis(500),
            news_max_results: 5,
            news_display_limit: 3,
            quote_base_url: DEFAULT_QUOTE_BASE.to_string(),
            cookie_url: DEFAULT_COOKIE_URL.to_string(),
            crumb_url: DEFAULT_CRUMB_URL.to_string(),
            news_base_url: DEFAULT_NEWS_BASE.to_string(),
        }
    }
}

impl std::fmt::Debug for AnalystConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalystConfig")
            .field("openai_api_key", &"<redacted>")
            .field("openai_api_base", &self.openai_api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("llm_timeout", &self.llm_timeout)
            .field("request_timeout", &self.request_timeout)
            .field("max_retries", &self.max_retries)
            .field("news_max_results", &self.news_max_results)
            .field("news_display_limit", &self.news_display_limit)
            .field("quote_base_url", &self.quote_base_url)
            .field("news_base_url", &self.news_base_url)
            .finish_non_exhaustive()
    }
}

impl AnalystConfig {
    /// Create a new configuration builder
    pub fn builder() -> AnalystConfigBuilder {
        AnalystConfigBuilder::default()
    }

    /// Build the configuration from environment variables
    ///
    /// `OPENAI_API_KEY` is required; everything else falls back to defaults.
    pub fn from_env() -> Result<Self> {
        Self::builder().with_env().build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.trim().is_empty() {
            return Err(StockError::ConfigError(
                "OPENAI_API_KEY is required".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(StockError::ConfigError(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }

        if self.max_retries == 0 {
            return Err(StockError::ConfigError(
                "max_retries must be greater than 0".to_string(),
            ));
        }

        if self.news_max_results == 0 {
            return Err(StockError::ConfigError(
                "news_max_results must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Retry policy for quote and news requests
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_retries,
            self.retry_backoff_base,
            self.retry_backoff_base * 8,
            2.0,
        )
    }

    /// Provider settings for the language model
    pub fn openai_config(&self) -> OpenAIConfig {
        OpenAIConfig::new(self.openai_api_key.clone())
            .with_api_base(self.openai_api_base.clone())
            .with_timeout(self.llm_timeout.as_secs())
    }
}

/// Builder for AnalystConfig
#[derive(Debug, Default)]
pub struct AnalystConfigBuilder {
    openai_api_key: Option<String>,
    openai_api_base: Option<String>,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    request_timeout: Option<Duration>,
    llm_timeout: Option<Duration>,
    max_retries: Option<u32>,
    retry_backoff_base: Option<Duration>,
    news_max_results: Option<usize>,
    news_display_limit: Option<usize>,
    quote_base_url: Option<String>,
    cookie_url: Option<String>,
    crumb_url: Option<String>,
    news_base_url: Option<String>,
    invalid: Vec<String>,
}

impl AnalystConfigBuilder {
    /// Set the language model API key
    pub fn openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    /// Set the chat completions base URL
    pub fn openai_api_base(mut self, base: impl Into<String>) -> Self {
        self.openai_api_base = Some(base.into());
        self
    }

    /// Set the model identifier
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the decoding temperature
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Cap generated tokens
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set timeout for quote and news requests
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set timeout for the language model call
    pub fn llm_timeout(mut self, duration: Duration) -> Self {
        self.llm_timeout = Some(duration);
        self
    }

    /// Set attempts per quote/news call
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set retry backoff base duration
    pub fn retry_backoff_base(mut self, duration: Duration) -> Self {
        self.retry_backoff_base = Some(duration);
        self
    }

    /// Set the number of results requested from the search provider
    pub fn news_max_results(mut self, count: usize) -> Self {
        self.news_max_results = Some(count);
        self
    }

    /// Set the number of news items shown on screen
    pub fn news_display_limit(mut self, count: usize) -> Self {
        self.news_display_limit = Some(count);
        self
    }

    /// Override the Yahoo Finance API host
    pub fn quote_base_url(mut self, url: impl Into<String>) -> Self {
        self.quote_base_url = Some(url.into());
        self
    }

    /// Override the Yahoo cookie and crumb URLs
    pub fn auth_urls(mut self, cookie_url: impl Into<String>, crumb_url: impl Into<String>) -> Self {
        self.cookie_url = Some(cookie_url.into());
        self.crumb_url = Some(crumb_url.into());
        self
    }

    /// Override the DuckDuckGo host
    pub fn news_base_url(mut self, url: impl Into<String>) -> Self {
        self.news_base_url = Some(url.into());
        self
    }

    /// Load settings from the environment
    ///
    /// Reads `OPENAI_API_KEY`, `OPENAI_API_BASE`, `OPENAI_MODEL`,
    /// `OPENAI_TEMPERATURE`, `OPENAI_MAX_TOKENS`, `ANALYST_REQUEST_TIMEOUT_SECS`,
    /// `ANALYST_MAX_RETRIES`, `YAHOO_QUOTE_BASE` and `DDG_BASE`. Values set
    /// explicitly on the builder before this call are overwritten.
    pub fn with_env(self) -> Self {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(base) = lookup("OPENAI_API_BASE") {
            self.openai_api_base = Some(base);
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.model = Some(model);
        }
        if let Some(raw) = lookup("OPENAI_TEMPERATURE") {
            match raw.trim().parse() {
                Ok(t) => self.temperature = Some(t),
                Err(_) => self.invalid.push(format!("OPENAI_TEMPERATURE={raw}")),
            }
        }
        if let Some(raw) = lookup("OPENAI_MAX_TOKENS") {
            match raw.trim().parse() {
                Ok(n) => self.max_tokens = Some(n),
                Err(_) => self.invalid.push(format!("OPENAI_MAX_TOKENS={raw}")),
            }
        }
        if let Some(raw) = lookup("ANALYST_REQUEST_TIMEOUT_SECS") {
            match raw.trim().parse() {
                Ok(secs) => self.request_timeout = Some(Duration::from_secs(secs)),
                Err(_) => self
                    .invalid
                    .push(format!("ANALYST_REQUEST_TIMEOUT_SECS={raw}")),
            }
        }
        if let Some(raw) = lookup("ANALYST_MAX_RETRIES") {
            match raw.trim().parse() {
                Ok(n) => self.max_retries = Some(n),
                Err(_) => self.invalid.push(format!("ANALYST_MAX_RETRIES={raw}")),
            }
        }
        if let Some(base) = lookup("YAHOO_QUOTE_BASE") {
            self.quote_base_url = Some(base);
        }
        if let Some(base) = lookup("DDG_BASE") {
            self.news_base_url = Some(base);
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AnalystConfig> {
        if !self.invalid.is_empty() {
            return Err(StockError::ConfigError(format!(
                "unparseable environment values: {}",
                self.invalid.join(", ")
            )));
        }

        let defaults = AnalystConfig::default();

        let config = AnalystConfig {
            openai_api_key: self.openai_api_key.unwrap_or(defaults.openai_api_key),
            openai_api_base: self.openai_api_base.unwrap_or(defaults.openai_api_base),
            model: self.model.unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            llm_timeout: self.llm_timeout.unwrap_or(defaults.llm_timeout),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            retry_backoff_base: self.retry_backoff_base.unwrap_or(defaults.retry_backoff_base),
            news_max_results: self.news_max_results.unwrap_or(defaults.news_max_results),
            news_display_limit: self.news_display_limit.unwrap_or(defaults.news_display_limit),
            quote_base_url: self.quote_base_url.unwrap_or(defaults.quote_base_url),
            cookie_url: self.cookie_url.unwrap_or(defaults.cookie_url),
            crumb_url: self.crumb_url.unwrap_or(defaults.crumb_url),
            news_base_url: self.news_base_url.unwrap_or(defaults.news_base_url),
        };

        config.validate()?;
        Ok(config)
    }
}
