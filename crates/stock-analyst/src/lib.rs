//! AI analyst for NSE/BSE listed stocks
//!
//! Given a ticker and a free-text question, this crate fetches a quote
//! snapshot from Yahoo Finance and recent headlines from DuckDuckGo, then
//! asks an OpenAI-compatible model for an analysis grounded in that data.
//!
//! - `api`: quote and news clients behind the [`QuoteSource`] and
//!   [`NewsSource`] traits
//! - `prompts`: MiniJinja templates for the model request
//! - `engine`: the quote → news → prompt → model pipeline
//! - `interface`: session state machine and text/JSON renderers
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_analyst::{AnalysisEngine, AnalystConfig, Session};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = AnalystConfig::from_env()?;
//!     let engine = Arc::new(AnalysisEngine::from_config(&config)?);
//!     let mut session = Session::new(engine);
//!
//!     let screen = session.trigger("RELIANCE.NS", "Analysis of current valuation").await;
//!     println!("{screen:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod interface;
pub mod model;
pub mod prompts;
pub mod retry;

pub use api::{DuckDuckGoClient, NewsSource, QuoteSource, YahooFinanceClient};
pub use config::AnalystConfig;
pub use engine::{AnalysisEngine, AnalysisGenerator, AnalysisReport};
pub use error::{Result, StockError};
pub use interface::{Formatter, FormatterFactory, OutputFormat, Screen, Session};
pub use model::{MetricValue, NewsItem, QuoteSnapshot};
pub use prompts::{AnalysisPrompt, build_prompt};
pub use retry::RetryPolicy;
