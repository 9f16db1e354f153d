//! Quote and news data shared by the fetchers, prompts and renderers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Marker shown wherever a provider had no value
pub const UNAVAILABLE: &str = "N/A";

/// One metric as reported by the quote provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Numeric value
    Number(f64),
    /// Provider sent text instead of a number
    Text(String),
    /// Provider had no value for this field
    Unavailable,
}

impl MetricValue {
    pub fn is_available(&self) -> bool {
        !matches!(self, MetricValue::Unavailable)
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Number(n) => write!(f, "{n}"),
            MetricValue::Text(s) => f.write_str(s),
            MetricValue::Unavailable => f.write_str(UNAVAILABLE),
        }
    }
}

/// Point-in-time metrics for one symbol
///
/// All seven fields are always present; a field the provider did not
/// report is [`MetricValue::Unavailable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    pub symbol: String,
    pub current_price: MetricValue,
    pub pe_ratio: MetricValue,
    pub market_cap: MetricValue,
    pub analyst_rating: MetricValue,
    pub dividend_yield: MetricValue,
    pub week_52_high: MetricValue,
    pub week_52_low: MetricValue,
}

impl QuoteSnapshot {
    /// Snapshot with every field unavailable
    pub fn empty(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            current_price: MetricValue::Unavailable,
            pe_ratio: MetricValue::Unavailable,
            market_cap: MetricValue::Unavailable,
            analyst_rating: MetricValue::Unavailable,
            dividend_yield: MetricValue::Unavailable,
            week_52_high: MetricValue::Unavailable,
            week_52_low: MetricValue::Unavailable,
        }
    }

    /// Labelled fields in display order
    pub fn fields(&self) -> [(&'static str, &MetricValue); 7] {
        [
            ("Current Price", &self.current_price),
            ("P/E Ratio", &self.pe_ratio),
            ("Market Cap", &self.market_cap),
            ("Analyst Rating", &self.analyst_rating),
            ("Dividend Yield", &self.dividend_yield),
            ("52 Week High", &self.week_52_high),
            ("52 Week Low", &self.week_52_low),
        ]
    }
}

/// One search result about a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub snippet: String,
}

impl NewsItem {
    pub fn new(title: impl Into<String>, snippet: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            snippet: snippet.into(),
        }
    }
}

/// Company name used for the news search: the ticker before its exchange suffix
///
/// `RELIANCE.NS` becomes `RELIANCE`; a symbol without a dot is used as is.
pub fn company_name(symbol: &str) -> &str {
    symbol.split('.').next().unwrap_or(symbol)
}
