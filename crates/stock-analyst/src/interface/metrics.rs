//! The three headline metrics shown under an analysis

use crate::model::{MetricValue, QuoteSnapshot, UNAVAILABLE};
use serde::Serialize;

/// Rupees in one crore
const CRORE: f64 = 10_000_000.0;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyMetrics {
    pub pe_ratio: String,
    pub market_cap: String,
    pub current_price: String,
}

impl KeyMetrics {
    pub fn from_snapshot(snapshot: &QuoteSnapshot) -> Self {
        Self {
            pe_ratio: format_pe_ratio(&snapshot.pe_ratio),
            market_cap: format_market_cap(&snapshot.market_cap),
            current_price: format_price(&snapshot.current_price),
        }
    }

    /// Label and value pairs in display order
    pub fn rows(&self) -> [(&'static str, &str); 3] {
        [
            ("P/E Ratio", self.pe_ratio.as_str()),
            ("Market Cap", self.market_cap.as_str()),
            ("Current Price", self.current_price.as_str()),
        ]
    }
}

pub fn format_pe_ratio(value: &MetricValue) -> String {
    match value {
        MetricValue::Number(pe) => format!("{pe:.2}"),
        other => other.to_string(),
    }
}

/// Market cap in crore, e.g. `₹1996000.00 Cr`
pub fn format_market_cap(value: &MetricValue) -> String {
    match value {
        MetricValue::Number(cap) => format!("₹{:.2} Cr", cap / CRORE),
        _ => UNAVAILABLE.to_string(),
    }
}

pub fn format_price(value: &MetricValue) -> String {
    match value {
        MetricValue::Unavailable => UNAVAILABLE.to_string(),
        other => format!("₹{other}"),
    }
}
