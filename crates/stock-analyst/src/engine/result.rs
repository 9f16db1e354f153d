//! Analysis result types

use crate::model::{NewsItem, QuoteSnapshot};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub query: String,
    /// Model output, unedited
    pub analysis: String,
    pub snapshot: QuoteSnapshot,
    pub news: Vec<NewsItem>,
    pub warnings: Vec<String>,
    pub model: String,
    pub generated_at: DateTime<Utc>,
}
