//! Terminal interface
//!
//! Session state machine plus renderers for text and JSON output.

pub mod formatter;
pub mod metrics;
pub mod session;

pub use formatter::{Formatter, FormatterFactory, JsonFormatter, OutputFormat, TextFormatter};
pub use metrics::KeyMetrics;
pub use session::{Screen, Session, SessionState};

pub const TITLE: &str = "🇮🇳 AI Indian Financial Analyst";
pub const SUBTITLE: &str = "Analyzing NSE/BSE stocks with real-time data and news";
pub const PROGRESS: &str = "Analyzing stock and market trends...";

/// Shown under every screen
pub const DISCLAIMER: &str = "Note: This is an analytical tool and should not be considered as financial advice. Always do your own research.";
