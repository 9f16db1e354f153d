//! Prompt construction for the analysis request
//!
//! Templates are rendered with MiniJinja:
//! - `system`: persona, quote snapshot, news and guidelines
//! - `user`: the question itself

mod system;
mod user;

use crate::error::Result;
use crate::model::{NewsItem, QuoteSnapshot};
use minijinja::Environment;
use serde::Serialize;
use serde_json::json;

/// System and user text ready for the language model
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisPrompt {
    pub system: String,
    pub user: String,
}

#[derive(Serialize)]
struct MetricLine {
    label: &'static str,
    value: String,
}

/// Build the analysis request from the query and fetched context
///
/// Pure: identical inputs render byte-identical text. Unavailable metrics
/// render as `N/A`; an empty news list renders an empty block.
pub fn build_prompt(
    query: &str,
    snapshot: &QuoteSnapshot,
    news: &[NewsItem],
) -> Result<AnalysisPrompt> {
    let metrics: Vec<MetricLine> = snapshot
        .fields()
        .into_iter()
        .map(|(label, value)| MetricLine {
            label,
            value: value.to_string(),
        })
        .collect();

    let env = Environment::new();
    let system = env.render_str(
        system::ANALYST_SYSTEM,
        json!({ "metrics": metrics, "news": news }),
    )?;
    let user = env.render_str(user::ANALYSIS_REQUEST, json!({ "query": query }))?;

    Ok(AnalysisPrompt { system, user })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MetricValue;

    fn snapshot() -> QuoteSnapshot {
        QuoteSnapshot {
            current_price: MetricValue::Number(2950.5),
            pe_ratio: MetricValue::Number(28.4),
            market_cap: MetricValue::Number(19_960_000_000_000.0),
            ..QuoteSnapshot::empty("RELIANCE.NS")
        }
    }

    #[test]
    fn test_system_prompt_lists_metrics_and_news() {
        let news = vec![
            NewsItem::new("Reliance Q2 profit rises", "Retail and Jio drove growth"),
            NewsItem::new("Jio tariff hike", "Analysts expect ARPU gains"),
        ];

        let prompt = build_prompt("Analysis of current valuation", &snapshot(), &news).unwrap();

        assert!(prompt.system.starts_with("You are an expert Indian financial analyst."));
        assert!(prompt.system.contains("Stock Information:\n- Current Price: 2950.5\n- P/E Ratio: 28.4\n"));
        assert!(prompt.system.contains("- Market Cap: 19960000000000\n"));
        assert!(prompt.system.contains("- Analyst Rating: N/A\n"));
        assert!(prompt.system.contains("- 52 Week Low: N/A\n"));
        assert!(prompt.system.contains(
            "Recent News:\n- Reliance Q2 profit rises: Retail and Jio drove growth\n- Jio tariff hike: Analysts expect ARPU gains\n"
        ));
        assert!(prompt.system.ends_with(
            "5. Never provide direct investment advice unless explicitly asked"
        ));
    }

    #[test]
    fn test_user_prompt() {
        let prompt = build_prompt("Is it overvalued?", &snapshot(), &[]).unwrap();
        assert_eq!(prompt.user, "Query: Is it overvalued?\n\nProvide detailed analysis:");
    }

    #[test]
    fn test_empty_news_renders_empty_block() {
        let prompt = build_prompt("q", &snapshot(), &[]).unwrap();
        assert!(prompt.system.contains("Recent News:\n\nFollow these guidelines:\n"));
    }

    #[test]
    fn test_query_is_not_html_escaped() {
        let prompt = build_prompt("P/E < 30 & \"cheap\"?", &snapshot(), &[]).unwrap();
        assert_eq!(prompt.user, "Query: P/E < 30 & \"cheap\"?\n\nProvide detailed analysis:");
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let news = vec![NewsItem::new("A", "b")];
        let first = build_prompt("same", &snapshot(), &news).unwrap();
        let second = build_prompt("same", &snapshot(), &news).unwrap();
        assert_eq!(first, second);
    }
}
