//! Screen rendering for the terminal

use super::session::Screen;
use super::{DISCLAIMER, KeyMetrics};
use crate::engine::AnalysisReport;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use serde_json::{Value, json};
use std::fmt::Write;

/// Output format selectable on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub trait Formatter: Send + Sync {
    fn format_screen(&self, screen: &Screen) -> String;
}

/// Human-readable output with a metrics table
pub struct TextFormatter {
    news_limit: usize,
}

impl TextFormatter {
    pub fn new(news_limit: usize) -> Self {
        Self { news_limit }
    }

    fn format_report(&self, report: &AnalysisReport) -> String {
        let mut out = String::new();
        let heading = format!("Analysis for {}", report.symbol);
        let _ = writeln!(out, "{heading}\n{}\n", "=".repeat(heading.chars().count()));
        let _ = writeln!(out, "{}\n", report.analysis.trim_end());

        let metrics = KeyMetrics::from_snapshot(&report.snapshot);
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec!["Metric", "Value"]);
        for (label, value) in metrics.rows() {
            table.add_row(vec![label, value]);
        }
        let _ = writeln!(out, "Key Metrics\n{table}\n");

        let _ = writeln!(out, "Recent News Highlights");
        if report.news.is_empty() {
            let _ = writeln!(out, "No recent news found.");
        }
        for item in report.news.iter().take(self.news_limit) {
            let _ = writeln!(out, "📰 {}", item.title);
            if !item.snippet.is_empty() {
                let _ = writeln!(out, "   {}", item.snippet);
            }
        }

        for warning in &report.warnings {
            let _ = writeln!(out, "\n⚠️  {warning}");
        }
        out
    }
}

impl Formatter for TextFormatter {
    fn format_screen(&self, screen: &Screen) -> String {
        let body = match screen {
            Screen::Warning(message) => format!("⚠️  {message}\n"),
            Screen::Error(message) => format!("❌ {message}\n"),
            Screen::Report(report) => self.format_report(report),
        };
        format!("{body}\n---\n{DISCLAIMER}")
    }
}

/// Machine-readable output, one JSON document per screen
pub struct JsonFormatter {
    news_limit: usize,
}

impl JsonFormatter {
    pub fn new(news_limit: usize) -> Self {
        Self { news_limit }
    }

    fn report_value(&self, report: &AnalysisReport) -> Value {
        let news: Vec<_> = report.news.iter().take(self.news_limit).collect();
        json!({
            "status": "ok",
            "symbol": report.symbol,
            "query": report.query,
            "analysis": report.analysis,
            "key_metrics": KeyMetrics::from_snapshot(&report.snapshot),
            "snapshot": report.snapshot,
            "news": news,
            "warnings": report.warnings,
            "model": report.model,
            "generated_at": report.generated_at,
            "disclaimer": DISCLAIMER,
        })
    }
}

impl Formatter for JsonFormatter {
    fn format_screen(&self, screen: &Screen) -> String {
        let value = match screen {
            Screen::Warning(message) => {
                json!({ "status": "warning", "message": message, "disclaimer": DISCLAIMER })
            }
            Screen::Error(message) => {
                json!({ "status": "error", "message": message, "disclaimer": DISCLAIMER })
            }
            Screen::Report(report) => self.report_value(report),
        };
        format!("{value:#}")
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(format: OutputFormat, news_limit: usize) -> Box<dyn Formatter> {
        match format {
            OutputFormat::Text => Box::new(TextFormatter::new(news_limit)),
            OutputFormat::Json => Box::new(JsonFormatter::new(news_limit)),
        }
    }
}
