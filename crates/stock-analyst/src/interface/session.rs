//! One user's analyse-and-display cycle

use crate::engine::{AnalysisEngine, AnalysisReport};
use crate::error::StockError;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

pub const INPUT_WARNING: &str = "Please enter both stock symbol and query";
pub const QUOTE_ERROR: &str = "Invalid stock symbol or data unavailable";
pub const ANALYSIS_ERROR: &str = "Unable to generate analysis right now. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SessionState {
    Idle,
    Running,
    Displayed,
}

/// What the user sees after a trigger
#[derive(Debug, Clone)]
pub enum Screen {
    Warning(String),
    Error(String),
    Report(Box<AnalysisReport>),
}

impl Screen {
    /// Whether the run produced an analysis
    pub fn is_report(&self) -> bool {
        matches!(self, Screen::Report(_))
    }
}

/// Drives the engine from raw user input
pub struct Session {
    engine: Arc<AnalysisEngine>,
    state: SessionState,
}

impl Session {
    pub fn new(engine: Arc<AnalysisEngine>) -> Self {
        Self {
            engine,
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Validate input, run the pipeline and produce the screen to show
    ///
    /// The symbol is trimmed and upper-cased; the query is trimmed. Missing
    /// input leaves the session idle without touching any provider.
    pub async fn trigger(&mut self, symbol: &str, query: &str) -> Screen {
        let symbol = symbol.trim().to_uppercase();
        let query = query.trim();

        if symbol.is_empty() || query.is_empty() {
            self.state = SessionState::Idle;
            return Screen::Warning(INPUT_WARNING.to_string());
        }

        self.state = SessionState::Running;
        info!(%symbol, "Analysis started");

        let screen = match self.engine.run(&symbol, query).await {
            Ok(report) => Screen::Report(Box::new(report)),
            Err(e) => {
                error!(%symbol, error = %e, "Analysis failed");
                Screen::Error(user_message(&e).to_string())
            }
        };

        self.state = SessionState::Displayed;
        screen
    }
}

/// Plain-language message for a pipeline failure
pub fn user_message(error: &StockError) -> &'static str {
    match error {
        StockError::LlmError(_) | StockError::PromptError(_) => ANALYSIS_ERROR,
        _ => QUOTE_ERROR,
    }
}
