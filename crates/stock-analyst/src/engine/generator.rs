//! Language model call producing the analysis text

use crate::config::AnalystConfig;
use crate::error::Result;
use crate::prompts::AnalysisPrompt;
use analyst_llm::providers::OpenAIProvider;
use analyst_llm::{CompletionRequest, LLMProvider, Message};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Sends an [`AnalysisPrompt`] to the configured model
///
/// Exactly one request per call; failures are returned, never retried.
pub struct AnalysisGenerator {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<usize>,
}

impl AnalysisGenerator {
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.3,
            max_tokens: None,
        }
    }

    /// OpenAI-backed generator using the configured model and sampling settings
    pub fn from_config(config: &AnalystConfig) -> Result<Self> {
        let provider = OpenAIProvider::with_config(config.openai_config())?;
        Ok(Self::new(Arc::new(provider), config.model.clone())
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<usize>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    #[instrument(skip(self, prompt), fields(provider = self.provider.name(), model = %self.model))]
    pub async fn generate(&self, prompt: &AnalysisPrompt) -> Result<String> {
        let request = CompletionRequest::builder(&self.model)
            .add_message(Message::system(&prompt.system))
            .add_message(Message::user(&prompt.user))
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build();

        let response = self.provider.complete(request).await?;
        debug!(
            stop_reason = ?response.stop_reason,
            tokens = response.usage.total(),
            "Model responded"
        );

        Ok(response.message.content)
    }
}
