//! LLM-backed answer generator

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::crag::prompts::{render, GENERATOR_SYSTEM_PROMPT, GENERATOR_USER_TEMPLATE};
use crate::domain::crag::{build_context, AnswerGenerator};
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::passage::Passage;
use crate::domain::DomainError;

#[derive(Debug)]
pub struct LlmAnswerGenerator {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    template: String,
}

impl LlmAnswerGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.3,
            max_tokens: None,
            system_prompt: GENERATOR_SYSTEM_PROMPT.to_string(),
            template: GENERATOR_USER_TEMPLATE.to_string(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Replace the user template; `${query}` and `${context}` are substituted
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

#[async_trait]
impl AnswerGenerator for LlmAnswerGenerator {
    async fn generate(&self, query: &str, passages: &[Passage]) -> Result<String, DomainError> {
        let context = build_context(passages);
        let user = render(&self.template, &[("query", query), ("context", context.as_str())]);

        let request = LlmRequest::builder()
            .system(self.system_prompt.clone())
            .user(user)
            .temperature(self.temperature)
            .max_tokens_opt(self.max_tokens)
            .build();

        let response = self.provider.chat(&self.model, request).await?;

        response.content().map(str::to_string).ok_or_else(|| {
            DomainError::provider(self.provider.provider_name(), "Empty answer from generator")
        })
    }
}
