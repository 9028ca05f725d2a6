//! LLM-backed query rewriter

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::crag::prompts::{render, REWRITER_SYSTEM_PROMPT, REWRITER_USER_TEMPLATE};
use crate::domain::crag::QueryRewriter;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::DomainError;

#[derive(Debug)]
pub struct LlmQueryRewriter {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    template: String,
}

impl LlmQueryRewriter {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: Some(200),
            system_prompt: REWRITER_SYSTEM_PROMPT.to_string(),
            template: REWRITER_USER_TEMPLATE.to_string(),
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

    /// Replace the user template; `${query}` is substituted
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }
}

/// First non-empty line, without surrounding quotes
fn clean_rewrite(reply: &str) -> Option<String> {
    reply
        .lines()
        .map(|line| line.trim().trim_matches(|c: char| c == '"' || c == '\'').trim())
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl QueryRewriter for LlmQueryRewriter {
    async fn rewrite(&self, query: &str) -> Result<String, DomainError> {
        let request = LlmRequest::builder()
            .system(self.system_prompt.clone())
            .user(render(&self.template, &[("query", query)]))
            .temperature(self.temperature)
            .max_tokens_opt(self.max_tokens)
            .build();

        let response = self.provider.chat(&self.model, request).await?;

        response
            .content()
            .and_then(clean_rewrite)
            .ok_or_else(|| {
                DomainError::provider(self.provider.provider_name(), "Empty rewrite from model")
            })
    }
}
