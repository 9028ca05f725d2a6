//! LLM-backed relevance grader

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::crag::prompts::{render, GRADER_SYSTEM_PROMPT, GRADER_USER_TEMPLATE};
use crate::domain::crag::RelevanceGrader;
use crate::domain::llm::{LlmProvider, LlmRequest};
use crate::domain::passage::Passage;
use crate::domain::DomainError;

/// Parse a one-word verdict. `None` when the reply is neither.
pub fn parse_verdict(reply: &str) -> Option<bool> {
    let reply = reply.trim().to_lowercase();

    if reply.contains("irrelevant") || reply.contains("not relevant") {
        Some(false)
    } else if reply.contains("relevant") {
        Some(true)
    } else {
        None
    }
}

/// Grades one passage per model call at deterministic temperature
#[derive(Debug)]
pub struct LlmRelevanceGrader {
    provider: Arc<dyn LlmProvider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    system_prompt: String,
    template: String,
}

impl LlmRelevanceGrader {
    pub fn new(provider: Arc<dyn LlmProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature: 0.0,
            max_tokens: Some(10),
            system_prompt: GRADER_SYSTEM_PROMPT.to_string(),
            template: GRADER_USER_TEMPLATE.to_string(),
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

    /// Replace the user template; `${query}` and `${document}` are substituted
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    fn build_request(&self, query: &str, passage: &Passage) -> LlmRequest {
        let user = render(
            &self.template,
            &[("query", query), ("document", passage.content.as_str())],
        );

        LlmRequest::builder()
            .system(self.system_prompt.clone())
            .user(user)
            .temperature(self.temperature)
            .max_tokens_opt(self.max_tokens)
            .build()
    }
}

#[async_trait]
impl RelevanceGrader for LlmRelevanceGrader {
    async fn grade(&self, query: &str, passage: &Passage) -> Result<bool, DomainError> {
        let request = self.build_request(query, passage);
        let response = self.provider.chat(&self.model, request).await?;
        let reply = response.content().unwrap_or_default();

        let verdict = parse_verdict(reply).ok_or_else(|| {
            DomainError::provider(
                self.provider.provider_name(),
                format!("Unrecognised grader verdict: {:?}", reply),
            )
        })?;

        debug!(passage_id = %passage.id, relevant = verdict, "Graded passage");

        Ok(verdict)
    }
}
