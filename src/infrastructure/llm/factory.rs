use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::OpenAiProvider;
use crate::domain::{DomainError, LlmProvider};
use crate::infrastructure::http_client::HttpClient;

/// Supported chat backends. All of them speak the OpenAI chat-completions dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProviderKind {
    #[serde(rename = "openai")]
    OpenAi,
    Groq,
    Gemini,
    Ollama,
}

impl LlmProviderKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Groq => "https://api.groq.com/openai/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
            Self::Ollama => "http://localhost:11434/v1",
        }
    }

    /// Local servers run without credentials
    pub fn requires_api_key(&self) -> bool {
        !matches!(self, Self::Ollama)
    }
}

/// Connection settings for one chat backend
#[derive(Debug, Clone)]
pub struct LlmProviderConfig {
    pub kind: LlmProviderKind,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout: Option<Duration>,
}

impl LlmProviderConfig {
    pub fn new(kind: LlmProviderKind) -> Self {
        Self {
            kind,
            api_key: None,
            base_url: None,
            timeout: None,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Factory for creating LLM providers
#[derive(Debug)]
pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create(config: &LlmProviderConfig) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let api_key = config.api_key.clone().filter(|key| !key.trim().is_empty());

        if config.kind.requires_api_key() && api_key.is_none() {
            return Err(DomainError::configuration(format!(
                "Provider '{}' requires an API key",
                config.kind.name()
            )));
        }

        let http_client = match config.timeout {
            Some(timeout) => HttpClient::with_timeout(timeout)?,
            None => HttpClient::new(),
        };

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or_else(|| config.kind.default_base_url());

        let provider =
            OpenAiProvider::with_base_url(http_client, api_key, base_url).named(config.kind.name());

        Ok(Arc::new(provider))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_requires_key_for_hosted_providers() {
        let result = LlmProviderFactory::create(&LlmProviderConfig::new(LlmProviderKind::Groq));
        assert!(matches!(result, Err(DomainError::Configuration { .. })));

        let result = LlmProviderFactory::create(
            &LlmProviderConfig::new(LlmProviderKind::Gemini).with_api_key("  "),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_create_ollama_without_key() {
        let provider =
            LlmProviderFactory::create(&LlmProviderConfig::new(LlmProviderKind::Ollama)).unwrap();
        assert_eq!(provider.provider_name(), "ollama");
    }

    #[test]
    fn test_create_with_key_and_timeout() {
        let provider = LlmProviderFactory::create(
            &LlmProviderConfig::new(LlmProviderKind::Groq)
                .with_api_key("gsk-test")
                .with_base_url("http://localhost:9999/v1")
                .with_timeout(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(provider.provider_name(), "groq");
    }

    #[test]
    fn test_kind_serde() {
        let kind: LlmProviderKind = serde_json::from_str(r#""openai""#).unwrap();
        assert_eq!(kind, LlmProviderKind::OpenAi);
        let kind: LlmProviderKind = serde_json::from_str(r#""ollama""#).unwrap();
        assert!(!kind.requires_api_key());
    }
}
