use serde::Deserialize;

use crate::domain::crag::CragConfig;
use crate::domain::DomainError;
use crate::infrastructure::llm::LlmProviderKind;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub crag: CragConfig,
    #[serde(default)]
    pub prompts: PromptsConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Optional replacements for the user-message templates
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PromptsConfig {
    /// `${query}`, `${document}`
    pub grader: Option<String>,
    /// `${query}`, `${context}`
    pub generator: Option<String>,
    /// `${query}`
    pub rewriter: Option<String>,
}

/// One chat model binding
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub provider: LlmProviderKind,
    pub model: String,
    pub temperature: f32,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Overrides the provider's default endpoint
    #[serde(default)]
    pub base_url: Option<String>,
    /// Name of the environment variable holding the API key
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// HTTP timeout for this model's requests
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ModelConfig {
    /// Resolve the API key from the configured environment variable
    pub fn api_key(&self) -> Option<String> {
        read_env(self.api_key_env.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelsConfig {
    #[serde(default = "default_grader_model")]
    pub grader: ModelConfig,
    #[serde(default = "default_generator_model")]
    pub generator: ModelConfig,
    #[serde(default = "default_rewriter_model")]
    pub rewriter: ModelConfig,
}

/// Query embedding endpoint for the vector store
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// OpenAI-compatible base URL including the version segment
    #[serde(default = "default_embedding_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub api_key_env: Option<String>,
}

impl EmbeddingConfig {
    pub fn api_key(&self) -> Option<String> {
        read_env(self.api_key_env.as_deref())
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            base_url: default_embedding_base_url(),
            api_key_env: None,
        }
    }
}

/// Passage store backend
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreConfig {
    Qdrant {
        url: String,
        #[serde(default = "default_collection")]
        collection: String,
        #[serde(default)]
        api_key_env: Option<String>,
        #[serde(default)]
        embedding: EmbeddingConfig,
        #[serde(default = "default_query_prefix")]
        query_prefix: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    InMemory {
        /// JSON array of passage records; empty store when absent
        #[serde(default)]
        corpus_path: Option<String>,
    },
}

fn read_env(name: Option<&str>) -> Option<String> {
    name.and_then(|name| std::env::var(name).ok())
        .filter(|value| !value.trim().is_empty())
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

fn default_grader_model() -> ModelConfig {
    ModelConfig {
        provider: LlmProviderKind::Groq,
        model: "llama-3.1-8b-instant".to_string(),
        temperature: 0.0,
        max_tokens: Some(10),
        base_url: None,
        api_key_env: Some("GROQ_API_KEY".to_string()),
        timeout_ms: None,
    }
}

fn default_generator_model() -> ModelConfig {
    ModelConfig {
        provider: LlmProviderKind::Gemini,
        model: "gemini-1.5-flash".to_string(),
        temperature: 0.3,
        max_tokens: None,
        base_url: None,
        api_key_env: Some("GOOGLE_API_KEY".to_string()),
        timeout_ms: None,
    }
}

fn default_rewriter_model() -> ModelConfig {
    ModelConfig {
        temperature: 0.7,
        max_tokens: Some(200),
        ..default_generator_model()
    }
}

fn default_embedding_model() -> String {
    "intfloat/multilingual-e5-large".to_string()
}

fn default_embedding_base_url() -> String {
    "http://localhost:8081/v1".to_string()
}

fn default_collection() -> String {
    "egyptian_law".to_string()
}

fn default_query_prefix() -> String {
    "query: ".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            grader: default_grader_model(),
            generator: default_generator_model(),
            rewriter: default_rewriter_model(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::InMemory { corpus_path: None }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(None)
    }

    /// Load defaults, then `extra_file` if given, then `APP__*` environment variables
    pub fn load_from(extra_file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false));

        if let Some(path) = extra_file {
            builder = builder.add_source(config::File::with_name(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        self.crag.validate()?;

        if let StoreConfig::Qdrant { url, .. } = &self.store {
            if url.trim().is_empty() {
                return Err(DomainError::configuration("store.url cannot be empty"));
            }
        }

        Ok(())
    }
}
