//! Process-wide registry of long-lived model and store clients
//!
//! Providers are created on first use and shared afterwards. Two components that
//! point at the same endpoint with the same credentials reuse one client.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::sync::RwLock;
use tracing::info;

use crate::config::{AppConfig, EmbeddingConfig, ModelConfig, StoreConfig};
use crate::domain::crag::CragEngine;
use crate::domain::embedding::EmbeddingProvider;
use crate::domain::passage::PassageStore;
use crate::domain::{DomainError, LlmProvider};
use crate::infrastructure::crag::{LlmAnswerGenerator, LlmQueryRewriter, LlmRelevanceGrader};
use crate::infrastructure::embedding::OpenAiEmbeddingProvider;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::llm::{LlmProviderConfig, LlmProviderFactory};
use crate::infrastructure::store::{InMemoryPassageStore, QdrantConfig, QdrantPassageStore};

static GLOBAL_REGISTRY: Lazy<ClientRegistry> = Lazy::new(ClientRegistry::new);

#[derive(Default)]
pub struct ClientRegistry {
    llm_providers: RwLock<HashMap<String, Arc<dyn LlmProvider>>>,
    embedders: RwLock<HashMap<String, Arc<dyn EmbeddingProvider>>>,
}

impl std::fmt::Debug for ClientRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientRegistry").finish_non_exhaustive()
    }
}

fn llm_key(model: &ModelConfig) -> String {
    format!(
        "{}|{}|{}|{}",
        model.provider.name(),
        model.base_url.as_deref().unwrap_or(""),
        model.api_key_env.as_deref().unwrap_or(""),
        model.timeout_ms.unwrap_or_default()
    )
}

fn embedding_key(config: &EmbeddingConfig) -> String {
    format!(
        "{}|{}",
        config.base_url,
        config.api_key_env.as_deref().unwrap_or("")
    )
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry shared by the whole process
    pub fn global() -> &'static ClientRegistry {
        &GLOBAL_REGISTRY
    }

    pub async fn llm_provider(
        &self,
        model: &ModelConfig,
    ) -> Result<Arc<dyn LlmProvider>, DomainError> {
        let key = llm_key(model);

        if let Some(provider) = self.llm_providers.read().await.get(&key) {
            return Ok(Arc::clone(provider));
        }

        let mut providers = self.llm_providers.write().await;

        // Another task may have created it while we waited for the lock
        if let Some(provider) = providers.get(&key) {
            return Ok(Arc::clone(provider));
        }

        let mut provider_config = LlmProviderConfig::new(model.provider);

        if let Some(api_key) = model.api_key() {
            provider_config = provider_config.with_api_key(api_key);
        }

        if let Some(ref base_url) = model.base_url {
            provider_config = provider_config.with_base_url(base_url.clone());
        }

        if let Some(timeout_ms) = model.timeout_ms {
            provider_config = provider_config.with_timeout(Duration::from_millis(timeout_ms));
        }

        let provider = LlmProviderFactory::create(&provider_config).map_err(|e| {
            DomainError::configuration(format!("model '{}': {}", model.model, e))
        })?;

        info!(
            provider = model.provider.name(),
            base_url = model.base_url.as_deref().unwrap_or(model.provider.default_base_url()),
            "Created LLM provider"
        );

        providers.insert(key, Arc::clone(&provider));

        Ok(provider)
    }

    pub async fn embedding_provider(
        &self,
        config: &EmbeddingConfig,
    ) -> Result<Arc<dyn EmbeddingProvider>, DomainError> {
        let key = embedding_key(config);

        if let Some(provider) = self.embedders.read().await.get(&key) {
            return Ok(Arc::clone(provider));
        }

        let mut embedders = self.embedders.write().await;

        if let Some(provider) = embedders.get(&key) {
            return Ok(Arc::clone(provider));
        }

        let provider: Arc<dyn EmbeddingProvider> = Arc::new(
            OpenAiEmbeddingProvider::with_base_url(
                HttpClient::new(),
                config.api_key(),
                config.base_url.clone(),
            ),
        );

        info!(base_url = %config.base_url, model = %config.model, "Created embedding provider");

        embedders.insert(key, Arc::clone(&provider));

        Ok(provider)
    }

    pub async fn llm_provider_count(&self) -> usize {
        self.llm_providers.read().await.len()
    }

    pub async fn passage_store(
        &self,
        config: &StoreConfig,
    ) -> Result<Arc<dyn PassageStore>, DomainError> {
        match config {
            StoreConfig::Qdrant {
                url,
                collection,
                api_key_env,
                embedding,
                query_prefix,
                timeout_ms,
            } => {
                let embedder = self.embedding_provider(embedding).await?;

                let client = match timeout_ms {
                    Some(ms) => HttpClient::with_timeout(Duration::from_millis(*ms))?,
                    None => HttpClient::new(),
                };

                let mut qdrant = QdrantConfig::new(url.clone(), collection.clone())
                    .with_embedding_model(embedding.model.clone())
                    .with_query_prefix(query_prefix.clone());

                if let Some(api_key) = api_key_env
                    .as_deref()
                    .and_then(|name| std::env::var(name).ok())
                    .filter(|key| !key.trim().is_empty())
                {
                    qdrant = qdrant.with_api_key(api_key);
                }

                info!(url = %url, collection = %collection, "Using Qdrant passage store");

                Ok(Arc::new(QdrantPassageStore::new(client, embedder, qdrant)))
            }
            StoreConfig::InMemory { corpus_path } => {
                let store = match corpus_path {
                    Some(path) => InMemoryPassageStore::from_file(path).await?,
                    None => InMemoryPassageStore::new(),
                };

                info!(
                    passages = store.len().await,
                    corpus = corpus_path.as_deref().unwrap_or("<none>"),
                    "Using in-memory passage store"
                );

                Ok(Arc::new(store))
            }
        }
    }

    /// Wire the engine from configuration, reusing any clients already created
    pub async fn build_engine(&self, config: &AppConfig) -> Result<CragEngine, DomainError> {
        config.validate()?;

        let models = &config.models;
        let prompts = &config.prompts;

        let store = self.passage_store(&config.store).await?;

        let mut grader = LlmRelevanceGrader::new(
            self.llm_provider(&models.grader).await?,
            models.grader.model.clone(),
        )
        .with_temperature(models.grader.temperature)
        .with_max_tokens(models.grader.max_tokens);
        if let Some(ref template) = prompts.grader {
            grader = grader.with_template(template.clone());
        }

        let mut generator = LlmAnswerGenerator::new(
            self.llm_provider(&models.generator).await?,
            models.generator.model.clone(),
        )
        .with_temperature(models.generator.temperature)
        .with_max_tokens(models.generator.max_tokens);
        if let Some(ref template) = prompts.generator {
            generator = generator.with_template(template.clone());
        }

        let mut rewriter = LlmQueryRewriter::new(
            self.llm_provider(&models.rewriter).await?,
            models.rewriter.model.clone(),
        )
        .with_temperature(models.rewriter.temperature)
        .with_max_tokens(models.rewriter.max_tokens);
        if let Some(ref template) = prompts.rewriter {
            rewriter = rewriter.with_template(template.clone());
        }

        CragEngine::new(
            store,
            Arc::new(grader),
            Arc::new(generator),
            Arc::new(rewriter),
            config.crag.clone(),
        )
    }
}
