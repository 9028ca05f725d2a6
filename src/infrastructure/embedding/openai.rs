//! OpenAI-compatible embedding provider

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest, EmbeddingResponse};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Embedding provider for any server exposing `/embeddings` in the OpenAI format
/// (OpenAI, Ollama, text-embeddings-inference, ...)
#[derive(Debug)]
pub struct OpenAiEmbeddingProvider<C: HttpClientTrait> {
    client: C,
    auth_header: Option<String>,
    base_url: String,
}

impl<C: HttpClientTrait> OpenAiEmbeddingProvider<C> {
    pub fn new(client: C, api_key: impl Into<String>) -> Self {
        Self::with_base_url(client, Some(api_key.into()), DEFAULT_OPENAI_BASE_URL)
    }

    /// `base_url` includes the version segment, e.g. `http://localhost:8080/v1`
    pub fn with_base_url(
        client: C,
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let auth_header = api_key
            .filter(|key| !key.is_empty())
            .map(|key| format!("Bearer {}", key));
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Self {
            client,
            auth_header,
            base_url,
        }
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref auth) = self.auth_header {
            headers.push(("Authorization", auth.as_str()));
        }
        headers
    }

    fn build_request(&self, request: &EmbeddingRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model(),
            "input": request.inputs(),
        });

        if let Some(dims) = request.dimensions() {
            body["dimensions"] = serde_json::json!(dims);
        }

        body
    }

    fn parse_response(
        &self,
        json: serde_json::Value,
        expected: usize,
    ) -> Result<EmbeddingResponse, DomainError> {
        let response: OpenAiEmbeddingResponse = serde_json::from_value(json).map_err(|e| {
            DomainError::provider("openai", format!("Failed to parse embedding response: {}", e))
        })?;

        if response.data.len() != expected {
            return Err(DomainError::provider(
                "openai",
                format!(
                    "Expected {} embeddings, got {}",
                    expected,
                    response.data.len()
                ),
            ));
        }

        let mut data = response.data;
        data.sort_by_key(|d| d.index);

        let vectors = data.into_iter().map(|d| d.embedding).collect();

        Ok(EmbeddingResponse::new(response.model, vectors))
    }
}

#[async_trait]
impl<C: HttpClientTrait> EmbeddingProvider for OpenAiEmbeddingProvider<C> {
    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse, DomainError> {
        let url = self.embeddings_url();
        let body = self.build_request(&request);

        let response = self
            .client
            .post_json(&url, self.headers(), &body)
            .await?;

        self.parse_response(response, request.inputs().len())
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}

// OpenAI API types for embeddings

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingResponse {
    #[serde(default)]
    model: String,
    data: Vec<OpenAiEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct OpenAiEmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http_client::mock::MockHttpClient;

    const TEST_URL: &str = "https://api.openai.com/v1/embeddings";

    fn create_mock_response(num_embeddings: usize, dimensions: usize) -> serde_json::Value {
        let data: Vec<serde_json::Value> = (0..num_embeddings)
            .rev()
            .map(|i| {
                let embedding: Vec<f32> = (0..dimensions).map(|j| (i + j) as f32 * 0.001).collect();
                serde_json::json!({
                    "index": i,
                    "embedding": embedding,
                    "object": "embedding"
                })
            })
            .collect();

        serde_json::json!({
            "model": "intfloat/multilingual-e5-large",
            "data": data,
        })
    }

    #[tokio::test]
    async fn test_embed_single_text() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1, 1024));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::single("intfloat/multilingual-e5-large", "query: theft");
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.model(), "intfloat/multilingual-e5-large");
        assert_eq!(response.vectors().len(), 1);
        assert_eq!(response.vectors()[0].len(), 1024);
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(3, 4));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::batch(
            "intfloat/multilingual-e5-large",
            vec!["a".into(), "b".into(), "c".into()],
        );
        let response = provider.embed(request).await.unwrap();

        let firsts: Vec<f32> = response.vectors().iter().map(|v| v[0]).collect();
        assert_eq!(firsts, vec![0.0, 0.001, 0.002]);
    }

    #[tokio::test]
    async fn test_embed_count_mismatch() {
        let client = MockHttpClient::new().with_response(TEST_URL, create_mock_response(1, 4));
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::batch("m", vec!["a".into(), "b".into()]);
        assert!(provider.embed(request).await.is_err());
    }

    #[tokio::test]
    async fn test_embed_error() {
        let client = MockHttpClient::new().with_error(TEST_URL, "Rate limit exceeded");
        let provider = OpenAiEmbeddingProvider::new(client, "test-api-key");

        let request = EmbeddingRequest::single("m", "Hello");
        let result = provider.embed(request).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_custom_base_url_with_dimensions() {
        let custom_url = "http://localhost:8080/v1/embeddings";
        let client = MockHttpClient::new().with_response(custom_url, create_mock_response(1, 256));
        let provider =
            OpenAiEmbeddingProvider::with_base_url(client, None, "http://localhost:8080/v1");

        let request = EmbeddingRequest::single("m", "Test").with_dimensions(256);
        let response = provider.embed(request).await.unwrap();

        assert_eq!(response.vectors()[0].len(), 256);
        let bodies = provider.client.bodies();
        assert_eq!(bodies[0].1["dimensions"], 256);
    }
}
