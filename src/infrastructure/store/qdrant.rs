//! Qdrant-backed passage store (REST API)

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::embedding::{EmbeddingProvider, EmbeddingRequest};
use crate::domain::passage::{sort_by_score, Passage, PassageStore, SearchParams};
use crate::domain::DomainError;
use crate::infrastructure::http_client::HttpClientTrait;

const PAYLOAD_TEXT: &str = "text";
const PAYLOAD_SOURCE_NAME: &str = "source_name";
const PAYLOAD_ARTICLE_NUMBER: &str = "article_number";
const PAYLOAD_LAW_NUMBER: &str = "law_number";
const PAYLOAD_LAW_YEAR: &str = "law_year";

/// Connection settings for a Qdrant collection
#[derive(Debug, Clone)]
pub struct QdrantConfig {
    /// Qdrant REST URL, e.g. `http://localhost:6333`
    pub url: String,
    pub collection: String,
    pub api_key: Option<String>,
    /// Embedding model used at ingestion time
    pub embedding_model: String,
    /// Prepended to every query before embedding (E5 models expect `query: `)
    pub query_prefix: String,
}

impl QdrantConfig {
    pub fn new(url: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            collection: collection.into(),
            api_key: None,
            embedding_model: "intfloat/multilingual-e5-large".to_string(),
            query_prefix: "query: ".to_string(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.query_prefix = prefix.into();
        self
    }
}

/// Passage store that embeds the query and runs a nearest-neighbour search in Qdrant.
///
/// Payload fields follow the ingestion schema: `text`, `source_name`,
/// `article_number`, `law_number`, `law_year`.
#[derive(Debug)]
pub struct QdrantPassageStore<C: HttpClientTrait> {
    client: C,
    embedder: Arc<dyn EmbeddingProvider>,
    config: QdrantConfig,
}

impl<C: HttpClientTrait> QdrantPassageStore<C> {
    pub fn new(client: C, embedder: Arc<dyn EmbeddingProvider>, config: QdrantConfig) -> Self {
        Self {
            client,
            embedder,
            config,
        }
    }

    fn query_url(&self) -> String {
        format!(
            "{}/collections/{}/points/query",
            self.config.url, self.config.collection
        )
    }

    fn collection_url(&self) -> String {
        format!("{}/collections/{}", self.config.url, self.config.collection)
    }

    fn headers(&self) -> Vec<(&str, &str)> {
        let mut headers = vec![("Content-Type", "application/json")];
        if let Some(ref key) = self.config.api_key {
            headers.push(("api-key", key.as_str()));
        }
        headers
    }

    async fn embed_query(&self, query: &str) -> Result<Vec<f32>, DomainError> {
        let text = format!("{}{}", self.config.query_prefix, query);
        let request = EmbeddingRequest::single(&self.config.embedding_model, text);

        self.embedder
            .embed(request)
            .await
            .map_err(|e| DomainError::retrieval("qdrant", format!("Query embedding failed: {}", e)))?
            .into_first()
            .ok_or_else(|| DomainError::retrieval("qdrant", "Embedding provider returned no vector"))
    }

    fn point_to_passage(point: QdrantPoint) -> Passage {
        let payload = point.payload.unwrap_or_default();

        let mut passage = Passage::new(
            value_to_string(&point.id).unwrap_or_default(),
            payload
                .get(PAYLOAD_TEXT)
                .and_then(|v| v.as_str())
                .unwrap_or_default(),
            point.score,
        );

        passage.source_name = payload.get(PAYLOAD_SOURCE_NAME).and_then(value_to_string);
        passage.article_id = payload.get(PAYLOAD_ARTICLE_NUMBER).and_then(value_to_string);
        passage.law_number = payload.get(PAYLOAD_LAW_NUMBER).and_then(value_to_string);
        passage.enactment_year = payload.get(PAYLOAD_LAW_YEAR).and_then(value_to_year);

        passage
    }
}

/// Non-empty string form of a scalar payload value
fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn value_to_year(value: &serde_json::Value) -> Option<i32> {
    match value {
        serde_json::Value::Number(n) => n.as_i64().and_then(|y| i32::try_from(y).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[async_trait]
impl<C: HttpClientTrait> PassageStore for QdrantPassageStore<C> {
    fn store_type(&self) -> &'static str {
        "qdrant"
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError> {
        let vector = self.embed_query(&params.query).await?;

        let body = serde_json::json!({
            "query": vector,
            "limit": params.top_k,
            "with_payload": true,
        });

        let response = self
            .client
            .post_json(&self.query_url(), self.headers(), &body)
            .await
            .map_err(|e| DomainError::retrieval("qdrant", e.to_string()))?;

        let response: QdrantQueryResponse = serde_json::from_value(response).map_err(|e| {
            DomainError::retrieval("qdrant", format!("Failed to parse query response: {}", e))
        })?;

        let mut passages: Vec<Passage> = response
            .result
            .points
            .into_iter()
            .map(Self::point_to_passage)
            .collect();

        sort_by_score(&mut passages);
        passages.truncate(params.top_k);

        debug!(
            collection = %self.config.collection,
            count = passages.len(),
            "Qdrant query complete"
        );

        Ok(passages)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        let response = self
            .client
            .get_json(&self.collection_url(), self.headers())
            .await
            .map_err(|e| DomainError::retrieval("qdrant", e.to_string()))?;

        Ok(response["result"]["status"]
            .as_str()
            .map(|status| status != "red")
            .unwrap_or(false))
    }
}

// Qdrant REST types

#[derive(Debug, Deserialize)]
struct QdrantQueryResponse {
    result: QdrantQueryResult,
}

#[derive(Debug, Deserialize)]
struct QdrantQueryResult {
    #[serde(default)]
    points: Vec<QdrantPoint>,
}

#[derive(Debug, Deserialize)]
struct QdrantPoint {
    id: serde_json::Value,
    score: f32,
    #[serde(default)]
    payload: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::embedding::MockEmbeddingProvider;
    use crate::infrastructure::http_client::mock::MockHttpClient;
    use serde_json::json;

    const QUERY_URL: &str = "http://qdrant:6333/collections/egyptian_law/points/query";

    fn config() -> QdrantConfig {
        QdrantConfig::new("http://qdrant:6333/", "egyptian_law").with_api_key("secret")
    }

    fn query_response() -> serde_json::Value {
        json!({
            "status": "ok",
            "result": {
                "points": [
                    {
                        "id": 42,
                        "score": 0.71,
                        "payload": {
                            "text": "Theft is punished by imprisonment.",
                            "source_name": "Penal Code",
                            "article_number": "311",
                            "law_number": "58",
                            "law_year": 1937
                        }
                    },
                    {
                        "id": "8c9f0d4e-0000-4000-8000-000000000001",
                        "score": 0.88,
                        "payload": {
                            "text": "The contract is the law of the parties.",
                            "source_name": "Civil Code",
                            "article_number": "147",
                            "law_year": "1948"
                        }
                    },
                    {
                        "id": 7,
                        "score": 0.5,
                        "payload": { "text": "Orphan text", "source_name": "" }
                    }
                ]
            }
        })
    }

    #[tokio::test]
    async fn test_search_maps_payload_and_sorts() {
        let client = MockHttpClient::new().with_response(QUERY_URL, query_response());
        let store =
            QdrantPassageStore::new(client, Arc::new(MockEmbeddingProvider::new(8)), config());

        let passages = store
            .search(SearchParams::new("penalty for theft").with_top_k(5))
            .await
            .unwrap();

        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].id, "8c9f0d4e-0000-4000-8000-000000000001");
        assert_eq!(passages[0].enactment_year, Some(1948));
        assert_eq!(passages[1].id, "42");
        assert_eq!(passages[1].citation_label(), "[Penal Code - Article 311 (1937)]");
        assert_eq!(passages[1].law_number.as_deref(), Some("58"));
        assert_eq!(passages[2].source_name, None);
        assert_eq!(passages[2].article_id, None);
    }

    #[tokio::test]
    async fn test_search_request_body() {
        let client = MockHttpClient::new().with_response(QUERY_URL, query_response());
        let store =
            QdrantPassageStore::new(client, Arc::new(MockEmbeddingProvider::new(8)), config());

        store
            .search(SearchParams::new("q").with_top_k(2))
            .await
            .unwrap();

        let bodies = store.client.bodies();
        let (url, body) = &bodies[0];
        assert_eq!(url, QUERY_URL);
        assert_eq!(body["limit"], 2);
        assert_eq!(body["with_payload"], true);
        assert_eq!(body["query"].as_array().unwrap().len(), 8);
    }

    #[tokio::test]
    async fn test_search_truncates_to_top_k() {
        let client = MockHttpClient::new().with_response(QUERY_URL, query_response());
        let store =
            QdrantPassageStore::new(client, Arc::new(MockEmbeddingProvider::new(8)), config());

        let passages = store
            .search(SearchParams::new("q").with_top_k(1))
            .await
            .unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].score, 0.88);
    }

    #[tokio::test]
    async fn test_backend_failure_is_retrieval_error() {
        let client = MockHttpClient::new().with_error(QUERY_URL, "connection refused");
        let store =
            QdrantPassageStore::new(client, Arc::new(MockEmbeddingProvider::new(8)), config());

        let result = store.search(SearchParams::new("q")).await;

        assert!(matches!(result, Err(DomainError::Retrieval { .. })));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_retrieval_error() {
        let client = MockHttpClient::new().with_response(QUERY_URL, query_response());
        let embedder = MockEmbeddingProvider::new(8).with_error("model not loaded");
        let store = QdrantPassageStore::new(client, Arc::new(embedder), config());

        let result = store.search(SearchParams::new("q")).await;

        assert!(matches!(result, Err(DomainError::Retrieval { .. })));
        assert!(store.client.bodies().is_empty());
    }

    #[tokio::test]
    async fn test_empty_result_is_ok() {
        let client =
            MockHttpClient::new().with_response(QUERY_URL, json!({"result": {"points": []}}));
        let store =
            QdrantPassageStore::new(client, Arc::new(MockEmbeddingProvider::new(8)), config());

        let passages = store.search(SearchParams::new("q")).await.unwrap();
        assert!(passages.is_empty());
    }

    #[tokio::test]
    async fn test_health_check() {
        let client = MockHttpClient::new().with_response(
            "http://qdrant:6333/collections/egyptian_law",
            json!({"result": {"status": "green"}}),
        );
        let store =
            QdrantPassageStore::new(client, Arc::new(MockEmbeddingProvider::new(8)), config());

        assert!(store.health_check().await.unwrap());
    }
}
