//! In-memory passage store for development and testing

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::domain::passage::{sort_by_score, Passage, PassageStore, SearchParams};
use crate::domain::DomainError;

/// One record of a JSON corpus file. Field names follow the vector store payload.
#[derive(Debug, Clone, Deserialize)]
struct CorpusRecord {
    id: String,
    #[serde(alias = "content")]
    text: String,
    #[serde(default)]
    source_name: Option<String>,
    #[serde(default, alias = "article_id")]
    article_number: Option<String>,
    #[serde(default)]
    law_number: Option<String>,
    #[serde(default, alias = "enactment_year")]
    law_year: Option<i32>,
}

impl CorpusRecord {
    fn into_passage(self) -> Passage {
        Passage {
            id: self.id,
            content: self.text,
            source_name: self.source_name.filter(|s| !s.trim().is_empty()),
            article_id: self.article_number.filter(|s| !s.trim().is_empty()),
            law_number: self.law_number.filter(|s| !s.trim().is_empty()),
            enactment_year: self.law_year,
            score: 0.0,
        }
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.chars().count() > 1)
        .map(|t| t.to_lowercase())
        .collect()
}

/// Lexical store: scores passages by the share of query terms they contain
#[derive(Debug, Default)]
pub struct InMemoryPassageStore {
    passages: Arc<RwLock<Vec<Passage>>>,
}

impl InMemoryPassageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_passages(passages: Vec<Passage>) -> Self {
        Self {
            passages: Arc::new(RwLock::new(passages)),
        }
    }

    /// Load a JSON array of corpus records
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::configuration(format!("Failed to read corpus {}: {}", path.display(), e))
        })?;

        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, DomainError> {
        let records: Vec<CorpusRecord> = serde_json::from_str(raw)
            .map_err(|e| DomainError::configuration(format!("Invalid corpus file: {}", e)))?;

        Ok(Self::with_passages(
            records.into_iter().map(CorpusRecord::into_passage).collect(),
        ))
    }

    pub async fn add(&self, passage: Passage) {
        self.passages.write().await.push(passage);
    }

    pub async fn len(&self) -> usize {
        self.passages.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.passages.read().await.is_empty()
    }
}

#[async_trait]
impl PassageStore for InMemoryPassageStore {
    fn store_type(&self) -> &'static str {
        "in_memory"
    }

    async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError> {
        let query_terms = terms(&params.query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let passages = self.passages.read().await;

        let mut results: Vec<Passage> = passages
            .iter()
            .filter_map(|passage| {
                let passage_terms = terms(&passage.content);
                let hits = query_terms
                    .iter()
                    .filter(|t| passage_terms.contains(*t))
                    .count();

                if hits == 0 {
                    return None;
                }

                let mut result = passage.clone();
                result.score = hits as f32 / query_terms.len() as f32;
                Some(result)
            })
            .collect();

        sort_by_score(&mut results);
        results.truncate(params.top_k);

        Ok(results)
    }
}
