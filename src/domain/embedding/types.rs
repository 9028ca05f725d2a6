//! Embedding request and response types

use serde::{Deserialize, Serialize};

/// Request to embed one or more texts with a given model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingRequest {
    model: String,
    input: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

impl EmbeddingRequest {
    /// Request for a single text
    pub fn single(model: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: vec![text.into()],
            dimensions: None,
        }
    }

    /// Request for several texts, embedded in order
    pub fn batch(model: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            model: model.into(),
            input: texts,
            dimensions: None,
        }
    }

    /// Ask for truncated output vectors (models that support it)
    pub fn with_dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = Some(dimensions);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn inputs(&self) -> &[String] {
        &self.input
    }

    pub fn dimensions(&self) -> Option<usize> {
        self.dimensions
    }
}

/// Embedding vectors, one per input, in input order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResponse {
    model: String,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingResponse {
    pub fn new(model: impl Into<String>, vectors: Vec<Vec<f32>>) -> Self {
        Self {
            model: model.into(),
            vectors,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }

    /// Take the first vector (single-input requests)
    pub fn into_first(self) -> Option<Vec<f32>> {
        self.vectors.into_iter().next()
    }
}
