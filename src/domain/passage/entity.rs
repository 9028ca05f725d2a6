//! Retrieved passage entity

use serde::{Deserialize, Serialize};

/// Placeholder rendered when a passage has no source name
pub const UNKNOWN_SOURCE: &str = "Unknown source";

/// Placeholder rendered for a missing article identifier or year
pub const UNSPECIFIED: &str = "unspecified";

/// A candidate unit of legal text returned by a passage store.
///
/// Passages are created fresh by every retrieval call and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// Store-assigned identifier
    pub id: String,
    /// Passage text
    pub content: String,
    /// Human-readable title of the law or code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// Article identifier, e.g. "147" or "104 bis"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    /// Law number within the official gazette
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub law_number: Option<String>,
    /// Year of enactment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enactment_year: Option<i32>,
    /// Retrieval relevance score
    pub score: f32,
}

impl Passage {
    pub fn new(id: impl Into<String>, content: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            source_name: None,
            article_id: None,
            law_number: None,
            enactment_year: None,
            score,
        }
    }

    pub fn with_source(mut self, source_name: impl Into<String>) -> Self {
        self.source_name = Some(source_name.into());
        self
    }

    pub fn with_article(mut self, article_id: impl Into<String>) -> Self {
        self.article_id = Some(article_id.into());
        self
    }

    pub fn with_law_number(mut self, law_number: impl Into<String>) -> Self {
        self.law_number = Some(law_number.into());
        self
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.enactment_year = Some(year);
        self
    }

    /// True when there is no text worth sending to a model
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }

    /// Citation label: `[<source> - Article <article> (<year>)]`
    pub fn citation_label(&self) -> String {
        let source = self.source_name.as_deref().unwrap_or(UNKNOWN_SOURCE);
        let article = self.article_id.as_deref().unwrap_or(UNSPECIFIED);
        let year = self
            .enactment_year
            .map(|y| y.to_string())
            .unwrap_or_else(|| UNSPECIFIED.to_string());

        format!("[{} - Article {} ({})]", source, article, year)
    }
}
