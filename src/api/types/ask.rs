//! Request and response bodies for `POST /v1/ask`

use serde::{Deserialize, Serialize};

use crate::domain::crag::{extract_citations, CragOutcome, Terminal};
use crate::domain::passage::Passage;

#[derive(Debug, Clone, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// A relevant passage as returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassageResponse {
    pub id: String,
    /// Formatted citation, e.g. `[Civil Code - Article 147 (1948)]`
    pub label: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub article_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub law_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enactment_year: Option<i32>,
    pub score: f32,
}

impl From<Passage> for PassageResponse {
    fn from(passage: Passage) -> Self {
        Self {
            label: passage.citation_label(),
            id: passage.id,
            content: passage.content,
            source_name: passage.source_name,
            article_id: passage.article_id,
            law_number: passage.law_number,
            enactment_year: passage.enactment_year,
            score: passage.score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub relevant_passages: Vec<PassageResponse>,
    pub retry_count: u32,
    pub query_history: Vec<String>,
    pub terminal: Terminal,
    pub forced: bool,
    /// Article references found in the answer
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub citations: Vec<String>,
}

impl From<CragOutcome> for AskResponse {
    fn from(outcome: CragOutcome) -> Self {
        Self {
            citations: extract_citations(&outcome.answer),
            answer: outcome.answer,
            relevant_passages: outcome
                .relevant_passages
                .into_iter()
                .map(PassageResponse::from)
                .collect(),
            retry_count: outcome.retry_count,
            query_history: outcome.query_history,
            terminal: outcome.terminal,
            forced: outcome.forced,
        }
    }
}
