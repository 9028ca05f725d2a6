//! Per-request state threaded through the engine

use serde::{Deserialize, Serialize};

use crate::domain::passage::Passage;

/// Mutable record for one user question.
///
/// Created at request start, mutated only by the engine, discarded once the
/// outcome is returned.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestState {
    /// Latest query attempt text
    pub current_query: String,
    /// Passages retrieved for the current attempt
    pub retrieved: Vec<Passage>,
    /// Passages of the current attempt graded relevant, in retrieval order
    pub relevant: Vec<Passage>,
    /// Number of rewrites performed
    pub retry_count: u32,
    /// Every query attempt, oldest first
    pub query_history: Vec<String>,
    /// Final answer, empty until a terminal step runs
    pub answer: String,
}

impl RequestState {
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();

        Self {
            current_query: question.clone(),
            retrieved: Vec::new(),
            relevant: Vec::new(),
            retry_count: 0,
            query_history: vec![question],
            answer: String::new(),
        }
    }

    /// Replace the retrieved set wholesale
    pub fn set_retrieved(&mut self, passages: Vec<Passage>) {
        self.retrieved = passages;
        self.relevant.clear();
    }

    pub fn set_relevant(&mut self, passages: Vec<Passage>) {
        self.relevant = passages;
    }

    /// Start a new attempt with the rewritten query.
    ///
    /// Passages from the failed attempt are dropped, never merged into the next one.
    pub fn apply_rewrite(&mut self, query: impl Into<String>) {
        let query = query.into();

        self.retry_count += 1;
        self.query_history.push(query.clone());
        self.current_query = query;
        self.retrieved.clear();
        self.relevant.clear();
    }

    pub fn into_outcome(self, terminal: Terminal, forced: bool) -> CragOutcome {
        CragOutcome {
            answer: self.answer,
            relevant_passages: self.relevant,
            retry_count: self.retry_count,
            query_history: self.query_history,
            terminal,
            forced,
        }
    }
}

/// Terminal step that ended a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    Generate,
    NoAnswer,
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CragOutcome {
    pub answer: String,
    pub relevant_passages: Vec<Passage>,
    pub retry_count: u32,
    pub query_history: Vec<String>,
    pub terminal: Terminal,
    /// Generation ran with no relevant passage because the retry budget was spent
    pub forced: bool,
}
