//! Passage store trait (the document store gateway)

use std::fmt::Debug;

use async_trait::async_trait;

use super::Passage;
use crate::domain::error::DomainError;

/// Search parameters for passage retrieval
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Query text to search for
    pub query: String,
    /// Number of passages to return
    pub top_k: usize,
}

impl SearchParams {
    /// Create new search parameters
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: 5,
        }
    }

    /// Set number of results
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }
}

/// Provider trait for passage retrieval.
///
/// Implementations must return passages ordered by descending score and must
/// return an error when the backend is unavailable instead of an empty list,
/// so callers can tell "no matches" apart from "service down".
#[async_trait]
pub trait PassageStore: Send + Sync + Debug {
    /// Get the store type name
    fn store_type(&self) -> &'static str;

    /// Retrieve up to `top_k` passages for the query
    async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }
}

/// Sort passages by descending score, keeping the original order for ties
pub(crate) fn sort_by_score(passages: &mut [Passage]) {
    passages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scriptable store: each search pops the next scripted reply, the last one repeats
    #[derive(Debug, Default)]
    pub struct MockPassageStore {
        replies: Mutex<VecDeque<Result<Vec<Passage>, String>>>,
        queries: Mutex<Vec<SearchParams>>,
    }

    impl MockPassageStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Return these passages (regardless of query)
        pub fn with_results(self, passages: Vec<Passage>) -> Self {
            self.replies.lock().unwrap().push_back(Ok(passages));
            self
        }

        /// Fail with a backend error
        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Err(error.into()));
            self
        }

        /// Number of search calls
        pub fn search_count(&self) -> usize {
            self.queries.lock().unwrap().len()
        }

        /// Query texts received, in call order
        pub fn queries(&self) -> Vec<String> {
            self.queries
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.query.clone())
                .collect()
        }
    }

    #[async_trait]
    impl PassageStore for MockPassageStore {
        fn store_type(&self) -> &'static str {
            "mock"
        }

        async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError> {
            let top_k = params.top_k;
            self.queries.lock().unwrap().push(params);

            let reply = {
                let mut replies = self.replies.lock().unwrap();
                if replies.len() > 1 {
                    replies.pop_front()
                } else {
                    replies.front().cloned()
                }
            };

            match reply {
                Some(Ok(passages)) => Ok(passages.into_iter().take(top_k).collect()),
                Some(Err(error)) => Err(DomainError::retrieval("mock", error)),
                None => Ok(Vec::new()),
            }
        }
    }
}
