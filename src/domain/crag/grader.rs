//! Relevance grading port

use async_trait::async_trait;

use crate::domain::passage::Passage;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Binary judgment of whether a passage helps answer a query.
///
/// Implementations report failures as errors; the engine decides how to treat them.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RelevanceGrader: Send + Sync {
    async fn grade(&self, query: &str, passage: &Passage) -> Result<bool, DomainError>;
}
