//! Answer generation port

use async_trait::async_trait;

use crate::domain::passage::Passage;
use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Synthesizes a cited answer from the passages judged relevant
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    /// `passages` may be empty when generation is forced after the last retry
    async fn generate(&self, query: &str, passages: &[Passage]) -> Result<String, DomainError>;
}

/// Render passages as the numbered context block given to the generator
pub fn build_context(passages: &[Passage]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            format!(
                "Document {} {}:\n{}",
                i + 1,
                passage.citation_label(),
                passage.content.trim()
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}
