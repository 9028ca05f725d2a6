//! Query rewriting port

use async_trait::async_trait;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Reformulates a query that retrieved nothing relevant
#[cfg_attr(test, automock)]
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    async fn rewrite(&self, query: &str) -> Result<String, DomainError>;
}
