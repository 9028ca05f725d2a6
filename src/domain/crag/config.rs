//! Engine configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::routing::ExhaustionPolicy;
use crate::domain::DomainError;

/// Per-operation time limits in milliseconds. `None` or `0` disables the limit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CragTimeouts {
    #[serde(default = "default_retrieval_ms")]
    pub retrieval_ms: Option<u64>,
    #[serde(default = "default_grading_ms")]
    pub grading_ms: Option<u64>,
    #[serde(default = "default_generation_ms")]
    pub generation_ms: Option<u64>,
    #[serde(default = "default_rewrite_ms")]
    pub rewrite_ms: Option<u64>,
}

fn default_retrieval_ms() -> Option<u64> {
    Some(30_000)
}

fn default_grading_ms() -> Option<u64> {
    Some(20_000)
}

fn default_generation_ms() -> Option<u64> {
    Some(60_000)
}

fn default_rewrite_ms() -> Option<u64> {
    Some(20_000)
}

impl Default for CragTimeouts {
    fn default() -> Self {
        Self {
            retrieval_ms: default_retrieval_ms(),
            grading_ms: default_grading_ms(),
            generation_ms: default_generation_ms(),
            rewrite_ms: default_rewrite_ms(),
        }
    }
}

fn limit(ms: Option<u64>) -> Option<Duration> {
    ms.filter(|ms| *ms > 0).map(Duration::from_millis)
}

impl CragTimeouts {
    /// No limits at all
    pub fn disabled() -> Self {
        Self {
            retrieval_ms: None,
            grading_ms: None,
            generation_ms: None,
            rewrite_ms: None,
        }
    }

    pub fn retrieval(&self) -> Option<Duration> {
        limit(self.retrieval_ms)
    }

    pub fn grading(&self) -> Option<Duration> {
        limit(self.grading_ms)
    }

    pub fn generation(&self) -> Option<Duration> {
        limit(self.generation_ms)
    }

    pub fn rewrite(&self) -> Option<Duration> {
        limit(self.rewrite_ms)
    }
}

/// Configuration for the corrective retrieval loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CragConfig {
    /// Passages fetched per retrieval
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    /// Maximum number of query rewrites per question
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Terminal step when nothing is relevant after the last retry
    #[serde(default)]
    pub exhaustion_policy: ExhaustionPolicy,
    /// Passages graded concurrently
    #[serde(default = "default_grading_concurrency")]
    pub grading_concurrency: usize,
    #[serde(default)]
    pub timeouts: CragTimeouts,
}

fn default_top_k() -> usize {
    5
}

fn default_max_retries() -> u32 {
    2
}

fn default_grading_concurrency() -> usize {
    4
}

impl Default for CragConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            max_retries: default_max_retries(),
            exhaustion_policy: ExhaustionPolicy::default(),
            grading_concurrency: default_grading_concurrency(),
            timeouts: CragTimeouts::default(),
        }
    }
}

impl CragConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_exhaustion_policy(mut self, policy: ExhaustionPolicy) -> Self {
        self.exhaustion_policy = policy;
        self
    }

    pub fn with_grading_concurrency(mut self, concurrency: usize) -> Self {
        self.grading_concurrency = concurrency;
        self
    }

    pub fn with_timeouts(mut self, timeouts: CragTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.top_k == 0 {
            return Err(DomainError::configuration("crag.top_k must be at least 1"));
        }

        if self.grading_concurrency == 0 {
            return Err(DomainError::configuration(
                "crag.grading_concurrency must be at least 1",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CragConfig::default();

        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.exhaustion_policy, ExhaustionPolicy::Generate);
        assert_eq!(config.grading_concurrency, 4);
        assert_eq!(config.timeouts.retrieval(), Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = CragConfig::new()
            .with_top_k(8)
            .with_max_retries(0)
            .with_exhaustion_policy(ExhaustionPolicy::NoAnswer)
            .with_grading_concurrency(1)
            .with_timeouts(CragTimeouts::disabled());

        assert_eq!(config.top_k, 8);
        assert_eq!(config.max_retries, 0);
        assert_eq!(config.exhaustion_policy, ExhaustionPolicy::NoAnswer);
        assert_eq!(config.grading_concurrency, 1);
        assert!(config.timeouts.grading().is_none());
    }

    #[test]
    fn test_zero_timeout_disables_limit() {
        let timeouts = CragTimeouts {
            retrieval_ms: Some(0),
            grading_ms: Some(1500),
            ..CragTimeouts::default()
        };

        assert!(timeouts.retrieval().is_none());
        assert_eq!(timeouts.grading(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_validate_rejects_zero_values() {
        assert!(CragConfig::new().with_top_k(0).validate().is_err());
        assert!(
            CragConfig::new()
                .with_grading_concurrency(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_deserialize_partial() {
        let config: CragConfig = serde_json::from_str(
            r#"{"max_retries": 3, "exhaustion_policy": "no_answer", "timeouts": {"grading_ms": null}}"#,
        )
        .unwrap();

        assert_eq!(config.top_k, 5);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.exhaustion_policy, ExhaustionPolicy::NoAnswer);
        assert!(config.timeouts.grading().is_none());
        assert_eq!(config.timeouts.rewrite(), Some(Duration::from_secs(20)));
    }
}
