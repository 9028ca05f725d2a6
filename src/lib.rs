//! Legal CRAG
//!
//! Corrective retrieval-augmented question answering over legal texts:
//! - passages are retrieved from a vector store (Qdrant) or an in-memory corpus
//! - each passage is graded for relevance by a language model
//! - when nothing relevant is found the question is rewritten and retried
//! - answers cite the articles they rely on

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::crag::{CragConfig, CragEngine, CragOutcome};
pub use domain::DomainError;
