//! Domain layer - Core types, ports and the CRAG engine

pub mod crag;
pub mod embedding;
pub mod error;
pub mod llm;
pub mod passage;

pub use error::DomainError;
pub use llm::{
    FinishReason, LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole,
    Usage,
};
