//! LLM provider implementations

mod factory;
mod openai;

pub use factory::{LlmProviderConfig, LlmProviderFactory, LlmProviderKind};
pub use openai::OpenAiProvider;
