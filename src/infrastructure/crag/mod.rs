//! LLM-backed CRAG components

mod llm_generator;
mod llm_grader;
mod llm_rewriter;

pub use llm_generator::LlmAnswerGenerator;
pub use llm_grader::{parse_verdict, LlmRelevanceGrader};
pub use llm_rewriter::LlmQueryRewriter;
