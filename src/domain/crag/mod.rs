//! CRAG (Corrective RAG) domain
//!
//! Retrieval is graded passage by passage; when nothing relevant comes back the
//! query is rewritten and retrieval runs again, up to a fixed retry budget.

mod citation;
mod config;
mod engine;
mod generator;
mod grader;
pub mod prompts;
mod rewriter;
mod routing;
mod state;

pub use citation::{extract_citations, unsupported_citations};
pub use config::{CragConfig, CragTimeouts};
pub use engine::{
    CragEngine, METRIC_GENERATION_FALLBACKS, METRIC_GRADING_FAILURES, METRIC_RETRIEVAL_FAILURES,
    METRIC_REWRITES, METRIC_REWRITE_FALLBACKS, METRIC_RUNS, METRIC_RUN_DURATION,
};
pub use generator::{build_context, AnswerGenerator};
pub use grader::RelevanceGrader;
pub use rewriter::QueryRewriter;
pub use routing::{route, ExhaustionPolicy, RouteDecision};
pub use state::{CragOutcome, RequestState, Terminal};

#[cfg(test)]
pub use generator::MockAnswerGenerator;
#[cfg(test)]
pub use grader::MockRelevanceGrader;
#[cfg(test)]
pub use rewriter::MockQueryRewriter;
