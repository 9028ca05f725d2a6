//! Corrective retrieval loop: retrieve, grade, route, then generate, rewrite or refuse

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use metrics::{counter, histogram};
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use super::citation::unsupported_citations;
use super::config::CragConfig;
use super::generator::AnswerGenerator;
use super::grader::RelevanceGrader;
use super::prompts::{GENERATION_FALLBACK_ANSWER, NO_ANSWER_MESSAGE};
use super::rewriter::QueryRewriter;
use super::routing::RouteDecision;
use super::state::{CragOutcome, RequestState, Terminal};
use crate::domain::passage::{PassageStore, SearchParams};
use crate::domain::DomainError;

pub const METRIC_RUNS: &str = "crag_runs_total";
pub const METRIC_RUN_DURATION: &str = "crag_run_duration_seconds";
pub const METRIC_REWRITES: &str = "crag_rewrites_total";
pub const METRIC_GRADING_FAILURES: &str = "crag_grading_failures_total";
pub const METRIC_GENERATION_FALLBACKS: &str = "crag_generation_fallbacks_total";
pub const METRIC_REWRITE_FALLBACKS: &str = "crag_rewrite_fallbacks_total";
pub const METRIC_RETRIEVAL_FAILURES: &str = "crag_retrieval_failures_total";

async fn with_timeout<T, F>(
    operation: &str,
    limit: Option<Duration>,
    future: F,
) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| DomainError::timeout(operation, limit))?,
        None => future.await,
    }
}

/// Orchestrates one question through the corrective retrieval loop.
///
/// Grader, generator and rewriter failures are absorbed here (fail-open, apology
/// answer, original query). Retrieval failures end the run with an error.
pub struct CragEngine {
    store: Arc<dyn PassageStore>,
    grader: Arc<dyn RelevanceGrader>,
    generator: Arc<dyn AnswerGenerator>,
    rewriter: Arc<dyn QueryRewriter>,
    config: CragConfig,
}

impl std::fmt::Debug for CragEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CragEngine")
            .field("store", &self.store.store_type())
            .field("config", &self.config)
            .finish()
    }
}

impl CragEngine {
    pub fn new(
        store: Arc<dyn PassageStore>,
        grader: Arc<dyn RelevanceGrader>,
        generator: Arc<dyn AnswerGenerator>,
        rewriter: Arc<dyn QueryRewriter>,
        config: CragConfig,
    ) -> Result<Self, DomainError> {
        config.validate()?;

        Ok(Self {
            store,
            grader,
            generator,
            rewriter,
            config,
        })
    }

    pub fn config(&self) -> &CragConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn PassageStore> {
        &self.store
    }

    /// Answer a question.
    ///
    /// Performs at most `max_retries + 1` retrieval cycles. Errors only for an empty
    /// question or a failed retrieval.
    pub async fn run(&self, question: &str) -> Result<CragOutcome, DomainError> {
        if question.trim().is_empty() {
            return Err(DomainError::validation("Question cannot be empty"));
        }

        let span = tracing::info_span!("crag_run", run_id = %Uuid::new_v4());
        self.run_loop(question).instrument(span).await
    }

    async fn run_loop(&self, question: &str) -> Result<CragOutcome, DomainError> {
        let started = Instant::now();
        let mut state = RequestState::new(question);

        info!(
            max_retries = self.config.max_retries,
            top_k = self.config.top_k,
            "Starting CRAG run"
        );

        let outcome = loop {
            if let Err(e) = self.retrieve(&mut state).await {
                counter!(METRIC_RETRIEVAL_FAILURES).increment(1);
                error!(retry_count = state.retry_count, "Retrieval failed: {}", e);
                return Err(e);
            }

            self.grade(&mut state).await;

            let decision = self.config.exhaustion_policy.route(
                state.relevant.len(),
                state.retry_count,
                self.config.max_retries,
            );

            info!(
                relevant = state.relevant.len(),
                retrieved = state.retrieved.len(),
                retry_count = state.retry_count,
                decision = %decision,
                "Routing decision"
            );

            match decision {
                RouteDecision::Generate => {
                    let forced = state.relevant.is_empty();
                    if forced {
                        warn!(
                            retry_count = state.retry_count,
                            "No relevant passages after last retry, generating anyway"
                        );
                    }
                    self.generate(&mut state).await;
                    break state.into_outcome(Terminal::Generate, forced);
                }
                RouteDecision::Rewrite => {
                    self.rewrite(&mut state).await;
                }
                RouteDecision::NoAnswer => {
                    warn!(
                        retry_count = state.retry_count,
                        "No relevant passages found, returning no-answer"
                    );
                    state.answer = NO_ANSWER_MESSAGE.to_string();
                    break state.into_outcome(Terminal::NoAnswer, false);
                }
            }
        };

        let terminal = match outcome.terminal {
            Terminal::Generate => "generate",
            Terminal::NoAnswer => "no_answer",
        };
        counter!(METRIC_RUNS, "terminal" => terminal).increment(1);
        histogram!(METRIC_RUN_DURATION).record(started.elapsed().as_secs_f64());

        info!(
            terminal,
            forced = outcome.forced,
            retry_count = outcome.retry_count,
            relevant = outcome.relevant_passages.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "CRAG run complete"
        );

        Ok(outcome)
    }

    async fn retrieve(&self, state: &mut RequestState) -> Result<(), DomainError> {
        let params = SearchParams::new(state.current_query.clone()).with_top_k(self.config.top_k);

        let passages = with_timeout(
            "retrieval",
            self.config.timeouts.retrieval(),
            self.store.search(params),
        )
        .await?;

        debug!(
            store = self.store.store_type(),
            count = passages.len(),
            "Retrieved passages"
        );

        state.set_retrieved(passages);
        Ok(())
    }

    /// Grade every retrieved passage, keeping retrieval order in the relevant set
    async fn grade(&self, state: &mut RequestState) {
        if state.retrieved.is_empty() {
            state.set_relevant(Vec::new());
            return;
        }

        let query = state.current_query.as_str();
        let limit = self.config.timeouts.grading();

        let verdicts: Vec<bool> = stream::iter(state.retrieved.iter())
            .map(|passage| async move {
                if passage.is_blank() {
                    debug!(passage_id = %passage.id, "Skipping blank passage");
                    return false;
                }

                match with_timeout("grading", limit, self.grader.grade(query, passage)).await {
                    Ok(relevant) => relevant,
                    Err(e) => {
                        counter!(METRIC_GRADING_FAILURES).increment(1);
                        warn!(
                            passage_id = %passage.id,
                            "Grading failed, keeping passage: {}", e
                        );
                        true
                    }
                }
            })
            .boxed()
            .buffered(self.config.grading_concurrency)
            .collect()
            .await;

        let relevant = state
            .retrieved
            .iter()
            .zip(verdicts)
            .filter(|(_, relevant)| *relevant)
            .map(|(passage, _)| passage.clone())
            .collect();

        state.set_relevant(relevant);
    }

    async fn generate(&self, state: &mut RequestState) {
        let result = with_timeout(
            "generation",
            self.config.timeouts.generation(),
            self.generator
                .generate(&state.current_query, &state.relevant),
        )
        .await;

        let answer = match result {
            Ok(answer) if !answer.trim().is_empty() => answer,
            Ok(_) => {
                counter!(METRIC_GENERATION_FALLBACKS).increment(1);
                warn!("Generator returned an empty answer, using fallback");
                GENERATION_FALLBACK_ANSWER.to_string()
            }
            Err(e) => {
                counter!(METRIC_GENERATION_FALLBACKS).increment(1);
                error!("Generation failed, using fallback: {}", e);
                GENERATION_FALLBACK_ANSWER.to_string()
            }
        };

        let unsupported = unsupported_citations(&answer, &state.relevant);
        if !unsupported.is_empty() {
            warn!(
                articles = ?unsupported,
                "Answer cites articles absent from the supplied passages"
            );
        }

        state.answer = answer;
    }

    async fn rewrite(&self, state: &mut RequestState) {
        let original = state.current_query.clone();

        let result = with_timeout(
            "rewrite",
            self.config.timeouts.rewrite(),
            self.rewriter.rewrite(&original),
        )
        .await;

        let rewritten = match result {
            Ok(query) if !query.trim().is_empty() => query.trim().to_string(),
            Ok(_) => {
                counter!(METRIC_REWRITE_FALLBACKS).increment(1);
                warn!("Rewriter returned an empty query, retrying with the original");
                original.clone()
            }
            Err(e) => {
                counter!(METRIC_REWRITE_FALLBACKS).increment(1);
                warn!("Rewrite failed, retrying with the original: {}", e);
                original.clone()
            }
        };

        info!(
            attempt = state.retry_count + 1,
            from = %original,
            to = %rewritten,
            "Rewrote query"
        );

        counter!(METRIC_REWRITES).increment(1);
        state.apply_rewrite(rewritten);
    }
}
