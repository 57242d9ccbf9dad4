//! Retry/correction engine - turns free-form completions into a profile.
//!
//! One run is a bounded sequence of attempts. Each attempt generates,
//! extracts a JSON candidate and parses it. A failed attempt feeds the next
//! one a correction request carrying the rejected output, until a record is
//! accepted or the attempt budget is spent.
//!
//! ```text
//! Generating -> Extracting -> Parsing -> Accepted
//!     ^                                  |
//!     |                                  v
//!     +--------- Correcting <------- (failure) -> Exhausted
//! ```
//!
//! Attempts never overlap: attempt k+1's request embeds attempt k's output.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::{
    AttemptError, CompletionError, CompletionResult, ExtractionFailure, ParseError, Result,
};
use crate::pipeline::json::{GreedyBraceExtractor, JsonExtractor};
use crate::pipeline::prompts::{build_correction_request, build_initial_request};
use crate::traits::completion::CompletionClient;
use crate::types::message::RequestMessage;
use crate::types::page::Corpus;
use crate::types::profile::ProfileRecord;

/// Named engine states, for logging and inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Generating,
    Extracting,
    Parsing,
    Correcting,
    Accepted,
    Exhausted,
    Cancelled,
}

/// Per-run bookkeeping. Owned by a single run and dropped with it.
#[derive(Debug, Default)]
pub struct AttemptState {
    attempt_index: usize,
    last_raw_response: Option<String>,
    last_error: Option<AttemptError>,
}

impl AttemptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zero-based index of the current attempt.
    pub fn attempt_index(&self) -> usize {
        self.attempt_index
    }

    /// Most recent raw response received, across all attempts so far.
    pub fn last_raw_response(&self) -> Option<&str> {
        self.last_raw_response.as_deref()
    }

    pub fn last_error(&self) -> Option<&AttemptError> {
        self.last_error.as_ref()
    }

    /// Record the failure of the current attempt.
    ///
    /// A completion failure brings no new text, so the previous raw
    /// response is kept for the next correction request.
    pub fn record_failure(&mut self, raw_response: Option<String>, error: AttemptError) {
        if raw_response.is_some() {
            self.last_raw_response = raw_response;
        }
        self.last_error = Some(error);
    }

    /// Whether the current attempt is the last one the budget allows.
    pub fn is_final(&self, max_attempts: usize) -> bool {
        self.attempt_index + 1 >= max_attempts
    }

    fn advance(&mut self) {
        self.attempt_index += 1;
    }

    fn into_exhausted(self) -> ExtractionFailure {
        let attempts_used = self.attempt_index + 1;
        ExtractionFailure::BudgetExhausted {
            last_raw_response: self.last_raw_response,
            last_error: self
                .last_error
                .unwrap_or(AttemptError::Parse(ParseError::NoJsonFound)),
            attempts_used,
        }
    }
}

/// A record accepted by the engine.
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    /// The parsed profile
    pub record: ProfileRecord,

    /// Generation calls made, including the accepted one
    pub attempts_used: usize,

    /// Raw completion the record was parsed from
    pub raw_response: String,
}

/// State of the machine between steps. Each variant carries what the next
/// step needs.
enum Step {
    Generating,
    Extracting { raw: String },
    Parsing { raw: String, candidate: String },
    Correcting { raw: Option<String>, error: AttemptError },
}

impl Step {
    fn state(&self) -> EngineState {
        match self {
            Self::Generating => EngineState::Generating,
            Self::Extracting { .. } => EngineState::Extracting,
            Self::Parsing { .. } => EngineState::Parsing,
            Self::Correcting { .. } => EngineState::Correcting,
        }
    }
}

/// Bounded generate → extract → parse → correct loop.
///
/// # Example
///
/// ```rust,ignore
/// let engine = RetryCorrectionEngine::new(OpenAI::from_env()?)
///     .with_model("gpt-4o")
///     .with_max_attempts(3);
///
/// let outcome = engine.run(&corpus, &CancellationToken::new()).await?;
/// println!("{:?}", outcome.record.name());
/// ```
pub struct RetryCorrectionEngine<C, X = GreedyBraceExtractor> {
    client: C,
    extractor: X,
    model: String,
    max_attempts: usize,
    timeout: Duration,
}

impl<C: CompletionClient> RetryCorrectionEngine<C> {
    /// Create an engine with the greedy brace extractor, model "gpt-4o",
    /// 3 attempts and a 120s completion timeout.
    pub fn new(client: C) -> Self {
        Self {
            client,
            extractor: GreedyBraceExtractor,
            model: "gpt-4o".to_string(),
            max_attempts: 3,
            timeout: Duration::from_secs(120),
        }
    }
}

impl<C: CompletionClient, X: JsonExtractor> RetryCorrectionEngine<C, X> {
    /// Swap the JSON extractor.
    pub fn with_extractor<Y: JsonExtractor>(self, extractor: Y) -> RetryCorrectionEngine<C, Y> {
        RetryCorrectionEngine {
            client: self.client,
            extractor,
            model: self.model,
            max_attempts: self.max_attempts,
            timeout: self.timeout,
        }
    }

    /// Set the model used for every attempt.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the total attempt budget, first attempt included.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the per-call completion timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Run the machine over `corpus` until a record is accepted, the budget
    /// is spent, or `cancel` fires.
    pub async fn run(&self, corpus: &Corpus, cancel: &CancellationToken) -> Result<ExtractionOutcome> {
        if self.max_attempts == 0 {
            return Err(ExtractionFailure::InvalidConfig {
                reason: "max_attempts must be at least 1".into(),
            });
        }

        let run_id = Uuid::now_v7();
        let span = info_span!(
            "profile_run",
            %run_id,
            model = %self.model,
            max_attempts = self.max_attempts,
            provider = self.client.name(),
        );

        self.run_machine(corpus, cancel).instrument(span).await
    }

    async fn run_machine(
        &self,
        corpus: &Corpus,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        info!(corpus_len = corpus.len(), "Profile extraction run starting");

        let mut attempt = AttemptState::new();
        let mut step = Step::Generating;

        loop {
            let from = step.state();
            step = match step {
                Step::Generating => {
                    if cancel.is_cancelled() {
                        return Err(self.cancelled(&attempt, 0));
                    }

                    let messages = self.request_for(corpus, &attempt);
                    debug!(
                        attempt = attempt.attempt_index(),
                        correction = attempt.last_raw_response().is_some(),
                        "Generating"
                    );

                    let generated = tokio::select! {
                        biased;
                        _ = cancel.cancelled() => return Err(self.cancelled(&attempt, 1)),
                        result = self.generate(&messages) => result,
                    };

                    match generated {
                        Ok(raw) => Step::Extracting { raw },
                        Err(e) => {
                            warn!(attempt = attempt.attempt_index(), error = %e, "Completion call failed");
                            Step::Correcting {
                                raw: None,
                                error: e.into(),
                            }
                        }
                    }
                }

                Step::Extracting { raw } => {
                    let candidate = self.extractor.extract(&raw).map(str::to_owned);
                    match candidate {
                        Some(candidate) => Step::Parsing { raw, candidate },
                        None => Step::Correcting {
                            raw: Some(raw),
                            error: ParseError::NoJsonFound.into(),
                        },
                    }
                }

                Step::Parsing { raw, candidate } => match ProfileRecord::parse(&candidate) {
                    Ok(record) => {
                        let attempts_used = attempt.attempt_index() + 1;
                        info!(
                            attempts_used,
                            fields = record.len(),
                            state = ?EngineState::Accepted,
                            "Profile accepted"
                        );
                        return Ok(ExtractionOutcome {
                            record,
                            attempts_used,
                            raw_response: raw,
                        });
                    }
                    Err(e) => {
                        warn!(attempt = attempt.attempt_index(), error = %e, "Response did not parse");
                        Step::Correcting {
                            raw: Some(raw),
                            error: e.into(),
                        }
                    }
                },

                Step::Correcting { raw, error } => {
                    attempt.record_failure(raw, error);
                    if attempt.is_final(self.max_attempts) {
                        warn!(
                            attempts_used = attempt.attempt_index() + 1,
                            state = ?EngineState::Exhausted,
                            "Attempt budget exhausted"
                        );
                        return Err(attempt.into_exhausted());
                    }
                    attempt.advance();
                    Step::Generating
                }
            };
            debug!(from = ?from, to = ?step.state(), "Engine transition");
        }
    }

    /// Initial request until some text has come back, then corrections.
    fn request_for(&self, corpus: &Corpus, attempt: &AttemptState) -> Vec<RequestMessage> {
        match attempt.last_raw_response() {
            Some(previous) => build_correction_request(corpus, previous),
            None => build_initial_request(corpus),
        }
    }

    async fn generate(&self, messages: &[RequestMessage]) -> CompletionResult<String> {
        match tokio::time::timeout(
            self.timeout,
            self.client.generate(messages, &self.model, self.timeout),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout {
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    /// `in_flight` counts a generation call that was started but abandoned.
    fn cancelled(&self, attempt: &AttemptState, in_flight: usize) -> ExtractionFailure {
        let attempts_used = attempt.attempt_index() + in_flight;
        info!(attempts_used, state = ?EngineState::Cancelled, "Profile extraction cancelled");
        ExtractionFailure::Cancelled { attempts_used }
    }
}
