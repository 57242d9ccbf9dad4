//! Profile pipeline - the core of the library.
//!
//! The pipeline orchestrates:
//! - Corpus aggregation (concurrent fetch, order-preserving join)
//! - Prompt construction for first and correction attempts
//! - JSON candidate extraction from free-form output
//! - The bounded retry/correction engine

pub mod aggregate;
pub mod engine;
pub mod json;
pub mod profiler;
pub mod prompts;

pub use aggregate::CorpusAggregator;
pub use engine::{AttemptState, EngineState, ExtractionOutcome, RetryCorrectionEngine};
pub use json::{extract_json_object, GreedyBraceExtractor, JsonExtractor};
pub use profiler::{extract_profile, ProfileReport, Profiler};
pub use prompts::{
    build_correction_request, build_initial_request, format_correction_prompt,
    format_profile_prompt, CORRECTION_PROMPT, PROFILE_PROMPT, PROFILE_SHAPE, SYSTEM_PROMPT,
};
