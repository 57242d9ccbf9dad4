//! Person Profile Extraction Library
//!
//! Fetches a set of web pages about one person, joins their text into a
//! corpus and asks a language model for a JSON profile. Responses that do
//! not hold a valid JSON object are sent back to the model with a
//! correction request, up to a fixed attempt budget.
//!
//! # Usage
//!
//! ```rust,ignore
//! use profile_extraction::{HttpFetcher, OpenAI, ProfileConfig, Profiler};
//!
//! let profiler = Profiler::new(HttpFetcher::new(), OpenAI::from_env()?, ProfileConfig::default());
//! let urls = vec!["https://example.com/about".to_string()];
//!
//! let record = profiler.extract_profile(&urls).await?;
//! println!("{:?}", record.name());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator boundaries (PageFetcher, CompletionClient)
//! - [`types`] - Pages, corpus, request messages, profile records, config
//! - [`pipeline`] - Aggregation, prompts, JSON extraction, retry engine
//! - [`fetchers`] - PageFetcher implementations (HttpFetcher, MockFetcher)
//! - [`ai`] - CompletionClient implementations (OpenAI)
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    AttemptError, CompletionError, ConfigError, ExtractionFailure, FetchError, ParseError,
};
pub use traits::{completion::CompletionClient, fetcher::PageFetcher};
pub use types::{
    config::ProfileConfig,
    message::{RequestMessage, Role},
    page::{Corpus, PageResult},
    profile::{ProfileRecord, PROFILE_FIELDS},
};

// Re-export pipeline components
pub use pipeline::{
    extract_json_object, extract_profile, CorpusAggregator, EngineState, ExtractionOutcome,
    GreedyBraceExtractor, JsonExtractor, ProfileReport, Profiler, RetryCorrectionEngine,
};

pub use ai::OpenAI;
pub use fetchers::{HttpFetcher, MockFetcher};
pub use testing::MockCompletion;

// Cancellation handle accepted by the run methods
pub use tokio_util::sync::CancellationToken;
