//! Typed errors for the profile extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.
//!
//! Only [`ExtractionFailure`] ever reaches the caller of a run. Everything
//! else is recovered inside the run and drives the retry state machine.

use thiserror::Error;

/// Errors from fetching a single page.
///
/// Swallowed by the corpus aggregator; a failing URL never aborts a run.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed or uses an unsupported scheme
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Server answered with a non-success status
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Request did not complete within the timeout
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

/// Errors from the completion-generating collaborator.
///
/// Counted against the attempt budget like a parse failure.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network error (connection failed, reset)
    #[error("network error: {0}")]
    Network(String),

    /// API error (non-2xx response, rate limit, invalid request)
    #[error("API error: {0}")]
    Api(String),

    /// Call did not complete within the timeout
    #[error("completion timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Provider answered without any content
    #[error("empty response from provider")]
    EmptyResponse,

    /// Configuration error (missing API key, invalid settings)
    #[error("configuration error: {0}")]
    Config(String),
}

/// Why a raw completion could not be turned into a record.
#[derive(Debug, Error)]
pub enum ParseError {
    /// No `{` anywhere in the response
    #[error("no JSON object found in response")]
    NoJsonFound,

    /// The extracted span is not valid JSON
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// Valid JSON, but not an object
    #[error("expected a JSON object, got {kind}")]
    NotAnObject { kind: &'static str },
}

/// The failure of a single attempt.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error(transparent)]
    Completion(#[from] CompletionError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl AttemptError {
    /// Whether this attempt failed before any text came back.
    pub fn is_completion(&self) -> bool {
        matches!(self, Self::Completion(_))
    }
}

/// Terminal failure of a profile extraction run.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    /// Every allowed attempt failed
    #[error("no valid profile after {attempts_used} attempt(s): {last_error}")]
    BudgetExhausted {
        /// Raw text of the last response received, if any was received
        last_raw_response: Option<String>,
        /// Error from the final attempt
        last_error: AttemptError,
        attempts_used: usize,
    },

    /// The caller cancelled the run or its deadline elapsed
    #[error("extraction cancelled after {attempts_used} attempt(s)")]
    Cancelled { attempts_used: usize },

    /// Run parameters rejected before any work started
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ExtractionFailure {
    /// Number of generation attempts made before the run ended.
    pub fn attempts_used(&self) -> usize {
        match self {
            Self::BudgetExhausted { attempts_used, .. } | Self::Cancelled { attempts_used } => {
                *attempts_used
            }
            Self::InvalidConfig { .. } => 0,
        }
    }

    /// Whether the run ended through cancellation.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unusable value
    #[error("invalid value for {key}: {value}")]
    InvalidEnv { key: String, value: String },

    /// A setting is out of range
    #[error("invalid setting: {0}")]
    Invalid(String),
}

impl From<ConfigError> for ExtractionFailure {
    fn from(err: ConfigError) -> Self {
        Self::InvalidConfig {
            reason: err.to_string(),
        }
    }
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for completion operations.
pub type CompletionResult<T> = std::result::Result<T, CompletionError>;

/// Result type alias for a whole extraction run.
pub type Result<T> = std::result::Result<T, ExtractionFailure>;
