//! The Profiler - main entry point for the library.
//!
//! Composes the two phases of a run: aggregate a corpus from URLs, then hand
//! it to the retry/correction engine. Aggregation always finishes before the
//! first generation call.

use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::{ExtractionFailure, Result};
use crate::pipeline::aggregate::CorpusAggregator;
use crate::pipeline::engine::{ExtractionOutcome, RetryCorrectionEngine};
use crate::pipeline::json::{GreedyBraceExtractor, JsonExtractor};
use crate::traits::{completion::CompletionClient, fetcher::PageFetcher};
use crate::types::config::ProfileConfig;
use crate::types::page::Corpus;
use crate::types::profile::ProfileRecord;

/// A finished run: the record plus what went into it.
#[derive(Debug, Clone)]
pub struct ProfileReport {
    pub outcome: ExtractionOutcome,
    pub corpus: Corpus,
}

impl ProfileReport {
    pub fn record(&self) -> &ProfileRecord {
        &self.outcome.record
    }

    pub fn into_record(self) -> ProfileRecord {
        self.outcome.record
    }
}

/// Fetches pages about a person and extracts a profile from them.
///
/// # Example
///
/// ```rust,ignore
/// let profiler = Profiler::new(HttpFetcher::new(), OpenAI::from_env()?, ProfileConfig::from_env()?);
///
/// let record = profiler.extract_profile(&urls).await?;
/// println!("{}", serde_json::to_string_pretty(&record)?);
/// ```
pub struct Profiler<F, C, X = GreedyBraceExtractor> {
    aggregator: CorpusAggregator<F>,
    engine: RetryCorrectionEngine<C, X>,
    config: ProfileConfig,
}

impl<F: PageFetcher, C: CompletionClient> Profiler<F, C> {
    /// Create a profiler. The config is copied into the aggregator and engine.
    pub fn new(fetcher: F, completion: C, config: ProfileConfig) -> Self {
        let aggregator = CorpusAggregator::new(fetcher)
            .with_timeout(config.fetch_timeout())
            .with_concurrency(config.fetch_concurrency);
        let engine = RetryCorrectionEngine::new(completion)
            .with_model(config.model.clone())
            .with_max_attempts(config.max_attempts)
            .with_timeout(config.completion_timeout());

        Self {
            aggregator,
            engine,
            config,
        }
    }
}

impl<F: PageFetcher, C: CompletionClient, X: JsonExtractor> Profiler<F, C, X> {
    /// Use a different JSON extractor.
    pub fn with_extractor<Y: JsonExtractor>(self, extractor: Y) -> Profiler<F, C, Y> {
        Profiler {
            aggregator: self.aggregator,
            engine: self.engine.with_extractor(extractor),
            config: self.config,
        }
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    pub fn aggregator(&self) -> &CorpusAggregator<F> {
        &self.aggregator
    }

    pub fn engine(&self) -> &RetryCorrectionEngine<C, X> {
        &self.engine
    }

    /// Fetch `urls` and extract a profile.
    pub async fn extract_profile(&self, urls: &[String]) -> Result<ProfileRecord> {
        self.extract_profile_with_cancel(urls, CancellationToken::new())
            .await
            .map(ProfileReport::into_record)
    }

    /// Extract with cancellation support.
    ///
    /// Cancelling during aggregation ends the run with zero attempts used.
    pub async fn extract_profile_with_cancel(
        &self,
        urls: &[String],
        cancel: CancellationToken,
    ) -> Result<ProfileReport> {
        self.config.validate()?;

        let corpus = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("Cancelled while aggregating corpus");
                return Err(ExtractionFailure::Cancelled { attempts_used: 0 });
            }
            corpus = self.aggregator.aggregate(urls) => corpus,
        };

        let outcome = self.engine.run(&corpus, &cancel).await?;
        Ok(ProfileReport { outcome, corpus })
    }

    /// Extract with an overall deadline covering both phases.
    pub async fn extract_profile_with_deadline(
        &self,
        urls: &[String],
        deadline: Duration,
    ) -> Result<ProfileReport> {
        let cancel = CancellationToken::new();
        let guard = cancel.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            guard.cancel();
        });

        let result = self.extract_profile_with_cancel(urls, cancel).await;
        timer.abort();
        result
    }

    /// Run only the engine over an already-built corpus.
    pub async fn extract_from_corpus(
        &self,
        corpus: &Corpus,
        cancel: &CancellationToken,
    ) -> Result<ExtractionOutcome> {
        self.config.validate()?;
        self.engine.run(corpus, cancel).await
    }
}

/// One-shot helper: default config with the given model and attempt budget.
pub async fn extract_profile<F, C>(
    fetcher: F,
    completion: C,
    urls: &[String],
    max_attempts: usize,
    model: &str,
) -> Result<ProfileRecord>
where
    F: PageFetcher,
    C: CompletionClient,
{
    let config = ProfileConfig::default()
        .with_model(model)
        .with_max_attempts(max_attempts);
    Profiler::new(fetcher, completion, config)
        .extract_profile(urls)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetchers::MockFetcher;
    use crate::testing::MockCompletion;

    const VALID: &str = r#"{"name": "Jane Roe", "location": "Lisbon"}"#;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_extract_profile_end_to_end() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.example", "Jane Roe lives in Lisbon.")
            .with_status("https://b.example", 404);
        let mock = MockCompletion::new().respond(VALID);
        let profiler = Profiler::new(fetcher, mock.clone(), ProfileConfig::default());

        let report = profiler
            .extract_profile_with_cancel(
                &urls(&["https://a.example", "https://b.example"]),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(report.record().location(), Some("Lisbon"));
        assert_eq!(report.corpus.page_count(), 1);
        assert_eq!(report.corpus.failed_urls().len(), 1);
        assert_eq!(mock.calls()[0].model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_config_flows_into_engine() {
        let mock = MockCompletion::new().respond_repeatedly("no json", 2);
        let config = ProfileConfig::default()
            .with_model("small-model")
            .with_max_attempts(2)
            .with_completion_timeout(Duration::from_secs(30));
        let profiler = Profiler::new(MockFetcher::new(), mock.clone(), config);

        let err = profiler.extract_profile(&[]).await.unwrap_err();

        assert_eq!(err.attempts_used(), 2);
        let calls = mock.calls();
        assert!(calls.iter().all(|c| c.model == "small-model"));
        assert!(calls.iter().all(|c| c.timeout == Duration::from_secs(30)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeouts_honored() {
        let fetcher = MockFetcher::new()
            .with_page("https://a.example", "Jane Roe lives in Lisbon.")
            .with_delay("https://a.example", Duration::from_millis(200));
        let mock = MockCompletion::new()
            .respond(VALID)
            .with_delay(Duration::from_millis(1200));
        let config = ProfileConfig::default()
            .with_max_attempts(1)
            .with_fetch_timeout(Duration::from_millis(500))
            .with_completion_timeout(Duration::from_millis(1500));
        let profiler = Profiler::new(fetcher, mock.clone(), config);

        let report = profiler
            .extract_profile_with_cancel(&urls(&["https://a.example"]), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.corpus.page_count(), 1);
        assert_eq!(report.record().name(), Some("Jane Roe"));
        assert_eq!(mock.calls()[0].timeout, Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected_before_fetching() {
        let fetcher = MockFetcher::new().with_page("https://a.example", "A");
        let profiler = Profiler::new(
            fetcher.clone(),
            MockCompletion::new(),
            ProfileConfig::default().with_max_attempts(0),
        );

        let err = profiler
            .extract_profile(&urls(&["https://a.example"]))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionFailure::InvalidConfig { .. }));
        assert_eq!(fetcher.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_aggregation() {
        let fetcher = MockFetcher::new()
            .with_page("https://slow.example", "Slow")
            .with_delay("https://slow.example", Duration::from_secs(5));
        let mock = MockCompletion::new().respond(VALID);
        let profiler = Profiler::new(fetcher, mock.clone(), ProfileConfig::default());

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.cancel();
        });

        let err = profiler
            .extract_profile_with_cancel(&urls(&["https://slow.example"]), cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionFailure::Cancelled { attempts_used: 0 }));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_cancels_generation() {
        let mock = MockCompletion::new()
            .respond(VALID)
            .with_delay(Duration::from_secs(60));
        let profiler = Profiler::new(MockFetcher::new(), mock, ProfileConfig::default());

        let err = profiler
            .extract_profile_with_deadline(&[], Duration::from_secs(5))
            .await
            .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(err.attempts_used(), 1);
    }

    #[tokio::test]
    async fn test_one_shot_helper() {
        let fetcher = MockFetcher::new().with_page("https://a.example", "Jane");
        let mock = MockCompletion::new().respond("nope").respond(VALID);

        let record = extract_profile(fetcher, mock.clone(), &urls(&["https://a.example"]), 2, "m")
            .await
            .unwrap();

        assert_eq!(record.name(), Some("Jane Roe"));
        assert_eq!(mock.call_count(), 2);
    }
}
