//! Corpus aggregation - fetch every URL, keep what worked, join in order.

use futures::stream::{self, StreamExt};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::traits::fetcher::PageFetcher;
use crate::types::page::{Corpus, PageResult};

/// Fetches pages concurrently and joins their text into a [`Corpus`].
///
/// Fetches are independent; a failing URL is logged and dropped.
/// Results are joined in input order once every fetch has resolved.
/// The timeout is enforced here as well, whatever the fetcher does with it.
pub struct CorpusAggregator<F> {
    fetcher: F,
    timeout: Duration,
    concurrency: usize,
}

impl<F: PageFetcher> CorpusAggregator<F> {
    /// Create an aggregator with a 10s timeout and 8 concurrent fetches.
    pub fn new(fetcher: F) -> Self {
        Self {
            fetcher,
            timeout: Duration::from_secs(10),
            concurrency: 8,
        }
    }

    /// Set the per-page timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set how many fetches may be in flight at once (minimum 1).
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Get the underlying fetcher.
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetch every URL, one result per input, in input order.
    pub async fn fetch_all(&self, urls: &[String]) -> Vec<PageResult> {
        stream::iter(urls)
            .map(|url| self.fetch_one(url))
            .buffered(self.concurrency)
            .collect()
            .await
    }

    /// Fetch every URL and join the successful texts.
    ///
    /// Zero successes gives an empty corpus, which is still a valid input.
    pub async fn aggregate(&self, urls: &[String]) -> Corpus {
        info!(
            url_count = urls.len(),
            fetcher = self.fetcher.name(),
            "Aggregating corpus"
        );

        let corpus = Corpus::from_results(self.fetch_all(urls).await);

        info!(
            pages = corpus.page_count(),
            failed = corpus.failed_urls().len(),
            corpus_len = corpus.len(),
            "Corpus aggregated"
        );
        corpus
    }

    async fn fetch_one(&self, url: &str) -> PageResult {
        let fetched =
            match tokio::time::timeout(self.timeout, self.fetcher.fetch_page_text(url, self.timeout))
                .await
            {
                Ok(result) => result,
                Err(_) => Err(FetchError::Timeout {
                    url: url.to_string(),
                }),
            };

        match fetched {
            Ok(text) => {
                debug!(url = %url, text_len = text.len(), "Fetched page");
                PageResult::success(url, text)
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Failed to fetch page");
                PageResult::failure(url, e)
            }
        }
    }
}
