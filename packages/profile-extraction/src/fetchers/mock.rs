//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the PageFetcher trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;

#[derive(Debug, Clone)]
enum MockPage {
    Text(String),
    Status(u16),
    Timeout,
}

/// Mock fetcher for testing.
///
/// Unknown URLs fail with HTTP 404. Pages can be given an artificial delay
/// to exercise concurrency and cancellation.
///
/// # Example
///
/// ```rust
/// use profile_extraction::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new()
///     .with_page("https://example.com/a", "Alpha")
///     .with_status("https://example.com/b", 500);
/// ```
#[derive(Default, Clone)]
pub struct MockFetcher {
    /// Canned outcomes indexed by URL
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    /// Per-URL artificial latency
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// URLs requested, in call order
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `text` for `url`.
    pub fn add_page(&self, url: impl Into<String>, text: impl Into<String>) {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Text(text.into()));
    }

    /// Builder form of [`add_page`](Self::add_page).
    pub fn with_page(self, url: impl Into<String>, text: impl Into<String>) -> Self {
        self.add_page(url, text);
        self
    }

    /// Fail `url` with an HTTP status.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Status(status));
        self
    }

    /// Fail `url` with a timeout.
    pub fn with_timeout(self, url: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(url.into(), MockPage::Timeout);
        self
    }

    /// Delay the response for `url`.
    pub fn with_delay(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// Get the number of fetch calls made.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Get the URLs fetched, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_page_text(&self, url: &str, _timeout: Duration) -> FetchResult<String> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = self.delays.read().unwrap().get(url).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let page = self.pages.read().unwrap().get(url).cloned();
        match page {
            Some(MockPage::Text(text)) => Ok(text),
            Some(MockPage::Status(status)) => Err(FetchError::Status {
                url: url.to_string(),
                status,
            }),
            Some(MockPage::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
