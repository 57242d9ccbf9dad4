//! PageFetcher trait for turning a URL into page text.
//!
//! Download and HTML-to-text conversion live behind this trait so the
//! aggregator never knows which transport produced the text.
//!
//! # Usage
//!
//! ```rust,ignore
//! use profile_extraction::{HttpFetcher, PageFetcher};
//!
//! let fetcher = HttpFetcher::new();
//! let text = fetcher
//!     .fetch_page_text("https://example.com/about", Duration::from_secs(10))
//!     .await?;
//! ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::FetchResult;

/// Fetch-text capability.
///
/// Implementations:
/// - `HttpFetcher` - reqwest GET plus HTML-to-text
/// - `MockFetcher` - canned pages for tests
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch a URL and return its extracted text.
    ///
    /// Must give up after `timeout`. Retrying is the implementation's own
    /// business; the aggregator calls each URL exactly once.
    async fn fetch_page_text(&self, url: &str, timeout: Duration) -> FetchResult<String>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Arc<T> {
    async fn fetch_page_text(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        (**self).fetch_page_text(url, timeout).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
