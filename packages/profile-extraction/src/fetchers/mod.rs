//! PageFetcher implementations.
//!
//! - `HttpFetcher` - HTTP GET with HTML-to-text reduction
//! - `MockFetcher` - For testing

mod http;
mod mock;

pub use http::{html_to_text, HttpFetcher};
pub use mock::MockFetcher;

// Re-export from traits for convenience
pub use crate::traits::fetcher::PageFetcher;
