//! Page types - per-URL fetch results and the aggregated corpus.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of fetching one URL.
///
/// Exactly one of `text` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// URL as given by the caller
    pub url: String,

    /// Extracted page text on success
    pub text: Option<String>,

    /// Error message on failure
    pub error: Option<String>,

    /// When the fetch resolved
    pub fetched_at: DateTime<Utc>,
}

impl PageResult {
    /// A successful fetch.
    pub fn success(url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            text: Some(text.into()),
            error: None,
            fetched_at: Utc::now(),
        }
    }

    /// A failed fetch.
    pub fn failure(url: impl Into<String>, error: impl ToString) -> Self {
        Self {
            url: url.into(),
            text: None,
            error: Some(error.to_string()),
            fetched_at: Utc::now(),
        }
    }

    /// Check if the fetch succeeded.
    pub fn is_success(&self) -> bool {
        self.text.is_some()
    }
}

/// Concatenated text of every successfully fetched page for one run.
///
/// Each page's text is followed by exactly one blank line. Built once,
/// then only read; every correction prompt re-embeds it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    text: String,
    page_count: usize,
    failed_urls: Vec<String>,
}

impl Corpus {
    /// Separator appended after each page's text.
    pub const SEPARATOR: &'static str = "\n\n";

    /// Build a corpus from fetch results, keeping their order.
    pub fn from_results(results: Vec<PageResult>) -> Self {
        let mut corpus = Self::default();
        for result in results {
            match result.text {
                Some(text) => {
                    corpus.text.push_str(&text);
                    corpus.text.push_str(Self::SEPARATOR);
                    corpus.page_count += 1;
                }
                None => corpus.failed_urls.push(result.url),
            }
        }
        corpus
    }

    /// Build a corpus directly from page texts.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut corpus = Self::default();
        for text in texts {
            corpus.text.push_str(text.as_ref());
            corpus.text.push_str(Self::SEPARATOR);
            corpus.page_count += 1;
        }
        corpus
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of pages that contributed text.
    pub fn page_count(&self) -> usize {
        self.page_count
    }

    /// URLs whose fetch failed, in input order.
    pub fn failed_urls(&self) -> &[String] {
        &self.failed_urls
    }
}

impl AsRef<str> for Corpus {
    fn as_ref(&self) -> &str {
        &self.text
    }
}
