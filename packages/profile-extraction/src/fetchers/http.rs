//! HTTP-based page fetcher.
//!
//! Downloads a page with a single GET and reduces its HTML to plain text.

use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::PageFetcher;

static HIDDEN_BLOCKS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<(script|style|noscript|template)[^>]*>.*?</(script|style|noscript|template)>")
        .expect("static regex")
});
static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static regex"));
static TAGS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("static regex"));
static NUMERIC_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("static regex"));

/// Fetcher that downloads pages over HTTP(S).
///
/// # Example
///
/// ```rust,ignore
/// use profile_extraction::fetchers::HttpFetcher;
///
/// let fetcher = HttpFetcher::new().with_user_agent("MyBot/1.0");
/// let text = fetcher.fetch_page_text("https://example.com", timeout).await?;
/// ```
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Create a new HTTP fetcher with default settings.
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            user_agent: "Mozilla/5.0 (compatible; ProfileExtraction/1.0)".to_string(),
        }
    }

    /// Set a custom user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    fn parse_url(url: &str) -> FetchResult<Url> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        match parsed.scheme() {
            "http" | "https" => Ok(parsed),
            _ => Err(FetchError::InvalidUrl {
                url: url.to_string(),
            }),
        }
    }
}

/// Reduce HTML to newline-separated text.
///
/// Every text run between tags becomes its own trimmed line; empty lines
/// are dropped. Script, style and comment content never reaches the output.
pub fn html_to_text(html: &str) -> String {
    let text = HIDDEN_BLOCKS.replace_all(html, "\n");
    let text = COMMENTS.replace_all(&text, "\n");
    let text = TAGS.replace_all(&text, "\n");
    let text = decode_entities(&text);

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY.replace_all(text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_default()
    });

    // &amp; last so "&amp;lt;" stays "&lt;"
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page_text(&self, url: &str, timeout: Duration) -> FetchResult<String> {
        let parsed = Self::parse_url(url)?;
        debug!(url = %url, "HTTP fetch starting");

        let response = self
            .client
            .get(parsed)
            .header("User-Agent", &self.user_agent)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                if e.is_timeout() {
                    FetchError::Timeout {
                        url: url.to_string(),
                    }
                } else {
                    FetchError::Http(Box::new(e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        let text = html_to_text(&html);
        debug!(url = %url, html_len = html.len(), text_len = text.len(), "Page fetched");
        Ok(text)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_to_text_lines() {
        let html = r#"
            <html><head><title>Jane Roe</title></head>
            <body>
                <h1>Jane   Roe</h1>
                <p>Engineer at <a href="/acme">Acme</a></p>
            </body></html>
        "#;

        let text = html_to_text(html);
        assert_eq!(text, "Jane Roe\nJane   Roe\nEngineer at\nAcme");
    }

    #[test]
    fn test_html_to_text_strips_scripts_and_comments() {
        let html = r#"<div>Visible</div><script>var x = "<p>hidden</p>";</script>
            <style>.a { color: red }</style><!-- secret -->"#;

        let text = html_to_text(html);
        assert_eq!(text, "Visible");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(
            html_to_text("<p>Tom &amp; Jerry &lt;3 caf&#233; &#x41;</p>"),
            "Tom & Jerry <3 café A"
        );
        assert_eq!(decode_entities("&amp;lt;"), "&lt;");
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        assert!(matches!(
            HttpFetcher::parse_url("file:///etc/passwd"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(matches!(
            HttpFetcher::parse_url("not a url"),
            Err(FetchError::InvalidUrl { .. })
        ));
        assert!(HttpFetcher::parse_url("https://example.com/a").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_url_fails_without_network() {
        let fetcher = HttpFetcher::new();
        let result = fetcher
            .fetch_page_text("ftp://example.com", Duration::from_secs(1))
            .await;
        assert!(matches!(result, Err(FetchError::InvalidUrl { .. })));
    }
}
