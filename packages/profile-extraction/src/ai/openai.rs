//! OpenAI implementation of the CompletionClient trait.
//!
//! Works against api.openai.com or any server speaking the same
//! chat-completions protocol.
//!
//! # Example
//!
//! ```rust,ignore
//! use profile_extraction::ai::OpenAI;
//!
//! let ai = OpenAI::from_env()?;
//! let profiler = Profiler::new(HttpFetcher::new(), ai, ProfileConfig::default());
//! ```

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::error::{CompletionError, CompletionResult};
use crate::traits::completion::CompletionClient;
use crate::types::message::RequestMessage;

/// OpenAI-compatible chat completion client.
pub struct OpenAI {
    client: Client,
    api_key: SecretString,
    base_url: String,
    temperature: Option<f32>,
}

impl std::fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAI")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl OpenAI {
    /// Create a new OpenAI client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: SecretString::from(api_key.into()),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: None,
        }
    }

    /// Create from `OPENAI_API_KEY`, honoring `OPENAI_BASE_URL` if set.
    pub fn from_env() -> CompletionResult<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| CompletionError::Config("OPENAI_API_KEY not set".into()))?;
        let mut ai = Self::new(api_key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            ai = ai.with_base_url(base_url);
        }
        Ok(ai)
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set a custom HTTP client.
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn map_send_error(err: reqwest::Error, timeout: Duration) -> CompletionError {
        if err.is_timeout() {
            CompletionError::Timeout {
                seconds: timeout.as_secs(),
            }
        } else {
            CompletionError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl CompletionClient for OpenAI {
    async fn generate(
        &self,
        messages: &[RequestMessage],
        model: &str,
        timeout: Duration,
    ) -> CompletionResult<String> {
        let start = Instant::now();
        let request = ChatRequest {
            model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "OpenAI request failed");
                Self::map_send_error(e, timeout)
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "OpenAI API error");
            return Err(CompletionError::Api(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Self::map_send_error(e, timeout))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(CompletionError::EmptyResponse)?;

        debug!(
            model = %model,
            duration_ms = start.elapsed().as_millis() as u64,
            response_len = content.len(),
            "OpenAI chat completion"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        "openai"
    }
}

// Request/Response types

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [RequestMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_builder() {
        let ai = OpenAI::new("sk-test")
            .with_base_url("https://custom.api.com/v1/")
            .with_temperature(0.0);

        assert_eq!(ai.base_url(), "https://custom.api.com/v1");
        assert_eq!(ai.temperature, Some(0.0));
        assert_eq!(ai.api_key.expose_secret(), "sk-test");
    }

    #[test]
    fn test_debug_redacts_key() {
        let ai = OpenAI::new("sk-very-secret");
        let debug = format!("{:?}", ai);
        assert!(!debug.contains("sk-very-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_request_shape() {
        let messages = vec![
            RequestMessage::system("You are a helpful assistant."),
            RequestMessage::user("hello"),
        ];
        let request = ChatRequest {
            model: "gpt-4o",
            messages: &messages,
            temperature: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "gpt-4o");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "hello");
        assert!(json.get("temperature").is_none());
    }

    #[test]
    fn test_null_content_parses() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#;
        let parsed: ChatResponse = serde_json::from_str(raw).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
