//! CompletionClient trait for LLM text generation.
//!
//! A single request/response call: submit role-tagged messages, receive
//! text. No streaming, and no conversation state kept between calls, so
//! every request must carry its full context.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::error::CompletionResult;
use crate::types::message::RequestMessage;

/// Completion-generating capability.
///
/// Implementations wrap specific LLM providers (OpenAI, compatible
/// gateways, local servers) and return the raw assistant text untouched.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Generate a completion for `messages` with `model`.
    ///
    /// Must give up after `timeout`.
    async fn generate(
        &self,
        messages: &[RequestMessage],
        model: &str,
        timeout: Duration,
    ) -> CompletionResult<String>;

    /// Get the provider name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: CompletionClient + ?Sized> CompletionClient for Arc<T> {
    async fn generate(
        &self,
        messages: &[RequestMessage],
        model: &str,
        timeout: Duration,
    ) -> CompletionResult<String> {
        (**self).generate(messages, model, timeout).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
