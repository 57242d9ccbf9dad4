//! CompletionClient implementations.
//!
//! This module provides a reference implementation of the `CompletionClient`
//! trait. Users can use it directly or implement their own.

mod openai;

pub use openai::OpenAI;
