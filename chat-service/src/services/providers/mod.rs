//! Generative model provider abstraction and implementations.
//!
//! The chat service talks to a `GenerativeProvider` trait object so the
//! Gemini backend can be swapped for the recording mock in tests.

pub mod gemini;
pub mod mock;

use crate::models::{ModelReply, Prompt};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub use gemini::GeminiProvider;
pub use mock::MockProvider;

/// Error type for provider operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Model returned no text")]
    EmptyResponse,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),
}

/// One-shot generation against a named model.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    async fn generate(&self, model: &str, prompt: &Prompt) -> Result<ModelReply, ProviderError>;
}
