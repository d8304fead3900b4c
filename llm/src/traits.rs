use async_trait::async_trait;
use futures_core::Stream;
use std::pin::Pin;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("network error: {0}")]
    Network(String),
    #[error("completion endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response")]
    InvalidResponse,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LLMError {
    fn from(e: reqwest::Error) -> Self {
        LLMError::Network(e.to_string())
    }
}

/// Stream of incremental text deltas.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, LLMError>> + Send>>;

#[async_trait]
pub trait LLMClient: Send + Sync {
    /// Stream the completion for `prompt` as it is generated.
    async fn stream_chat(&self, model: &str, prompt: &str) -> Result<DeltaStream, LLMError>;

    /// Return the complete, non-streamed response for `prompt`.
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, LLMError>;
}
