// src/dispatch/types.rs
use std::pin::Pin;

use futures_util::Stream;
use serde::Serialize;

/// Body of one automation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AutomationRequest {
    pub url: String,  // sportsbook page the remote browser starts on
    pub goal: String, // natural-language task
}

/// Raw response body, chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, DispatchError>> + Send>>;

/// Transport-level failures. Every variant ends the source as a network error.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("automation request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("automation service returned {0}")]
    Status(reqwest::StatusCode),
    #[error("stream read failed: {0}")]
    Read(String),
}

#[async_trait::async_trait]
pub trait AutomationBackend: Send + Sync {
    /// Send the request and hand back the event stream body.
    async fn open(&self, req: &AutomationRequest) -> Result<ByteStream, DispatchError>;
    fn name(&self) -> &'static str;
}
