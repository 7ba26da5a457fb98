//! Relay Port - streaming chat boundary
//!
//! One call sends a message to the relay and returns the raw response body
//! as it arrives. Decoding the bytes is the caller's job.

use std::pin::Pin;

use futures_util::Stream;
use streamchat_shared::RelayRequest;

/// Raw body chunks in arrival order. An `Err` item is terminal.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, RelayError>> + Send>>;

#[derive(Debug, Clone, thiserror::Error)]
pub enum RelayError {
    #[error("Relay request failed: {0}")]
    RequestFailed(String),
    #[error("Relay returned status {0}")]
    Status(u16),
    #[error("Relay stream interrupted: {0}")]
    StreamInterrupted(String),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RelayPort: Send + Sync {
    async fn open_stream(&self, request: &RelayRequest) -> Result<ChunkStream, RelayError>;
}
