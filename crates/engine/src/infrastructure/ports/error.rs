//! Error types for port operations.

#[derive(Debug, Clone, thiserror::Error)]
pub enum LlmError {
    /// The backend could not be reached or answered with a non-success status.
    #[error("LLM request failed: {0}")]
    RequestFailed(String),
    /// The response body broke off after streaming had started.
    #[error("LLM stream interrupted: {0}")]
    StreamInterrupted(String),
}
