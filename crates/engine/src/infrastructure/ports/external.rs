//! External service port traits (LLM streaming).

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use super::error::LlmError;

// =============================================================================
// LLM Types
// =============================================================================

/// Generated text fragments in arrival order.
///
/// Ends when the backend signals completion or closes its body. An `Err`
/// item is terminal.
pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send>>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmStreamPort: Send + Sync {
    /// Start a streaming generation for `prompt`.
    ///
    /// Errors returned here happen before any text is produced.
    async fn generate_stream(&self, prompt: &str) -> Result<TokenStream, LlmError>;
}
