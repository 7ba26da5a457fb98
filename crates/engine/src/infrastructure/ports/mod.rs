//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - LLM calls (could swap Ollama -> another streaming backend)

mod error;
mod external;

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{LlmStreamPort, TokenStream};

// =============================================================================
// Error Types
// =============================================================================
pub use error::LlmError;

#[cfg(test)]
pub use external::MockLlmStreamPort;
