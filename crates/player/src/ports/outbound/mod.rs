//! Outbound ports - Interfaces for external services
//!
//! These ports define the contracts that infrastructure adapters must implement,
//! allowing application services to interact with external systems without
//! depending on concrete implementations.

pub mod relay_port;
pub mod transcript_view;

pub use relay_port::{ChunkStream, RelayError, RelayPort};
pub use transcript_view::TranscriptView;

#[cfg(test)]
pub use relay_port::MockRelayPort;
