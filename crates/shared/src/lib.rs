//! StreamChat Protocol - Shared types for relay and client communication
//!
//! # Design Principles
//!
//! 1. **Minimal dependencies** - Only serde and serde_json
//! 2. **No business logic** - Pure data types and serialization

pub mod relay;

pub use relay::{RelayRequest, CHAT_PATH, HEALTH_PATH, RELAY_CONTENT_TYPE};
