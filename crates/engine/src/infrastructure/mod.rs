//! Infrastructure implementations.
//!
//! Contains port trait implementations for external dependencies.

pub mod config;
pub mod ndjson;
pub mod ollama;
pub mod ports;
