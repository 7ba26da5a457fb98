//! Infrastructure adapters for the player.

pub mod config;
pub mod http_client;

pub use config::{ChatMode, ConfigError, PlayerConfig};
pub use http_client::RelayHttpClient;
