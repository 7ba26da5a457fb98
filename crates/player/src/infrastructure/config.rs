//! Client configuration, read from the environment.

use url::Url;

pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000/api/chat";

/// Which front-end flow the session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatMode {
    /// Every submission goes straight to the relay
    #[default]
    Chat,
    /// Submissions drive the story dialogue first
    Story,
}

impl ChatMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chat" => Some(ChatMode::Chat),
            "story" => Some(ChatMode::Story),
            _ => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid relay URL '{value}': {source}")]
    InvalidRelayUrl {
        value: String,
        source: url::ParseError,
    },
    #[error("Unknown chat mode '{0}' (expected 'chat' or 'story')")]
    UnknownMode(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConfig {
    pub relay_url: Url,
    pub mode: ChatMode,
}

impl PlayerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Prefer the short name used by dev scripts; fall back to the prefixed one.
        let raw_url = lookup("RELAY_URL")
            .or_else(|| lookup("STREAMCHAT_RELAY_URL"))
            .unwrap_or_else(|| DEFAULT_RELAY_URL.to_string());
        let relay_url = Url::parse(raw_url.trim()).map_err(|source| ConfigError::InvalidRelayUrl {
            value: raw_url.clone(),
            source,
        })?;

        let mode = match lookup("STREAMCHAT_MODE") {
            Some(raw) => ChatMode::parse(&raw).ok_or(ConfigError::UnknownMode(raw))?,
            None => ChatMode::default(),
        };

        Ok(Self { relay_url, mode })
    }
}
