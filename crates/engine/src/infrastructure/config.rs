//! Relay configuration, read from the environment.

use std::net::SocketAddr;

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use super::ollama::{DEFAULT_OLLAMA_BASE_URL, DEFAULT_OLLAMA_MODEL};

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

/// Settings for the relay process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub ollama_url: String,
    pub ollama_model: String,
    pub server_host: String,
    pub server_port: u16,
    /// `*`, a comma separated origin list, or `None` for no CORS layer
    pub cors_allowed_origins: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            ollama_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_model: DEFAULT_OLLAMA_MODEL.to_string(),
            server_host: DEFAULT_SERVER_HOST.to_string(),
            server_port: DEFAULT_SERVER_PORT,
            cors_allowed_origins: None,
        }
    }
}

impl RelayConfig {
    /// Load from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from any key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let ollama_url = lookup("OLLAMA_URL")
            .or_else(|| lookup("OLLAMA_BASE_URL"))
            .unwrap_or(defaults.ollama_url);
        let ollama_model = lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama_model);
        let server_host = lookup("SERVER_HOST").unwrap_or(defaults.server_host);
        let server_port = match lookup("SERVER_PORT").or_else(|| lookup("PORT")) {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Invalid SERVER_PORT, using {}", DEFAULT_SERVER_PORT);
                DEFAULT_SERVER_PORT
            }),
            None => defaults.server_port,
        };
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            ollama_url,
            ollama_model,
            server_host,
            server_port,
            cors_allowed_origins,
        }
    }

    pub fn listen_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server_host, self.server_port).parse()?)
    }

    pub fn cors_layer(&self) -> Option<CorsLayer> {
        build_cors_layer(self.cors_allowed_origins.as_deref())
    }
}

/// CORS for browser clients: `*` allows any origin, otherwise a comma
/// separated list. `None` when unset or when no listed origin is usable.
pub fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?.trim();

    // Browsers send JSON bodies, which trigger CORS preflights.
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        return Some(cors.allow_origin(Any));
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .filter_map(|s| match HeaderValue::from_str(s) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %s.escape_debug(), "Skipping invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return None;
    }
    Some(cors.allow_origin(origins))
}
