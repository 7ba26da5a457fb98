//! HTTP routes.

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures_util::TryStreamExt;
use std::sync::Arc;

use streamchat_shared::{RelayRequest, CHAT_PATH, HEALTH_PATH, RELAY_CONTENT_TYPE};

use crate::app::App;

/// Create all HTTP routes.
///
/// `CHAT_PATH` only routes POST; other methods get axum's empty 405.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route(HEALTH_PATH, get(health))
        .route(CHAT_PATH, post(chat))
}

async fn health() -> &'static str {
    "OK"
}

// =============================================================================
// Chat relay
// =============================================================================

/// Relay one chat message and stream the generated text back as plain bytes.
///
/// The body is parsed by hand so that malformed JSON maps to the same
/// generic 500 as any other failure.
async fn chat(State(app): State<Arc<App>>, body: Bytes) -> Result<Response, ApiError> {
    let request: RelayRequest =
        serde_json::from_slice(&body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let tokens = app
        .use_cases
        .relay
        .chat
        .execute(&request)
        .await
        .map_err(|e| ApiError::Upstream(e.to_string()))?;

    let tokens = tokens.inspect_err(|e| {
        tracing::warn!(error = %e, "Relay stream terminated by backend error");
    });

    Ok((
        [(header::CONTENT_TYPE, RELAY_CONTENT_TYPE)],
        Body::from_stream(tokens),
    )
        .into_response())
}

#[derive(Debug)]
pub enum ApiError {
    /// Request body was not a valid chat request
    InvalidBody(String),
    /// The backend could not start a generation
    Upstream(String),
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match &self {
            ApiError::InvalidBody(msg) => {
                tracing::warn!(error = %msg, "Rejected chat request body");
            }
            ApiError::Upstream(msg) => {
                tracing::error!(error = %msg, "Chat relay failed before streaming");
            }
        }
        (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error",
        )
            .into_response()
    }
}
