//! Client -> relay wire contract.

use serde::{Deserialize, Serialize};

/// Route the relay accepts chat requests on
pub const CHAT_PATH: &str = "/api/chat";

/// Liveness route
pub const HEALTH_PATH: &str = "/api/health";

/// Content type of the relay's token stream
pub const RELAY_CONTENT_TYPE: &str = "text/plain";

/// Body of `POST /api/chat`
///
/// The response is a chunked `text/plain` body: the generated text, with no
/// framing between tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub message: String,
    /// Prior turns rendered as `"<role>: <content>"` lines
    #[serde(default)]
    pub context: Option<String>,
}

impl RelayRequest {
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: Some(context.into()),
        }
    }

    /// Context with absent and empty treated alike
    pub fn context(&self) -> Option<&str> {
        self.context.as_deref().filter(|c| !c.is_empty())
    }
}
