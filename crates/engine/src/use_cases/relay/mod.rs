//! Chat relay: forward one message to the LLM and hand back its token stream.

use std::sync::Arc;

use streamchat_shared::RelayRequest;

use crate::infrastructure::ports::{LlmError, LlmStreamPort, TokenStream};

/// Separator between prior context and the new message
pub const CONTEXT_SEPARATOR: &str = "\nuser: ";

pub struct RelayUseCases {
    pub chat: Arc<RelayChat>,
}

impl RelayUseCases {
    pub fn new(chat: Arc<RelayChat>) -> Self {
        Self { chat }
    }
}

/// Opens one streaming generation per chat request.
pub struct RelayChat {
    llm: Arc<dyn LlmStreamPort>,
}

impl RelayChat {
    pub fn new(llm: Arc<dyn LlmStreamPort>) -> Self {
        Self { llm }
    }

    pub async fn execute(&self, request: &RelayRequest) -> Result<TokenStream, RelayError> {
        let prompt = build_prompt(request);
        tracing::info!(
            message_len = request.message.len(),
            prompt_len = prompt.len(),
            has_context = request.context().is_some(),
            "Relaying chat message"
        );
        Ok(self.llm.generate_stream(&prompt).await?)
    }
}

/// `context + "\nuser: " + message`, or the bare message without context.
pub fn build_prompt(request: &RelayRequest) -> String {
    match request.context() {
        Some(context) => format!("{context}{CONTEXT_SEPARATOR}{}", request.message),
        None => request.message.clone(),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("LLM backend error: {0}")]
    Llm(#[from] LlmError),
}
