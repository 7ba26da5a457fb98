//! Chat turns and the transcript that owns them
//!
//! The transcript is append-only except for the last turn, which may be
//! rewritten while it is streaming.
//!
//! # Invariant
//!
//! ```text
//! at most one turn has is_streaming = true, and it is always the last turn
//! ```

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Role of the author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

impl ChatRole {
    /// Wire/context spelling of the role (`"user"` / `"assistant"`)
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }

    /// Label shown above a turn in a transcript view
    pub fn display_name(&self) -> &'static str {
        match self {
            ChatRole::User => "You",
            ChatRole::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub is_streaming: bool,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            is_streaming: false,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            is_streaming: false,
        }
    }

    /// Empty assistant turn that is still receiving text
    pub fn streaming_placeholder() -> Self {
        Self {
            role: ChatRole::Assistant,
            content: String::new(),
            is_streaming: true,
        }
    }

    /// Render as a context line: `"<role>: <content>"`
    pub fn context_line(&self) -> String {
        format!("{}: {}", self.role, self.content)
    }
}

/// Ordered sequence of chat turns for one session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<ChatTurn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&ChatTurn> {
        self.turns.last()
    }

    /// Whether the last turn is still receiving text
    pub fn is_streaming(&self) -> bool {
        self.turns.last().is_some_and(|t| t.is_streaming)
    }

    /// Append a finished turn.
    ///
    /// Rejected while a turn is streaming, since the streaming turn must stay last.
    pub fn push(&mut self, turn: ChatTurn) -> Result<(), DomainError> {
        if self.is_streaming() {
            return Err(DomainError::invalid_transition(
                "cannot append a turn while another turn is streaming",
            ));
        }
        if turn.is_streaming {
            return self.begin_streaming();
        }
        self.turns.push(turn);
        Ok(())
    }

    /// Append an empty streaming assistant turn.
    pub fn begin_streaming(&mut self) -> Result<(), DomainError> {
        if self.is_streaming() {
            return Err(DomainError::invalid_transition(
                "a turn is already streaming",
            ));
        }
        self.turns.push(ChatTurn::streaming_placeholder());
        Ok(())
    }

    /// Replace the streaming turn's content, keeping it streaming.
    pub fn update_streaming(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        self.replace_streaming(ChatTurn {
            role: ChatRole::Assistant,
            content: content.into(),
            is_streaming: true,
        })
    }

    /// Replace the streaming turn with its final content.
    pub fn finish_streaming(&mut self, content: impl Into<String>) -> Result<(), DomainError> {
        self.replace_streaming(ChatTurn::assistant(content))
    }

    /// Context string sent alongside a message: every turn before the
    /// streaming placeholder, one `"<role>: <content>"` per line.
    pub fn render_context(&self) -> String {
        let settled = if self.is_streaming() {
            &self.turns[..self.turns.len() - 1]
        } else {
            &self.turns[..]
        };
        settled
            .iter()
            .map(ChatTurn::context_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn replace_streaming(&mut self, turn: ChatTurn) -> Result<(), DomainError> {
        match self.turns.last_mut() {
            Some(last) if last.is_streaming => {
                *last = turn;
                Ok(())
            }
            _ => Err(DomainError::invalid_transition(
                "no streaming turn to replace",
            )),
        }
    }
}
