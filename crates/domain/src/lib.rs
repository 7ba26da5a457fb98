//! StreamChat domain types.
//!
//! Pure data and state machines with no I/O: the chat transcript with its
//! single-streaming-turn invariant, and the story-mode dialogue.

pub mod chat;
pub mod error;
pub mod story;

pub use chat::{ChatRole, ChatTurn, Transcript};
pub use error::DomainError;
pub use story::{DialogueState, StoryDialogue, StoryElements, StoryStep};
