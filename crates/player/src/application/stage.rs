//! Input stages - optional pre-processing in front of the relay
//!
//! A session without a stage relays every submission. A stage can answer a
//! submission itself, rewrite it into a different relay message, or refuse
//! input while it waits for a generation to finish.

use streamchat_domain::{StoryDialogue, StoryStep};

/// Which prior turns accompany a relayed message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayContext {
    /// Every settled turn, `"<role>: <content>"` per line
    Transcript,
    /// No history; the message stands alone
    Empty,
}

/// What the session does with one submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageAction {
    /// Answer locally with this assistant message
    Reply(String),
    /// Send `message` through the relay and stream the answer
    Relay {
        message: String,
        context: RelayContext,
    },
    /// Drop the submission without touching the transcript
    Ignore,
}

impl StageAction {
    /// Plain chat: relay the text with the full transcript as context
    pub fn relay(text: &str) -> Self {
        Self::Relay {
            message: text.to_string(),
            context: RelayContext::Transcript,
        }
    }
}

pub trait InputStage: Send {
    /// Assistant message shown when the session starts
    fn greeting(&self) -> Option<String> {
        None
    }

    /// Whether the input control should be enabled
    fn accepts_input(&self) -> bool {
        true
    }

    /// Short label for the stage's current state, for prompts and logs
    fn state_label(&self) -> Option<&'static str> {
        None
    }

    fn route(&mut self, input: &str) -> StageAction;

    /// Called once a relayed stream has ended. Returns a follow-up
    /// assistant message, if any.
    fn stream_finished(&mut self, _succeeded: bool) -> Option<String> {
        None
    }
}

impl InputStage for StoryDialogue {
    fn greeting(&self) -> Option<String> {
        Some(StoryDialogue::greeting(self).to_string())
    }

    fn accepts_input(&self) -> bool {
        self.state().accepts_input()
    }

    fn state_label(&self) -> Option<&'static str> {
        Some(self.state().as_str())
    }

    fn route(&mut self, input: &str) -> StageAction {
        match self.submit(input) {
            Ok(StoryStep::Reply(text)) => StageAction::Reply(text),
            Ok(StoryStep::Generate(prompt)) => {
                tracing::info!(elements = ?self.elements(), "Story elements collected, generating");
                StageAction::Relay {
                    message: prompt,
                    context: RelayContext::Empty,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Story dialogue refused input");
                StageAction::Ignore
            }
        }
    }

    fn stream_finished(&mut self, succeeded: bool) -> Option<String> {
        match self.finish_generation(succeeded) {
            Ok(follow_up) => Some(follow_up.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Unexpected stream completion for story dialogue");
                None
            }
        }
    }
}
