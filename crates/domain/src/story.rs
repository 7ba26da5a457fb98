//! Story-mode dialogue state machine
//!
//! Collects three items, an action, and a location one submission at a time,
//! then yields a single generation prompt.
//!
//! # State Transitions
//!
//! ```text
//! CollectingItems -> CollectingAction -> CollectingLocation -> Generating -> Complete
//!        ^                                                        |             |
//!        +------------------- generation failed ------------------+             |
//!        +------------------------- next submission ----------------------------+
//! ```

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Number of items a story needs
pub const STORY_ITEM_COUNT: usize = 3;

pub const ITEMS_PROMPT: &str =
    "Let's write a story together! First, name three items, separated by commas.";
pub const ITEMS_RETRY_PROMPT: &str =
    "I need exactly 3 items, separated by commas (for example: sword, lantern, map).";
pub const LOCATION_PROMPT: &str = "Great. Where does the story take place?";
pub const COMPLETE_PROMPT: &str = "The end! Send anything to start a new story.";
pub const FAILED_PROMPT: &str =
    "The story could not be written. Let's start over: name three items, separated by commas.";

/// Where the dialogue is in its linear flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum DialogueState {
    #[default]
    CollectingItems,
    CollectingAction,
    CollectingLocation,
    Generating,
    Complete,
}

impl DialogueState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DialogueState::CollectingItems => "collecting-items",
            DialogueState::CollectingAction => "collecting-action",
            DialogueState::CollectingLocation => "collecting-location",
            DialogueState::Generating => "generating",
            DialogueState::Complete => "complete",
        }
    }

    /// Submissions are refused only while the story is being generated
    pub fn accepts_input(&self) -> bool {
        !matches!(self, DialogueState::Generating)
    }
}

impl std::fmt::Display for DialogueState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Story ingredients gathered so far
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryElements {
    pub items: Vec<String>,
    pub action: String,
    pub location: String,
}

impl StoryElements {
    /// The fixed generation prompt for these elements
    pub fn story_prompt(&self) -> String {
        let items = match self.items.as_slice() {
            [a, b, c] => format!("{a}, {b}, and {c}"),
            other => other.join(", "),
        };
        format!(
            "Write a short, imaginative story. The story must feature these three items: {items}. \
             The main character's key action is: {}. The story takes place in: {}. \
             Keep it under 500 words and give it a clear ending.",
            self.action, self.location
        )
    }
}

/// What the caller should do with a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoryStep {
    /// Show this assistant message; nothing goes to the relay
    Reply(String),
    /// Send this prompt through the relay
    Generate(String),
}

/// Linear collect-then-generate dialogue
#[derive(Debug, Clone, Default)]
pub struct StoryDialogue {
    state: DialogueState,
    elements: StoryElements,
}

impl StoryDialogue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DialogueState {
        self.state
    }

    pub fn elements(&self) -> &StoryElements {
        &self.elements
    }

    pub fn greeting(&self) -> &'static str {
        ITEMS_PROMPT
    }

    /// Advance the dialogue with one user submission.
    ///
    /// Fails only while generating; callers keep input disabled in that state.
    pub fn submit(&mut self, input: &str) -> Result<StoryStep, DomainError> {
        match self.state {
            DialogueState::CollectingItems => {
                let items = parse_items(input);
                if items.len() < STORY_ITEM_COUNT {
                    return Ok(StoryStep::Reply(ITEMS_RETRY_PROMPT.to_string()));
                }
                self.elements.items = items.into_iter().take(STORY_ITEM_COUNT).collect();
                self.state = DialogueState::CollectingAction;
                Ok(StoryStep::Reply(format!(
                    "Got it: {}. What is the main character's key action?",
                    self.elements.items.join(", ")
                )))
            }
            DialogueState::CollectingAction => {
                self.elements.action = input.trim().to_string();
                self.state = DialogueState::CollectingLocation;
                Ok(StoryStep::Reply(LOCATION_PROMPT.to_string()))
            }
            DialogueState::CollectingLocation => {
                self.elements.location = input.trim().to_string();
                self.state = DialogueState::Generating;
                Ok(StoryStep::Generate(self.elements.story_prompt()))
            }
            DialogueState::Generating => Err(DomainError::invalid_transition(
                "story is still being generated",
            )),
            DialogueState::Complete => {
                self.reset();
                Ok(StoryStep::Reply(ITEMS_PROMPT.to_string()))
            }
        }
    }

    /// Record how the generation request ended.
    ///
    /// Success moves to `Complete`; failure resets the whole dialogue.
    /// Returns the follow-up message to show.
    pub fn finish_generation(&mut self, succeeded: bool) -> Result<&'static str, DomainError> {
        if self.state != DialogueState::Generating {
            return Err(DomainError::invalid_transition(format!(
                "generation finished while {}",
                self.state
            )));
        }
        if succeeded {
            self.state = DialogueState::Complete;
            Ok(COMPLETE_PROMPT)
        } else {
            self.reset();
            Ok(FAILED_PROMPT)
        }
    }

    pub fn reset(&mut self) {
        self.state = DialogueState::CollectingItems;
        self.elements = StoryElements::default();
    }
}

/// Split on commas, trim, drop empties
fn parse_items(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
