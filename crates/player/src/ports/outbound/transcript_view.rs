//! Transcript View Port - where transcript changes are rendered
//!
//! The session calls the view after every change with the whole turn
//! sequence, so rendering is a pure function of the turns.

use streamchat_domain::ChatTurn;

pub trait TranscriptView: Send {
    /// Called after every transcript change; also the auto-scroll hook.
    fn transcript_changed(&mut self, turns: &[ChatTurn]);
}
