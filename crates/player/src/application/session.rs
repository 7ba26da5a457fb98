//! Chat session - owns the transcript and drives one stream at a time
//!
//! A session is created with an empty transcript (plus the stage greeting,
//! if any), accepts submissions while no stream is in flight, and hands its
//! transcript back when it ends.

use std::sync::Arc;

use futures_util::StreamExt;
use streamchat_domain::{ChatTurn, DomainError, Transcript};
use streamchat_shared::RelayRequest;
use uuid::Uuid;

use super::stage::{InputStage, RelayContext, StageAction};
use super::text_decoder::Utf8StreamDecoder;
use crate::ports::outbound::{RelayError, RelayPort, TranscriptView};

/// Assistant turn shown in place of a reply that failed
pub const ERROR_TURN_TEXT: &str = "Sorry, there was an error processing your message.";

/// What happened to a submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input, or input is disabled
    Ignored,
    /// The stage answered without contacting the relay
    Replied,
    /// The relay stream ran to completion
    Streamed,
    /// The relay failed; the error turn is showing
    Failed,
}

pub struct ChatSession {
    id: Uuid,
    relay: Arc<dyn RelayPort>,
    view: Box<dyn TranscriptView>,
    stage: Option<Box<dyn InputStage>>,
    transcript: Transcript,
    input: String,
}

impl ChatSession {
    /// Plain chat session: every submission is relayed.
    pub fn new(relay: Arc<dyn RelayPort>, view: Box<dyn TranscriptView>) -> Self {
        let id = Uuid::new_v4();
        tracing::info!(session_id = %id, "Chat session started");
        Self {
            id,
            relay,
            view,
            stage: None,
            transcript: Transcript::new(),
            input: String::new(),
        }
    }

    /// Session with a pre-processing stage in front of the relay.
    pub fn with_stage(
        relay: Arc<dyn RelayPort>,
        view: Box<dyn TranscriptView>,
        stage: Box<dyn InputStage>,
    ) -> Self {
        let mut session = Self::new(relay, view);
        let greeting = stage.greeting();
        session.stage = Some(stage);
        if let Some(greeting) = greeting {
            session.apply(|t| t.push(ChatTurn::assistant(greeting)));
        }
        session
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn turns(&self) -> &[ChatTurn] {
        self.transcript.turns()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    pub fn is_streaming(&self) -> bool {
        self.transcript.is_streaming()
    }

    /// False while a stream is in flight or the stage is waiting.
    pub fn input_enabled(&self) -> bool {
        !self.is_streaming() && self.stage.as_ref().map_or(true, |s| s.accepts_input())
    }

    pub fn stage_label(&self) -> Option<&'static str> {
        self.stage.as_ref().and_then(|s| s.state_label())
    }

    /// Send whatever is in the input field.
    pub async fn submit(&mut self) -> SendOutcome {
        let text = self.input.clone();
        self.send_message(&text).await
    }

    /// Submit one message.
    ///
    /// No-op when `text` is blank or input is disabled. Relay failures never
    /// escape: they end as an error turn.
    pub async fn send_message(&mut self, text: &str) -> SendOutcome {
        if text.trim().is_empty() || !self.input_enabled() {
            return SendOutcome::Ignored;
        }

        let action = match self.stage.as_mut() {
            Some(stage) => stage.route(text),
            None => StageAction::relay(text),
        };

        match action {
            StageAction::Ignore => SendOutcome::Ignored,
            StageAction::Reply(reply) => {
                self.apply(|t| t.push(ChatTurn::user(text)));
                self.input.clear();
                self.apply(|t| t.push(ChatTurn::assistant(reply)));
                SendOutcome::Replied
            }
            StageAction::Relay { message, context } => {
                self.apply(|t| t.push(ChatTurn::user(text)));
                self.apply(Transcript::begin_streaming);
                self.input.clear();

                let context = match context {
                    RelayContext::Transcript => self.transcript.render_context(),
                    RelayContext::Empty => String::new(),
                };
                let succeeded = self.stream_reply(RelayRequest::new(message, context)).await;

                let follow_up = self
                    .stage
                    .as_mut()
                    .and_then(|stage| stage.stream_finished(succeeded));
                if let Some(follow_up) = follow_up {
                    self.apply(|t| t.push(ChatTurn::assistant(follow_up)));
                }

                if succeeded {
                    SendOutcome::Streamed
                } else {
                    SendOutcome::Failed
                }
            }
        }
    }

    /// End the session, handing back the final transcript.
    pub fn end(self) -> Transcript {
        tracing::info!(
            session_id = %self.id,
            turns = self.transcript.len(),
            "Chat session ended"
        );
        self.transcript
    }

    /// Fill the streaming placeholder from the relay. Returns whether the
    /// stream completed.
    async fn stream_reply(&mut self, request: RelayRequest) -> bool {
        match self.pump(&request).await {
            Ok(full_text) => {
                tracing::debug!(session_id = %self.id, chars = full_text.len(), "Reply complete");
                self.apply(|t| t.finish_streaming(full_text));
                true
            }
            Err(e) => {
                tracing::warn!(session_id = %self.id, error = %e, "Reply failed");
                self.apply(|t| t.finish_streaming(ERROR_TURN_TEXT));
                false
            }
        }
    }

    async fn pump(&mut self, request: &RelayRequest) -> Result<String, RelayError> {
        let mut chunks = self.relay.open_stream(request).await?;
        let mut decoder = Utf8StreamDecoder::new();
        let mut full_text = String::new();

        while let Some(chunk) = chunks.next().await {
            let chunk = chunk?;
            full_text.push_str(&decoder.decode(&chunk));
            self.apply(|t| t.update_streaming(full_text.as_str()));
        }

        full_text.push_str(&decoder.finish());
        Ok(full_text)
    }

    /// Mutate the transcript and re-render.
    fn apply(&mut self, change: impl FnOnce(&mut Transcript) -> Result<(), DomainError>) {
        if let Err(e) = change(&mut self.transcript) {
            tracing::error!(session_id = %self.id, error = %e, "Rejected transcript change");
            return;
        }
        self.view.transcript_changed(self.transcript.turns());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::outbound::{ChunkStream, MockRelayPort};
    use futures_util::stream;
    use std::sync::Mutex;
    use streamchat_domain::story::{COMPLETE_PROMPT, FAILED_PROMPT, ITEMS_PROMPT, ITEMS_RETRY_PROMPT};
    use streamchat_domain::{ChatRole, StoryDialogue};

    /// Records every transcript snapshot the session renders.
    #[derive(Clone, Default)]
    struct RecordingView {
        snapshots: Arc<Mutex<Vec<Vec<ChatTurn>>>>,
    }

    impl TranscriptView for RecordingView {
        fn transcript_changed(&mut self, turns: &[ChatTurn]) {
            self.snapshots.lock().unwrap().push(turns.to_vec());
        }
    }

    impl RecordingView {
        fn snapshots(&self) -> Vec<Vec<ChatTurn>> {
            self.snapshots.lock().unwrap().clone()
        }
    }

    fn chunks(parts: &[&'static str]) -> ChunkStream {
        let items: Vec<Result<Vec<u8>, RelayError>> =
            parts.iter().map(|p| Ok(p.as_bytes().to_vec())).collect();
        Box::pin(stream::iter(items))
    }

    fn session_with(relay: MockRelayPort) -> (ChatSession, RecordingView) {
        let view = RecordingView::default();
        let session = ChatSession::new(Arc::new(relay), Box::new(view.clone()));
        (session, view)
    }

    fn story_session_with(relay: MockRelayPort) -> (ChatSession, RecordingView) {
        let view = RecordingView::default();
        let session = ChatSession::with_stage(
            Arc::new(relay),
            Box::new(view.clone()),
            Box::new(StoryDialogue::new()),
        );
        (session, view)
    }

    fn assert_single_trailing_stream(snapshots: &[Vec<ChatTurn>]) {
        for turns in snapshots {
            let streaming: Vec<usize> = turns
                .iter()
                .enumerate()
                .filter(|(_, t)| t.is_streaming)
                .map(|(i, _)| i)
                .collect();
            assert!(streaming.len() <= 1, "more than one streaming turn");
            if let Some(i) = streaming.first() {
                assert_eq!(*i, turns.len() - 1, "streaming turn is not last");
            }
        }
    }

    mod plain_chat {
        use super::*;

        #[tokio::test]
        async fn blank_input_is_ignored() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().never();
            let (mut session, view) = session_with(relay);

            session.set_input("   ");
            assert_eq!(session.submit().await, SendOutcome::Ignored);
            assert_eq!(session.send_message("").await, SendOutcome::Ignored);
            assert!(session.turns().is_empty());
            assert!(view.snapshots().is_empty());
            assert_eq!(session.input(), "   ");
        }

        #[tokio::test]
        async fn each_chunk_rewrites_the_streaming_turn() {
            let mut relay = MockRelayPort::new();
            relay
                .expect_open_stream()
                .times(1)
                .returning(|_| Ok(chunks(&["Hello", " ", "world"])));
            let (mut session, view) = session_with(relay);

            assert_eq!(session.send_message("hi").await, SendOutcome::Streamed);

            let assistant: Vec<(String, bool)> = view
                .snapshots()
                .iter()
                .filter_map(|turns| turns.get(1))
                .map(|t| (t.content.clone(), t.is_streaming))
                .collect();
            assert_eq!(
                assistant,
                vec![
                    (String::new(), true),
                    ("Hello".to_string(), true),
                    ("Hello ".to_string(), true),
                    ("Hello world".to_string(), true),
                    ("Hello world".to_string(), false),
                ]
            );
            assert_single_trailing_stream(&view.snapshots());
            assert!(!session.is_streaming());
        }

        #[tokio::test]
        async fn sends_message_with_rendered_context() {
            let mut relay = MockRelayPort::new();
            relay
                .expect_open_stream()
                .withf(|req| req.message == "hi" && req.context.as_deref() == Some("user: hi"))
                .times(1)
                .returning(|_| Ok(chunks(&["Hello!"])));
            relay
                .expect_open_stream()
                .withf(|req| {
                    req.message == "how are you?"
                        && req.context.as_deref()
                            == Some("user: hi\nassistant: Hello!\nuser: how are you?")
                })
                .times(1)
                .returning(|_| Ok(chunks(&["Fine."])));
            let (mut session, _view) = session_with(relay);

            session.send_message("hi").await;
            session.send_message("how are you?").await;

            let roles: Vec<ChatRole> = session.turns().iter().map(|t| t.role).collect();
            assert_eq!(
                roles,
                vec![ChatRole::User, ChatRole::Assistant, ChatRole::User, ChatRole::Assistant]
            );
            assert_eq!(session.turns()[3].content, "Fine.");
        }

        #[tokio::test]
        async fn submit_clears_the_input_field() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().returning(|_| Ok(chunks(&["ok"])));
            let (mut session, _view) = session_with(relay);

            session.set_input("hello");
            assert_eq!(session.submit().await, SendOutcome::Streamed);
            assert_eq!(session.input(), "");
            assert_eq!(session.turns()[0], ChatTurn::user("hello"));
        }

        #[tokio::test]
        async fn relay_refusal_becomes_error_turn() {
            let mut relay = MockRelayPort::new();
            relay
                .expect_open_stream()
                .returning(|_| Err(RelayError::Status(500)));
            let (mut session, view) = session_with(relay);

            assert_eq!(session.send_message("hi").await, SendOutcome::Failed);
            assert_eq!(session.turns()[1], ChatTurn::assistant(ERROR_TURN_TEXT));
            assert!(!session.is_streaming());
            assert!(session.input_enabled());
            assert_single_trailing_stream(&view.snapshots());
        }

        #[tokio::test]
        async fn mid_stream_failure_replaces_partial_text() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().returning(|_| {
                let items: Vec<Result<Vec<u8>, RelayError>> = vec![
                    Ok(b"Once upon".to_vec()),
                    Err(RelayError::StreamInterrupted("connection closed".into())),
                ];
                Ok(Box::pin(stream::iter(items)) as ChunkStream)
            });
            let (mut session, _view) = session_with(relay);

            assert_eq!(session.send_message("story?").await, SendOutcome::Failed);
            assert_eq!(session.turns().len(), 2);
            assert_eq!(session.turns()[1], ChatTurn::assistant(ERROR_TURN_TEXT));
        }

        #[tokio::test]
        async fn multibyte_characters_survive_chunk_splits() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().returning(|_| {
                let bytes = "caf\u{e9} \u{2615}".as_bytes();
                let items: Vec<Result<Vec<u8>, RelayError>> = vec![
                    Ok(bytes[..4].to_vec()),
                    Ok(bytes[4..7].to_vec()),
                    Ok(bytes[7..].to_vec()),
                ];
                Ok(Box::pin(stream::iter(items)) as ChunkStream)
            });
            let (mut session, view) = session_with(relay);

            session.send_message("coffee?").await;

            assert_eq!(session.turns()[1].content, "caf\u{e9} \u{2615}");
            assert!(view
                .snapshots()
                .iter()
                .filter_map(|turns| turns.get(1))
                .all(|t| !t.content.contains('\u{fffd}')));
        }

        #[tokio::test]
        async fn end_hands_back_transcript() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().returning(|_| Ok(chunks(&["pong"])));
            let (mut session, _view) = session_with(relay);

            session.send_message("ping").await;
            let transcript = session.end();
            assert_eq!(transcript.len(), 2);
            assert_eq!(transcript.last().unwrap().content, "pong");
        }
    }

    mod story_mode {
        use super::*;

        #[tokio::test]
        async fn greeting_is_the_first_turn() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().never();
            let (session, view) = story_session_with(relay);

            assert_eq!(session.turns(), &[ChatTurn::assistant(ITEMS_PROMPT)]);
            assert_eq!(view.snapshots().len(), 1);
            assert_eq!(session.stage_label(), Some("collecting-items"));
        }

        #[tokio::test]
        async fn too_few_items_reprompt_without_relaying() {
            let mut relay = MockRelayPort::new();
            relay.expect_open_stream().never();
            let (mut session, _view) = story_session_with(relay);

            assert_eq!(session.send_message("sword, lantern").await, SendOutcome::Replied);
            assert_eq!(session.stage_label(), Some("collecting-items"));
            assert_eq!(
                &session.turns()[1..],
                &[
                    ChatTurn::user("sword, lantern"),
                    ChatTurn::assistant(ITEMS_RETRY_PROMPT)
                ]
            );
        }

        #[tokio::test]
        async fn full_dialogue_generates_once_and_completes() {
            let mut relay = MockRelayPort::new();
            relay
                .expect_open_stream()
                .withf(|req| {
                    req.message.contains("sword, lantern, and map")
                        && req.message.contains("escapes")
                        && req.message.contains("a drowned city")
                        && req.context().is_none()
                })
                .times(1)
                .returning(|_| Ok(chunks(&["Once", " upon a time."])));
            let (mut session, _view) = story_session_with(relay);

            session.send_message("sword, lantern, map").await;
            assert_eq!(session.stage_label(), Some("collecting-action"));
            session.send_message("escapes").await;
            assert_eq!(session.stage_label(), Some("collecting-location"));
            assert_eq!(
                session.send_message("a drowned city").await,
                SendOutcome::Streamed
            );

            assert_eq!(session.stage_label(), Some("complete"));
            let n = session.turns().len();
            assert_eq!(session.turns()[n - 2], ChatTurn::assistant("Once upon a time."));
            assert_eq!(session.turns()[n - 1], ChatTurn::assistant(COMPLETE_PROMPT));
            assert!(session.input_enabled());
        }

        #[tokio::test]
        async fn submission_after_complete_starts_over() {
            let mut relay = MockRelayPort::new();
            relay
                .expect_open_stream()
                .times(1)
                .returning(|_| Ok(chunks(&["The end."])));
            let (mut session, _view) = story_session_with(relay);

            session.send_message("a, b, c").await;
            session.send_message("runs").await;
            session.send_message("home").await;

            assert_eq!(
                session.send_message("x, y, z").await,
                SendOutcome::Replied
            );
            assert_eq!(session.stage_label(), Some("collecting-items"));
            assert_eq!(session.turns().last().unwrap(), &ChatTurn::assistant(ITEMS_PROMPT));
        }

        #[tokio::test]
        async fn relay_failure_resets_the_dialogue() {
            let mut relay = MockRelayPort::new();
            relay
                .expect_open_stream()
                .returning(|_| Err(RelayError::RequestFailed("connection refused".into())));
            let (mut session, _view) = story_session_with(relay);

            session.send_message("a, b, c").await;
            session.send_message("runs").await;
            assert_eq!(session.send_message("home").await, SendOutcome::Failed);

            assert_eq!(session.stage_label(), Some("collecting-items"));
            let n = session.turns().len();
            assert_eq!(session.turns()[n - 2], ChatTurn::assistant(ERROR_TURN_TEXT));
            assert_eq!(session.turns()[n - 1], ChatTurn::assistant(FAILED_PROMPT));
            assert!(session.input_enabled());
        }
    }
}
