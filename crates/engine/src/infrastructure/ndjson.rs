//! Newline-delimited JSON decoding for the Ollama generate stream.
//!
//! Each line of the backend body is one JSON record. Lines are parsed on
//! their own: a line that does not parse is dropped and the stream goes on.

use std::collections::VecDeque;
use std::pin::Pin;

use futures_util::{stream, Stream, StreamExt};
use serde::Deserialize;

use crate::infrastructure::ports::LlmError;

/// One record of the backend stream. Other fields are ignored.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default, deserialize_with = "lenient_flag")]
    pub done: bool,
}

/// Only a JSON `true` counts; `null` or any other value reads as `false`.
fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(matches!(value, serde_json::Value::Bool(true)))
}

impl StreamRecord {
    /// The record's text, if it carries any
    pub fn text(&self) -> Option<&str> {
        self.response.as_deref().filter(|s| !s.is_empty())
    }
}

/// Incremental line splitter and record parser.
///
/// Bytes of a line that spans chunk boundaries are held until its newline
/// (or the end of the body) arrives.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: Vec<u8>,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk, returning the records completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamRecord> {
        self.buffer.extend_from_slice(chunk);

        let mut records = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            if let Some(record) = parse_line(&line[..pos]) {
                records.push(record);
            }
        }
        records
    }

    /// Flush whatever is left once the body has ended.
    pub fn finish(&mut self) -> Option<StreamRecord> {
        let rest = std::mem::take(&mut self.buffer);
        parse_line(&rest)
    }
}

fn parse_line(line: &[u8]) -> Option<StreamRecord> {
    let text = match std::str::from_utf8(line) {
        Ok(text) => text.trim(),
        Err(e) => {
            tracing::debug!(error = %e, "Dropping non UTF-8 stream line");
            return None;
        }
    };
    if text.is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamRecord>(text) {
        Ok(record) => Some(record),
        Err(e) => {
            tracing::debug!(error = %e, line = text, "Dropping malformed stream record");
            None
        }
    }
}

struct PumpState<S> {
    body: Pin<Box<S>>,
    decoder: NdjsonDecoder,
    pending: VecDeque<String>,
    finished: bool,
}

impl<S> PumpState<S> {
    /// Queue the text of each record; a `done` record ends the generation.
    fn accept(&mut self, records: impl IntoIterator<Item = StreamRecord>) {
        for record in records {
            if self.finished {
                break;
            }
            if let Some(text) = record.text() {
                self.pending.push_back(text.to_string());
            }
            if record.done {
                tracing::debug!("Backend signalled done");
                self.finished = true;
            }
        }
    }
}

/// Turn a raw NDJSON body into the text fragments it carries.
///
/// Text is yielded exactly as received, in order. A body error is yielded
/// once and ends the stream.
pub fn token_stream<S, B, E>(body: S) -> impl Stream<Item = Result<String, LlmError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    let state = PumpState {
        body: Box::pin(body),
        decoder: NdjsonDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(text) = st.pending.pop_front() {
                return Some((Ok(text), st));
            }
            if st.finished {
                return None;
            }
            match st.body.next().await {
                Some(Ok(chunk)) => {
                    let records = st.decoder.push(chunk.as_ref());
                    st.accept(records);
                }
                Some(Err(e)) => {
                    st.finished = true;
                    return Some((Err(LlmError::StreamInterrupted(e.to_string())), st));
                }
                None => {
                    let last = st.decoder.finish();
                    st.accept(last);
                    st.finished = true;
                }
            }
        }
    })
}
