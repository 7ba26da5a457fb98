//! Terminal transcript view
//!
//! Prints each turn once. While a turn streams, only the newly appended text
//! is written so the reply grows in place on the current line.

use std::io::{IsTerminal, Write};

use streamchat_domain::ChatTurn;

use crate::ports::outbound::TranscriptView;

/// Trails the turn that is still streaming
const STREAMING_MARKER: &str = " \u{25cf}";

/// Steps back over the marker and clears to end of line
const ERASE_MARKER: &str = "\u{8}\u{8}\x1b[K";

pub struct TerminalView<W: Write + Send> {
    out: W,
    /// Turns fully written, newline included
    printed: usize,
    /// Text already written for the open streaming turn
    shown: Option<String>,
    marker: bool,
}

impl TerminalView<std::io::Stdout> {
    /// Stdout view; the streaming marker is only drawn on a terminal.
    pub fn stdout() -> Self {
        let out = std::io::stdout();
        let on_terminal = out.is_terminal();
        let view = Self::new(out);
        if on_terminal {
            view.with_streaming_marker()
        } else {
            view
        }
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            printed: 0,
            shown: None,
            marker: false,
        }
    }

    /// Draw a marker after the turn in progress, removed when it finishes.
    pub fn with_streaming_marker(mut self) -> Self {
        self.marker = true;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, turns: &[ChatTurn]) -> std::io::Result<()> {
        if turns.len() < self.printed {
            // Transcript was replaced; start over below what is on screen.
            self.printed = 0;
            self.shown = None;
        }

        for turn in &turns[self.printed..] {
            if self.marker && self.shown.is_some() {
                write!(self.out, "{ERASE_MARKER}")?;
            }
            match self.shown.take() {
                Some(shown) if turn.content.starts_with(&shown) => {
                    write!(self.out, "{}", &turn.content[shown.len()..])?;
                }
                Some(_) => {
                    writeln!(self.out)?;
                    write!(self.out, "{}: {}", turn.role.display_name(), turn.content)?;
                }
                None => {
                    write!(self.out, "{}: {}", turn.role.display_name(), turn.content)?;
                }
            }

            if turn.is_streaming {
                if self.marker {
                    write!(self.out, "{STREAMING_MARKER}")?;
                }
                self.shown = Some(turn.content.clone());
                break;
            }
            writeln!(self.out)?;
            self.printed += 1;
        }

        self.out.flush()
    }
}

impl<W: Write + Send> TranscriptView for TerminalView<W> {
    fn transcript_changed(&mut self, turns: &[ChatTurn]) {
        if let Err(e) = self.render(turns) {
            tracing::warn!(error = %e, "Failed to write transcript");
        }
    }
}
