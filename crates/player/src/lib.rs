//! StreamChat Player - streaming transcript client.
//!
//! Sends messages to the relay and renders the reply as it streams in,
//! optionally behind the story dialogue.

pub mod application;
pub mod infrastructure;
pub mod ports;
pub mod ui;
