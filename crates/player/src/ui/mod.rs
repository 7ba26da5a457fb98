//! Terminal front-end.

pub mod terminal;

pub use terminal::TerminalView;
