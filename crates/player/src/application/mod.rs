//! Application layer - session flow on top of the outbound ports.

pub mod session;
pub mod stage;
pub mod text_decoder;

pub use session::{ChatSession, SendOutcome, ERROR_TURN_TEXT};
pub use stage::{InputStage, RelayContext, StageAction};
pub use text_decoder::Utf8StreamDecoder;
