//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::LlmStreamPort;
use crate::use_cases::relay::{RelayChat, RelayUseCases};

/// Main application state.
///
/// Passed to HTTP handlers via Axum state.
pub struct App {
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub relay: RelayUseCases,
}

impl App {
    /// Create a new App with all dependencies wired up.
    pub fn new(llm: Arc<dyn LlmStreamPort>) -> Self {
        let relay = RelayUseCases::new(Arc::new(RelayChat::new(llm)));

        Self {
            use_cases: UseCases { relay },
        }
    }
}
