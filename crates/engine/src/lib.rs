//! StreamChat Engine library.
//!
//! The relay between chat clients and an Ollama backend.
//!
//! ## Structure
//!
//! - `use_cases/` - Relay orchestration
//! - `infrastructure/` - External dependency implementations (ports + adapters)
//! - `api/` - HTTP entry points
//! - `app` - Application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
