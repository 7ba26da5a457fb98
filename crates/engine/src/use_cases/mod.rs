//! Use cases - User story orchestration.

pub mod relay;

pub use relay::RelayUseCases;
