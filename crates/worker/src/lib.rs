//! `lightwatch-worker` library crate.
//!
//! Houses the alert engine and its wiring. The binary entrypoint lives in
//! `main.rs`; modules are public for integration testing.

pub mod config;
pub mod engine;
pub mod error;
pub mod notifier;
pub mod rule_seed;
pub mod sources;
pub mod store;

pub use engine::{AlertEngine, EngineHandle, PassSummary, RuleOutcome};
pub use error::{EngineError, RuleSeedError, SourceError};
