//! Error types for the alert engine and the rule seed loader.

use std::path::PathBuf;

/// Boxed error returned by rule, sample and event adapters.
pub type SourceError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the evaluation pass.
///
/// Only [`EngineError::RuleSource`] escapes a pass; the other variants are
/// scoped to a single rule and are logged and counted inside the pass.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to load enabled rules")]
    RuleSource(#[source] SourceError),

    #[error("failed to query samples")]
    SampleSource(#[source] SourceError),

    #[error("failed to persist alert event")]
    Persistence(#[source] SourceError),
}

/// Failures loading the startup rule seed file.
///
/// Individual invalid rules are not errors; they are skipped and logged.
#[derive(Debug, thiserror::Error)]
pub enum RuleSeedError {
    #[error("failed to read rule seed file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse rule seed file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error while seeding rules")]
    Database(#[from] sqlx::Error),
}
