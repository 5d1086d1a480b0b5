//! Alert rule evaluation logic.
//!
//! Pure logic only. The worker fetches rules and samples, then calls into
//! this module to resolve lookback windows and decide whether a rule's
//! condition is breached.

pub mod condition;
pub mod rules;
pub mod status;
pub mod strategy;
pub mod window;

/// Maximum number of samples fetched per rule per pass.
///
/// The threshold strategy only looks at the newest sample, but the fetch
/// contract (newest-first, bounded) is shared by every strategy.
pub const SAMPLE_FETCH_LIMIT: i64 = 100;
