//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod alert_event_repo;
pub mod alert_rule_repo;
pub mod metric_sample_repo;

pub use alert_event_repo::AlertEventRepo;
pub use alert_rule_repo::AlertRuleRepo;
pub use metric_sample_repo::MetricSampleRepo;

/// Upper bound on rows returned by any list query.
pub const MAX_LIMIT: i64 = 500;

/// Bound `limit` to `[1, MAX_LIMIT]`, using `default` for non-positive input.
pub(crate) fn clamp_limit(limit: i64, default: i64) -> i64 {
    if limit <= 0 {
        default
    } else {
        limit.min(MAX_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_defaults_non_positive() {
        assert_eq!(clamp_limit(0, 100), 100);
        assert_eq!(clamp_limit(-3, 20), 20);
    }

    #[test]
    fn clamp_limit_caps_at_max() {
        assert_eq!(clamp_limit(10_000, 100), MAX_LIMIT);
        assert_eq!(clamp_limit(100, 50), 100);
    }
}
