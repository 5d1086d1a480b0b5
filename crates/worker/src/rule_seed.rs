//! Startup seeding of alert rules from a JSON file.
//!
//! The file holds a JSON array of rule definitions:
//!
//! ```json
//! [
//!   {
//!     "name": "checkout cpu high",
//!     "type": "threshold",
//!     "condition": { "metric": "cpu", "operator": "gt", "threshold": 90, "duration": "5m" },
//!     "service": "checkout",
//!     "channels": ["webhook"],
//!     "webhook": "https://hooks.example.com/alerts"
//!   }
//! ]
//! ```
//!
//! Invalid entries are skipped with a warning. Rules whose name already
//! exists are left untouched, so seeding is safe to repeat on every start.

use std::path::Path;

use lightwatch_core::alerting::rules::{RuleDefinition, ValidatedRule};
use lightwatch_db::models::alert_rule::CreateAlertRule;
use lightwatch_db::repositories::AlertRuleRepo;
use lightwatch_db::DbPool;

use crate::error::RuleSeedError;

/// Counts from one seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub existing: usize,
    pub invalid: usize,
}

/// Read and validate a seed file.
///
/// Returns the valid rules and the number of entries that failed
/// validation.
pub fn load_rule_seed(path: &Path) -> Result<(Vec<ValidatedRule>, usize), RuleSeedError> {
    let contents = std::fs::read_to_string(path).map_err(|source| RuleSeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let definitions: Vec<RuleDefinition> =
        serde_json::from_str(&contents).map_err(|source| RuleSeedError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(validate_definitions(definitions))
}

/// Validate each definition, dropping and logging the invalid ones.
pub fn validate_definitions(definitions: Vec<RuleDefinition>) -> (Vec<ValidatedRule>, usize) {
    let mut valid = Vec::with_capacity(definitions.len());
    let mut invalid = 0usize;

    for (index, definition) in definitions.into_iter().enumerate() {
        let name = definition.name.clone();
        match definition.validate_rule() {
            Ok(rule) => valid.push(rule),
            Err(e) => {
                invalid += 1;
                tracing::warn!(index, name = %name, error = %e, "Skipping invalid seed rule");
            }
        }
    }

    (valid, invalid)
}

/// Insert the rules whose names are not yet present.
pub async fn seed_rules(
    pool: &DbPool,
    rules: Vec<ValidatedRule>,
) -> Result<SeedSummary, RuleSeedError> {
    let mut summary = SeedSummary::default();

    for rule in rules {
        if AlertRuleRepo::find_by_name(pool, &rule.name).await?.is_some() {
            tracing::debug!(name = %rule.name, "Seed rule already exists, skipping");
            summary.existing += 1;
            continue;
        }

        let created = AlertRuleRepo::create(pool, &CreateAlertRule::from(rule)).await?;
        tracing::info!(
            rule_id = created.id,
            name = %created.name,
            detection_type = %created.detection_type,
            "Seeded alert rule"
        );
        summary.inserted += 1;
    }

    Ok(summary)
}

/// Load `path` and seed its rules into the database.
pub async fn seed_from_file(pool: &DbPool, path: &Path) -> Result<SeedSummary, RuleSeedError> {
    let (rules, invalid) = load_rule_seed(path)?;
    let mut summary = seed_rules(pool, rules).await?;
    summary.invalid = invalid;

    tracing::info!(
        path = %path.display(),
        inserted = summary.inserted,
        existing = summary.existing,
        invalid = summary.invalid,
        "Rule seed applied"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use lightwatch_core::alerting::condition::CompareOp;
    use lightwatch_core::alerting::strategy::DetectionType;
    use std::io::Write;

    fn write_seed(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn loads_valid_rules_with_defaults() {
        let file = write_seed(
            r#"[
                {
                    "name": "cpu high",
                    "condition": {
                        "metric": "cpu", "operator": "gt", "threshold": 90, "duration": "5m"
                    },
                    "service": "svc1",
                    "webhook": "https://hooks.example.com/a"
                }
            ]"#,
        );

        let (rules, invalid) = load_rule_seed(file.path()).unwrap();
        assert_eq!(invalid, 0);
        assert_eq!(rules.len(), 1);

        let rule = &rules[0];
        assert_eq!(rule.name, "cpu high");
        assert_eq!(rule.detection_type, DetectionType::Threshold);
        assert_eq!(rule.operator, CompareOp::Gt);
        assert_eq!(rule.threshold, 90.0);
        assert_eq!(rule.duration.as_deref(), Some("5m"));
        assert!(rule.enabled);
        assert_eq!(rule.webhook.as_deref(), Some("https://hooks.example.com/a"));
    }

    #[test]
    fn invalid_entries_are_counted_and_skipped() {
        let file = write_seed(
            r#"[
                { "name": "ok",
                  "condition": { "metric": "cpu", "operator": "lt", "threshold": 1 } },
                { "name": "bad op",
                  "condition": { "metric": "cpu", "operator": "neq", "threshold": 1 } },
                { "name": "no metric",
                  "condition": { "metric": "", "operator": "gt", "threshold": 1 } },
                { "name": "bad type", "type": "magic",
                  "condition": { "metric": "cpu", "operator": "gt", "threshold": 1 } }
            ]"#,
        );

        let (rules, invalid) = load_rule_seed(file.path()).unwrap();
        assert_eq!(invalid, 3);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].name, "ok");
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let file = write_seed("{ not json");
        assert_matches!(load_rule_seed(file.path()), Err(RuleSeedError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        assert_matches!(load_rule_seed(&path), Err(RuleSeedError::Read { .. }));
    }

    #[test]
    fn empty_array_yields_nothing() {
        let file = write_seed("[]");
        let (rules, invalid) = load_rule_seed(file.path()).unwrap();
        assert!(rules.is_empty());
        assert_eq!(invalid, 0);
    }
}
