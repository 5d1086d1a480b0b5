//! Detection strategies.
//!
//! Every strategy receives the same input: the rule's condition and the
//! samples fetched for its window, newest first. Only
//! [`DetectionType::Threshold`] is implemented; `rate_change` and `anomaly`
//! are accepted on rules but never breach.

use std::fmt;
use std::str::FromStr;

use crate::alerting::condition::is_breached;
use crate::error::CoreError;

/// Detection strategy named on a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetectionType {
    #[default]
    Threshold,
    RateChange,
    Anomaly,
}

impl DetectionType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Threshold => "threshold",
            Self::RateChange => "rate_change",
            Self::Anomaly => "anomaly",
        }
    }

    /// Whether this strategy produces breaches today.
    pub fn is_implemented(self) -> bool {
        matches!(self, Self::Threshold)
    }

    /// Evaluate `condition` against `values`, ordered newest first.
    ///
    /// Returns the breach, if any. An empty slice never breaches.
    pub fn evaluate(self, condition: &Condition<'_>, values: &[f64]) -> Option<Breach> {
        match self {
            Self::Threshold => evaluate_threshold(condition, values),
            // Reserved: these need the full window and have no semantics yet.
            Self::RateChange | Self::Anomaly => None,
        }
    }
}

impl FromStr for DetectionType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "threshold" => Ok(Self::Threshold),
            "rate_change" => Ok(Self::RateChange),
            "anomaly" => Ok(Self::Anomaly),
            other => Err(CoreError::Validation(format!(
                "unknown detection type '{other}' (expected threshold, rate_change or anomaly)"
            ))),
        }
    }
}

impl fmt::Display for DetectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The comparison a rule tests.
#[derive(Debug, Clone, Copy)]
pub struct Condition<'a> {
    pub operator: &'a str,
    pub threshold: f64,
}

/// A breached condition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breach {
    /// Index into the evaluated slice of the sample that breached.
    pub sample_index: usize,
    /// Observed value of that sample.
    pub value: f64,
}

/// Threshold strategy: compare only the newest value.
fn evaluate_threshold(condition: &Condition<'_>, values: &[f64]) -> Option<Breach> {
    let newest = *values.first()?;
    is_breached(newest, condition.operator, condition.threshold).then_some(Breach {
        sample_index: 0,
        value: newest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn cond(operator: &str, threshold: f64) -> Condition<'_> {
        Condition {
            operator,
            threshold,
        }
    }

    #[test]
    fn threshold_breaches_on_newest_value() {
        let breach = DetectionType::Threshold.evaluate(&cond("gt", 90.0), &[95.0, 10.0, 20.0]);
        assert_eq!(
            breach,
            Some(Breach {
                sample_index: 0,
                value: 95.0
            })
        );
    }

    #[test]
    fn threshold_ignores_older_values() {
        // Older samples breach, newest does not.
        let breach = DetectionType::Threshold.evaluate(&cond("gt", 90.0), &[80.0, 99.0, 99.0]);
        assert!(breach.is_none());
    }

    #[test]
    fn threshold_no_data_never_breaches() {
        assert!(DetectionType::Threshold.evaluate(&cond("gt", 0.0), &[]).is_none());
    }

    #[test]
    fn threshold_unknown_operator_never_breaches() {
        for value in [-1.0, 0.0, 95.0, 1e12] {
            assert!(DetectionType::Threshold
                .evaluate(&cond("neq", 90.0), &[value])
                .is_none());
        }
    }

    #[test]
    fn reserved_strategies_never_breach() {
        for strategy in [DetectionType::RateChange, DetectionType::Anomaly] {
            assert!(!strategy.is_implemented());
            assert!(strategy.evaluate(&cond("gt", 0.0), &[100.0, 1.0]).is_none());
        }
    }

    #[test]
    fn defaults_to_threshold() {
        assert_eq!(DetectionType::default(), DetectionType::Threshold);
    }

    #[test]
    fn parses_known_names() {
        assert_eq!("threshold".parse::<DetectionType>().unwrap(), DetectionType::Threshold);
        assert_eq!("rate_change".parse::<DetectionType>().unwrap(), DetectionType::RateChange);
        assert_eq!("anomaly".parse::<DetectionType>().unwrap(), DetectionType::Anomaly);
        assert_matches!("spike".parse::<DetectionType>(), Err(CoreError::Validation(_)));
    }
}
