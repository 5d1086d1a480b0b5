//! Comparison operators and the breach predicate.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Comparison applied between an observed value and a rule's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Gt,
    Gte,
    Lt,
    Lte,
    /// Exact floating-point equality, no tolerance.
    Eq,
}

impl CompareOp {
    /// Every operator a rule may use.
    pub const ALL: [CompareOp; 5] = [Self::Gt, Self::Gte, Self::Lt, Self::Lte, Self::Eq];

    /// Wire name stored on the rule (`"gt"`, `"gte"`, ...).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Eq => "eq",
        }
    }

    /// Whether `value` satisfies this operator against `threshold`.
    pub fn check(self, value: f64, threshold: f64) -> bool {
        match self {
            Self::Gt => value > threshold,
            Self::Gte => value >= threshold,
            Self::Lt => value < threshold,
            Self::Lte => value <= threshold,
            Self::Eq => value == threshold,
        }
    }
}

impl FromStr for CompareOp {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gt" => Ok(Self::Gt),
            "gte" => Ok(Self::Gte),
            "lt" => Ok(Self::Lt),
            "lte" => Ok(Self::Lte),
            "eq" => Ok(Self::Eq),
            other => Err(CoreError::Validation(format!(
                "unknown comparison operator '{other}' (expected gt, gte, lt, lte or eq)"
            ))),
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate the breach predicate for a raw operator string.
///
/// Unknown operators never breach. A malformed rule is silently inert at
/// evaluation time rather than an error.
pub fn is_breached(value: f64, operator: &str, threshold: f64) -> bool {
    operator
        .parse::<CompareOp>()
        .map(|op| op.check(value, threshold))
        .unwrap_or(false)
}
