//! Verdict types - the pass/fail outcome of one invariant evaluation

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of evaluating one invariant.
///
/// A false result is a value, not an error: invariants never throw for a
/// failed check, only for malformed comparison input (`InvariantError`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub passed: bool,
    /// Human-readable explanation; on failure it names every offender class.
    pub message: String,
    /// Structured diff for reporters that want more than text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<VerdictDetails>,
}

impl Verdict {
    #[must_use]
    pub fn pass(message: impl Into<String>) -> Self {
        Self {
            passed: true,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: None,
        }
    }

    #[must_use]
    pub fn fail_with(message: impl Into<String>, details: VerdictDetails) -> Self {
        Self {
            passed: false,
            message: message.into(),
            details: Some(details),
        }
    }
}

/// Structured failure detail, one shape per invariant family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerdictDetails {
    /// Every value that occurs more than once, first-occurrence order.
    Duplicates { values: Vec<serde_json::Value> },
    /// First adjacent pair violating the declared order.
    OrderViolation {
        index: usize,
        left: serde_json::Value,
        right: serde_json::Value,
    },
    /// Multiset symmetric difference.
    SymmetricDifference {
        only_left: Vec<serde_json::Value>,
        only_right: Vec<serde_json::Value>,
    },
    /// Elements of the candidate absent from the superset.
    MissingElements { values: Vec<serde_json::Value> },
    CountMismatch { expected: usize, actual: usize },
    /// Every element that failed the predicate, with its index.
    Offenders { offenders: Vec<Offender> },
}

/// One predicate-failing element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Offender {
    pub index: usize,
    pub value: serde_json::Value,
}

/// Malformed invariant input - fatal to the single check, never to the run.
#[derive(Debug, Clone, thiserror::Error)]
pub enum InvariantError {
    #[error("cannot order {left} against {right}")]
    Incomparable { left: String, right: String },
    #[error("sort key {key:?} did not resolve at index {index}")]
    KeyMiss { key: String, index: usize },
    #[error("expected count is not a non-negative integer: {0}")]
    BadCount(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_has_no_details() {
        let v = Verdict::pass("all good");
        assert!(v.passed);
        assert!(v.details.is_none());
    }

    #[test]
    fn fail_with_carries_details() {
        let v = Verdict::fail_with(
            "count mismatch",
            VerdictDetails::CountMismatch {
                expected: 3,
                actual: 2,
            },
        );
        assert!(!v.passed);
        assert!(matches!(
            v.details,
            Some(VerdictDetails::CountMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn verdict_serialization_roundtrip() {
        let v = Verdict::fail_with(
            "dupes",
            VerdictDetails::Duplicates {
                values: vec![serde_json::json!("a")],
            },
        );
        let json = serde_json::to_string(&v).unwrap();
        let parsed: Verdict = serde_json::from_str(&json).unwrap();
        assert_eq!(v, parsed);
    }

    #[test]
    fn details_tagged_by_kind() {
        let v = Verdict::fail_with(
            "offenders",
            VerdictDetails::Offenders {
                offenders: vec![Offender {
                    index: 2,
                    value: serde_json::json!("x"),
                }],
            },
        );
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["details"]["kind"], "offenders");
        assert_eq!(json["details"]["offenders"][0]["index"], 2);
    }
}
