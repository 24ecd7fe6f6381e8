//! The invariant library - pure functions from extracted values to verdicts
//!
//! No I/O. A failed check is `Ok(Verdict { passed: false, .. })`; `Err` is
//! reserved for malformed comparison input and fails only that single check.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::path::PathExpr;

use super::{InvariantError, Offender, Verdict, VerdictDetails};

/// Sort direction for ordering checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Ascending,
    Descending,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ascending => write!(f, "ascending"),
            Self::Descending => write!(f, "descending"),
        }
    }
}

/// JSON type tag, for type-conformance predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JsonType {
    Null,
    Boolean,
    Number,
    String,
    Array,
    Object,
}

impl JsonType {
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(_) => Self::Boolean,
            Value::Number(_) => Self::Number,
            Value::String(_) => Self::String,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::String => "string",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Element predicate for `all_satisfy`. This is the resolved form: binding
/// references have already been replaced by concrete values.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    NonNull,
    /// Null, `""`, `[]`, and `{}` are empty; everything else is not.
    NonEmpty,
    TypeIs(JsonType),
    Equals(Value),
    OneOf(Vec<Value>),
    AtMost(Value),
    AtLeast(Value),
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NonNull => write!(f, "non-null"),
            Self::NonEmpty => write!(f, "non-empty"),
            Self::TypeIs(t) => write!(f, "of type {t}"),
            Self::Equals(v) => write!(f, "equal to {v}"),
            Self::OneOf(vs) => write!(f, "one of {}", render_set(vs)),
            Self::AtMost(v) => write!(f, "at most {v}"),
            Self::AtLeast(v) => write!(f, "at least {v}"),
        }
    }
}

impl Predicate {
    /// Whether `value` satisfies this predicate.
    ///
    /// # Errors
    ///
    /// `AtMost`/`AtLeast` against a value of a non-orderable type is an
    /// `InvariantError`.
    pub fn holds(&self, value: &Value) -> Result<bool, InvariantError> {
        Ok(match self {
            Self::NonNull => !value.is_null(),
            Self::NonEmpty => !is_empty(value),
            Self::TypeIs(t) => JsonType::of(value) == *t,
            Self::Equals(expected) => value == expected,
            Self::OneOf(allowed) => allowed.contains(value),
            Self::AtMost(bound) => compare_scalars(value, bound)? != Ordering::Greater,
            Self::AtLeast(bound) => compare_scalars(value, bound)? != Ordering::Less,
        })
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Order two scalars: numbers numerically, strings lexicographically.
/// Anything else (or a mixed pair) is malformed comparison input.
pub fn compare_scalars(left: &Value, right: &Value) -> Result<Ordering, InvariantError> {
    let incomparable = || InvariantError::Incomparable {
        left: JsonType::of(left).to_string(),
        right: JsonType::of(right).to_string(),
    };

    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            match (a, b) {
                (Some(a), Some(b)) => a.partial_cmp(&b).ok_or_else(incomparable),
                _ => Err(incomparable()),
            }
        }
        (Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
        _ => Err(incomparable()),
    }
}

/// Canonical multiset key: serialized JSON already distinguishes types
/// (`"5"` vs `5`, `true` vs `"true"`).
fn key_of(value: &Value) -> String {
    value.to_string()
}

fn render_set(values: &[Value]) -> String {
    let rendered: Vec<String> = values.iter().map(ToString::to_string).collect();
    format!("[{}]", rendered.join(", "))
}

// ── Invariants ──

/// Passes iff every value is distinct. Details list every duplicated value.
#[must_use]
pub fn unique(values: &[Value]) -> Verdict {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for v in values {
        *counts.entry(key_of(v)).or_default() += 1;
    }

    let mut duplicates = Vec::new();
    let mut seen: HashMap<String, ()> = HashMap::new();
    for v in values {
        let k = key_of(v);
        if counts[&k] > 1 && seen.insert(k, ()).is_none() {
            duplicates.push(v.clone());
        }
    }

    if duplicates.is_empty() {
        Verdict::pass(format!("{} values, all distinct", values.len()))
    } else {
        Verdict::fail_with(
            format!(
                "{} duplicated values among {}: {}",
                duplicates.len(),
                values.len(),
                render_set(&duplicates)
            ),
            VerdictDetails::Duplicates { values: duplicates },
        )
    }
}

/// Passes iff adjacent pairs respect `direction`. Ties are allowed unless
/// `strict`. `key` optionally projects each element before comparison.
///
/// # Errors
///
/// Non-comparable adjacent elements, or a `key` that does not resolve to a
/// scalar, are malformed input.
pub fn sorted(
    values: &[Value],
    direction: Direction,
    strict: bool,
    key: Option<&PathExpr>,
) -> Result<Verdict, InvariantError> {
    let mut keys = Vec::with_capacity(values.len());
    for (index, element) in values.iter().enumerate() {
        let k = match key {
            None => element.clone(),
            Some(expr) => expr
                .extract(element)
                .and_then(|e| e.as_one().cloned())
                .ok_or_else(|| InvariantError::KeyMiss {
                    key: expr.raw().to_string(),
                    index,
                })?,
        };
        keys.push(k);
    }

    for (index, pair) in keys.windows(2).enumerate() {
        let ord = compare_scalars(&pair[0], &pair[1])?;
        let violated = match (direction, strict) {
            (Direction::Ascending, false) => ord == Ordering::Greater,
            (Direction::Ascending, true) => ord != Ordering::Less,
            (Direction::Descending, false) => ord == Ordering::Less,
            (Direction::Descending, true) => ord != Ordering::Greater,
        };
        if violated {
            return Ok(Verdict::fail_with(
                format!(
                    "not sorted {direction}: {} before {} at index {index}",
                    pair[0], pair[1]
                ),
                VerdictDetails::OrderViolation {
                    index,
                    left: pair[0].clone(),
                    right: pair[1].clone(),
                },
            ));
        }
    }

    Ok(Verdict::pass(format!(
        "{} values sorted {direction}",
        values.len()
    )))
}

/// Passes iff both sequences hold the same multiset of values, order
/// ignored. Details report the symmetric difference.
#[must_use]
pub fn set_equals(left: &[Value], right: &[Value]) -> Verdict {
    let only_left = multiset_excess(left, right);
    let only_right = multiset_excess(right, left);

    if only_left.is_empty() && only_right.is_empty() {
        Verdict::pass(format!("both sides hold the same {} values", left.len()))
    } else {
        Verdict::fail_with(
            format!(
                "multisets differ: {} only on the left {}, {} only on the right {}",
                only_left.len(),
                render_set(&only_left),
                only_right.len(),
                render_set(&only_right)
            ),
            VerdictDetails::SymmetricDifference {
                only_left,
                only_right,
            },
        )
    }
}

/// Occurrences of `a` not matched by an occurrence in `b`, in `a`'s order.
fn multiset_excess(a: &[Value], b: &[Value]) -> Vec<Value> {
    let mut available: HashMap<String, usize> = HashMap::new();
    for v in b {
        *available.entry(key_of(v)).or_default() += 1;
    }

    let mut excess = Vec::new();
    for v in a {
        let k = key_of(v);
        match available.get_mut(&k) {
            Some(n) if *n > 0 => *n -= 1,
            _ => excess.push(v.clone()),
        }
    }
    excess
}

/// Passes iff every element of `candidate` appears in `superset`.
/// Trivially true for an empty candidate.
#[must_use]
pub fn subset(candidate: &[Value], superset: &[Value]) -> Verdict {
    let mut present: HashMap<String, ()> = HashMap::new();
    for v in superset {
        present.insert(key_of(v), ());
    }

    let mut missing = Vec::new();
    let mut reported: HashMap<String, ()> = HashMap::new();
    for v in candidate {
        let k = key_of(v);
        if !present.contains_key(&k) && reported.insert(k, ()).is_none() {
            missing.push(v.clone());
        }
    }

    if missing.is_empty() {
        Verdict::pass(format!(
            "all {} elements present in the superset",
            candidate.len()
        ))
    } else {
        Verdict::fail_with(
            format!(
                "{} elements missing from the superset: {}",
                missing.len(),
                render_set(&missing)
            ),
            VerdictDetails::MissingElements { values: missing },
        )
    }
}

/// Passes iff the sequence length equals `expected`.
#[must_use]
pub fn count_equals(values: &[Value], expected: usize) -> Verdict {
    let actual = values.len();
    if actual == expected {
        Verdict::pass(format!("count is {actual}"))
    } else {
        Verdict::fail_with(
            format!("expected {expected} items, got {actual}"),
            VerdictDetails::CountMismatch { expected, actual },
        )
    }
}

/// Passes iff `predicate` holds for every element. Collects ALL failing
/// elements so the verdict explains every offender, not just the first.
///
/// # Errors
///
/// Propagates comparison errors from ordering predicates.
pub fn all_satisfy(values: &[Value], predicate: &Predicate) -> Result<Verdict, InvariantError> {
    let mut offenders = Vec::new();
    for (index, value) in values.iter().enumerate() {
        if !predicate.holds(value)? {
            offenders.push(Offender {
                index,
                value: value.clone(),
            });
        }
    }

    if offenders.is_empty() {
        Ok(Verdict::pass(format!(
            "all {} elements are {predicate}",
            values.len()
        )))
    } else {
        let rendered: Vec<String> = offenders
            .iter()
            .map(|o| format!("[{}] {}", o.index, o.value))
            .collect();
        Ok(Verdict::fail_with(
            format!(
                "{} of {} elements are not {predicate}: {}",
                offenders.len(),
                values.len(),
                rendered.join(", ")
            ),
            VerdictDetails::Offenders { offenders },
        ))
    }
}

/// Passes iff `value` is present in `allowed` (exact value equality).
#[must_use]
pub fn member_of(value: &Value, allowed: &[Value]) -> Verdict {
    if allowed.contains(value) {
        Verdict::pass(format!("{value} is in the allowed set"))
    } else {
        Verdict::fail(format!("{value} is not in {}", render_set(allowed)))
    }
}

/// Passes iff every element's JSON type is boolean - not merely truthy.
#[must_use]
pub fn boolean_typed(values: &[Value]) -> Verdict {
    let offenders: Vec<Offender> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_boolean())
        .map(|(index, v)| Offender {
            index,
            value: v.clone(),
        })
        .collect();

    if offenders.is_empty() {
        Verdict::pass(format!("all {} values are booleans", values.len()))
    } else {
        let rendered: Vec<String> = offenders
            .iter()
            .map(|o| format!("[{}] {}", o.index, o.value))
            .collect();
        Verdict::fail_with(
            format!(
                "{} of {} values are not booleans: {}",
                offenders.len(),
                values.len(),
                rendered.join(", ")
            ),
            VerdictDetails::Offenders { offenders },
        )
    }
}
