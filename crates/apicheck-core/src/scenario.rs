//! Scenario model - contract checks as data, not code
//!
//! A suite file (TOML, YAML, or JSON) declares named scenarios. Each scenario
//! is an ordered chain of steps: issue a request, extract values out of the
//! response, check invariants, and bind values for later steps. Later steps
//! reference earlier bindings with `{{name}}` in any request template value.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::invariant::{Direction, JsonType, Predicate};
use crate::path::PathExpr;

/// A suite: one file, many scenarios.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Suite {
    #[serde(default)]
    pub scenarios: Vec<Scenario>,
}

/// An ordered chain of request/extract/check steps.
///
/// A scenario owns its steps; execution state lives in the runner, so the
/// same declaration can seed any number of independent runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub steps: Vec<Step>,
}

/// One step of a scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Step {
    pub request: RequestTemplate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expect: Option<Expectations>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extract: Vec<Extraction>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub check: Vec<CheckSpec>,
}

impl Step {
    /// Binding names this step consumes, in reference order, deduplicated.
    #[must_use]
    pub fn consumed_bindings(&self) -> Vec<String> {
        let mut names = Vec::new();
        let mut push = |name: String| {
            if !names.contains(&name) {
                names.push(name);
            }
        };

        for value in std::iter::once(&self.request.path)
            .chain(self.request.path_params.values())
            .chain(self.request.query.values())
            .chain(self.request.headers.values())
        {
            for name in binding_refs(value) {
                push(name);
            }
        }
        for check in &self.check {
            for name in check.consumed_bindings() {
                push(name.to_string());
            }
        }
        names
    }

    /// Binding names this step produces.
    #[must_use]
    pub fn produced_bindings(&self) -> Vec<&str> {
        self.extract.iter().map(|e| e.bind.as_str()).collect()
    }
}

/// Request template. Every value may interpolate `{{binding}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestTemplate {
    #[serde(default = "default_method")]
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub path_params: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

impl RequestTemplate {
    /// Operation label for reports: `"GET /orgs/{org}"`.
    #[must_use]
    pub fn operation(&self) -> String {
        format!("{} {}", self.method, self.path)
    }
}

fn default_method() -> String {
    "GET".to_string()
}

/// Response-level expectations, each evaluated into a verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expectations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Compared on the media type only; parameters such as charset ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Substring of the HTTP reason phrase, e.g. "Unauthorized".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_text_contains: Option<String>,
}

/// Bind a value extracted from the response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Extraction {
    pub bind: String,
    pub path: PathExpr,
    /// Bind one random element of a sequence result instead of the sequence.
    #[serde(default)]
    pub sample: bool,
}

/// One invariant applied to values from the current response (`path`) or a
/// previously bound value (`binding`). Exactly one source must be given.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathExpr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    #[serde(flatten)]
    pub invariant: InvariantSpec,
}

impl CheckSpec {
    /// Label for reports: `"unique on *.id"`.
    #[must_use]
    pub fn label(&self) -> String {
        let source = match (&self.path, &self.binding) {
            (Some(p), _) if p.raw().is_empty() => "body".to_string(),
            (Some(p), _) => p.raw().to_string(),
            (None, Some(b)) => format!("binding {b}"),
            (None, None) => "?".to_string(),
        };
        format!("{} on {source}", self.invariant.kind_label())
    }

    /// Bindings referenced by the source and the invariant arguments.
    #[must_use]
    pub fn consumed_bindings(&self) -> Vec<&str> {
        let mut names = Vec::new();
        if let Some(b) = &self.binding {
            names.push(b.as_str());
        }
        match &self.invariant {
            InvariantSpec::SetEquals { other: r }
            | InvariantSpec::Subset { superset: r }
            | InvariantSpec::CountEquals { expected: r } => {
                if let Some(b) = r.binding_name() {
                    names.push(b);
                }
            }
            InvariantSpec::AllSatisfy { predicate } => {
                if let Some(b) = predicate.binding_name() {
                    names.push(b);
                }
            }
            InvariantSpec::Unique
            | InvariantSpec::Sorted { .. }
            | InvariantSpec::MemberOf { .. }
            | InvariantSpec::BooleanTyped => {}
        }
        names
    }
}

/// The declarative invariant grammar.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InvariantSpec {
    Unique,
    Sorted {
        direction: Direction,
        #[serde(default)]
        strict: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        key: Option<PathExpr>,
    },
    SetEquals {
        other: ValueRef,
    },
    Subset {
        superset: ValueRef,
    },
    CountEquals {
        expected: ValueRef,
    },
    AllSatisfy {
        predicate: PredicateSpec,
    },
    MemberOf {
        allowed: Vec<Value>,
    },
    BooleanTyped,
}

impl InvariantSpec {
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Unique => "unique",
            Self::Sorted { .. } => "sorted",
            Self::SetEquals { .. } => "set_equals",
            Self::Subset { .. } => "subset",
            Self::CountEquals { .. } => "count_equals",
            Self::AllSatisfy { .. } => "all_satisfy",
            Self::MemberOf { .. } => "member_of",
            Self::BooleanTyped => "boolean_typed",
        }
    }
}

/// A literal value or a reference to a binding from an earlier step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ValueRef {
    Binding { binding: String },
    Literal { value: Value },
}

impl ValueRef {
    #[must_use]
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Self::Binding { binding } => Some(binding),
            Self::Literal { .. } => None,
        }
    }

    /// Resolve to a concrete value.
    ///
    /// # Errors
    ///
    /// Referencing an absent binding is a `BindingError`.
    pub fn resolve(&self, bindings: &HashMap<String, Value>) -> Result<Value, BindingError> {
        match self {
            Self::Literal { value } => Ok(value.clone()),
            Self::Binding { binding } => bindings
                .get(binding)
                .cloned()
                .ok_or_else(|| BindingError(binding.clone())),
        }
    }
}

/// Declarative predicate for `all_satisfy`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PredicateSpec {
    NonNull,
    NonEmpty,
    TypeIs {
        #[serde(rename = "type")]
        json_type: JsonType,
    },
    Equals {
        value: ValueRef,
    },
    OneOf {
        allowed: Vec<Value>,
    },
    AtMost {
        value: ValueRef,
    },
    AtLeast {
        value: ValueRef,
    },
}

impl PredicateSpec {
    #[must_use]
    pub fn binding_name(&self) -> Option<&str> {
        match self {
            Self::Equals { value } | Self::AtMost { value } | Self::AtLeast { value } => {
                value.binding_name()
            }
            Self::NonNull | Self::NonEmpty | Self::TypeIs { .. } | Self::OneOf { .. } => None,
        }
    }

    /// Resolve binding references into a concrete predicate.
    ///
    /// # Errors
    ///
    /// Referencing an absent binding is a `BindingError`.
    pub fn resolve(&self, bindings: &HashMap<String, Value>) -> Result<Predicate, BindingError> {
        Ok(match self {
            Self::NonNull => Predicate::NonNull,
            Self::NonEmpty => Predicate::NonEmpty,
            Self::TypeIs { json_type } => Predicate::TypeIs(*json_type),
            Self::Equals { value } => Predicate::Equals(value.resolve(bindings)?),
            Self::OneOf { allowed } => Predicate::OneOf(allowed.clone()),
            Self::AtMost { value } => Predicate::AtMost(value.resolve(bindings)?),
            Self::AtLeast { value } => Predicate::AtLeast(value.resolve(bindings)?),
        })
    }
}

/// A later step required a binding no earlier step produced.
/// Fatal to the scenario.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("binding {0:?} was never produced by an earlier step")]
pub struct BindingError(pub String);

// ── Binding interpolation ──

/// Substitute every `{{name}}` in `template` from `bindings`. String values
/// render bare, everything else as JSON.
///
/// # Errors
///
/// Referencing an absent binding is a `BindingError`.
pub fn interpolate(
    template: &str,
    bindings: &HashMap<String, Value>,
) -> Result<String, BindingError> {
    let mut out = String::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            // Unterminated marker stays literal.
            out.push_str(&rest[start..]);
            return Ok(out);
        };
        let name = after[..end].trim();
        let value = bindings
            .get(name)
            .ok_or_else(|| BindingError(name.to_string()))?;
        out.push_str(&render_binding(value));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Binding names referenced by `{{name}}` markers in `template`.
#[must_use]
pub fn binding_refs(template: &str) -> Vec<String> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else { break };
        names.push(after[..end].trim().to_string());
        rest = &after[end + 2..];
    }
    names
}

fn render_binding(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Suite loading ──

#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    #[error("cannot read {0}: {1}")]
    Io(PathBuf, String),
    #[error("invalid suite {0}: {1}")]
    Parse(String, String),
    #[error("suite {file}: scenario {scenario:?}, step {step}: {reason}")]
    Invalid {
        file: String,
        scenario: String,
        step: usize,
        reason: String,
    },
    #[error("suite {file}: duplicate scenario name {name:?}")]
    DuplicateScenario { file: String, name: String },
}

impl Suite {
    /// Load and validate a suite file.
    ///
    /// # Errors
    ///
    /// Returns `SuiteError` if the file cannot be read, parsed, or fails
    /// structural validation.
    pub fn load(path: &Path) -> Result<Self, SuiteError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SuiteError::Io(path.to_path_buf(), e.to_string()))?;
        Self::parse(path, &content)
    }

    /// Parse suite content. Detection strategy: extension first
    /// (`.toml`/`.yaml`/`.yml`/`.json`), then content sniffing (leading `{`
    /// means JSON, otherwise TOML with YAML as fallback).
    ///
    /// # Errors
    ///
    /// Returns `SuiteError::Parse` on malformed content, or a structural
    /// error from validation.
    pub fn parse(path: &Path, content: &str) -> Result<Self, SuiteError> {
        let label = path.display().to_string();
        let parse_err = |e: String| SuiteError::Parse(label.clone(), e);

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let suite: Self = match ext.as_str() {
            "toml" => toml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            "yaml" | "yml" => serde_yml::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            "json" => serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?,
            _ => {
                if content.trim_start().starts_with('{') {
                    serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?
                } else if let Ok(suite) = toml::from_str(content) {
                    suite
                } else {
                    serde_yml::from_str(content).map_err(|e| parse_err(e.to_string()))?
                }
            }
        };

        suite.validate(&label)?;
        Ok(suite)
    }

    fn validate(&self, file: &str) -> Result<(), SuiteError> {
        let mut seen: Vec<&str> = Vec::new();
        for scenario in &self.scenarios {
            if seen.contains(&scenario.name.as_str()) {
                return Err(SuiteError::DuplicateScenario {
                    file: file.to_string(),
                    name: scenario.name.clone(),
                });
            }
            seen.push(&scenario.name);

            if scenario.steps.is_empty() {
                return Err(SuiteError::Invalid {
                    file: file.to_string(),
                    scenario: scenario.name.clone(),
                    step: 0,
                    reason: "scenario has no steps".to_string(),
                });
            }

            for (index, step) in scenario.steps.iter().enumerate() {
                for check in &step.check {
                    match (&check.path, &check.binding) {
                        (Some(_), None) | (None, Some(_)) => {}
                        (None, None) => {
                            return Err(SuiteError::Invalid {
                                file: file.to_string(),
                                scenario: scenario.name.clone(),
                                step: index,
                                reason: format!(
                                    "check {:?} needs a path or a binding source",
                                    check.invariant.kind_label()
                                ),
                            });
                        }
                        (Some(_), Some(_)) => {
                            return Err(SuiteError::Invalid {
                                file: file.to_string(),
                                scenario: scenario.name.clone(),
                                step: index,
                                reason: format!(
                                    "check {:?} has both a path and a binding source",
                                    check.invariant.kind_label()
                                ),
                            });
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// Example suite file content for `apicheck init`.
    #[must_use]
    pub fn example() -> &'static str {
        r#"# apicheck scenario suite
#
# Each scenario is an ordered chain of steps. A step issues one request,
# optionally extracts values out of the response body, and checks invariants
# against them. `{{name}}` in any request value interpolates a binding
# produced by an earlier step (or a [params] entry from the config).

[[scenarios]]
name = "listing-contract"
description = "Listing is complete, ids are unique, owner is consistent"

[[scenarios.steps]]
request = { method = "GET", path = "/orgs/{org}", path_params = { org = "cucumber" } }
expect = { status = 200, content_type = "application/json" }
extract = [
  { bind = "org_id", path = "id" },
  { bind = "repo_count", path = "public_repos" },
]

[[scenarios.steps]]
request = { method = "GET", path = "/orgs/{org}/repos", path_params = { org = "cucumber" }, query = { per_page = "150" } }
expect = { status = 200 }

[[scenarios.steps.check]]
path = "*.id"
kind = "unique"

[[scenarios.steps.check]]
path = ""
kind = "count_equals"
expected = { binding = "repo_count" }

[[scenarios.steps.check]]
path = "*.owner.id"
kind = "all_satisfy"
predicate = { kind = "equals", value = { binding = "org_id" } }
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse_toml(content: &str) -> Suite {
        Suite::parse(Path::new("suite.toml"), content).unwrap()
    }

    // ── parsing ──

    #[test]
    fn example_suite_parses() {
        let suite = parse_toml(Suite::example());
        assert_eq!(suite.scenarios.len(), 1);

        let scenario = &suite.scenarios[0];
        assert_eq!(scenario.name, "listing-contract");
        assert_eq!(scenario.steps.len(), 2);

        let first = &scenario.steps[0];
        assert_eq!(first.request.method, "GET");
        assert_eq!(first.request.path, "/orgs/{org}");
        assert_eq!(first.expect.as_ref().unwrap().status, Some(200));
        assert_eq!(first.extract.len(), 2);
        assert_eq!(first.extract[0].bind, "org_id");

        let second = &scenario.steps[1];
        assert_eq!(second.check.len(), 3);
        assert!(matches!(second.check[0].invariant, InvariantSpec::Unique));
        assert!(matches!(
            &second.check[1].invariant,
            InvariantSpec::CountEquals {
                expected: ValueRef::Binding { binding }
            } if binding == "repo_count"
        ));
    }

    #[test]
    fn parse_yaml_suite() {
        let yaml = r#"
scenarios:
  - name: sorting
    steps:
      - request:
          path: /orgs/{org}/repos
          path_params: { org: cucumber }
          query: { sort: full_name, direction: desc }
        check:
          - path: "*.full_name"
            kind: sorted
            direction: descending
"#;
        let suite = Suite::parse(Path::new("suite.yaml"), yaml).unwrap();
        let check = &suite.scenarios[0].steps[0].check[0];
        assert!(matches!(
            check.invariant,
            InvariantSpec::Sorted {
                direction: Direction::Descending,
                strict: false,
                key: None
            }
        ));
    }

    #[test]
    fn parse_json_suite_by_sniffing() {
        let json_suite = r#"{
            "scenarios": [{
                "name": "enum-membership",
                "steps": [{
                    "request": {"path": "/sortingHat"},
                    "check": [{
                        "path": "",
                        "kind": "member_of",
                        "allowed": ["Gryffindor", "Ravenclaw", "Slytherin", "Hufflepuff"]
                    }]
                }]
            }]
        }"#;
        // No recognized extension: content sniffing takes over.
        let suite = Suite::parse(Path::new("suite"), json_suite).unwrap();
        assert_eq!(suite.scenarios[0].name, "enum-membership");
    }

    #[test]
    fn parse_invalid_toml_is_error() {
        let err = Suite::parse(Path::new("suite.toml"), "scenarios = ").unwrap_err();
        assert!(matches!(err, SuiteError::Parse(..)));
    }

    #[test]
    fn load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("basic.toml");
        std::fs::write(&path, Suite::example()).unwrap();
        let suite = Suite::load(&path).unwrap();
        assert_eq!(suite.scenarios.len(), 1);

        let missing = Suite::load(&dir.path().join("absent.toml"));
        assert!(matches!(missing, Err(SuiteError::Io(..))));
    }

    // ── validation ──

    #[test]
    fn check_without_source_is_invalid() {
        let toml = r#"
[[scenarios]]
name = "bad"
[[scenarios.steps]]
request = { path = "/x" }
[[scenarios.steps.check]]
kind = "unique"
"#;
        let err = Suite::parse(Path::new("suite.toml"), toml).unwrap_err();
        assert!(matches!(err, SuiteError::Invalid { step: 0, .. }));
    }

    #[test]
    fn check_with_two_sources_is_invalid() {
        let toml = r#"
[[scenarios]]
name = "bad"
[[scenarios.steps]]
request = { path = "/x" }
[[scenarios.steps.check]]
path = "*.id"
binding = "ids"
kind = "unique"
"#;
        let err = Suite::parse(Path::new("suite.toml"), toml).unwrap_err();
        assert!(matches!(err, SuiteError::Invalid { .. }));
    }

    #[test]
    fn duplicate_scenario_names_rejected() {
        let toml = r#"
[[scenarios]]
name = "twice"
[[scenarios.steps]]
request = { path = "/a" }

[[scenarios]]
name = "twice"
[[scenarios.steps]]
request = { path = "/b" }
"#;
        let err = Suite::parse(Path::new("suite.toml"), toml).unwrap_err();
        assert!(matches!(err, SuiteError::DuplicateScenario { .. }));
    }

    #[test]
    fn empty_scenario_rejected() {
        let toml = r#"
[[scenarios]]
name = "hollow"
steps = []
"#;
        let err = Suite::parse(Path::new("suite.toml"), toml).unwrap_err();
        assert!(matches!(err, SuiteError::Invalid { .. }));
    }

    // ── interpolation ──

    fn bindings() -> HashMap<String, Value> {
        HashMap::from([
            ("org_id".to_string(), json!(320565)),
            ("name".to_string(), json!("Harry Potter")),
        ])
    }

    #[test]
    fn interpolate_string_binding_renders_bare() {
        assert_eq!(
            interpolate("{{name}}", &bindings()).unwrap(),
            "Harry Potter"
        );
    }

    #[test]
    fn interpolate_number_binding() {
        assert_eq!(
            interpolate("/orgs/{{org_id}}/repos", &bindings()).unwrap(),
            "/orgs/320565/repos"
        );
    }

    #[test]
    fn interpolate_missing_binding_is_error() {
        let err = interpolate("{{gone}}", &bindings()).unwrap_err();
        assert_eq!(err, BindingError("gone".to_string()));
    }

    #[test]
    fn interpolate_leaves_plain_text_alone() {
        assert_eq!(interpolate("/houses", &bindings()).unwrap(), "/houses");
        assert_eq!(
            interpolate("{unclosed {{name}}", &bindings()).unwrap(),
            "{unclosed Harry Potter"
        );
    }

    #[test]
    fn binding_refs_lists_in_order() {
        assert_eq!(
            binding_refs("{{a}}/x/{{ b }}/{{a}}"),
            vec!["a".to_string(), "b".to_string(), "a".to_string()]
        );
    }

    // ── binding bookkeeping ──

    #[test]
    fn step_consumed_and_produced_bindings() {
        let toml = r#"
[[scenarios]]
name = "chain"

[[scenarios.steps]]
request = { path = "/houses/{id}", path_params = { id = "{{house_id}}" }, query = { key = "{{api_key}}" } }
extract = [ { bind = "member_ids", path = "[0].members.*._id" } ]

[[scenarios.steps.check]]
path = "*.something"
kind = "set_equals"
other = { binding = "expected_ids" }
"#;
        let suite = parse_toml(toml);
        let step = &suite.scenarios[0].steps[0];
        assert_eq!(
            step.consumed_bindings(),
            vec![
                "house_id".to_string(),
                "api_key".to_string(),
                "expected_ids".to_string()
            ]
        );
        assert_eq!(step.produced_bindings(), vec!["member_ids"]);
    }

    #[test]
    fn predicate_binding_is_consumed() {
        let toml = r#"
[[scenarios]]
name = "pred"
[[scenarios.steps]]
request = { path = "/x" }
[[scenarios.steps.check]]
path = "*.members"
kind = "all_satisfy"
predicate = { kind = "at_most", value = { binding = "reference_size" } }
"#;
        let suite = parse_toml(toml);
        let step = &suite.scenarios[0].steps[0];
        assert_eq!(step.consumed_bindings(), vec!["reference_size".to_string()]);
    }

    // ── resolution ──

    #[test]
    fn value_ref_resolution() {
        let b = bindings();
        let literal = ValueRef::Literal { value: json!(3) };
        assert_eq!(literal.resolve(&b).unwrap(), json!(3));

        let bound = ValueRef::Binding {
            binding: "org_id".to_string(),
        };
        assert_eq!(bound.resolve(&b).unwrap(), json!(320565));

        let gone = ValueRef::Binding {
            binding: "gone".to_string(),
        };
        assert!(gone.resolve(&b).is_err());
    }

    #[test]
    fn predicate_spec_resolves_bindings() {
        let spec = PredicateSpec::Equals {
            value: ValueRef::Binding {
                binding: "org_id".to_string(),
            },
        };
        let predicate = spec.resolve(&bindings()).unwrap();
        assert_eq!(predicate, Predicate::Equals(json!(320565)));
    }

    #[test]
    fn check_label_is_readable() {
        let toml = r#"
[[scenarios]]
name = "labels"
[[scenarios.steps]]
request = { path = "/x" }
[[scenarios.steps.check]]
path = "*.id"
kind = "unique"
[[scenarios.steps.check]]
path = ""
kind = "count_equals"
expected = { value = 194 }
"#;
        let suite = parse_toml(toml);
        let checks = &suite.scenarios[0].steps[0].check;
        assert_eq!(checks[0].label(), "unique on *.id");
        assert_eq!(checks[1].label(), "count_equals on body");
    }
}
