//! Report interchange types - what a run hands to reporting collaborators
//!
//! The core produces a stream of verdicts plus a structured `RunReport`;
//! formatting and persistence belong to the consumer. The JSON Schema for the
//! report format is exported via [`generate_schema`].

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::invariant::{Verdict, VerdictDetails};
use crate::transport::RequestSnapshot;

/// Consumes the verdict stream as it is produced, one call per evaluation.
pub trait Reporter {
    fn verdict(&mut self, scenario: &str, step: usize, verdict: &Verdict);
}

/// Discards the stream; the structured report still captures everything.
pub struct NullReporter;

impl Reporter for NullReporter {
    fn verdict(&mut self, _scenario: &str, _step: usize, _verdict: &Verdict) {}
}

/// Terminal state of one scenario run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "PASS"),
            Self::Failed => write!(f, "FAIL"),
        }
    }
}

/// One evaluated check, labeled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictRecord {
    /// What was checked: `"unique on *.id"`, `"status"`, `"binding"`.
    pub check: String,
    pub passed: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<VerdictDetails>,
    /// Fatal verdicts (binding/transport) halted the scenario.
    #[serde(default)]
    pub fatal: bool,
}

impl VerdictRecord {
    #[must_use]
    pub fn from_verdict(check: impl Into<String>, verdict: Verdict) -> Self {
        Self {
            check: check.into(),
            passed: verdict.passed,
            message: verdict.message,
            details: verdict.details,
            fatal: false,
        }
    }

    /// A failed verdict that also halted the scenario.
    #[must_use]
    pub fn fatal(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            check: check.into(),
            passed: false,
            message: message.into(),
            details: None,
            fatal: true,
        }
    }
}

/// Everything observed while executing one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StepReport {
    pub index: usize,
    /// Operation label: `"GET /orgs/{org}"`.
    pub operation: String,
    /// Response status, if a response arrived at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default)]
    pub elapsed: f64,
    /// Resolved request, for reproduction files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSnapshot>,
    #[serde(default)]
    pub verdicts: Vec<VerdictRecord>,
}

impl StepReport {
    #[must_use]
    pub fn failed(&self) -> bool {
        self.verdicts.iter().any(|v| !v.passed)
    }
}

/// Complete record of one scenario execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioReport {
    pub name: String,
    pub status: ScenarioStatus,
    pub steps: Vec<StepReport>,
}

impl ScenarioReport {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == ScenarioStatus::Completed
    }

    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.steps
            .iter()
            .any(|s| s.verdicts.iter().any(|v| v.fatal))
    }

    /// Count of failed verdicts across all steps.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.steps
            .iter()
            .map(|s| s.verdicts.iter().filter(|v| !v.passed).count())
            .sum()
    }
}

/// Top-level run output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunReport {
    /// Scenarios executed
    pub total: u64,
    /// Scenarios that completed with every verdict passing
    pub passed: u64,
    /// Scenarios with at least one failed verdict or a fatal halt
    pub failed: u64,
    pub scenarios: Vec<ScenarioReport>,
    /// Tool-level errors (unreadable suites, etc.), not contract failures
    #[serde(default)]
    pub errors: Vec<String>,
}

impl RunReport {
    #[must_use]
    pub fn from_scenarios(scenarios: Vec<ScenarioReport>, errors: Vec<String>) -> Self {
        let total = scenarios.len() as u64;
        let passed = scenarios.iter().filter(|s| s.passed()).count() as u64;
        Self {
            total,
            passed,
            failed: total - passed,
            scenarios,
            errors,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0 && self.errors.is_empty() && self.total > 0
    }

    /// Exit code policy: 2 for fatal scenario errors, 1 for contract
    /// failures, 3 for tool errors or an empty run, 0 otherwise.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        if self.scenarios.iter().any(ScenarioReport::has_fatal) {
            return 2;
        }
        if self.failed > 0 {
            return 1;
        }
        if !self.errors.is_empty() || self.total == 0 {
            return 3;
        }
        0
    }

    /// One-line summary for terminal output and summaries.
    #[must_use]
    pub fn reason(&self) -> String {
        if self.total == 0 {
            return "No scenarios were run".to_string();
        }
        if self.all_passed() {
            return format!("All {} scenarios passed", self.total);
        }

        let mut parts = Vec::new();
        if self.failed > 0 {
            let fatal = self
                .scenarios
                .iter()
                .filter(|s| s.has_fatal())
                .count();
            let verdicts: usize = self
                .scenarios
                .iter()
                .map(ScenarioReport::failure_count)
                .sum();
            parts.push(format!(
                "{} of {} scenarios failed ({verdicts} failed verdicts, {fatal} fatal)",
                self.failed, self.total
            ));
        }
        if !self.errors.is_empty() {
            parts.push(format!("{} tool errors", self.errors.len()));
        }
        parts.join("; ")
    }
}

/// Generate JSON Schema for the report format.
#[must_use]
pub fn generate_schema() -> String {
    let schema = schemars::schema_for!(RunReport);
    serde_json::to_string_pretty(&schema).expect("schema serialization should not fail")
}
