//! Dry run plan types and config validation
//!
//! Describes what a run *would* do without sending any requests: per-scenario
//! step plans, binding flow, and config/suite validation. Used for pre-flight
//! checks and CI previews.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::scenario::Suite;

// ── Plan types ──

/// Complete dry run plan: scenarios, request counts, and validations.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RunPlan {
    /// Per-scenario execution plan
    pub scenarios: Vec<ScenarioPlan>,
    /// Total requests that would be sent (one per step)
    pub total_requests: u64,
    /// Config/suite validation results
    pub validations: Vec<Validation>,
}

/// Execution plan for a single scenario.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScenarioPlan {
    pub name: String,
    /// Suite file the scenario came from
    pub suite: String,
    pub steps: Vec<StepPlan>,
}

/// Plan for one step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StepPlan {
    /// Operation label, e.g. "GET /orgs/{org}"
    pub operation: String,
    /// Check labels, e.g. "unique on *.id"
    pub checks: Vec<String>,
    /// Bindings this step produces
    pub produces: Vec<String>,
    /// Bindings this step consumes
    pub consumes: Vec<String>,
}

/// A validation check result.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Validation {
    pub check: String,
    pub status: ValidationStatus,
    pub message: String,
}

/// Status of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStatus {
    Ok,
    Warning,
    Error,
}

impl std::fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "WARNING"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

// ── Config validation ──

/// Patterns that suggest a placeholder value rather than a real credential.
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-token",
    "your_token",
    "YOUR_TOKEN",
    "your-api-key",
    "YOUR_API_KEY",
    "TODO",
    "CHANGEME",
    "changeme",
    "placeholder",
    "xxx",
    "XXX",
    "replace-me",
    "REPLACE_ME",
    "insert-",
    "INSERT_",
    "example",
];

/// Validate config and produce validation results.
#[must_use]
pub fn validate_config(config: &Config) -> Vec<Validation> {
    let mut checks = Vec::new();

    // Base URL
    if config.base_url.starts_with("http://") || config.base_url.starts_with("https://") {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Ok,
            message: format!("base_url: {}", config.base_url),
        });
    } else {
        checks.push(Validation {
            check: "base_url".into(),
            status: ValidationStatus::Warning,
            message: format!(
                "base_url: {} (missing http:// or https:// prefix)",
                config.base_url
            ),
        });
    }

    // Suite files exist
    if config.suites.is_empty() {
        checks.push(Validation {
            check: "suites".into(),
            status: ValidationStatus::Error,
            message: "suites: none configured".into(),
        });
    } else {
        for suite in &config.suites {
            if suite.exists() {
                checks.push(Validation {
                    check: "suites".into(),
                    status: ValidationStatus::Ok,
                    message: format!("suite: {} (exists)", suite.display()),
                });
            } else {
                checks.push(Validation {
                    check: "suites".into(),
                    status: ValidationStatus::Error,
                    message: format!("suite: {} (not found)", suite.display()),
                });
            }
        }
    }

    // Headers and params — check for placeholders
    let configured = config.headers.iter().chain(config.params.iter());
    let mut value_issues = Vec::new();
    for (key, value) in configured {
        // Angle-bracket placeholders: <token>, <your-key>
        if value.contains('<') && value.contains('>') {
            value_issues.push(format!("{key}: contains '<...>' placeholder"));
        }
        for pattern in PLACEHOLDER_PATTERNS {
            if value.contains(pattern) {
                value_issues.push(format!("{key}: contains '{pattern}' — may be placeholder"));
                break;
            }
        }
    }
    if value_issues.is_empty() {
        checks.push(Validation {
            check: "headers".into(),
            status: ValidationStatus::Ok,
            message: format!(
                "headers: {} configured, params: {}",
                config.headers.len(),
                config.params.len()
            ),
        });
    } else {
        for issue in value_issues {
            checks.push(Validation {
                check: "headers".into(),
                status: ValidationStatus::Warning,
                message: issue,
            });
        }
    }

    checks
}

// ── Planning ──

/// Build the dry run plan for loaded suites. Validates that every consumed
/// binding is produced by an earlier step (or seeded from config params).
#[must_use]
pub fn plan(config: &Config, suites: &[(String, Suite)]) -> RunPlan {
    let mut validations = validate_config(config);
    let mut scenario_plans = Vec::new();
    let mut total_requests: u64 = 0;

    for (file, suite) in suites {
        for scenario in &suite.scenarios {
            let mut available: Vec<String> = config.params.keys().cloned().collect();
            let mut steps = Vec::new();

            for (index, step) in scenario.steps.iter().enumerate() {
                let consumes = step.consumed_bindings();
                for name in &consumes {
                    if !available.contains(name) {
                        validations.push(Validation {
                            check: "bindings".into(),
                            status: ValidationStatus::Error,
                            message: format!(
                                "scenario {:?}, step {index}: binding {name:?} is not produced by any earlier step",
                                scenario.name
                            ),
                        });
                    }
                }

                let produces: Vec<String> = step
                    .produced_bindings()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                available.extend(produces.iter().cloned());

                steps.push(StepPlan {
                    operation: step.request.operation(),
                    checks: step.check.iter().map(|c| c.label()).collect(),
                    produces,
                    consumes,
                });
                total_requests += 1;
            }

            scenario_plans.push(ScenarioPlan {
                name: scenario.name.clone(),
                suite: file.clone(),
                steps,
            });
        }
    }

    if scenario_plans.is_empty() {
        validations.push(Validation {
            check: "scenarios".into(),
            status: ValidationStatus::Error,
            message: "no scenarios found in configured suites".into(),
        });
    }

    RunPlan {
        scenarios: scenario_plans,
        total_requests,
        validations,
    }
}

// ── Display helpers ──

impl RunPlan {
    /// Format as human-readable terminal output.
    #[must_use]
    pub fn to_terminal(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "Dry run: {} scenarios, {} requests planned\n",
            self.scenarios.len(),
            self.total_requests,
        ));

        for scenario in &self.scenarios {
            lines.push(format!("{} ({}):", scenario.name, scenario.suite));
            for (index, step) in scenario.steps.iter().enumerate() {
                lines.push(format!("  [{index}] {}", step.operation));
                if !step.consumes.is_empty() {
                    lines.push(format!("      needs: {}", step.consumes.join(", ")));
                }
                if !step.produces.is_empty() {
                    lines.push(format!("      binds: {}", step.produces.join(", ")));
                }
                for check in &step.checks {
                    lines.push(format!("      check: {check}"));
                }
            }
            lines.push(String::new());
        }

        lines.push("Validation:".into());
        for v in &self.validations {
            lines.push(format!("  [{}] {}", v.status, v.message));
        }

        lines.join("\n")
    }

    /// Returns true if any validation has Error status.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Error)
    }

    /// Returns true if any validation has Warning status.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.validations
            .iter()
            .any(|v| v.status == ValidationStatus::Warning)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::path::Path;

    fn config() -> Config {
        Config {
            base_url: "http://localhost:8080".into(),
            headers: HashMap::new(),
            params: HashMap::new(),
            suites: vec![],
        }
    }

    fn suite(toml: &str) -> Suite {
        Suite::parse(Path::new("suite.toml"), toml).unwrap()
    }

    const CHAINED: &str = r#"
[[scenarios]]
name = "chain"

[[scenarios.steps]]
request = { path = "/orgs/{org}", path_params = { org = "cucumber" } }
extract = [ { bind = "repo_count", path = "public_repos" } ]

[[scenarios.steps]]
request = { path = "/orgs/{org}/repos", path_params = { org = "cucumber" } }

[[scenarios.steps.check]]
path = ""
kind = "count_equals"
expected = { binding = "repo_count" }
"#;

    #[test]
    fn plan_tracks_binding_flow() {
        let suites = vec![("suite.toml".to_string(), suite(CHAINED))];
        let p = plan(&config(), &suites);

        assert_eq!(p.total_requests, 2);
        assert_eq!(p.scenarios.len(), 1);
        let steps = &p.scenarios[0].steps;
        assert_eq!(steps[0].produces, vec!["repo_count"]);
        assert_eq!(steps[1].consumes, vec!["repo_count"]);
        assert!(!p.has_errors());
    }

    #[test]
    fn plan_flags_missing_binding() {
        let broken = r#"
[[scenarios]]
name = "broken"

[[scenarios.steps]]
request = { path = "/houses/{id}", path_params = { id = "{{house_id}}" } }
"#;
        let suites = vec![("suite.toml".to_string(), suite(broken))];
        let p = plan(&config(), &suites);
        assert!(p.has_errors());
        assert!(
            p.validations
                .iter()
                .any(|v| v.status == ValidationStatus::Error
                    && v.message.contains("\"house_id\""))
        );
    }

    #[test]
    fn plan_accepts_config_seeded_bindings() {
        let needs_key = r#"
[[scenarios]]
name = "keyed"

[[scenarios.steps]]
request = { path = "/characters", query = { key = "{{api_key}}" } }
"#;
        let mut cfg = config();
        cfg.params.insert("api_key".into(), "secret".into());
        let suites = vec![("suite.toml".to_string(), suite(needs_key))];
        let p = plan(&cfg, &suites);
        assert!(!p.has_errors());
    }

    #[test]
    fn plan_empty_is_error() {
        let p = plan(&config(), &[]);
        assert!(p.has_errors());
    }

    #[test]
    fn validate_placeholder_header() {
        let mut cfg = config();
        cfg.headers
            .insert("Authorization".into(), "Bearer <your-token-here>".into());
        let checks = validate_config(&cfg);
        assert!(
            checks
                .iter()
                .any(|c| c.check == "headers" && c.status == ValidationStatus::Warning)
        );
    }

    #[test]
    fn validate_placeholder_param() {
        let mut cfg = config();
        cfg.params.insert("api_key".into(), "YOUR_API_KEY".into());
        let checks = validate_config(&cfg);
        assert!(
            checks
                .iter()
                .any(|c| c.check == "headers" && c.status == ValidationStatus::Warning)
        );
    }

    #[test]
    fn validate_real_values_ok() {
        let mut cfg = config();
        cfg.headers.insert(
            "Authorization".into(),
            "Bearer eyJhbGciOiJIUzI1NiJ9.abc.xyz".into(),
        );
        let checks = validate_config(&cfg);
        let header_checks: Vec<_> = checks.iter().filter(|c| c.check == "headers").collect();
        assert_eq!(header_checks.len(), 1);
        assert_eq!(header_checks[0].status, ValidationStatus::Ok);
    }

    #[test]
    fn validate_bad_base_url() {
        let cfg = Config {
            base_url: "localhost:8080".into(),
            ..config()
        };
        let checks = validate_config(&cfg);
        let url_check = checks.iter().find(|c| c.check == "base_url").unwrap();
        assert_eq!(url_check.status, ValidationStatus::Warning);
    }

    #[test]
    fn validate_missing_suite_file() {
        let cfg = Config {
            suites: vec!["definitely-absent.toml".into()],
            ..config()
        };
        let checks = validate_config(&cfg);
        let suite_check = checks.iter().find(|c| c.check == "suites").unwrap();
        assert_eq!(suite_check.status, ValidationStatus::Error);
    }

    #[test]
    fn plan_terminal_output() {
        let suites = vec![("suite.toml".to_string(), suite(CHAINED))];
        let p = plan(&config(), &suites);
        let text = p.to_terminal();
        assert!(text.contains("1 scenarios, 2 requests planned"));
        assert!(text.contains("chain (suite.toml):"));
        assert!(text.contains("binds: repo_count"));
        assert!(text.contains("needs: repo_count"));
        assert!(text.contains("check: count_equals on body"));
    }
}
