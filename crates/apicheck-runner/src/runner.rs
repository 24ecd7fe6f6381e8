//! Scenario execution - the request→extract→check chain
//!
//! Strictly sequential within a scenario: each step may depend on bindings
//! produced by earlier ones. Failed verdicts accumulate; only a missing
//! binding or a transport failure halts the scenario, and the halt itself is
//! recorded as a final fatal verdict so the report stays complete.

use std::collections::HashMap;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

use apicheck_core::invariant::{self, InvariantError, Verdict};
use apicheck_core::path::ExtractedNode;
use apicheck_core::report::{
    NullReporter, Reporter, ScenarioReport, ScenarioStatus, StepReport, VerdictRecord,
};
use apicheck_core::scenario::{
    BindingError, CheckSpec, Expectations, InvariantSpec, Scenario, Step, interpolate,
};
use apicheck_core::transport::{RequestSpec, ResponseContract, Transport, TransportError};

/// Execution state of one runner. Terminal states are final: `run` consumes
/// the runner, so re-running a scenario means building a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Pending,
    Running,
    Completed,
    Failed,
}

/// Executes one scenario against a transport.
pub struct ScenarioRunner<'a, T: Transport> {
    transport: &'a T,
    bindings: HashMap<String, Value>,
    rng: SmallRng,
    state: RunnerState,
}

impl<'a, T: Transport> ScenarioRunner<'a, T> {
    #[must_use]
    pub fn new(transport: &'a T) -> Self {
        Self {
            transport,
            bindings: HashMap::new(),
            rng: SmallRng::from_entropy(),
            state: RunnerState::Pending,
        }
    }

    /// Seed initial bindings (config params: API keys, entity IDs).
    #[must_use]
    pub fn with_bindings(mut self, bindings: HashMap<String, Value>) -> Self {
        self.bindings = bindings;
        self
    }

    /// Deterministic RNG for `sample` extractions.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = SmallRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn state(&self) -> RunnerState {
        self.state
    }

    /// Run to completion, discarding the verdict stream.
    #[must_use]
    pub fn run(self, scenario: &Scenario) -> ScenarioReport {
        self.run_with(scenario, &mut NullReporter)
    }

    /// Run to completion, emitting every verdict to `reporter` as produced.
    pub fn run_with(mut self, scenario: &Scenario, reporter: &mut dyn Reporter) -> ScenarioReport {
        self.state = RunnerState::Running;
        let mut steps = Vec::new();
        let mut halted = false;

        for (index, step) in scenario.steps.iter().enumerate() {
            match self.execute_step(index, step, &scenario.name, reporter) {
                StepOutcome::Continue(report) => steps.push(report),
                StepOutcome::Halt(report) => {
                    steps.push(report);
                    halted = true;
                    break;
                }
            }
        }

        let failed = halted || steps.iter().any(StepReport::failed);
        self.state = if failed {
            RunnerState::Failed
        } else {
            RunnerState::Completed
        };

        ScenarioReport {
            name: scenario.name.clone(),
            status: if failed {
                ScenarioStatus::Failed
            } else {
                ScenarioStatus::Completed
            },
            steps,
        }
    }

    fn execute_step(
        &mut self,
        index: usize,
        step: &Step,
        scenario_name: &str,
        reporter: &mut dyn Reporter,
    ) -> StepOutcome {
        let operation = step.request.operation();

        // Parameterize the request from bindings. A miss here is fatal.
        let request = match self.resolve_request(step) {
            Ok(request) => request,
            Err(BindingError(name)) => {
                let verdict = Verdict::fail(format!(
                    "binding {name:?} was never produced by an earlier step"
                ));
                reporter.verdict(scenario_name, index, &verdict);
                return StepOutcome::Halt(StepReport {
                    index,
                    operation,
                    status: None,
                    elapsed: 0.0,
                    request: None,
                    verdicts: vec![VerdictRecord::fatal("binding", verdict.message)],
                });
            }
        };
        let snapshot = request.snapshot();

        let response = match self.transport.send(&request) {
            Ok(response) => response,
            Err(TransportError(message)) => {
                let verdict = Verdict::fail(format!("transport error: {message}"));
                reporter.verdict(scenario_name, index, &verdict);
                return StepOutcome::Halt(StepReport {
                    index,
                    operation,
                    status: None,
                    elapsed: 0.0,
                    request: Some(snapshot),
                    verdicts: vec![VerdictRecord::fatal("transport", verdict.message)],
                });
            }
        };

        let mut verdicts = Vec::new();

        // Response-level expectations first: status, content type, reason.
        if let Some(expect) = &step.expect {
            for (label, verdict) in evaluate_expectations(expect, &response) {
                reporter.verdict(scenario_name, index, &verdict);
                verdicts.push(VerdictRecord::from_verdict(label, verdict));
            }
        }

        // Extractions bind values for checks and later steps. A miss binds
        // nothing; it only becomes an error when the binding is used.
        for extraction in &step.extract {
            if let Some(extracted) = extraction.path.extract(&response.body) {
                let bound = match extracted.node {
                    ExtractedNode::Many(vs) => self.maybe_sample(vs, extraction.sample),
                    ExtractedNode::One(Value::Array(vs)) if extraction.sample => {
                        self.maybe_sample(vs, true)
                    }
                    ExtractedNode::One(v) => Some(v),
                };
                if let Some(value) = bound {
                    self.bindings.insert(extraction.bind.clone(), value);
                }
            }
        }

        for check in &step.check {
            let label = check.label();
            match self.evaluate_check(check, &response) {
                Ok(verdict) => {
                    reporter.verdict(scenario_name, index, &verdict);
                    verdicts.push(VerdictRecord::from_verdict(label, verdict));
                }
                Err(CheckError::Invariant(e)) => {
                    // Fatal to this single check; the scenario keeps going.
                    eprintln!("  {scenario_name}: invariant error on {label}: {e}");
                    let verdict = Verdict::fail(format!("invariant error: {e}"));
                    reporter.verdict(scenario_name, index, &verdict);
                    verdicts.push(VerdictRecord::from_verdict(label, verdict));
                }
                Err(CheckError::Binding(BindingError(name))) => {
                    let verdict = Verdict::fail(format!(
                        "binding {name:?} was never produced by an earlier step"
                    ));
                    reporter.verdict(scenario_name, index, &verdict);
                    verdicts.push(VerdictRecord::fatal(label, verdict.message));
                    return StepOutcome::Halt(StepReport {
                        index,
                        operation,
                        status: Some(response.status),
                        elapsed: response.elapsed,
                        request: Some(snapshot),
                        verdicts,
                    });
                }
            }
        }

        StepOutcome::Continue(StepReport {
            index,
            operation,
            status: Some(response.status),
            elapsed: response.elapsed,
            request: Some(snapshot),
            verdicts,
        })
    }

    fn resolve_request(&self, step: &Step) -> Result<RequestSpec, BindingError> {
        let template = &step.request;

        let mut path_params = HashMap::new();
        for (name, value) in &template.path_params {
            path_params.insert(name.clone(), interpolate(value, &self.bindings)?);
        }
        let mut query = std::collections::BTreeMap::new();
        for (name, value) in &template.query {
            query.insert(name.clone(), interpolate(value, &self.bindings)?);
        }
        let mut headers = HashMap::new();
        for (name, value) in &template.headers {
            headers.insert(name.clone(), interpolate(value, &self.bindings)?);
        }

        Ok(RequestSpec {
            method: template.method.clone(),
            path: interpolate(&template.path, &self.bindings)?,
            path_params,
            query,
            headers,
        })
    }

    fn maybe_sample(&mut self, mut values: Vec<Value>, sample: bool) -> Option<Value> {
        if !sample {
            return Some(Value::Array(values));
        }
        if values.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..values.len());
        Some(values.swap_remove(index))
    }

    fn evaluate_check(
        &self,
        check: &CheckSpec,
        response: &ResponseContract,
    ) -> Result<Verdict, CheckError> {
        let source = match (&check.path, &check.binding) {
            (Some(path), _) => match path.extract(&response.body) {
                None => {
                    return Ok(Verdict::fail(format!(
                        "path {:?} did not resolve against the response body",
                        path.raw()
                    )));
                }
                Some(extracted) => match extracted.node {
                    ExtractedNode::One(v) => Source::Scalar(v),
                    ExtractedNode::Many(vs) => Source::List(vs),
                },
            },
            (None, Some(binding)) => Source::Scalar(
                self.bindings
                    .get(binding)
                    .cloned()
                    .ok_or_else(|| BindingError(binding.clone()))?,
            ),
            // Unreachable after suite validation.
            (None, None) => return Ok(Verdict::fail("check has no source".to_string())),
        };

        let verdict = match &check.invariant {
            InvariantSpec::Unique => invariant::unique(&source.to_list()),
            InvariantSpec::Sorted {
                direction,
                strict,
                key,
            } => invariant::sorted(&source.to_list(), *direction, *strict, key.as_ref())?,
            InvariantSpec::SetEquals { other } => {
                let other = as_list(other.resolve(&self.bindings)?);
                invariant::set_equals(&source.to_list(), &other)
            }
            InvariantSpec::Subset { superset } => {
                let superset = as_list(superset.resolve(&self.bindings)?);
                invariant::subset(&source.to_list(), &superset)
            }
            InvariantSpec::CountEquals { expected } => {
                let expected = expected.resolve(&self.bindings)?;
                let count = expected
                    .as_u64()
                    .and_then(|n| usize::try_from(n).ok())
                    .ok_or_else(|| InvariantError::BadCount(expected.to_string()))?;
                invariant::count_equals(&source.to_list(), count)
            }
            InvariantSpec::AllSatisfy { predicate } => {
                let predicate = predicate.resolve(&self.bindings)?;
                invariant::all_satisfy(&source.to_list(), &predicate)?
            }
            InvariantSpec::MemberOf { allowed } => match &source {
                Source::Scalar(v) => invariant::member_of(v, allowed),
                Source::List(vs) => Verdict::fail(format!(
                    "membership needs a single value, path produced a sequence of {}",
                    vs.len()
                )),
            },
            InvariantSpec::BooleanTyped => invariant::boolean_typed(&source.to_list()),
        };

        Ok(verdict)
    }
}

/// Run every scenario with fresh state, seeded from the same bindings.
/// Scenarios are independent; failures in one never leak into the next.
pub fn run_scenarios<T: Transport>(
    transport: &T,
    seed_bindings: &HashMap<String, Value>,
    scenarios: &[Scenario],
    seed: Option<u64>,
    reporter: &mut dyn Reporter,
) -> Vec<ScenarioReport> {
    scenarios
        .iter()
        .map(|scenario| {
            let mut runner = ScenarioRunner::new(transport).with_bindings(seed_bindings.clone());
            if let Some(seed) = seed {
                runner = runner.with_seed(seed);
            }
            let report = runner.run_with(scenario, reporter);
            if report.passed() {
                eprintln!("  {}: OK ({} steps)", report.name, report.steps.len());
            } else {
                eprintln!(
                    "  {}: {} failed verdicts",
                    report.name,
                    report.failure_count()
                );
            }
            report
        })
        .collect()
}

enum StepOutcome {
    Continue(StepReport),
    Halt(StepReport),
}

enum Source {
    Scalar(Value),
    List(Vec<Value>),
}

impl Source {
    fn to_list(&self) -> Vec<Value> {
        match self {
            Self::List(vs) => vs.clone(),
            Self::Scalar(v) => as_list(v.clone()),
        }
    }
}

/// A scalar that is itself an array is treated as its elements; anything
/// else is a one-element list.
fn as_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(vs) => vs,
        other => vec![other],
    }
}

enum CheckError {
    Binding(BindingError),
    Invariant(InvariantError),
}

impl From<BindingError> for CheckError {
    fn from(e: BindingError) -> Self {
        Self::Binding(e)
    }
}

impl From<InvariantError> for CheckError {
    fn from(e: InvariantError) -> Self {
        Self::Invariant(e)
    }
}

fn evaluate_expectations(
    expect: &Expectations,
    response: &ResponseContract,
) -> Vec<(&'static str, Verdict)> {
    let mut verdicts = Vec::new();

    if let Some(expected) = expect.status {
        let verdict = if response.status == expected {
            Verdict::pass(format!("status is {expected}"))
        } else {
            Verdict::fail(format!(
                "expected status {expected}, got {}",
                response.status
            ))
        };
        verdicts.push(("status", verdict));
    }

    if let Some(expected) = &expect.content_type {
        let expected_media = expected.split(';').next().unwrap_or("").trim();
        let verdict = match response.media_type() {
            Some(actual) if actual == expected_media => {
                Verdict::pass(format!("content type is {expected_media}"))
            }
            Some(actual) => Verdict::fail(format!(
                "expected content type {expected_media:?}, got {actual:?}"
            )),
            None => Verdict::fail(format!(
                "no Content-Type header, expected {expected_media:?}"
            )),
        };
        verdicts.push(("content_type", verdict));
    }

    if let Some(needle) = &expect.status_text_contains {
        let verdict = if response.status_text.contains(needle.as_str()) {
            Verdict::pass(format!("status text contains {needle:?}"))
        } else {
            Verdict::fail(format!(
                "status text {:?} does not contain {needle:?}",
                response.status_text
            ))
        };
        verdicts.push(("status_text", verdict));
    }

    verdicts
}
