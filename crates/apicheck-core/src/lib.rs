//! apicheck-core: Core types and invariant logic for API contract checking
//!
//! This crate provides path extraction over JSON response bodies, the
//! invariant library producing pass/fail verdicts, and the declarative
//! scenario model that the runner executes.

pub mod config;
pub mod invariant;
pub mod path;
pub mod plan;
pub mod report;
pub mod repro;
pub mod scenario;
pub mod transport;

pub use config::{Config, ConfigError};
pub use invariant::{Direction, InvariantError, JsonType, Predicate, Verdict, VerdictDetails};
pub use path::{ExtractedNode, ExtractedValue, PathError, PathExpr};
pub use plan::{RunPlan, Validation, ValidationStatus};
pub use report::{
    NullReporter, Reporter, RunReport, ScenarioReport, ScenarioStatus, StepReport, VerdictRecord,
    generate_schema,
};
pub use repro::to_http_file;
pub use scenario::{BindingError, CheckSpec, InvariantSpec, Scenario, Step, Suite, SuiteError};
pub use transport::{RequestSnapshot, RequestSpec, ResponseContract, Transport, TransportError};
