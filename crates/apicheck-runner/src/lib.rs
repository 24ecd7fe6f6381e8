//! apicheck-runner: scenario execution engines

pub mod http;
pub mod runner;

pub use http::HttpTransport;
pub use runner::{RunnerState, ScenarioRunner, run_scenarios};
