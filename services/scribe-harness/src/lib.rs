//! # Scribe Harness
//!
//! Lifecycle hooks, configuration, log files and run reports for API test
//! suites written as cucumber features.
//!
//! ## Flow per scenario
//! - `on_scenario_start` resolves the feature, its correlation id and the
//!   fixture row into the scenario's context
//! - steps send requests through an evidence collector
//! - `on_scenario_end` classifies the scenario, renders its evidence and
//!   clears the context

pub mod config;
pub mod hooks;
pub mod logs;
pub mod report;
pub mod runner;

pub use config::HarnessConfig;
pub use hooks::{ScenarioInfo, SuiteHooks, SuitePhase, SuiteReport};
pub use report::{Attachment, RunReport, ScenarioRecord};
pub use runner::{run_features, ScenarioWorld};
