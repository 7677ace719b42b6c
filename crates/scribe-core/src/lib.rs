//! # Scribe Core
//!
//! Core types for the Scribe API test harness.
//!
//! ## Scenario isolation
//! - One `ScenarioContext` per scenario, passed explicitly to collaborators
//! - Identifier registries and captured exchanges live inside the context
//! - Clearing the context at scenario end leaves nothing for the next one
//!
//! ## Run-wide state
//! - Lock-free pass/fail counters
//! - Feature correlation ids generated once per feature, shared by its scenarios

pub mod context;
pub mod error;
pub mod evidence;
pub mod fixture;
pub mod mask;
pub mod registry;
pub mod run;
pub mod scenario;
pub mod tags;

pub use context::ScenarioContext;
pub use error::{Result, ScribeError};
pub use evidence::{EvidenceEntry, EvidenceLog};
pub use fixture::{FixtureRecord, LoginFixture, RegistrationFixture};
pub use registry::{
    ArticleRegistry, CategoryRegistry, IdentityRegistry, TokenRegistry, UserRegistry,
};
pub use run::{RunState, RunSummary};
pub use scenario::{ScenarioMeta, ScenarioOutcome};
pub use tags::{ScenarioTag, ScenarioTags, RESET_STATE_TAG, UNDEFINED_TAG};

/// Current Scribe version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build information for logs and reports
pub const BUILD_INFO: &str = concat!(
    "Scribe ",
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CARGO_PKG_NAME"),
    ")"
);

/// Output locations, relative to the configured output root
pub mod paths {
    pub const LOG_DIR: &str = "target/log";
    pub const REPORT_DIR: &str = "target/reports";
    pub const REPORT_FILE: &str = "reports.json";
    pub const DOCX_EVIDENCE_DIR: &str = "target/evidence";
    pub const PDF_EVIDENCE_DIR: &str = "evidence";
    pub const EXECUTION_LOG: &str = "execution";
    pub const AUTOMATION_LOG: &str = "automation";
}
