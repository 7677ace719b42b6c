//! Per-scenario context
//!
//! One `ScenarioContext` is created for each scenario and handed by reference
//! to every collaborator. It owns everything that must not outlive the
//! scenario: ad-hoc values, identifier registries, the fixture record, the
//! captured exchanges and the failure narrative.

use crate::evidence::EvidenceLog;
use crate::fixture::FixtureRecord;
use crate::registry::IdentityRegistry;
use crate::scenario::ScenarioMeta;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

#[derive(Debug, Default)]
pub struct ScenarioContext {
    values: HashMap<String, Value>,
    identities: IdentityRegistry,
    fixture: Option<FixtureRecord>,
    meta: Option<ScenarioMeta>,
    evidence: EvidenceLog,
    failures: Vec<String>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// `None` when the key was never set in this scenario.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn identities(&self) -> &IdentityRegistry {
        &self.identities
    }

    pub fn identities_mut(&mut self) -> &mut IdentityRegistry {
        &mut self.identities
    }

    /// Shared handle to the exchange accumulator of this scenario.
    pub fn evidence_log(&self) -> EvidenceLog {
        self.evidence.clone()
    }

    pub fn set_fixture(&mut self, record: FixtureRecord) {
        self.fixture = Some(record);
    }

    pub fn fixture(&self) -> Option<&FixtureRecord> {
        self.fixture.as_ref()
    }

    pub fn set_meta(&mut self, meta: ScenarioMeta) {
        self.meta = Some(meta);
    }

    pub fn meta(&self) -> Option<&ScenarioMeta> {
        self.meta.as_ref()
    }

    pub fn meta_mut(&mut self) -> Option<&mut ScenarioMeta> {
        self.meta.as_mut()
    }

    /// Adds a line to the failure narrative embedded in the evidence.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    pub fn failure_log(&self) -> Option<String> {
        if self.failures.is_empty() {
            None
        } else {
            Some(self.failures.join("\n"))
        }
    }

    /// Drops every scenario-scoped value. The evidence log handle stays valid
    /// for collectors wired to it, but its entries are gone.
    pub fn clear(&mut self) {
        debug!(
            keys = self.values.len(),
            entries = self.evidence.len(),
            "Clearing scenario context"
        );
        self.values.clear();
        self.identities.remove_all();
        self.fixture = None;
        self.meta = None;
        self.evidence.clear();
        self.failures.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
            && self.identities.is_empty()
            && self.fixture.is_none()
            && self.meta.is_none()
            && self.evidence.is_empty()
            && self.failures.is_empty()
    }
}
