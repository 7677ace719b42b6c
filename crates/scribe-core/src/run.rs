//! Run-wide shared state
//!
//! Pass/fail counters and the feature correlation-id cache are the only
//! mutable state shared between concurrently running scenarios.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct RunState {
    passed: AtomicU64,
    failed: AtomicU64,
    feature_ids: DashMap<String, Uuid>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the feature's correlation id, generating it on first use.
    ///
    /// The shard lock held by the entry makes this an atomic
    /// compute-if-absent: racing first callers all see the same id.
    pub fn feature_id(&self, feature_name: &str) -> Uuid {
        *self
            .feature_ids
            .entry(feature_name.to_string())
            .or_insert_with(|| {
                let id = Uuid::new_v4();
                debug!(feature = feature_name, %id, "Generated feature correlation id");
                id
            })
    }

    pub fn increment_passed(&self) -> u64 {
        self.passed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn increment_failed(&self) -> u64 {
        self.failed.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn passed(&self) -> u64 {
        self.passed.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Only valid at run boundaries, when no scenario is in flight.
    pub fn reset(&self) {
        self.passed.store(0, Ordering::Relaxed);
        self.failed.store(0, Ordering::Relaxed);
        self.feature_ids.clear();
        info!("Run counters reset");
    }

    pub fn summary(&self, duration_ms: u64) -> RunSummary {
        RunSummary {
            duration_ms,
            passed: self.passed(),
            failed: self.failed(),
            features: self.feature_ids.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub duration_ms: u64,
    pub passed: u64,
    pub failed: u64,
    pub features: usize,
}

impl RunSummary {
    pub fn total(&self) -> u64 {
        self.passed + self.failed
    }
}
