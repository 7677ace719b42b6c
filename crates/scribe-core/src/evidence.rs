//! Captured request/response pairs

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One observed HTTP exchange.
///
/// The optional sections (proxy, parameters, cookies, multipart) are kept
/// separately so renderers can leave them out when empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvidenceEntry {
    pub method: String,
    pub uri: String,
    pub headers: Vec<(String, String)>,
    pub request_body: String,
    pub status: u16,
    pub response_body: String,
    pub proxy: Option<String>,
    pub query_params: Vec<(String, String)>,
    pub path_params: Vec<(String, String)>,
    pub form_params: Vec<(String, String)>,
    pub cookies: Vec<(String, String)>,
    pub multipart: Vec<String>,
}

impl EvidenceEntry {
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Header block in `Name=value` form, one header per line.
    pub fn header_block(&self) -> String {
        self.headers
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Append-only, ordered accumulator of the exchanges of one scenario.
///
/// Cloning yields another handle to the same entries, so the HTTP collector
/// and the scenario context observe one sequence.
#[derive(Debug, Clone, Default)]
pub struct EvidenceLog {
    entries: Arc<Mutex<Vec<EvidenceEntry>>>,
}

impl EvidenceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: EvidenceEntry) {
        self.entries.lock().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    pub fn last(&self) -> Option<EvidenceEntry> {
        self.entries.lock().last().cloned()
    }

    /// Entries in call order.
    pub fn snapshot(&self) -> Vec<EvidenceEntry> {
        self.entries.lock().clone()
    }

    /// Removes and returns every entry, leaving the log empty but still shared.
    pub fn drain(&self) -> Vec<EvidenceEntry> {
        std::mem::take(&mut *self.entries.lock())
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_entries_in_order() {
        let log = EvidenceLog::new();
        let handle = log.clone();

        handle.push(EvidenceEntry::new("POST", "http://api/auth/login"));
        handle.push(EvidenceEntry::new("GET", "http://api/usuarios"));

        let methods: Vec<_> = log.snapshot().into_iter().map(|e| e.method).collect();
        assert_eq!(methods, vec!["POST", "GET"]);
    }

    #[test]
    fn test_drain_keeps_log_usable() {
        let log = EvidenceLog::new();
        let handle = log.clone();
        log.push(EvidenceEntry::new("GET", "/a"));

        assert_eq!(log.drain().len(), 1);
        assert!(handle.is_empty());

        handle.push(EvidenceEntry::new("GET", "/b"));
        assert_eq!(log.last().unwrap().uri, "/b");
    }

    #[test]
    fn test_header_block() {
        let mut entry = EvidenceEntry::new("GET", "/");
        entry.headers = vec![
            ("Accept".to_string(), "*/*".to_string()),
            ("Content-Type".to_string(), "application/json".to_string()),
        ];
        assert_eq!(entry.header_block(), "Accept=*/*\nContent-Type=application/json");
    }
}
