//! Renderer input

use crate::format::{format_assignments, format_headers, format_params, pretty_json};
use crate::mask::mask_sensitive_json;
use chrono::{Local, NaiveDateTime};
use scribe_core::{EvidenceEntry, ScenarioMeta, ScenarioOutcome};

/// Everything needed to document one finished scenario.
#[derive(Debug, Clone)]
pub struct EvidenceReport {
    pub meta: ScenarioMeta,
    pub outcome: ScenarioOutcome,
    /// Captured exchanges in call order.
    pub entries: Vec<EvidenceEntry>,
    /// Instant used in file names and the document date.
    pub generated_at: NaiveDateTime,
}

impl EvidenceReport {
    pub fn new(meta: ScenarioMeta, outcome: ScenarioOutcome, entries: Vec<EvidenceEntry>) -> Self {
        Self {
            meta,
            outcome,
            entries,
            generated_at: Local::now().naive_local(),
        }
    }

    pub fn at(mut self, generated_at: NaiveDateTime) -> Self {
        self.generated_at = generated_at;
        self
    }

    pub fn passed(&self) -> bool {
        self.outcome.passed()
    }

    /// Exchanges ready to print: bodies pretty-printed then masked, header
    /// and parameter blocks flattened to text.
    pub fn exchanges(&self) -> Vec<ExchangeView> {
        self.entries.iter().map(ExchangeView::from_entry).collect()
    }

    /// Failure narrative with tokens masked, `None` for passed scenarios or
    /// an empty narrative.
    pub fn failure_log(&self) -> Option<String> {
        self.outcome
            .narrative()
            .filter(|log| !log.is_empty())
            .map(mask_sensitive_json)
    }

    /// `<tag>: <scenario name>`
    pub fn title(&self) -> String {
        format!("{}: {}", self.meta.tag, self.meta.scenario_name)
    }
}

/// Display form of one exchange. Empty optional sections are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeView {
    pub method: String,
    pub uri: String,
    pub proxy: String,
    pub query_params: String,
    pub path_params: String,
    pub form_params: String,
    pub headers: String,
    pub cookies: String,
    pub multipart: String,
    pub request_body: String,
    pub status: u16,
    pub response_body: String,
}

impl ExchangeView {
    pub fn from_entry(entry: &EvidenceEntry) -> Self {
        Self {
            method: entry.method.clone(),
            uri: entry.uri.clone(),
            proxy: entry.proxy.clone().unwrap_or_default(),
            query_params: format_params(&entry.query_params),
            path_params: format_params(&entry.path_params),
            form_params: format_params(&entry.form_params),
            headers: format_headers(&entry.headers),
            cookies: format_assignments(&entry.cookies),
            multipart: entry.multipart.join("\n"),
            request_body: mask_sensitive_json(&pretty_json(&entry.request_body)),
            status: entry.status,
            response_body: mask_sensitive_json(&pretty_json(&entry.response_body)),
        }
    }

    /// Label/value rows for a key/value table, optional sections omitted
    /// when empty.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let mut rows = vec![
            ("Request method", self.method.clone()),
            ("Request URI", self.uri.clone()),
        ];
        let optional = [
            ("Proxy", &self.proxy),
            ("Query params", &self.query_params),
            ("Form params", &self.form_params),
            ("Path params", &self.path_params),
        ];
        rows.extend(
            optional
                .into_iter()
                .filter(|(_, value)| !value.is_empty())
                .map(|(label, value)| (label, value.clone())),
        );
        rows.push(("Headers", self.headers.clone()));
        if !self.cookies.is_empty() {
            rows.push(("Cookies", self.cookies.clone()));
        }
        if !self.multipart.is_empty() {
            rows.push(("Multiparts", self.multipart.clone()));
        }
        rows.push(("Request Body", self.request_body.clone()));
        rows.push(("Status Code", self.status.to_string()));
        rows.push(("Response Body", self.response_body.clone()));
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failure_log_is_masked() {
        let meta = ScenarioMeta {
            feature_name: "Login".into(),
            feature_file: "login".into(),
            feature_path: None,
            feature_id: uuid::Uuid::nil(),
            scenario_name: "Login fails".into(),
            tag: "CT-1".into(),
            classification: None,
            started_at: "10:00:00:000".into(),
            finished_at: None,
        };
        let outcome = ScenarioOutcome::Failed {
            narrative: Some("Response body:\n{\"token\":\"abcdefghijklmnopqrstuvwxyz\"}".into()),
        };
        let report = EvidenceReport::new(meta.clone(), outcome, Vec::new());
        assert_eq!(
            report.failure_log().as_deref(),
            Some("Response body:\n{\"token\":\"abcdefghijklmno...\"}")
        );

        let passed = EvidenceReport::new(meta, ScenarioOutcome::Passed, Vec::new());
        assert!(passed.failure_log().is_none());
    }

    #[test]
    fn test_rows_skip_empty_sections() {
        let mut entry = EvidenceEntry::new("POST", "http://api/auth/login");
        entry.request_body = r#"{"email":"a@x.com"}"#.into();
        entry.status = 200;
        entry.response_body = r#"{"token":"abcdefghijklmnopqrstuvwxyz"}"#.into();
        entry.query_params = vec![("page".into(), "1".into())];

        let view = ExchangeView::from_entry(&entry);
        let labels: Vec<_> = view.rows().into_iter().map(|(label, _)| label).collect();
        assert_eq!(
            labels,
            vec![
                "Request method",
                "Request URI",
                "Query params",
                "Headers",
                "Request Body",
                "Status Code",
                "Response Body"
            ]
        );
        assert_eq!(view.response_body, "{\n  \"token\": \"abcdefghijklmno...\"\n}");
    }
}
