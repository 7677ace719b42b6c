//! Harness configuration
//!
//! Read from `SCRIBE_*` environment variables after an optional `.env` file
//! has been loaded. Every variable has a default so a bare checkout runs
//! against a local API.

use evidence_renderer::EvidenceFormat;
use scribe_core::mask::mask_secret;
use scribe_core::{Result, ScribeError};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_WORKBOOK: &str = "resources/MassaDadosCMS.xlsx";
pub const DEFAULT_TEMPLATE: &str = "resources/evidence-template.docx";
pub const DEFAULT_FEATURES_DIR: &str = "features";
pub const DEFAULT_MAX_CONCURRENT: usize = 4;
pub const DEFAULT_PROJECT_NAME: &str = "API test project";

#[derive(Debug, Clone, PartialEq)]
pub struct HarnessConfig {
    pub api_base_url: String,
    pub fixture_workbook: PathBuf,
    pub evidence_template: PathBuf,
    pub output_root: PathBuf,
    pub evidence_formats: Vec<EvidenceFormat>,
    pub features_dir: PathBuf,
    pub max_concurrent_scenarios: usize,
    pub mask_log_secrets: bool,
    pub project_name: String,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            fixture_workbook: PathBuf::from(DEFAULT_WORKBOOK),
            evidence_template: PathBuf::from(DEFAULT_TEMPLATE),
            output_root: PathBuf::from("."),
            evidence_formats: vec![EvidenceFormat::Docx],
            features_dir: PathBuf::from(DEFAULT_FEATURES_DIR),
            max_concurrent_scenarios: DEFAULT_MAX_CONCURRENT,
            mask_log_secrets: true,
            project_name: DEFAULT_PROJECT_NAME.to_string(),
        }
    }
}

impl HarnessConfig {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let evidence_formats = match lookup("SCRIBE_EVIDENCE_FORMATS") {
            Some(raw) => parse_formats(&raw)?,
            None => defaults.evidence_formats,
        };

        let max_concurrent_scenarios = match lookup("SCRIBE_MAX_CONCURRENT_SCENARIOS") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ScribeError::ConfigError {
                        reason: format!(
                            "SCRIBE_MAX_CONCURRENT_SCENARIOS must be a positive integer, got {raw:?}"
                        ),
                    })
                }
            },
            None => defaults.max_concurrent_scenarios,
        };

        let mask_log_secrets = lookup("SCRIBE_MASK_LOG_SECRETS")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(defaults.mask_log_secrets);

        Ok(Self {
            api_base_url: lookup("SCRIBE_API_BASE_URL").unwrap_or(defaults.api_base_url),
            fixture_workbook: lookup("SCRIBE_FIXTURE_WORKBOOK")
                .map(PathBuf::from)
                .unwrap_or(defaults.fixture_workbook),
            evidence_template: lookup("SCRIBE_EVIDENCE_TEMPLATE")
                .map(PathBuf::from)
                .unwrap_or(defaults.evidence_template),
            output_root: lookup("SCRIBE_OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            evidence_formats,
            features_dir: lookup("SCRIBE_FEATURES_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.features_dir),
            max_concurrent_scenarios,
            mask_log_secrets,
            project_name: lookup("SCRIBE_PROJECT_NAME").unwrap_or(defaults.project_name),
        })
    }

    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_fixture_workbook(mut self, path: impl Into<PathBuf>) -> Self {
        self.fixture_workbook = path.into();
        self
    }

    pub fn with_evidence_template(mut self, path: impl Into<PathBuf>) -> Self {
        self.evidence_template = path.into();
        self
    }

    pub fn with_output_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_root = path.into();
        self
    }

    pub fn with_evidence_formats(mut self, formats: Vec<EvidenceFormat>) -> Self {
        self.evidence_formats = formats;
        self
    }

    pub fn with_features_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.features_dir = path.into();
        self
    }

    pub fn with_max_concurrent_scenarios(mut self, max: usize) -> Self {
        self.max_concurrent_scenarios = max.max(1);
        self
    }

    pub fn with_mask_log_secrets(mut self, mask: bool) -> Self {
        self.mask_log_secrets = mask;
        self
    }

    pub fn with_project_name(mut self, name: impl Into<String>) -> Self {
        self.project_name = name.into();
        self
    }

    pub fn log_dir(&self) -> PathBuf {
        self.output_root.join(scribe_core::paths::LOG_DIR)
    }

    pub fn report_dir(&self) -> PathBuf {
        self.output_root.join(scribe_core::paths::REPORT_DIR)
    }

    /// Fixture and identity values as they may appear in the logs.
    pub fn loggable(&self, value: &str) -> String {
        if self.mask_log_secrets {
            mask_secret(value)
        } else {
            value.to_string()
        }
    }
}

fn parse_formats(raw: &str) -> Result<Vec<EvidenceFormat>> {
    let mut formats = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let format: EvidenceFormat = part.parse()?;
        if !formats.contains(&format) {
            formats.push(format);
        }
    }
    Ok(formats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_loggable_follows_mask_setting() {
        let config = HarnessConfig::default();
        assert_eq!(config.loggable("a@x.com"), "***.com");

        let config = config.with_mask_log_secrets(false);
        assert_eq!(config.loggable("a@x.com"), "a@x.com");
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = HarnessConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, HarnessConfig::default());
        assert_eq!(config.log_dir(), PathBuf::from("./target/log"));
    }

    #[test]
    fn test_overrides() {
        let config = HarnessConfig::from_lookup(lookup(&[
            ("SCRIBE_API_BASE_URL", "http://api.local"),
            ("SCRIBE_EVIDENCE_FORMATS", "pdf, docx, pdf"),
            ("SCRIBE_MAX_CONCURRENT_SCENARIOS", "8"),
            ("SCRIBE_MASK_LOG_SECRETS", "0"),
            ("SCRIBE_OUTPUT_ROOT", "/tmp/run"),
        ]))
        .unwrap();

        assert_eq!(config.api_base_url, "http://api.local");
        assert_eq!(
            config.evidence_formats,
            vec![EvidenceFormat::Pdf, EvidenceFormat::Docx]
        );
        assert_eq!(config.max_concurrent_scenarios, 8);
        assert!(!config.mask_log_secrets);
        assert_eq!(config.report_dir(), PathBuf::from("/tmp/run/target/reports"));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let err = HarnessConfig::from_lookup(lookup(&[("SCRIBE_EVIDENCE_FORMATS", "html")]))
            .unwrap_err();
        assert!(matches!(err, ScribeError::ConfigError { .. }));

        let err = HarnessConfig::from_lookup(lookup(&[(
            "SCRIBE_MAX_CONCURRENT_SCENARIOS",
            "many",
        )]))
        .unwrap_err();
        assert!(matches!(err, ScribeError::ConfigError { .. }));
    }
}
