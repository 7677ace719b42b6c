//! Deterministic artifact paths
//!
//! Both layouts embed a millisecond timestamp, so re-running the same
//! scenario never overwrites an earlier document.

use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use scribe_core::{paths, ScenarioMeta};
use std::path::{Path, PathBuf};

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-zA-Z0-9\s]").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static RESERVED_PATH_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("valid regex"));

pub const DOCX_TIMESTAMP: &str = "%Y-%m-%d_%H_%M_%S_%3f";
pub const PDF_TIMESTAMP: &str = "%d-%m-%Y %H_%M_%S_%3f";

/// Lowercase, ASCII alphanumerics only, whitespace runs collapsed to `_`.
pub fn clean_scenario_name(name: &str) -> String {
    let stripped = NON_ALPHANUMERIC.replace_all(name, "");
    WHITESPACE_RUN
        .replace_all(stripped.trim(), "_")
        .to_lowercase()
}

/// Removes characters that are not allowed in file names.
pub fn strip_reserved(name: &str) -> String {
    RESERVED_PATH_CHARS.replace_all(name, "").into_owned()
}

/// `target/evidence/<feature file>/<feature id>/<tag>_<clean name> - <timestamp>.docx`
pub fn docx_path(root: &Path, meta: &ScenarioMeta, at: NaiveDateTime) -> PathBuf {
    let file_name = format!(
        "{}_{} - {}.docx",
        meta.tag,
        clean_scenario_name(&meta.scenario_name),
        at.format(DOCX_TIMESTAMP)
    );
    root.join(paths::DOCX_EVIDENCE_DIR)
        .join(strip_reserved(&meta.feature_file))
        .join(meta.feature_id.to_string())
        .join(file_name)
}

/// `evidence/<tag>_<name>_<timestamp>.pdf`
pub fn pdf_path(root: &Path, meta: &ScenarioMeta, at: NaiveDateTime) -> PathBuf {
    let file_name = format!(
        "{}_{}_{}.pdf",
        meta.tag,
        strip_reserved(&meta.scenario_name),
        at.format(PDF_TIMESTAMP)
    );
    root.join(paths::PDF_EVIDENCE_DIR).join(file_name)
}
