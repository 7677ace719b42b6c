//! Command handlers for the `scribe` CLI
//!
//! Each handler returns the text to print, so the binary stays a thin
//! argument parser.

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use evidence_renderer::mask::mask_secret;
use evidence_renderer::write_default_template;
use fixture_loader::{sheets, DataFixtureLoader, FixtureBook, FixtureSource};
use scribe_core::ScenarioTag;
use scribe_harness::logs::LogFiles;
use scribe_harness::report::rename_with_timestamp;
use serde_json::json;
use std::path::Path;

/// Fixture row of one scenario as pretty JSON. Secrets are masked unless
/// `reveal` is set.
pub fn fixture_show(workbook: &Path, tag: &str, reveal: bool) -> anyhow::Result<String> {
    let tag = ScenarioTag::parse(tag)?;
    let book = FixtureBook::from_xlsx(workbook)
        .with_context(|| format!("reading {}", workbook.display()))?;
    let record = DataFixtureLoader::new(book).load(&tag)?;

    let secret = |value: &str| {
        if reveal {
            value.to_string()
        } else {
            mask_secret(value)
        }
    };

    let registration = record.registration().map(|r| {
        json!({
            "mass_id": r.mass_id,
            "full_name": r.full_name,
            "user_name": r.user_name,
            "email": r.email,
            "password": secret(&r.password),
            "user_id": r.user_id,
        })
    });

    let output = json!({
        "tag": record.tag().as_str(),
        "email": record.email(),
        "password": secret(record.password()),
        "user_id": record.user_id(),
        "mass_id": record.mass_id(),
        "registration": registration,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Scenario tags present in the workbook, one per line.
pub fn fixture_tags(workbook: &Path) -> anyhow::Result<String> {
    let book = FixtureBook::from_xlsx(workbook)
        .with_context(|| format!("reading {}", workbook.display()))?;
    let tags = book
        .sheet(sheets::SCENARIOS)?
        .column_values(sheets::SCENARIO_ID)?
        .into_iter()
        .filter(|tag| !tag.is_empty())
        .collect::<Vec<_>>()
        .join("\n");
    Ok(tags)
}

pub fn template_init(path: &Path, force: bool) -> anyhow::Result<String> {
    if path.exists() && !force {
        bail!("{} already exists; pass --force to overwrite", path.display());
    }
    write_default_template(path)?;
    Ok(format!("Template written to {}", path.display()))
}

/// Merges the undated log files of `date` (today when absent).
pub fn logs_consolidate(log_dir: &Path, date: Option<&str>) -> anyhow::Result<String> {
    let date = match date {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .with_context(|| format!("invalid date {raw:?}, expected yyyy-MM-dd"))?,
        None => Local::now().date_naive(),
    };

    let merged = LogFiles::new(log_dir, date).consolidate()?;
    if merged.is_empty() {
        return Ok("Nothing to consolidate".to_string());
    }
    Ok(merged
        .iter()
        .map(|p| format!("Consolidated {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n"))
}

pub fn report_rename(report_dir: &Path) -> anyhow::Result<String> {
    match rename_with_timestamp(report_dir, Local::now().naive_local())? {
        Some(path) => Ok(format!("Report renamed to {}", path.display())),
        None => Ok("No report to rename".to_string()),
    }
}
