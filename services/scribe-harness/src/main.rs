//! # Scribe Harness
//!
//! Runs the API feature suite and writes evidence, logs and the run report.

mod suite;

use scribe_core::BUILD_INFO;
use scribe_harness::logs::init_logging;
use scribe_harness::{run_features, HarnessConfig, SuiteHooks};
use std::sync::Arc;
use suite::ApiWorld;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = HarnessConfig::from_env()?;
    init_logging(&config.log_dir());

    info!("Starting Scribe Harness {}", BUILD_INFO);
    info!(
        api = %config.api_base_url,
        workbook = %config.fixture_workbook.display(),
        formats = ?config.evidence_formats,
        "Configuration loaded"
    );

    suite::configure(config.clone());
    let features = config.features_dir.clone();
    let hooks = Arc::new(SuiteHooks::new(config));

    let result = run_features::<ApiWorld>(hooks, features).await?;
    let summary = &result.summary;

    println!("Duration: {} ms", summary.duration_ms);
    println!("Passed:   {}", summary.passed);
    println!("Failed:   {}", summary.failed);
    if let Some(path) = &result.report_path {
        println!("Report:   {}", path.display());
    }

    if summary.failed > 0 {
        anyhow::bail!("{} of {} scenarios failed", summary.failed, summary.total());
    }
    Ok(())
}
