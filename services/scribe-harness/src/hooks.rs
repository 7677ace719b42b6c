//! Suite and scenario lifecycle
//!
//! `SuiteHooks` is driven by the runner adapter:
//!
//! ```text
//! on_suite_start
//!   (on_scenario_start -> steps -> on_scenario_end)*
//! on_suite_end
//! ```
//!
//! `on_scenario_end` must run for every started scenario, including those
//! whose start hook failed, so the context is always cleared.

use crate::config::HarnessConfig;
use crate::logs::{LogFiles, AUTOMATION_TARGET};
use crate::report::{rename_with_timestamp, Attachment, RunReport, ScenarioRecord};
use chrono::Local;
use evidence_renderer::{EvidenceRenderer, EvidenceReport};
use fixture_loader::{DataFixtureLoader, FixtureBook};
use parking_lot::{Mutex, RwLock};
use scribe_core::{
    Result, RunState, RunSummary, ScenarioContext, ScenarioMeta, ScenarioOutcome, ScenarioTags,
    ScribeError, RESET_STATE_TAG,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument, warn};

/// Time of day stamped on scenario start and end.
pub const SCENARIO_TIME_FORMAT: &str = "%H:%M:%S:%3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuitePhase {
    NotStarted,
    Running,
    Finished,
}

/// What the runner knows about a scenario before it starts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioInfo {
    /// Feature title as parsed by the runner.
    pub feature_name: String,
    pub feature_path: Option<PathBuf>,
    pub scenario_name: String,
    /// Feature, rule and scenario tags, with or without `@`.
    pub tags: Vec<String>,
}

/// Result of closing the suite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteReport {
    pub summary: RunSummary,
    pub report_path: Option<PathBuf>,
    pub merged_logs: Vec<PathBuf>,
}

enum Fixtures {
    Unloaded,
    Loaded(Arc<DataFixtureLoader<FixtureBook>>),
    Unavailable(String),
}

struct SuiteClock {
    started: Instant,
    logs: LogFiles,
}

pub struct SuiteHooks {
    config: HarnessConfig,
    run: Arc<RunState>,
    renderer: EvidenceRenderer,
    fixtures: RwLock<Fixtures>,
    report: Mutex<RunReport>,
    phase: Mutex<SuitePhase>,
    clock: Mutex<Option<SuiteClock>>,
}

impl SuiteHooks {
    pub fn new(config: HarnessConfig) -> Self {
        let renderer = EvidenceRenderer::for_formats(
            config.output_root.clone(),
            &config.evidence_formats,
            config.evidence_template.clone(),
            config.project_name.clone(),
        );

        Self {
            config,
            run: Arc::new(RunState::new()),
            renderer,
            fixtures: RwLock::new(Fixtures::Unloaded),
            report: Mutex::new(RunReport::new()),
            phase: Mutex::new(SuitePhase::NotStarted),
            clock: Mutex::new(None),
        }
    }

    /// Uses an already loaded workbook instead of reading the configured one.
    pub fn with_fixtures(self, book: FixtureBook) -> Self {
        *self.fixtures.write() = Fixtures::Loaded(Arc::new(DataFixtureLoader::new(book)));
        self
    }

    pub fn with_renderer(mut self, renderer: EvidenceRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn run(&self) -> &Arc<RunState> {
        &self.run
    }

    pub fn phase(&self) -> SuitePhase {
        *self.phase.lock()
    }

    /// Records collected so far in this run.
    pub fn report_snapshot(&self) -> RunReport {
        self.report.lock().clone()
    }

    /// Prepares log files, resets counters and loads the fixture workbook.
    ///
    /// A workbook that cannot be read is not fatal here; it fails the first
    /// scenario that needs fixtures.
    #[instrument(skip(self))]
    pub fn on_suite_start(&self) -> Result<()> {
        let mut phase = self.phase.lock();
        match *phase {
            SuitePhase::NotStarted => {}
            SuitePhase::Running => {
                warn!("Suite already running");
                return Ok(());
            }
            SuitePhase::Finished => {
                return Err(ScribeError::LifecycleError {
                    reason: "suite already finished".to_string(),
                })
            }
        }

        let now = Local::now();
        let logs = LogFiles::new(self.config.log_dir(), now.date_naive());
        logs.ensure_created()?;
        self.run.reset();

        *self.report.lock() = RunReport {
            started_at: Some(now.to_rfc3339()),
            ..RunReport::default()
        };

        self.load_fixtures();

        *self.clock.lock() = Some(SuiteClock {
            started: Instant::now(),
            logs,
        });
        *phase = SuitePhase::Running;

        info!(
            target: AUTOMATION_TARGET,
            "Execution started at {}",
            now.format("%d/%m/%Y %H:%M:%S")
        );
        Ok(())
    }

    fn load_fixtures(&self) {
        let mut fixtures = self.fixtures.write();
        if matches!(*fixtures, Fixtures::Loaded(_)) {
            return;
        }

        *fixtures = match FixtureBook::from_xlsx(&self.config.fixture_workbook) {
            Ok(book) => Fixtures::Loaded(Arc::new(DataFixtureLoader::new(book))),
            Err(err) => {
                warn!(
                    path = %self.config.fixture_workbook.display(),
                    error = %err,
                    "Fixture workbook unavailable; tagged scenarios will fail"
                );
                Fixtures::Unavailable(err.to_string())
            }
        };
    }

    fn fixture_loader(&self) -> Result<Arc<DataFixtureLoader<FixtureBook>>> {
        match &*self.fixtures.read() {
            Fixtures::Loaded(loader) => Ok(Arc::clone(loader)),
            Fixtures::Unavailable(reason) => Err(ScribeError::WorkbookError {
                reason: reason.clone(),
            }),
            Fixtures::Unloaded => Err(ScribeError::WorkbookError {
                reason: format!(
                    "workbook {} was not loaded",
                    self.config.fixture_workbook.display()
                ),
            }),
        }
    }

    /// Fills the context with metadata and fixtures for one scenario.
    ///
    /// Metadata is set before fixtures are loaded so a fatal fixture error
    /// still produces labelled evidence at scenario end.
    #[instrument(skip(self, ctx, info), fields(scenario = %info.scenario_name))]
    pub fn on_scenario_start(&self, ctx: &mut ScenarioContext, info: &ScenarioInfo) -> Result<()> {
        if self.phase() != SuitePhase::Running {
            return Err(ScribeError::LifecycleError {
                reason: format!("scenario '{}' started outside a running suite", info.scenario_name),
            });
        }

        let tags = ScenarioTags::from_tags(&info.tags);
        if tags.has(RESET_STATE_TAG) {
            ctx.identities_mut().token.remove();
            ctx.identities_mut().user.remove();
            info!("Token and user registries cleared before scenario");
        }

        let meta = self.scenario_meta(info, &tags);
        info!(target: AUTOMATION_TARGET, "Feature: {}", meta.feature_name);
        info!(target: AUTOMATION_TARGET, "Feature id: {}", meta.feature_id);
        info!(
            target: AUTOMATION_TARGET,
            "Scenario started: {} [{}] at {}",
            meta.scenario_name,
            meta.tag,
            meta.started_at
        );
        ctx.set_meta(meta);

        if let Some(tag) = &tags.scenario {
            let record = self
                .fixture_loader()
                .and_then(|loader| loader.load(tag))
                .inspect_err(|err| ctx.record_failure(format!("Fixture setup failed: {err}")))?;
            info!(
                target: AUTOMATION_TARGET,
                "Fixture {}: email={} password={} id={}",
                tag,
                self.config.loggable(record.email()),
                self.config.loggable(record.password()),
                self.config.loggable(record.user_id())
            );
            ctx.set_fixture(record);
        }

        Ok(())
    }

    /// Classifies the scenario, renders its evidence and clears the context.
    /// Never fails: rendering problems are logged and skipped.
    #[instrument(skip(self, ctx, info), fields(scenario = %info.scenario_name))]
    pub fn on_scenario_end(
        &self,
        ctx: &mut ScenarioContext,
        info: &ScenarioInfo,
        failed: bool,
    ) -> ScenarioRecord {
        let finished = Local::now();
        let mut meta = ctx.meta().cloned().unwrap_or_else(|| {
            self.scenario_meta(info, &ScenarioTags::from_tags(&info.tags))
        });
        meta.finished_at = Some(finished.format(SCENARIO_TIME_FORMAT).to_string());

        let entries = ctx.evidence_log().drain();
        let outcome = if failed {
            self.run.increment_failed();
            let narrative = ctx.failure_log().unwrap_or_else(|| {
                let last_status = entries
                    .last()
                    .map(|e| e.status.to_string())
                    .unwrap_or_else(|| "none".to_string());
                generic_failure_narrative(&last_status)
            });
            ScenarioOutcome::Failed {
                narrative: Some(narrative),
            }
        } else {
            self.run.increment_passed();
            ScenarioOutcome::Passed
        };

        ctx.clear();

        let report = EvidenceReport::new(meta.clone(), outcome.clone(), entries)
            .at(finished.naive_local());
        let attachments: Vec<Attachment> = self
            .renderer
            .render(&report)
            .iter()
            .filter_map(Attachment::from_artifact)
            .collect();

        let record = ScenarioRecord::new(&meta, &outcome, attachments);
        self.report.lock().push(record.clone());

        if outcome.passed() {
            info!(target: AUTOMATION_TARGET, "Scenario {} PASSED", meta.scenario_name);
        } else {
            error!(target: AUTOMATION_TARGET, "Scenario {} FAILED", meta.scenario_name);
        }
        record
    }

    /// Writes and renames the run report, merges the day's logs and returns
    /// the run summary.
    #[instrument(skip(self))]
    pub fn on_suite_end(&self) -> Result<SuiteReport> {
        let mut phase = self.phase.lock();
        if *phase != SuitePhase::Running {
            return Err(ScribeError::LifecycleError {
                reason: format!("suite cannot end from {:?}", *phase),
            });
        }

        let clock = self.clock.lock().take();
        let duration_ms = clock
            .as_ref()
            .map(|c| c.started.elapsed().as_millis() as u64)
            .unwrap_or_default();
        let summary = self.run.summary(duration_ms);

        info!(
            target: AUTOMATION_TARGET,
            "Execution finished in {} ms: {} passed, {} failed",
            summary.duration_ms,
            summary.passed,
            summary.failed
        );

        let now = Local::now();
        let report_dir = self.config.report_dir();
        let report_path = {
            let mut report = self.report.lock();
            report.finished_at = Some(now.to_rfc3339());
            report.summary = Some(summary.clone());
            match report.write(&report_dir.join(scribe_core::paths::REPORT_FILE)) {
                Ok(()) => rename_with_timestamp(&report_dir, now.naive_local())
                    .unwrap_or_else(|err| {
                        error!(error = %err, "Run report could not be renamed");
                        None
                    }),
                Err(err) => {
                    error!(error = %err, "Run report could not be written");
                    None
                }
            }
        };

        let merged_logs = match &clock {
            Some(clock) => clock.logs.consolidate().unwrap_or_else(|err| {
                error!(error = %err, "Log files could not be consolidated");
                Vec::new()
            }),
            None => Vec::new(),
        };

        *phase = SuitePhase::Finished;
        Ok(SuiteReport {
            summary,
            report_path,
            merged_logs,
        })
    }

    fn scenario_meta(&self, info: &ScenarioInfo, tags: &ScenarioTags) -> ScenarioMeta {
        let feature_name = feature_title(info.feature_path.as_deref(), &info.feature_name);
        let feature_file = info
            .feature_path
            .as_deref()
            .and_then(Path::file_stem)
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| feature_name.clone());

        ScenarioMeta {
            feature_id: self.run.feature_id(&feature_name),
            feature_name,
            feature_file,
            feature_path: info.feature_path.clone(),
            scenario_name: info.scenario_name.clone(),
            tag: tags.label(),
            classification: tags.classification.clone(),
            started_at: Local::now().format(SCENARIO_TIME_FORMAT).to_string(),
            finished_at: None,
        }
    }
}

/// Title from the `Feature:` line of the feature file. Falls back to the
/// file name, then to `fallback` when there is no file.
pub fn feature_title(path: Option<&Path>, fallback: &str) -> String {
    let Some(path) = path else {
        return fallback.to_string();
    };

    let from_text = fs::read_to_string(path).ok().and_then(|text| {
        text.lines()
            .map(str::trim)
            .find_map(|line| line.strip_prefix("Feature:"))
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .map(str::to_string)
    });

    from_text
        .or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| fallback.to_string())
}

pub fn generic_failure_narrative(last_status: &str) -> String {
    format!(
        "The scenario failed during validation. Last status code: {last_status}. \
         See the execution log for the full assertion message."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use evidence_renderer::EvidenceFormat;
    use fixture_loader::{sheets, SheetTable};
    use scribe_core::EvidenceEntry;
    use tempfile::TempDir;

    fn book() -> FixtureBook {
        FixtureBook::from_tables([SheetTable::new(
            sheets::SCENARIOS,
            vec![
                sheets::SCENARIO_ID.to_string(),
                sheets::EMAIL.to_string(),
                sheets::PASSWORD.to_string(),
                sheets::USER_ID.to_string(),
                sheets::MASS_ID.to_string(),
            ],
            vec![vec![
                "CT-1001".to_string(),
                "a@x.com".to_string(),
                "Secret1".to_string(),
                "u-1".to_string(),
                String::new(),
            ]],
        )])
    }

    fn hooks(dir: &TempDir) -> SuiteHooks {
        let config = HarnessConfig::default()
            .with_output_root(dir.path())
            .with_evidence_formats(vec![EvidenceFormat::Pdf]);
        SuiteHooks::new(config).with_fixtures(book())
    }

    fn info(tags: &[&str]) -> ScenarioInfo {
        ScenarioInfo {
            feature_name: "Login".to_string(),
            feature_path: None,
            scenario_name: "Valid login".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[test]
    fn test_feature_title_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("login.feature");
        fs::write(&path, "@all\nFeature:   User login  \n\n  Scenario: x\n").unwrap();
        assert_eq!(feature_title(Some(&path), "ignored"), "User login");
    }

    #[test]
    fn test_feature_title_falls_back_to_file_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("categories.feature");
        fs::write(&path, "Scenario: no title line\n").unwrap();
        assert_eq!(feature_title(Some(&path), "ignored"), "categories");

        let missing = dir.path().join("articles.feature");
        assert_eq!(feature_title(Some(&missing), "ignored"), "articles");
        assert_eq!(feature_title(None, "Parsed"), "Parsed");
    }

    #[test]
    fn test_scenario_start_requires_running_suite() {
        let dir = TempDir::new().unwrap();
        let hooks = hooks(&dir);
        let mut ctx = ScenarioContext::new();

        let err = hooks.on_scenario_start(&mut ctx, &info(&["@CT-1001"])).unwrap_err();
        assert!(matches!(err, ScribeError::LifecycleError { .. }));
    }

    #[test]
    fn test_scenario_start_loads_fixture_and_meta() {
        let dir = TempDir::new().unwrap();
        let hooks = hooks(&dir);
        hooks.on_suite_start().unwrap();

        let mut ctx = ScenarioContext::new();
        hooks
            .on_scenario_start(&mut ctx, &info(&["@Login", "@CT-1001"]))
            .unwrap();

        assert_eq!(ctx.fixture().unwrap().email(), "a@x.com");
        let meta = ctx.meta().unwrap();
        assert_eq!(meta.tag, "CT-1001");
        assert_eq!(meta.classification.as_deref(), Some("Login"));
        assert_eq!(meta.feature_id, hooks.run().feature_id("Login"));
    }

    #[test]
    fn test_missing_fixture_row_is_fatal_but_meta_is_set() {
        let dir = TempDir::new().unwrap();
        let hooks = hooks(&dir);
        hooks.on_suite_start().unwrap();

        let mut ctx = ScenarioContext::new();
        let err = hooks
            .on_scenario_start(&mut ctx, &info(&["@CT-9999"]))
            .unwrap_err();

        assert!(err.is_fatal_setup());
        assert_eq!(ctx.meta().unwrap().tag, "CT-9999");
        assert!(ctx.failure_log().unwrap().contains("CT-9999"));
    }

    #[test]
    fn test_reset_tag_clears_token_and_user() {
        let dir = TempDir::new().unwrap();
        let hooks = hooks(&dir);
        hooks.on_suite_start().unwrap();

        let mut ctx = ScenarioContext::new();
        ctx.identities_mut().token.token = Some("stale".to_string());
        ctx.identities_mut().user.email = Some("old@x.com".to_string());
        ctx.identities_mut().category.id = Some("c-1".to_string());

        hooks
            .on_scenario_start(&mut ctx, &info(&["@LimparEstadoAntes"]))
            .unwrap();

        assert!(ctx.identities().token.token.is_none());
        assert!(ctx.identities().user.email.is_none());
        assert_eq!(ctx.identities().category.id.as_deref(), Some("c-1"));
    }

    #[test]
    fn test_failed_scenario_without_narrative_gets_generic_one() {
        let dir = TempDir::new().unwrap();
        let hooks = hooks(&dir);
        hooks.on_suite_start().unwrap();

        let mut ctx = ScenarioContext::new();
        let scenario = info(&["@CT-1001"]);
        hooks.on_scenario_start(&mut ctx, &scenario).unwrap();
        let mut entry = EvidenceEntry::new("GET", "http://localhost/usuarios");
        entry.status = 500;
        ctx.evidence_log().push(entry);

        let record = hooks.on_scenario_end(&mut ctx, &scenario, true);

        assert_eq!(record.status, "FAILED");
        assert!(record
            .failure
            .as_deref()
            .unwrap()
            .contains("Last status code: 500"));
        assert_eq!(record.attachments.len(), 1);
        assert_eq!(hooks.run().failed(), 1);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_suite_end_writes_report_and_summary() {
        let dir = TempDir::new().unwrap();
        let hooks = hooks(&dir);
        hooks.on_suite_start().unwrap();

        let mut ctx = ScenarioContext::new();
        let scenario = info(&[]);
        hooks.on_scenario_start(&mut ctx, &scenario).unwrap();
        hooks.on_scenario_end(&mut ctx, &scenario, false);

        let result = hooks.on_suite_end().unwrap();

        assert_eq!(result.summary.passed, 1);
        assert_eq!(result.summary.failed, 0);
        let report = RunReport::read(result.report_path.as_ref().unwrap()).unwrap();
        assert_eq!(report.scenarios[0].tag, "CT-UNDEFINED");
        assert_eq!(hooks.phase(), SuitePhase::Finished);
        assert!(hooks.on_suite_end().is_err());
        assert!(hooks.on_suite_start().is_err());
    }
}
