//! Log sinks and log-file housekeeping
//!
//! Three layers share one registry:
//! - console, filtered by `RUST_LOG` (default `info`)
//! - `execution.log`, every event at `info` and above
//! - `automation.log`, only the scenario narrative (target `automation`)
//!
//! Suite start makes sure the dated files of the day exist; suite end merges
//! the undated files into them.

use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{debug, info};
use tracing_subscriber::filter::{EnvFilter, FilterFn, LevelFilter};
use tracing_subscriber::fmt::{self, time::ChronoLocal, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, Registry};

/// Target of the narrative events mirrored into `automation.log`.
pub const AUTOMATION_TARGET: &str = "automation";

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

static INIT: Once = Once::new();

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(log_dir: &Path) {
    INIT.call_once(|| {
        let console_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let console = fmt::layer()
            .with_writer(io::stdout)
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
            .with_filter(console_filter);

        let execution = fmt::layer()
            .with_ansi(false)
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
            .with_writer(AppendMakeWriter::new(
                log_dir.join(file_name(scribe_core::paths::EXECUTION_LOG)),
            ))
            .with_filter(LevelFilter::INFO);

        let automation = fmt::layer()
            .with_ansi(false)
            .with_target(false)
            .with_timer(ChronoLocal::new(TIME_FORMAT.to_string()))
            .with_writer(AppendMakeWriter::new(
                log_dir.join(file_name(scribe_core::paths::AUTOMATION_LOG)),
            ))
            .with_filter(FilterFn::new(|meta| meta.target() == AUTOMATION_TARGET));

        let _ = Registry::default()
            .with(console)
            .with(execution)
            .with(automation)
            .try_init();
    });
}

fn file_name(stem: &str) -> String {
    format!("{stem}.log")
}

/// Opens the file in append mode for every event, so a file moved away by
/// consolidation is recreated by the next write.
struct AppendMakeWriter {
    path: PathBuf,
}

impl AppendMakeWriter {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl<'a> MakeWriter<'a> for AppendMakeWriter {
    type Writer = AppendWriter;

    fn make_writer(&'a self) -> Self::Writer {
        AppendWriter {
            file: open_append(&self.path).ok(),
        }
    }
}

/// Drops output silently when the file could not be opened.
struct AppendWriter {
    file: Option<File>,
}

impl Write for AppendWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.file.as_mut() {
            Some(f) => f.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// The execution and automation log files of one calendar day.
#[derive(Debug, Clone)]
pub struct LogFiles {
    dir: PathBuf,
    date: String,
}

impl LogFiles {
    pub fn new(dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            dir: dir.into(),
            date: date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `<dir>/<stem>-<yyyy-MM-dd>.log`
    pub fn dated(&self, stem: &str) -> PathBuf {
        self.dir.join(format!("{stem}-{}.log", self.date))
    }

    /// `<dir>/<stem>.log`
    pub fn undated(&self, stem: &str) -> PathBuf {
        self.dir.join(file_name(stem))
    }

    fn stems() -> [&'static str; 2] {
        [
            scribe_core::paths::EXECUTION_LOG,
            scribe_core::paths::AUTOMATION_LOG,
        ]
    }

    /// Creates the log directory and the dated files. Existing files are
    /// left untouched.
    pub fn ensure_created(&self) -> io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        for stem in Self::stems() {
            let path = self.dated(stem);
            if !path.exists() {
                File::create(&path)?;
                debug!(path = %path.display(), "Created log file");
            }
        }
        Ok(())
    }

    /// Merges each undated file into its dated counterpart: appended and
    /// deleted when the dated file exists, renamed otherwise.
    ///
    /// Returns the dated files that received content.
    pub fn consolidate(&self) -> io::Result<Vec<PathBuf>> {
        let mut merged = Vec::new();

        for stem in Self::stems() {
            let undated = self.undated(stem);
            if !undated.exists() {
                continue;
            }
            let dated = self.dated(stem);

            if dated.exists() {
                let contents = fs::read(&undated)?;
                let mut target = OpenOptions::new().append(true).open(&dated)?;
                target.write_all(&contents)?;
                fs::remove_file(&undated)?;
            } else {
                fs::rename(&undated, &dated)?;
            }

            info!(from = %undated.display(), to = %dated.display(), "Consolidated log file");
            merged.push(dated);
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_dated_names() {
        let files = LogFiles::new("/logs", day());
        assert_eq!(files.dated("execution"), PathBuf::from("/logs/execution-2024-03-09.log"));
        assert_eq!(files.undated("automation"), PathBuf::from("/logs/automation.log"));
    }

    #[test]
    fn test_ensure_created_never_truncates() {
        let dir = TempDir::new().unwrap();
        let files = LogFiles::new(dir.path().join("target/log"), day());

        files.ensure_created().unwrap();
        fs::write(files.dated("execution"), "earlier run\n").unwrap();
        files.ensure_created().unwrap();

        assert_eq!(fs::read_to_string(files.dated("execution")).unwrap(), "earlier run\n");
        assert!(files.dated("automation").exists());
    }

    #[test]
    fn test_consolidate_appends_then_deletes() {
        let dir = TempDir::new().unwrap();
        let files = LogFiles::new(dir.path(), day());
        fs::write(files.dated("execution"), "first\n").unwrap();
        fs::write(files.undated("execution"), "second\n").unwrap();

        let merged = files.consolidate().unwrap();

        assert_eq!(merged, vec![files.dated("execution")]);
        assert_eq!(
            fs::read_to_string(files.dated("execution")).unwrap(),
            "first\nsecond\n"
        );
        assert!(!files.undated("execution").exists());
    }

    #[test]
    fn test_consolidate_renames_without_dated_file() {
        let dir = TempDir::new().unwrap();
        let files = LogFiles::new(dir.path(), day());
        fs::write(files.undated("automation"), "PASSED\n").unwrap();

        files.consolidate().unwrap();

        assert_eq!(fs::read_to_string(files.dated("automation")).unwrap(), "PASSED\n");
        assert!(!files.undated("automation").exists());
    }

    #[test]
    fn test_append_writer_recreates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/execution.log");
        let make = AppendMakeWriter::new(path.clone());

        make.make_writer().write_all(b"one\n").unwrap();
        make.make_writer().write_all(b"two\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "one\ntwo\n");

        fs::remove_file(&path).unwrap();
        make.make_writer().write_all(b"three\n").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "three\n");
    }
}
