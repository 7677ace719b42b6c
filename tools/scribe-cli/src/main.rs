use clap::{Parser, Subcommand};
use scribe_harness::HarnessConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scribe")]
#[command(about = "Scribe CLI - fixtures, evidence templates, logs and reports")]
#[command(version = scribe_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixture workbook inspection
    Fixture {
        #[command(subcommand)]
        action: FixtureAction,
    },
    /// DOCX evidence template
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
    /// Log file housekeeping
    Logs {
        #[command(subcommand)]
        action: LogsAction,
    },
    /// Run report housekeeping
    Report {
        #[command(subcommand)]
        action: ReportAction,
    },
}

#[derive(Subcommand)]
enum FixtureAction {
    /// Show the fixture row of a scenario tag
    Show {
        tag: String,
        #[arg(long)]
        workbook: Option<PathBuf>,
        /// Print passwords unmasked
        #[arg(long)]
        reveal: bool,
    },
    /// List the scenario tags of the workbook
    Tags {
        #[arg(long)]
        workbook: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Write a default template with every placeholder
    Init {
        path: PathBuf,
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand)]
enum LogsAction {
    /// Merge undated log files into the dated ones
    Consolidate {
        /// Day of the dated files, yyyy-MM-dd
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Subcommand)]
enum ReportAction {
    /// Rename reports.json to a timestamped name
    Rename,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = HarnessConfig::from_env()?;

    let output = match cli.command {
        Commands::Fixture { action } => match action {
            FixtureAction::Show {
                tag,
                workbook,
                reveal,
            } => scribe_cli::fixture_show(
                &workbook.unwrap_or(config.fixture_workbook),
                &tag,
                reveal,
            )?,
            FixtureAction::Tags { workbook } => {
                scribe_cli::fixture_tags(&workbook.unwrap_or(config.fixture_workbook))?
            }
        },
        Commands::Template { action } => match action {
            TemplateAction::Init { path, force } => scribe_cli::template_init(&path, force)?,
        },
        Commands::Logs { action } => match action {
            LogsAction::Consolidate { date } => {
                scribe_cli::logs_consolidate(&config.log_dir(), date.as_deref())?
            }
        },
        Commands::Report { action } => match action {
            ReportAction::Rename => scribe_cli::report_rename(&config.report_dir())?,
        },
    };

    println!("{output}");
    Ok(())
}
