//! `lazyreview` command line entry point.
//!
//! # Responsibility
//! - Wire config, logging and the filesystem note host into `ReviewService`.
//! - Render review listings and apply lifecycle actions from the shell.
//!
//! # Invariants
//! - The local clock is read once per run, here; `--today` overrides it.
//! - Failures print one line to stderr and exit non-zero.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use lazyreview_core::{
    core_version, init_from_config, local_today, machine_summary_line, render_review_summary,
    FsNoteHost, ReviewConfig, ReviewService, ReviewServiceError, Transition,
};
use log::info;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lazyreview", about = "Review projects and areas kept in markdown notes")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Notes directory; overrides `notes_dir` from the config.
    #[arg(long, global = true)]
    notes_dir: Option<PathBuf>,
    /// Reference day as YYYY-MM-DD; defaults to the local date.
    #[arg(long, global = true, value_parser = parse_day)]
    today: Option<NaiveDate>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print `<days>\t<title>` for every project due for review.
    List,
    /// Print a markdown report of all projects and areas.
    Summary,
    /// Print the derived state of one note as JSON.
    Show { note: String },
    /// Mark a project completed today.
    Complete { note: String },
    /// Mark a project cancelled today.
    Cancel { note: String },
    /// Record that a project was reviewed today.
    Reviewed { note: String },
    /// Print the core version.
    Version,
}

fn parse_day(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|err| format!("expected YYYY-MM-DD, got `{value}`: {err}"))
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("lazyreview: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match cli.config.as_deref() {
        Some(path) => ReviewConfig::load(path)?,
        None => ReviewConfig::default(),
    };
    if let Some(dir) = cli.notes_dir {
        config.notes_dir = dir;
    }
    if let Err(err) = init_from_config(&config) {
        eprintln!("lazyreview: logging disabled: {err}");
    }

    let today = cli.today.unwrap_or_else(local_today);
    info!(
        "event=cli_run module=cli status=start command={:?} today={today}",
        cli.command
    );
    let host = FsNoteHost::new(config.notes_dir.clone());
    let mut service = ReviewService::new(host, config);

    match cli.command {
        Command::List => {
            for entry in service.ready_for_review(today)? {
                println!("{}", machine_summary_line(&entry.state));
            }
        }
        Command::Summary => {
            let projects: Vec<_> = service
                .list_projects(today)?
                .into_iter()
                .map(|entry| entry.state)
                .collect();
            print!("{}", render_review_summary(&projects, service.config()));
        }
        Command::Show { note } => {
            let state = service.load_project(&note, today)?;
            if let Some(err) = state.interval_error() {
                eprintln!("lazyreview: warning: {err}");
            }
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
        Command::Complete { note } => report(service.complete(&note, today))?,
        Command::Cancel { note } => report(service.cancel(&note, today))?,
        Command::Reviewed { note } => report(service.finish_review(&note, today))?,
        Command::Version => println!("lazyreview_core {}", core_version()),
    }
    Ok(())
}

fn report(result: Result<Transition, ReviewServiceError>) -> Result<(), ReviewServiceError> {
    let transition = result?;
    if let Some(err) = transition.state.interval_error() {
        eprintln!("lazyreview: warning: {err}");
    }
    println!("{}", transition.metadata_line);
    Ok(())
}
