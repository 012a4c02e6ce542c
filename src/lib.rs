//! hashdex - content-fingerprint index for duplicate files
//!
//! Files are fingerprinted from a bounded head/tail sample with two
//! independent digests and recorded in a SQLite index. The index answers
//! "have I seen this content before?" for new files, lists indexed files
//! sharing a fingerprint (verified byte for byte), and forgets files that
//! have disappeared from disk.

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod index;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod signal;
pub mod workflow;

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use yansi::Paint;

use crate::actions::ActionOutcome;
use crate::cli::{CheckArgs, Cli, Commands, DuplicatesArgs, IndexArgs, OutputFormat};
use crate::config::Config;
use crate::error::ExitCode;
use crate::output::{JsonReport, TextOutput};
use crate::progress::Progress;
use crate::scanner::{DirectoryScanner, FileRecord};
use crate::signal::ShutdownHandler;
use crate::workflow::{CheckSummary, IndexingWorkflow, WorkflowError};

/// Run the command described by `cli` and return the process exit code.
///
/// # Errors
///
/// Returns an error for anything that aborts the command: an unreadable
/// scan root, an index that cannot be opened, or a failed delete/move
/// during `check`.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let handler = signal::install_handler()?;
    let mut config = Config::load();
    cli.apply_to(&mut config);

    let ctx = RunContext {
        handler,
        quiet: cli.quiet,
    };

    match cli.command {
        Commands::Index(ref args) => {
            args.scan.apply_to(&mut config);
            run_index(args, &config, &ctx)
        }
        Commands::Check(ref args) => {
            args.scan.apply_to(&mut config);
            run_check(args, &config, &ctx)
        }
        Commands::Duplicates(ref args) => run_duplicates(args, &config, &ctx),
        Commands::Cleanup => run_cleanup(&config, &ctx),
    }
}

struct RunContext {
    handler: ShutdownHandler,
    quiet: bool,
}

impl RunContext {
    fn open_workflow(&self, config: &Config) -> Result<IndexingWorkflow> {
        let workflow = IndexingWorkflow::open(config)
            .context("Failed to open index")?
            .with_shutdown_flag(self.handler.get_flag())
            .with_progress(Arc::new(Progress::new(self.quiet)));
        Ok(workflow)
    }

    fn scan(&self, path: &Path, config: &Config) -> Result<Vec<FileRecord>> {
        let root = path
            .canonicalize()
            .with_context(|| format!("Cannot access {}", path.display()))?;
        let files = DirectoryScanner::new(&root, config.walker_config())
            .with_shutdown_flag(self.handler.get_flag())
            .files()?;
        log::info!("Found {} files under {}", files.len(), root.display());
        Ok(files)
    }

    fn exit_code(&self, interrupted: bool, failures: usize) -> ExitCode {
        if interrupted || self.handler.is_shutdown_requested() {
            ExitCode::Interrupted
        } else if failures > 0 {
            ExitCode::PartialSuccess
        } else {
            ExitCode::Success
        }
    }
}

fn run_index(args: &IndexArgs, config: &Config, ctx: &RunContext) -> Result<ExitCode> {
    let files = ctx.scan(&args.path, config)?;
    if ctx.handler.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }

    let mut workflow = ctx.open_workflow(config)?;
    let summary = workflow.add(&files)?;

    let indexed = summary.processed - summary.failures.len();
    println!("Successfully indexed {} files", indexed);
    println!("A total of {} fingerprints are indexed", summary.fingerprints);
    if !summary.failures.is_empty() {
        eprintln!(
            "{} {} files could not be indexed",
            "warning:".yellow().bold(),
            summary.failures.len()
        );
    }

    Ok(ctx.exit_code(summary.interrupted, summary.failures.len()))
}

fn run_check(args: &CheckArgs, config: &Config, ctx: &RunContext) -> Result<ExitCode> {
    let files = ctx.scan(&args.path, config)?;
    if ctx.handler.is_shutdown_requested() {
        return Ok(ExitCode::Interrupted);
    }

    let mut workflow = ctx.open_workflow(config)?;
    let summary = match workflow.check(&files, &args.disposition()) {
        Ok(summary) => summary,
        Err(e) => {
            if let WorkflowError::CheckAborted { summary, .. } = &e {
                print_check_summary(summary);
            }
            return Err(e.into());
        }
    };
    print_check_summary(&summary);

    Ok(ctx.exit_code(summary.interrupted, summary.failures.len()))
}

fn print_check_summary(summary: &CheckSummary) {
    for found in &summary.matches {
        let original = found.original.display();
        match &found.outcome {
            ActionOutcome::Reported(path) => {
                println!("{} duplicates {}", path.display(), original)
            }
            ActionOutcome::Trashed(path) => {
                println!("Trashed {} (original at {})", path.display(), original)
            }
            ActionOutcome::Deleted(path) => {
                println!("Deleted {} (original at {})", path.display(), original)
            }
            ActionOutcome::Moved { from, to } => println!(
                "Moved {} to {} (original at {})",
                from.display(),
                to.display(),
                original
            ),
        }
    }
    println!(
        "{} of {} files were already indexed",
        summary.matches.len(),
        summary.processed
    );
}

fn run_duplicates(args: &DuplicatesArgs, config: &Config, ctx: &RunContext) -> Result<ExitCode> {
    let workflow = ctx.open_workflow(config)?;
    let mut failures = 0usize;

    let stats = match args.output {
        OutputFormat::Text => {
            let stdout = io::stdout();
            let mut out = TextOutput::new(stdout.lock());
            for group in workflow.duplicates()? {
                if ctx.handler.is_shutdown_requested() {
                    break;
                }
                match group {
                    Ok(group) => out.write_group(&group)?,
                    Err(e) => {
                        log::error!("{}", e);
                        failures += 1;
                    }
                }
            }
            out.finish()?
        }
        OutputFormat::Json => {
            let mut groups = Vec::new();
            for group in workflow.duplicates()? {
                if ctx.handler.is_shutdown_requested() {
                    break;
                }
                match group {
                    Ok(group) => groups.push(group),
                    Err(e) => {
                        log::error!("{}", e);
                        failures += 1;
                    }
                }
            }
            let report = JsonReport::new(&groups);
            let stdout = io::stdout();
            let mut lock = stdout.lock();
            report.write_to(&mut lock)?;
            lock.flush()?;
            duplicates::GroupStats::from_groups(&groups)
        }
    };

    let code = ctx.exit_code(false, failures);
    if code == ExitCode::Success && stats.groups == 0 {
        return Ok(ExitCode::NoDuplicates);
    }
    Ok(code)
}

fn run_cleanup(config: &Config, ctx: &RunContext) -> Result<ExitCode> {
    let mut workflow = ctx.open_workflow(config)?;
    let summary = workflow.cleanup()?;

    for path in &summary.removed {
        println!("Removed {}", path.display());
    }
    println!(
        "Removed {} of {} indexed files",
        summary.removed.len(),
        summary.scanned
    );

    Ok(ctx.exit_code(summary.interrupted, summary.failures.len()))
}
