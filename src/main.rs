//! fileperf - Filesystem Read Performance Scanner
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use clap::Parser;
use fileperf::config::{CliArgs, Command, ScanArgs, ScanConfig};
use fileperf::fs::Dir;
use fileperf::progress::{print_header, print_summary, ProgressReporter};
use fileperf::walker::{CancelToken, Scanner};
use fileperf::ScanError;
use std::path::Path;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();

    setup_logging(args.log_level.as_deref())?;

    match args.command {
        Command::Scan(scan) => run_scan(scan),
    }
}

fn run_scan(args: ScanArgs) -> Result<()> {
    let config = ScanConfig::from_args(args).context("Invalid configuration")?;
    let scanner = config.scanner();

    // One handler for the whole process; each root polls the same token
    let interrupt = CancelToken::new();
    let handler_token = interrupt.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nInterrupt received, shutting down...");
        handler_token.cancel();
    })
    .context("Failed to set signal handler")?;

    for root in &config.roots {
        match scan_root(&scanner, &config, root, &interrupt) {
            Ok(()) => {}
            Err(e) if e.is_cancellation() => {
                info!("Scan was interrupted before completion");
                return Ok(());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Scan of {} failed", root.display()));
            }
        }
    }

    Ok(())
}

fn scan_root(
    scanner: &Scanner,
    config: &ScanConfig,
    root: &Path,
    interrupt: &CancelToken,
) -> Result<(), ScanError> {
    let mut iter = scanner.scan_dir(Dir::new(root))?;

    print_header(root);

    let mut progress = if config.show_progress {
        ProgressReporter::new()
    } else {
        ProgressReporter::hidden()
    };

    while iter.advance(interrupt) {
        if config.verbose {
            if let Some(record) = iter.current() {
                progress.println(record.to_string());
            }
        } else {
            progress.update(&iter.statistics());
        }
    }

    iter.close();
    progress.finish_and_clear();

    let stats = iter.statistics();
    let outcome = iter.error().cloned();
    let interrupted = outcome.as_ref().is_some_and(ScanError::is_cancellation);
    print_summary(&stats, iter.elapsed(), interrupted);

    if stats.errors > 0 {
        info!(errors = stats.errors, "Scan completed with file errors");
    }

    match outcome {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn setup_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("Invalid log filter '{}'", directive))?,
        None => EnvFilter::new("fileperf=info,warn"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();

    Ok(())
}
