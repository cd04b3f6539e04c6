//! Configuration types for fileperf
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Runtime configuration with validation

use crate::error::ConfigError;
use crate::pattern::Pattern;
use crate::walker::Scanner;
use clap::{Parser, Subcommand};
use std::path::{Component, Path, PathBuf};

/// Tests the read performance of the file system
#[derive(Parser, Debug, Clone)]
#[command(
    name = "fileperf",
    version,
    about = "Tests the read performance of the file system",
    after_help = "EXAMPLES:\n    \
        fileperf scan /mnt/data\n    \
        fileperf scan /srv/a /srv/b --exclude '^\\.git$' -v\n    \
        fileperf scan /var/log --include '\\.log$' --show-skipped -v"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Log filter directive (overrides RUST_LOG-style defaults)
    #[arg(long, global = true, value_name = "FILTER")]
    pub log_level: Option<String>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Scans a set of file paths recursively and tests the read performance
    /// of each file. Reports cumulative statistics.
    Scan(ScanArgs),
}

/// Arguments for the `scan` subcommand
#[derive(clap::Args, Debug, Clone)]
pub struct ScanArgs {
    /// Paths to search recursively
    #[arg(value_name = "PATHS", env = "PATHS", required = true)]
    pub paths: Vec<PathBuf>,

    /// Include files matching regular expression pattern (can be repeated)
    #[arg(long, env = "INCLUDE", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub include: Vec<String>,

    /// Exclude files matching regular expression pattern (can be repeated)
    #[arg(long, env = "EXCLUDE", value_name = "PATTERN", action = clap::ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Show per-file statistics
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Also list files skipped by filters (with --verbose)
    #[arg(long)]
    pub show_skipped: bool,

    /// Quiet mode - suppress the progress spinner
    #[arg(short = 'q', long)]
    pub quiet: bool,
}

/// Validated runtime configuration for a scan
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Cleaned root directories, in the order given
    pub roots: Vec<PathBuf>,

    /// Compiled include patterns
    pub include: Vec<Pattern>,

    /// Compiled exclude patterns
    pub exclude: Vec<Pattern>,

    /// Print one line per file
    pub verbose: bool,

    /// Report skipped entries
    pub show_skipped: bool,

    /// Show progress indicator
    pub show_progress: bool,
}

impl ScanConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: ScanArgs) -> Result<Self, ConfigError> {
        if args.paths.is_empty() {
            return Err(ConfigError::NoPaths);
        }

        let roots = args
            .paths
            .iter()
            .map(|p| {
                let cleaned = clean_path(p);
                if cleaned.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidRoot {
                        path: p.clone(),
                        reason: "empty path".into(),
                    });
                }
                Ok(cleaned)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Patterns are compiled here so mistakes surface before any scan
        let include = compile(&args.include)?;
        let exclude = compile(&args.exclude)?;

        Ok(Self {
            roots,
            include,
            exclude,
            verbose: args.verbose,
            show_skipped: args.show_skipped && args.verbose,
            show_progress: !args.quiet && !args.verbose,
        })
    }

    /// Scanner configured with this filter set
    pub fn scanner(&self) -> Scanner {
        Scanner {
            include: self.include.clone(),
            exclude: self.exclude.clone(),
            report_skipped: self.show_skipped,
        }
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns.iter().map(|p| Pattern::new(p)).collect()
}

/// Lexically clean a path: drop `.` components and fold `..` where possible
pub fn clean_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    out.pop();
                } else if !matches!(
                    out.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() && !path.as_os_str().is_empty() {
        out.push(".");
    }
    out
}
