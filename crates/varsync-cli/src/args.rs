//! Command line arguments

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use varsync_core::Mode;

/// Converge a global priority variable set across control plane organizations
#[derive(Debug, Parser)]
#[command(name = "varsync", version, about)]
pub(crate) struct Args {
    /// Operation to perform
    #[arg(long, default_value = "create", value_parser = parse_mode)]
    pub(crate) mode: Mode,

    /// Path to the YAML configuration file
    #[arg(long)]
    pub(crate) config: PathBuf,

    /// Organizations to target: a file with one name per line, or a
    /// comma-separated list
    #[arg(long)]
    pub(crate) orgs: Option<String>,

    /// Log intended changes without applying them
    #[arg(long)]
    pub(crate) dry_run: bool,

    /// Log verbosity
    #[arg(long, value_enum, ignore_case = true, default_value_t = LogLevel::Info)]
    pub(crate) log_level: LogLevel,

    /// Organizations processed concurrently
    #[arg(long, default_value_t = 5)]
    pub(crate) max_workers: usize,

    /// Append-only execution log
    #[arg(long, default_value = "execution.log")]
    pub(crate) log_file: PathBuf,

    /// Directory the CSV report is written to
    #[arg(long, default_value = ".")]
    pub(crate) report_dir: PathBuf,
}

fn parse_mode(value: &str) -> Result<Mode, String> {
    value.parse()
}

/// Accepted `--log-level` values
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum LogLevel {
    Debug,
    Info,
    #[value(alias = "warn")]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    /// `tracing` level name
    pub(crate) fn as_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error | Self::Critical => "error",
        }
    }
}
