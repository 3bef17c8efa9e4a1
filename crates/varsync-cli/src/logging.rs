//! Tracing setup: console plus an append-only log file

use crate::args::LogLevel;
use anyhow::Context;
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive for a level; HTTP internals never log below `info`
pub(crate) fn filter_directive(level: LogLevel) -> String {
    let base = level.as_directive();
    if level == LogLevel::Debug {
        format!("{base},hyper=info,hyper_util=info,reqwest=info,h2=info")
    } else {
        base.to_string()
    }
}

/// Install the global subscriber
///
/// `RUST_LOG`, when set, overrides `level`.
pub(crate) fn init(level: LogLevel, log_file: &Path) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter_directive(level)))
        .context("invalid log filter")?;

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("failed to open log file {}", log_file.display()))?;

    let console_layer = fmt::layer().with_target(false).with_thread_names(true);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_thread_names(true)
        .with_writer(Arc::new(file));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("logging already initialised")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_caps_http_noise() {
        let directive = filter_directive(LogLevel::Debug);
        assert!(directive.starts_with("debug,"));
        assert!(directive.contains("hyper=info"));
        assert!(directive.contains("reqwest=info"));
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn other_levels_are_plain() {
        assert_eq!(filter_directive(LogLevel::Info), "info");
        assert_eq!(filter_directive(LogLevel::Warning), "warn");
        assert_eq!(filter_directive(LogLevel::Critical), "error");
    }
}
