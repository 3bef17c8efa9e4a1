//! varsync - reconcile a global priority variable set across organizations

mod args;
mod logging;
mod prompts;
mod tenants;

use anyhow::Context;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};
use varsync_core::{
    ControlPlane, Mode, Orchestrator, Reconciler, RunReport, SyncError, SyncOptions, TargetConfig,
};

use crate::args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.log_level, &args.log_file) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let started = Instant::now();

    let target = TargetConfig::load(&args.config)
        .map_err(SyncError::from)
        .context("failed to load configuration")?;
    info!(
        set = %target.target_set_name,
        entries = target.desired_entries.len(),
        mode = %args.mode,
        "loaded configuration"
    );

    let token = prompts::admin_token()?;

    let options = SyncOptions::new()
        .with_dry_run(args.dry_run)
        .with_max_workers(args.max_workers);
    if options.dry_run {
        info!("[DRY RUN] no changes will be made");
    }

    if args.mode == Mode::Delete
        && !options.dry_run
        && !prompts::confirm_delete(&target.target_set_name)?
    {
        warn!("delete not confirmed, aborting");
        return Err(SyncError::Aborted.into());
    }

    let api = ControlPlane::connect(&target.control_plane_url, &token, &options)
        .map_err(SyncError::from)?;
    let tenants =
        tenants::select(args.orgs.as_deref(), &target, &api, options.tenant_page_size).await?;
    if tenants.is_empty() {
        warn!("no organizations to process");
    }

    let report = Arc::new(RunReport::new());
    let reconciler = Arc::new(Reconciler::new(
        api,
        Arc::new(target),
        options.clone(),
        Arc::clone(&report),
    ));
    let summary = Orchestrator::new(reconciler, &options)
        .run(tenants, args.mode)
        .await;

    for outcome in summary.failures() {
        if let Some(failure) = &outcome.failure {
            error!(tenant = %outcome.tenant, "organization failed: {failure}");
        }
    }

    write_report(&report, &args.report_dir);

    let counts = report.summary();
    if counts.not_successful() > 0 {
        warn!(
            skipped = counts.skipped,
            errors = counts.error,
            "{} of {} actions did not succeed, check the report",
            counts.not_successful(),
            counts.total()
        );
    }
    info!(
        organizations = summary.total(),
        failed = summary.failed(),
        success = counts.success,
        "run complete"
    );

    let elapsed = started.elapsed().as_secs_f64();
    info!(
        "total runtime: {elapsed:.2} seconds ({:.2} minutes)",
        elapsed / 60.0
    );

    Ok(())
}

/// Write the report into `dir`; a write failure is logged, never fatal
fn write_report(report: &RunReport, dir: &Path) -> Option<PathBuf> {
    match report.flush(dir) {
        Ok(Some(path)) => {
            info!("report written to {}", path.display());
            Some(path)
        }
        Ok(None) => {
            info!("no actions recorded, report not written");
            None
        }
        Err(e) => {
            error!(dir = %dir.display(), error = %e, "failed to write report");
            None
        }
    }
}
