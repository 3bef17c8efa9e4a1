//! varsync core - global priority variable set reconciliation
//!
//! Converges one named, global, priority configuration set inside every
//! tenant of a control plane to a declared target:
//! - Loads and validates the target configuration
//! - Talks JSON:API over a retrying HTTP client
//! - Locates, creates, reconciles, or deletes the set per tenant
//! - Fans tenants out over a bounded worker pool
//! - Records every action in a CSV run report
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use varsync_core::prelude::*;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let target = Arc::new(TargetConfig::load("config.yaml")?);
//! let options = SyncOptions::new().with_dry_run(true);
//! let api = ControlPlane::connect(&target.control_plane_url, "token", &options)?;
//! let report = Arc::new(RunReport::new());
//!
//! let tenants = list_tenants(&api, options.tenant_page_size).await;
//! let reconciler = Arc::new(Reconciler::new(api, target, options.clone(), Arc::clone(&report)));
//! let summary = Orchestrator::new(reconciler, &options).run(tenants, Mode::Update).await;
//!
//! println!("{} tenants, {} failed", summary.total(), summary.failed());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod locator;
pub mod orchestrator;
pub mod pagination;
pub mod reconcile;
pub mod report;
pub mod types;

pub use api::ControlPlane;
pub use config::{SyncOptions, TargetConfig};
pub use error::{ConfigError, HttpError, ReportError, SyncError};
pub use http::{ApiRequest, ApiResponse, Method, RetryPolicy, RetryingClient, Transport};
pub use locator::SetLocator;
pub use orchestrator::{Orchestrator, RunSummary, TenantOutcome};
pub use pagination::{list_all, list_tenants, Paginator};
pub use reconcile::{Mode, PlannedUpdate, ReconcilePlan, Reconciler};
pub use report::{ActionKind, ReportRecord, ReportSummary, RunReport, Status};
pub use types::{
    Category, ConfigurationSet, DesiredEntry, EntryAttributes, RemoteEntry, SetAttributes, Tenant,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a run
    pub use crate::{
        list_tenants, ControlPlane, DesiredEntry, Mode, Orchestrator, Reconciler, RunReport,
        RunSummary, SyncError, SyncOptions, TargetConfig, Tenant,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
