//! Entry reconciler
//!
//! Three entry points, one per mode:
//! - [`Reconciler::create`]: create the set, then add every desired entry
//! - [`Reconciler::reconcile`]: diff the set's entries against the desired
//!   list and apply adds, then updates, then deletes
//! - [`Reconciler::delete`]: delete the set (entries cascade server-side)
//!
//! Each action records exactly one report row in live mode. In dry-run mode
//! actions log what they would send and record nothing.

mod actions;
pub mod plan;

pub use plan::{PlannedUpdate, ReconcilePlan};

use crate::api::ControlPlane;
use crate::config::{SyncOptions, TargetConfig};
use crate::error::{HttpError, SyncError};
use crate::http::ApiRequest;
use crate::locator::SetLocator;
use crate::report::{ActionKind, ReportRecord, RunReport, Status};
use crate::types::{Document, RemoteEntry, RemoteEntryAttributes, Resource, Tenant};
use actions::SetCreation;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Top-level operation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Create the set and populate it
    #[default]
    Create,
    /// Reconcile entries of an existing set
    Update,
    /// Delete the set
    Delete,
}

impl Mode {
    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Set-level action a run in this mode reports under
    #[must_use]
    pub fn set_action(self) -> ActionKind {
        match self {
            Self::Create => ActionKind::CreateSet,
            Self::Update => ActionKind::UpdateSet,
            Self::Delete => ActionKind::DeleteSet,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(format!("unknown mode: {other}")),
        }
    }
}

/// Applies the target configuration to one tenant at a time
///
/// Shared read-only across tenant workers; the only mutable state it touches
/// is the report, which synchronizes internally.
#[derive(Debug)]
pub struct Reconciler {
    api: ControlPlane,
    target: Arc<TargetConfig>,
    options: SyncOptions,
    report: Arc<RunReport>,
}

impl Reconciler {
    /// Create reconciler
    #[must_use]
    pub fn new(
        api: ControlPlane,
        target: Arc<TargetConfig>,
        options: SyncOptions,
        report: Arc<RunReport>,
    ) -> Self {
        Self {
            api,
            target,
            options,
            report,
        }
    }

    /// Control plane handle
    #[inline]
    #[must_use]
    pub fn api(&self) -> &ControlPlane {
        &self.api
    }

    /// Target configuration
    #[inline]
    #[must_use]
    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    /// Run options
    #[inline]
    #[must_use]
    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Shared report
    #[inline]
    #[must_use]
    pub fn report(&self) -> &Arc<RunReport> {
        &self.report
    }

    /// Dispatch on mode
    ///
    /// # Errors
    /// `SyncError::UnexpectedResponse` when the API answers a successful
    /// request with an unusable body
    pub async fn run(&self, mode: Mode, tenant: &Tenant) -> Result<(), SyncError> {
        match mode {
            Mode::Create => self.create(tenant).await,
            Mode::Update => self.reconcile(tenant).await,
            Mode::Delete => self.delete(tenant).await,
        }
    }

    /// Create the set and add every desired entry
    ///
    /// A name conflict means the set already exists and is reported as
    /// skipped; entries are only added to a set this call created.
    ///
    /// # Errors
    /// `SyncError::UnexpectedResponse` if a created set has no usable id
    pub async fn create(&self, tenant: &Tenant) -> Result<(), SyncError> {
        info!(%tenant, "creating global priority set");

        if self.options.dry_run {
            if let Some(set_id) = self.locate(tenant).await {
                info!(
                    "[DRY RUN] set '{}' already exists for tenant {tenant} (id: {set_id}), would not create",
                    self.target.target_set_name
                );
                return Ok(());
            }
        }

        let set_id = match self.create_set(tenant).await? {
            SetCreation::Created(set_id) => set_id,
            SetCreation::Planned => actions::PENDING_SET_ID.to_string(),
            SetCreation::NotCreated => return Ok(()),
        };

        for entry in &self.target.desired_entries {
            self.add_entry(tenant, &set_id, entry).await;
        }

        Ok(())
    }

    /// Bring the set's entries in line with the desired list
    ///
    /// # Errors
    /// None at present; rejections become report rows
    pub async fn reconcile(&self, tenant: &Tenant) -> Result<(), SyncError> {
        info!(%tenant, "updating global priority set");

        let Some(set_id) = self.locate(tenant).await else {
            warn!(%tenant, "no global priority set found to update");
            self.record(ReportRecord::new(
                tenant.name(),
                ActionKind::UpdateSet,
                Status::Error,
                "no global priority set found to update",
            ));
            return Ok(());
        };

        let current = match self.current_entries(&set_id).await {
            Ok(current) => current,
            Err(e) => {
                error!(%tenant, %set_id, error = %e, "failed to read current entries");
                self.record(
                    ReportRecord::new(
                        tenant.name(),
                        ActionKind::UpdateSet,
                        Status::Error,
                        format!("failed to read current entries: {e}"),
                    )
                    .with_set(&set_id),
                );
                return Ok(());
            }
        };

        let plan = ReconcilePlan::compute(&current, &self.target.desired_entries);
        info!(
            %tenant,
            %set_id,
            adds = plan.adds.len(),
            updates = plan.updates.len(),
            unchanged = plan.unchanged.len(),
            deletes = plan.deletes.len(),
            "computed plan"
        );

        for entry in &plan.adds {
            self.add_entry(tenant, &set_id, entry).await;
        }
        for update in &plan.updates {
            self.update_entry(tenant, &set_id, update).await;
        }
        for key in &plan.unchanged {
            info!(%tenant, key, "no updates found for entry");
            self.record(
                ReportRecord::new(
                    tenant.name(),
                    ActionKind::UpdateEntry,
                    Status::Skipped,
                    format!("no updates found for entry {key}"),
                )
                .with_set(&set_id)
                .with_entry(*key),
            );
        }
        for entry in &plan.deletes {
            self.delete_entry(tenant, &set_id, entry).await;
        }

        Ok(())
    }

    /// Delete the set
    ///
    /// # Errors
    /// None at present; rejections become report rows
    pub async fn delete(&self, tenant: &Tenant) -> Result<(), SyncError> {
        info!(%tenant, "deleting global priority set");

        let Some(set_id) = self.locate(tenant).await else {
            warn!(%tenant, "no global priority set found to delete");
            self.record(ReportRecord::new(
                tenant.name(),
                ActionKind::DeleteSet,
                Status::Error,
                format!("no global priority set found for tenant {tenant}"),
            ));
            return Ok(());
        };

        self.delete_set(tenant, &set_id).await;
        Ok(())
    }

    /// Id of the tenant's global priority set
    pub async fn locate(&self, tenant: &Tenant) -> Option<String> {
        SetLocator::new(&self.api, self.options.set_page_size)
            .find(tenant, &self.target.target_set_name)
            .await
    }

    /// Every entry currently in the set
    ///
    /// # Errors
    /// Any HTTP or decode failure; a partial read is never returned
    pub async fn current_entries(&self, set_id: &str) -> Result<Vec<RemoteEntry>, HttpError> {
        let response = self
            .api
            .execute(ApiRequest::get(self.api.entries_url(set_id)))
            .await?;
        let document: Document<Vec<Resource<RemoteEntryAttributes>>> = response.success_json()?;
        Ok(document.data.into_iter().map(RemoteEntry::from).collect())
    }

    /// Record a failure that ended the tenant's run early
    pub fn record_failure(&self, mode: Mode, tenant: &Tenant, message: impl Into<String>) {
        self.record(ReportRecord::new(
            tenant.name(),
            mode.set_action(),
            Status::Error,
            message,
        ));
    }

    /// Append to the report; dry runs only log
    fn record(&self, record: ReportRecord) {
        if !self.options.dry_run {
            self.report.record(record);
        }
    }
}
