//! Single mutating actions
//!
//! Each action sends one request (or logs it under dry-run) and maps the
//! response status onto one report row. Expected API rejections are rows,
//! not errors.

use super::{PlannedUpdate, Reconciler};
use crate::error::SyncError;
use crate::http::{ApiRequest, ApiResponse};
use crate::report::{ActionKind, ReportRecord, Status};
use crate::types::{DesiredEntry, Document, RemoteEntry, Resource, SetAttributes, Tenant};
use tracing::{error, info, warn};

/// Placeholder id used in dry-run logs for a set that does not exist yet
pub(super) const PENDING_SET_ID: &str = "<new set>";

/// Detail the API returns when the set name is in use
const NAME_TAKEN: &str = "Name has already been taken";

/// Outcome of a create-set request
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum SetCreation {
    /// Created with this id
    Created(String),
    /// Dry run, nothing sent
    Planned,
    /// Exists already, rejected, or failed; already reported
    NotCreated,
}

/// `"{status}: {detail}"` from a rejected response
fn rejection(response: &ApiResponse) -> String {
    let detail = response
        .first_error_detail()
        .unwrap_or_else(|| response.body.trim().to_string());
    format!("{}: {detail}", response.status)
}

impl Reconciler {
    pub(super) async fn create_set(&self, tenant: &Tenant) -> Result<SetCreation, SyncError> {
        let payload = self.target.set_payload();

        if self.options.dry_run {
            info!("[DRY RUN] would create set for tenant {tenant} with payload {payload}");
            return Ok(SetCreation::Planned);
        }

        let request = ApiRequest::post(self.api.sets_url(tenant), payload);
        let record = |status, message: String| {
            ReportRecord::new(tenant.name(), ActionKind::CreateSet, status, message)
        };

        let response = match self.api.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                error!(%tenant, error = %e, "create set request failed");
                self.record(record(Status::Error, e.to_string()));
                return Ok(SetCreation::NotCreated);
            }
        };

        match response.status {
            201 => {
                let created: Document<Resource<SetAttributes>> =
                    response.json().map_err(|e| {
                        SyncError::UnexpectedResponse(format!(
                            "set created for tenant {tenant} but response was unusable: {e}"
                        ))
                    })?;
                let set_id = created.data.id;
                info!(%tenant, %set_id, "created set");
                self.record(
                    record(Status::Success, format!("created set {set_id}")).with_set(&set_id),
                );
                Ok(SetCreation::Created(set_id))
            }
            422 if response.first_error_detail().as_deref() == Some(NAME_TAKEN) => {
                warn!(%tenant, "set '{}' already exists", self.target.target_set_name);
                self.record(record(
                    Status::Skipped,
                    format!("set '{}' already exists", self.target.target_set_name),
                ));
                Ok(SetCreation::NotCreated)
            }
            status => {
                error!(%tenant, status, body = %response.body, "failed to create set");
                self.record(record(Status::Error, rejection(&response)));
                Ok(SetCreation::NotCreated)
            }
        }
    }

    pub(super) async fn add_entry(&self, tenant: &Tenant, set_id: &str, entry: &DesiredEntry) {
        let key = entry.key.as_str();

        if self.options.dry_run {
            info!(
                "[DRY RUN] would add entry {key} to set {set_id} for tenant {tenant} with payload {}",
                entry.to_redacted_payload()
            );
            return;
        }

        let request = ApiRequest::post(self.api.entries_url(set_id), entry.to_payload());
        let (status, message) = match self.api.execute(request).await {
            Ok(response) if response.status == 201 => {
                info!(%tenant, set_id, key, "added entry");
                (Status::Success, format!("added entry {key}"))
            }
            Ok(response) => {
                error!(%tenant, set_id, key, status = response.status, "failed to add entry");
                (Status::Error, rejection(&response))
            }
            Err(e) => {
                error!(%tenant, set_id, key, error = %e, "add entry request failed");
                (Status::Error, e.to_string())
            }
        };

        self.record(
            ReportRecord::new(tenant.name(), ActionKind::AddEntry, status, message)
                .with_set(set_id)
                .with_entry(key),
        );
    }

    pub(super) async fn update_entry(
        &self,
        tenant: &Tenant,
        set_id: &str,
        update: &PlannedUpdate<'_>,
    ) {
        let key = update.desired.key.as_str();
        let changed = update.changed.join(", ");

        if self.options.dry_run {
            info!(
                "[DRY RUN] would update entry {key} ({changed}) in set {set_id} for tenant {tenant} with payload {}",
                update.desired.to_redacted_payload()
            );
            return;
        }

        let request = ApiRequest::patch(
            self.api.entry_url(set_id, update.entry_id),
            update.desired.to_payload(),
        );
        let (status, message) = match self.api.execute(request).await {
            Ok(response) if response.status == 200 => {
                info!(%tenant, set_id, key, changed, "updated entry");
                (Status::Success, format!("updated entry {key} ({changed})"))
            }
            Ok(response) => {
                error!(%tenant, set_id, key, status = response.status, "failed to update entry");
                (Status::Error, rejection(&response))
            }
            Err(e) => {
                error!(%tenant, set_id, key, error = %e, "update entry request failed");
                (Status::Error, e.to_string())
            }
        };

        self.record(
            ReportRecord::new(tenant.name(), ActionKind::UpdateEntry, status, message)
                .with_set(set_id)
                .with_entry(key),
        );
    }

    pub(super) async fn delete_entry(&self, tenant: &Tenant, set_id: &str, entry: &RemoteEntry) {
        let key = entry.key.as_str();

        if self.options.dry_run {
            info!(
                "[DRY RUN] would delete entry {key} ({}) from set {set_id} for tenant {tenant}",
                entry.id
            );
            return;
        }

        let request = ApiRequest::delete(self.api.entry_url(set_id, &entry.id));
        let (status, message) = match self.api.execute(request).await {
            Ok(response) if response.status == 204 => {
                info!(%tenant, set_id, key, "deleted entry");
                (Status::Success, format!("deleted entry {key}, no longer desired"))
            }
            Ok(response) => {
                error!(%tenant, set_id, key, status = response.status, "failed to delete entry");
                (Status::Error, rejection(&response))
            }
            Err(e) => {
                error!(%tenant, set_id, key, error = %e, "delete entry request failed");
                (Status::Error, e.to_string())
            }
        };

        self.record(
            ReportRecord::new(tenant.name(), ActionKind::DeleteEntry, status, message)
                .with_set(set_id)
                .with_entry(key),
        );
    }

    pub(super) async fn delete_set(&self, tenant: &Tenant, set_id: &str) {
        if self.options.dry_run {
            info!("[DRY RUN] would delete set {set_id} for tenant {tenant}");
            return;
        }

        let request = ApiRequest::delete(self.api.set_url(set_id));
        let (status, message) = match self.api.execute(request).await {
            Ok(response) if response.status == 204 => {
                info!(%tenant, set_id, "deleted set");
                (Status::Success, format!("deleted set {set_id}"))
            }
            Ok(response) if response.status == 404 => {
                warn!(%tenant, set_id, "set not found");
                (
                    Status::Error,
                    format!("set {set_id} not found for tenant {tenant}"),
                )
            }
            Ok(response) => {
                error!(%tenant, set_id, status = response.status, "failed to delete set");
                (Status::Error, rejection(&response))
            }
            Err(e) => {
                error!(%tenant, set_id, error = %e, "delete set request failed");
                (Status::Error, e.to_string())
            }
        };

        self.record(
            ReportRecord::new(tenant.name(), ActionKind::DeleteSet, status, message)
                .with_set(set_id),
        );
    }
}
