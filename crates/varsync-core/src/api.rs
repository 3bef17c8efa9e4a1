//! Control plane endpoints
//!
//! Resource hierarchy: organization → variable set → variables.

use crate::config::SyncOptions;
use crate::error::HttpError;
use crate::http::{ApiRequest, ApiResponse, ReqwestTransport, RetryingClient, Transport};
use crate::types::Tenant;

/// API path prefix appended to the configured URL
pub const API_PREFIX: &str = "/api/v2";

/// Handle on the control plane API
#[derive(Debug)]
pub struct ControlPlane {
    http: RetryingClient,
    root: String,
}

impl ControlPlane {
    /// Create from an already configured client
    #[must_use]
    pub fn new(http: RetryingClient, control_plane_url: &str) -> Self {
        Self {
            http,
            root: format!("{}{API_PREFIX}", control_plane_url.trim_end_matches('/')),
        }
    }

    /// Connect with a bearer token over `reqwest`
    ///
    /// # Errors
    /// `HttpError::Client` if the HTTP client cannot be built
    pub fn connect(
        control_plane_url: &str,
        token: &str,
        options: &SyncOptions,
    ) -> Result<Self, HttpError> {
        let transport = ReqwestTransport::new(token, options.request_timeout)?;
        Ok(Self::with_transport(
            transport,
            control_plane_url,
            options,
        ))
    }

    /// Build over any transport with the options' retry policy
    #[must_use]
    pub fn with_transport(
        transport: impl Transport + 'static,
        control_plane_url: &str,
        options: &SyncOptions,
    ) -> Self {
        Self::new(
            RetryingClient::new(transport, options.retry.clone()),
            control_plane_url,
        )
    }

    /// Send through the retrying client
    ///
    /// # Errors
    /// See [`RetryingClient::execute`]
    #[inline]
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpError> {
        self.http.execute(request).await
    }

    /// `/organizations`
    #[must_use]
    pub fn tenants_url(&self) -> String {
        format!("{}/organizations", self.root)
    }

    /// `/organizations/{tenant}/varsets`
    #[must_use]
    pub fn sets_url(&self, tenant: &Tenant) -> String {
        format!("{}/organizations/{}/varsets", self.root, tenant.name())
    }

    /// `/varsets/{set_id}`
    #[must_use]
    pub fn set_url(&self, set_id: &str) -> String {
        format!("{}/varsets/{set_id}", self.root)
    }

    /// `/varsets/{set_id}/relationships/vars`
    #[must_use]
    pub fn entries_url(&self, set_id: &str) -> String {
        format!("{}/varsets/{set_id}/relationships/vars", self.root)
    }

    /// `/varsets/{set_id}/relationships/vars/{entry_id}`
    #[must_use]
    pub fn entry_url(&self, set_id: &str, entry_id: &str) -> String {
        format!("{}/varsets/{set_id}/relationships/vars/{entry_id}", self.root)
    }
}
