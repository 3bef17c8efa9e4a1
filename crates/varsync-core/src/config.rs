//! Configuration for varsync
//!
//! Two layers:
//! - [`TargetConfig`]: what to reconcile, loaded once from a YAML file
//! - [`SyncOptions`]: how to run (dry run, pool size, retry policy, timeouts)
//!
//! Both are immutable after startup and shared by reference with every
//! tenant worker.

use crate::error::ConfigError;
use crate::http::RetryPolicy;
use crate::types::{DesiredEntry, Tenant};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Document shape before required keys are checked
#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(alias = "tfe_url")]
    control_plane_url: Option<String>,
    #[serde(alias = "varset_name")]
    target_set_name: Option<String>,
    #[serde(alias = "varset_description")]
    target_set_description: Option<String>,
    #[serde(alias = "varset_vars")]
    desired_entries: Option<Vec<DesiredEntry>>,
    organizations: Option<Vec<String>>,
}

/// The reconciliation target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetConfig {
    /// Control plane base URL, without trailing slash
    pub control_plane_url: String,
    /// Name of the global priority set
    pub target_set_name: String,
    /// Description used when the set is created
    pub target_set_description: String,
    /// Entries the set must contain
    pub desired_entries: Vec<DesiredEntry>,
    /// Explicit tenant list, if the document provides one
    pub organizations: Option<Vec<Tenant>>,
}

impl TargetConfig {
    /// Load and validate a YAML config file
    ///
    /// # Errors
    /// - `ConfigError::Read` if the file cannot be read
    /// - any error from [`TargetConfig::from_yaml_str`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse and validate a YAML document
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed YAML
    /// - `ConfigError::MissingKey` naming the first absent required key
    /// - `ConfigError::DuplicateEntryKey` if two entries share a key
    /// - `ConfigError::InvalidValue` for an empty URL or entry key
    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_yaml::from_str(content)?;

        let control_plane_url = raw
            .control_plane_url
            .ok_or(ConfigError::MissingKey("control_plane_url"))?;
        let target_set_name = raw
            .target_set_name
            .ok_or(ConfigError::MissingKey("target_set_name"))?;
        let desired_entries = raw
            .desired_entries
            .ok_or(ConfigError::MissingKey("desired_entries"))?;

        let control_plane_url = control_plane_url.trim().trim_end_matches('/').to_string();
        if control_plane_url.is_empty() {
            return Err(ConfigError::InvalidValue(
                "control_plane_url must not be empty".to_string(),
            ));
        }
        if target_set_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "target_set_name must not be empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &desired_entries {
            if entry.key.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "desired entry with empty key".to_string(),
                ));
            }
            if !seen.insert(entry.key.as_str()) {
                return Err(ConfigError::DuplicateEntryKey(entry.key.clone()));
            }
        }

        Ok(Self {
            control_plane_url,
            target_set_name,
            target_set_description: raw.target_set_description.unwrap_or_default(),
            desired_entries,
            organizations: raw
                .organizations
                .map(|orgs| orgs.into_iter().map(Tenant::from).collect()),
        })
    }

    /// JSON:API document for creating the set
    #[must_use]
    pub fn set_payload(&self) -> serde_json::Value {
        serde_json::json!({
            "data": {
                "type": "varsets",
                "attributes": {
                    "name": self.target_set_name,
                    "description": self.target_set_description,
                    "global": true,
                    "priority": true,
                }
            }
        })
    }
}

/// Run-time options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Log intended actions without mutating anything
    pub dry_run: bool,
    /// Tenants processed concurrently
    pub max_workers: usize,
    /// Pause after each tenant completes
    pub settle_delay: Duration,
    /// Retry policy applied to every request
    pub retry: RetryPolicy,
    /// Per-request timeout
    pub request_timeout: Duration,
    /// Page size when enumerating tenants
    pub tenant_page_size: u32,
    /// Page size when scanning a tenant's sets
    pub set_page_size: u32,
}

impl SyncOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With dry run
    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// With worker count (at least one)
    #[inline]
    #[must_use]
    pub fn with_max_workers(mut self, max: usize) -> Self {
        self.max_workers = max.max(1);
        self
    }

    /// With settle delay
    #[inline]
    #[must_use]
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// With retry policy
    #[inline]
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// With page sizes for tenant and set listings
    #[inline]
    #[must_use]
    pub fn with_page_sizes(mut self, tenant_page_size: u32, set_page_size: u32) -> Self {
        self.tenant_page_size = tenant_page_size.max(1);
        self.set_page_size = set_page_size.max(1);
        self
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            max_workers: 5,
            settle_delay: Duration::from_millis(500),
            retry: RetryPolicy::default(),
            request_timeout: Duration::from_secs(30),
            tenant_page_size: 100,
            set_page_size: 20,
        }
    }
}
