//! Tenant orchestrator
//!
//! Runs the reconciler against every tenant with bounded concurrency:
//! - At most `max_workers` tenants in flight
//! - Each tenant in its own task, so a panic stays with that tenant
//! - A settle delay after each tenant before its slot is released
//! - Completions consumed as they arrive
//! - A tenant that fails outright gets one error row in the report

use crate::config::SyncOptions;
use crate::error::SyncError;
use crate::reconcile::{Mode, Reconciler};
use crate::types::Tenant;
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{error, info};

/// How one tenant's run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantOutcome {
    /// Tenant
    pub tenant: Tenant,
    /// Orchestration-level failure, if any
    ///
    /// In-band API rejections are report rows and do not count here.
    pub failure: Option<String>,
}

impl TenantOutcome {
    /// Check if the tenant task completed
    #[inline]
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Result of a full run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// One outcome per tenant, in completion order
    pub outcomes: Vec<TenantOutcome>,
}

impl RunSummary {
    /// Tenants processed
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    /// Tenants whose task completed
    #[must_use]
    pub fn completed(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_completed()).count()
    }

    /// Tenants whose task failed
    #[must_use]
    pub fn failed(&self) -> usize {
        self.total() - self.completed()
    }

    /// Outcomes with a failure
    pub fn failures(&self) -> impl Iterator<Item = &TenantOutcome> {
        self.outcomes.iter().filter(|o| !o.is_completed())
    }
}

/// Fans a mode out across tenants
#[derive(Debug, Clone)]
pub struct Orchestrator {
    reconciler: Arc<Reconciler>,
    max_workers: usize,
    settle_delay: Duration,
}

impl Orchestrator {
    /// Create orchestrator
    #[must_use]
    pub fn new(reconciler: Arc<Reconciler>, options: &SyncOptions) -> Self {
        Self {
            reconciler,
            max_workers: options.max_workers.max(1),
            settle_delay: options.settle_delay,
        }
    }

    /// Worker limit
    #[inline]
    #[must_use]
    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Process every tenant and wait for all of them
    ///
    /// Never fails as a whole: each tenant's failure is isolated in its
    /// outcome, logged, and recorded as an error row.
    pub async fn run(&self, tenants: Vec<Tenant>, mode: Mode) -> RunSummary {
        let total = tenants.len();
        info!(total, mode = %mode, max_workers = self.max_workers, "processing tenants");

        let permits = Arc::new(Semaphore::new(self.max_workers));
        let mut pending = FuturesUnordered::new();

        for tenant in tenants {
            let permits = Arc::clone(&permits);
            let reconciler = Arc::clone(&self.reconciler);
            let settle_delay = self.settle_delay;
            let task_tenant = tenant.clone();

            let handle = tokio::spawn(async move {
                let _permit = permits
                    .acquire_owned()
                    .await
                    .map_err(|_| SyncError::PoolClosed)?;
                let result = reconciler.run(mode, &task_tenant).await;
                if !settle_delay.is_zero() {
                    tokio::time::sleep(settle_delay).await;
                }
                result
            });

            pending.push(async move { (tenant, handle.await) });
        }

        let mut summary = RunSummary::default();
        let mut finished = 0usize;

        while let Some((tenant, joined)) = pending.next().await {
            finished += 1;
            let failure = match joined {
                Ok(Ok(())) => None,
                Ok(Err(e)) => {
                    error!(%tenant, error = %e, "tenant failed");
                    Some(e.to_string())
                }
                Err(join_error) => {
                    error!(%tenant, error = %join_error, "tenant task aborted");
                    Some(format!("task aborted: {join_error}"))
                }
            };
            if let Some(failure) = &failure {
                self.reconciler.record_failure(mode, &tenant, failure.as_str());
            }
            info!("[{finished}/{total}] finished tenant {tenant}");
            summary.outcomes.push(TenantOutcome { tenant, failure });
        }

        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(name: &str, failure: Option<&str>) -> TenantOutcome {
        TenantOutcome {
            tenant: Tenant::new(name),
            failure: failure.map(str::to_string),
        }
    }

    #[test]
    fn summary_counts() {
        let summary = RunSummary {
            outcomes: vec![
                outcome("a", None),
                outcome("b", Some("boom")),
                outcome("c", None),
            ],
        };

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.completed(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(
            summary.failures().map(|o| o.tenant.name()).collect::<Vec<_>>(),
            vec!["b"]
        );
    }

    #[test]
    fn empty_summary() {
        let summary = RunSummary::default();
        assert_eq!(summary.total(), 0);
        assert_eq!(summary.failed(), 0);
    }
}
