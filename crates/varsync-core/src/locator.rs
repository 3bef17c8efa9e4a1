//! Locates the global priority set within a tenant

use crate::api::ControlPlane;
use crate::pagination::Paginator;
use crate::types::{ConfigurationSet, Resource, SetAttributes, Tenant};
use tracing::{debug, error};

/// Scans a tenant's sets for the one matching {name, global, priority}
#[derive(Debug, Clone, Copy)]
pub struct SetLocator<'a> {
    api: &'a ControlPlane,
    page_size: u32,
}

impl<'a> SetLocator<'a> {
    /// Create locator
    #[inline]
    #[must_use]
    pub fn new(api: &'a ControlPlane, page_size: u32) -> Self {
        Self { api, page_size }
    }

    /// Id of the first matching set, if any
    ///
    /// Stops paging at the first match. A request failure is logged and
    /// treated like "not found": either way the caller cannot proceed.
    pub async fn find(&self, tenant: &Tenant, name: &str) -> Option<String> {
        let mut pages = Paginator::new(self.api, self.api.sets_url(tenant), self.page_size);

        loop {
            let page_number = pages.page_number();
            match pages.next_page::<Resource<SetAttributes>>().await {
                Ok(Some(page)) => {
                    let found = page
                        .into_iter()
                        .map(ConfigurationSet::from)
                        .find(|set| set.is_global_priority(name));
                    if let Some(set) = found {
                        debug!(%tenant, set_id = %set.id, page = page_number, "located set");
                        return Some(set.id);
                    }
                }
                Ok(None) => {
                    debug!(%tenant, name, "no matching set");
                    return None;
                }
                Err(e) => {
                    error!(%tenant, page = page_number, error = %e, "failed to list sets");
                    return None;
                }
            }
        }
    }
}
