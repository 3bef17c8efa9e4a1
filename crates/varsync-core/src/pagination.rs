//! Page-number pagination over JSON:API collections
//!
//! Requests `page[number]` / `page[size]` and walks forward until a page is
//! empty or the response stops advertising a next page.

use crate::api::ControlPlane;
use crate::error::HttpError;
use crate::http::ApiRequest;
use crate::types::{Resource, Tenant};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{error, info};

/// Shape of one listing page
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
struct ListPage<T> {
    #[serde(default = "Vec::new")]
    data: Vec<T>,
    #[serde(default)]
    links: Option<Links>,
    #[serde(default)]
    meta: Option<Meta>,
}

impl<T> ListPage<T> {
    fn has_next(&self) -> bool {
        let linked = self.links.as_ref().is_some_and(|l| l.next.is_some());
        let counted = self
            .meta
            .as_ref()
            .and_then(|m| m.pagination.as_ref())
            .is_some_and(|p| p.next_page.is_some());
        linked || counted
    }
}

#[derive(Debug, Deserialize)]
struct Links {
    #[serde(default)]
    next: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Option<PaginationMeta>,
}

#[derive(Debug, Deserialize)]
struct PaginationMeta {
    #[serde(default, rename = "next-page")]
    next_page: Option<u64>,
}

/// Cursor over the pages of one collection
#[derive(Debug)]
pub struct Paginator<'a> {
    api: &'a ControlPlane,
    url: String,
    page_size: u32,
    page_number: u32,
    done: bool,
}

impl<'a> Paginator<'a> {
    /// Start at page 1
    #[must_use]
    pub fn new(api: &'a ControlPlane, url: impl Into<String>, page_size: u32) -> Self {
        Self {
            api,
            url: url.into(),
            page_size: page_size.max(1),
            page_number: 1,
            done: false,
        }
    }

    /// Number of the page the next call will request
    #[inline]
    #[must_use]
    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Fetch the next page
    ///
    /// Returns `Ok(None)` once the collection is exhausted. An empty page
    /// ends the walk without being returned.
    ///
    /// # Errors
    /// - `HttpError::Status` for a non-2xx response
    /// - `HttpError::Decode` for an unreadable body
    /// - any error from the retrying client
    pub async fn next_page<T: DeserializeOwned>(&mut self) -> Result<Option<Vec<T>>, HttpError> {
        if self.done {
            return Ok(None);
        }

        let request = ApiRequest::get(&self.url)
            .with_query("page[number]", self.page_number)
            .with_query("page[size]", self.page_size);

        let fetched = self
            .api
            .execute(request)
            .await
            .and_then(|r| r.success_json::<ListPage<T>>());
        let page = match fetched {
            Ok(page) => page,
            Err(e) => {
                self.done = true;
                return Err(e);
            }
        };

        if page.data.is_empty() {
            self.done = true;
            return Ok(None);
        }
        if !page.has_next() {
            self.done = true;
        }
        self.page_number += 1;

        Ok(Some(page.data))
    }
}

/// Collect every item of a collection, in page order
///
/// A failure mid-walk is logged and whatever was gathered so far is
/// returned; callers must tolerate a truncated listing.
pub async fn list_all<T: DeserializeOwned>(
    api: &ControlPlane,
    url: &str,
    page_size: u32,
) -> Vec<T> {
    let mut items = Vec::new();
    let mut pages = Paginator::new(api, url, page_size);

    loop {
        let page_number = pages.page_number();
        match pages.next_page::<T>().await {
            Ok(Some(page)) => {
                info!(url, page = page_number, count = page.len(), "retrieved page");
                items.extend(page);
            }
            Ok(None) => break,
            Err(e) => {
                error!(
                    url,
                    page = page_number,
                    error = %e,
                    "listing failed, returning partial results"
                );
                break;
            }
        }
    }

    items
}

/// Enumerate every tenant visible to the token
pub async fn list_tenants(api: &ControlPlane, page_size: u32) -> Vec<Tenant> {
    list_all::<Resource<serde_json::Value>>(api, &api.tenants_url(), page_size)
        .await
        .into_iter()
        .map(|resource| Tenant::new(resource.id))
        .collect()
}
