//! Pagination against a mock control plane.
//!
//! - N items at page size P take ceil(N/P) requests and keep page order.
//! - A failure mid-walk returns what was gathered before it.
//! - An empty collection costs exactly one request.

use pretty_assertions::assert_eq;
use varsync_core::pagination::{list_tenants, Paginator};
use varsync_core::types::{Resource, SetAttributes};
use varsync_test_utils::{
    json_api, list_page, target_set, tenant_resource, test_options, TestContext,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::Mock;

const TENANTS: &str = "/api/v2/organizations";

async fn mount_tenant_page(ctx: &TestContext, page: u32, names: &[&str], next: Option<u32>) {
    let data = names.iter().map(|n| tenant_resource(n)).collect();
    Mock::given(method("GET"))
        .and(path(TENANTS))
        .and(query_param("page[number]", page.to_string()))
        .and(query_param("page[size]", "2"))
        .respond_with(json_api(200, list_page(data, next)))
        .expect(1)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn walks_every_page_in_order() {
    let ctx = TestContext::start().await;
    mount_tenant_page(&ctx, 1, &["alpha", "bravo"], Some(2)).await;
    mount_tenant_page(&ctx, 2, &["charlie", "delta"], Some(3)).await;
    mount_tenant_page(&ctx, 3, &["echo"], None).await;

    let api = ctx.control_plane(&test_options());
    let tenants = list_tenants(&api, 2).await;

    let names: Vec<&str> = tenants.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["alpha", "bravo", "charlie", "delta", "echo"]);
}

/// Page 2 keeps failing after retries: page 1 is still returned.
#[tokio::test]
async fn failure_mid_walk_returns_partial_results() {
    let ctx = TestContext::start().await;
    mount_tenant_page(&ctx, 1, &["alpha", "bravo"], Some(2)).await;
    Mock::given(method("GET"))
        .and(path(TENANTS))
        .and(query_param("page[number]", "2"))
        .respond_with(json_api(500, serde_json::json!({})))
        .expect(3)
        .mount(&ctx.server)
        .await;

    let api = ctx.control_plane(&test_options());
    let tenants = list_tenants(&api, 2).await;

    let names: Vec<&str> = tenants.iter().map(|t| t.name()).collect();
    assert_eq!(names, vec!["alpha", "bravo"]);
}

#[tokio::test]
async fn empty_collection_is_one_request() {
    let ctx = TestContext::start().await;
    mount_tenant_page(&ctx, 1, &[], Some(2)).await;

    let api = ctx.control_plane(&test_options());
    assert!(list_tenants(&api, 2).await.is_empty());
}

/// The cursor stops once a page no longer advertises a successor.
#[tokio::test]
async fn paginator_stops_without_next_page() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations/acme/varsets"))
        .and(query_param("page[number]", "1"))
        .respond_with(json_api(200, list_page(vec![target_set("varset-1")], None)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let api = ctx.control_plane(&test_options());
    let url = format!("{}/api/v2/organizations/acme/varsets", ctx.server.uri());
    let mut pages = Paginator::new(&api, url, 20);

    let first = pages
        .next_page::<Resource<SetAttributes>>()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(first.len(), 1);
    assert_eq!(first[0].id, "varset-1");

    assert!(pages.next_page::<Resource<SetAttributes>>().await.unwrap().is_none());
}
