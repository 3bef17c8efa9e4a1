//! Locating the global priority set.
//!
//! A set matches only on name, global, and priority together. The scan
//! stops at the first match and treats a failed listing like "not found".

use varsync_core::locator::SetLocator;
use varsync_core::types::Tenant;
use varsync_test_utils::{
    json_api, list_page, mount_sets, set_resource, sets_path, target_set, test_options,
    TestContext, SET_NAME,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::Mock;

async fn mount_page(
    ctx: &TestContext,
    page: u32,
    sets: Vec<serde_json::Value>,
    next: Option<u32>,
    hits: u64,
) {
    Mock::given(method("GET"))
        .and(path(sets_path("acme")))
        .and(query_param("page[number]", page.to_string()))
        .respond_with(json_api(200, list_page(sets, next)))
        .expect(hits)
        .mount(&ctx.server)
        .await;
}

#[tokio::test]
async fn finds_match_on_later_page_and_stops() {
    let ctx = TestContext::start().await;
    mount_page(
        &ctx,
        1,
        vec![
            set_resource("varset-a", "other", true, true),
            set_resource("varset-b", "misc", false, false),
        ],
        Some(2),
        1,
    )
    .await;
    mount_page(
        &ctx,
        2,
        vec![set_resource("varset-c", "unrelated", true, false), target_set("varset-target")],
        Some(3),
        1,
    )
    .await;
    mount_page(&ctx, 3, vec![set_resource("varset-z", "late", true, true)], None, 0).await;

    let api = ctx.control_plane(&test_options());
    let found = SetLocator::new(&api, 2).find(&Tenant::new("acme"), SET_NAME).await;

    assert_eq!(found.as_deref(), Some("varset-target"));
}

/// Same name but not both global and priority is not the target.
#[tokio::test]
async fn partial_matches_are_ignored() {
    let ctx = TestContext::start().await;
    mount_sets(
        &ctx.server,
        "acme",
        vec![
            set_resource("varset-1", SET_NAME, true, false),
            set_resource("varset-2", SET_NAME, false, true),
        ],
    )
    .await;

    let api = ctx.control_plane(&test_options());
    let found = SetLocator::new(&api, 20).find(&Tenant::new("acme"), SET_NAME).await;

    assert_eq!(found, None);
}

#[tokio::test]
async fn first_match_wins() {
    let ctx = TestContext::start().await;
    mount_sets(&ctx.server, "acme", vec![target_set("varset-1"), target_set("varset-2")]).await;

    let api = ctx.control_plane(&test_options());
    let found = SetLocator::new(&api, 20).find(&Tenant::new("acme"), SET_NAME).await;

    assert_eq!(found.as_deref(), Some("varset-1"));
}

#[tokio::test]
async fn listing_failure_is_not_found() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path(sets_path("acme")))
        .respond_with(json_api(404, serde_json::json!({ "errors": [] })))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let api = ctx.control_plane(&test_options());
    let found = SetLocator::new(&api, 20).find(&Tenant::new("acme"), SET_NAME).await;

    assert_eq!(found, None);
}
