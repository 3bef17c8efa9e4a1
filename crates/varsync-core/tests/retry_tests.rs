//! Retrying client over real HTTP.

use std::time::Duration;
use varsync_core::http::{ApiRequest, RetryPolicy};
use varsync_core::{ControlPlane, HttpError, SyncOptions};
use varsync_test_utils::{json_api, list_page, test_options, tenant_resource, TestContext};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn transient_statuses_are_retried_until_success() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&ctx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .respond_with(json_api(200, list_page(vec![tenant_resource("acme")], None)))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let api = ctx.control_plane(&test_options());
    let response = api.execute(ApiRequest::get(api.tenants_url())).await.unwrap();

    assert_eq!(response.status, 200);
}

/// Exhausting the budget on a retryable status hands back that response.
#[tokio::test]
async fn exhausted_status_returns_last_response() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "0"))
        .expect(3)
        .mount(&ctx.server)
        .await;

    let api = ctx.control_plane(&test_options());
    let response = api.execute(ApiRequest::get(api.tenants_url())).await.unwrap();

    assert_eq!(response.status, 429);
    assert_eq!(response.retry_after, Some(Duration::ZERO));
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let ctx = TestContext::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v2/organizations"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&ctx.server)
        .await;

    let api = ctx.control_plane(&test_options());
    let response = api.execute(ApiRequest::get(api.tenants_url())).await.unwrap();

    assert_eq!(response.status, 401);
}

#[tokio::test]
async fn unreachable_host_exhausts_retries() {
    let options = SyncOptions::new()
        .with_retry(RetryPolicy::immediate(2))
        .with_request_timeout(Duration::from_secs(2));
    let api = ControlPlane::connect("http://127.0.0.1:1", "test-token", &options).unwrap();

    let result = api.execute(ApiRequest::get(api.tenants_url())).await;

    assert!(matches!(result, Err(HttpError::RetriesExhausted { attempts: 2, .. })));
}
