//! Dry-run mode: reads are allowed, writes never leave the process, and
//! nothing lands in the report.

use varsync_core::reconcile::Mode;
use varsync_core::types::{DesiredEntry, Tenant};
use varsync_test_utils::{
    entry_resource, mount_entries, mount_sets, target_set, test_options, TestContext,
};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, ResponseTemplate};

/// Any non-GET request fails the test on drop.
async fn forbid_writes(ctx: &TestContext) {
    for verb in ["POST", "PATCH", "DELETE"] {
        Mock::given(method(verb))
            .and(path_regex(".*"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&ctx.server)
            .await;
    }
}

#[tokio::test]
async fn dry_run_update_sends_no_writes() {
    let ctx = TestContext::start().await;
    forbid_writes(&ctx).await;
    mount_sets(&ctx.server, "acme", vec![target_set("varset-1")]).await;
    mount_entries(
        &ctx.server,
        "varset-1",
        vec![entry_resource("var-a", "a", "old"), entry_resource("var-b", "b", "2")],
    )
    .await;

    let reconciler = ctx.reconciler_with(
        vec![DesiredEntry::new("a", "new"), DesiredEntry::new("c", "3").sensitive()],
        test_options().with_dry_run(true),
    );
    reconciler.run(Mode::Update, &Tenant::new("acme")).await.unwrap();

    assert!(ctx.report.is_empty());
    assert_eq!(ctx.mutating_requests().await, 0);
}

/// With no existing set, create is planned in full without a single write.
#[tokio::test]
async fn dry_run_create_probes_then_logs() {
    let ctx = TestContext::start().await;
    forbid_writes(&ctx).await;
    mount_sets(&ctx.server, "acme", vec![]).await;

    let reconciler = ctx.reconciler_with(
        vec![DesiredEntry::new("a", "1"), DesiredEntry::new("b", "2")],
        test_options().with_dry_run(true),
    );
    reconciler.run(Mode::Create, &Tenant::new("acme")).await.unwrap();

    assert!(ctx.report.is_empty());
    assert_eq!(ctx.mutating_requests().await, 0);
}

#[tokio::test]
async fn dry_run_create_of_existing_set_stops_early() {
    let ctx = TestContext::start().await;
    forbid_writes(&ctx).await;
    mount_sets(&ctx.server, "acme", vec![target_set("varset-1")]).await;

    let reconciler =
        ctx.reconciler_with(vec![DesiredEntry::new("a", "1")], test_options().with_dry_run(true));
    reconciler.run(Mode::Create, &Tenant::new("acme")).await.unwrap();

    assert!(ctx.report.is_empty());
}

#[tokio::test]
async fn dry_run_delete_sends_no_writes() {
    let ctx = TestContext::start().await;
    forbid_writes(&ctx).await;
    mount_sets(&ctx.server, "acme", vec![target_set("varset-1")]).await;

    let reconciler = ctx.reconciler_with(vec![], test_options().with_dry_run(true));
    reconciler.run(Mode::Delete, &Tenant::new("acme")).await.unwrap();

    assert!(ctx.report.is_empty());
    assert_eq!(ctx.mutating_requests().await, 0);
}
