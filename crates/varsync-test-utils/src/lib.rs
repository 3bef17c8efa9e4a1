//! Testing utilities for varsync workspace
//!
//! JSON:API fixtures, `wiremock` mount helpers, and a context that wires a
//! reconciler against a mock control plane.

#![allow(missing_docs)]

use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use varsync_core::{
    ControlPlane, DesiredEntry, Reconciler, RetryPolicy, RunReport, SyncOptions, TargetConfig,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SET_NAME: &str = "platform-defaults";

pub fn set_resource(id: &str, name: &str, global: bool, priority: bool) -> Value {
    json!({
        "id": id,
        "type": "varsets",
        "attributes": {
            "name": name,
            "description": "",
            "global": global,
            "priority": priority,
        }
    })
}

/// The set every test is looking for
pub fn target_set(id: &str) -> Value {
    set_resource(id, SET_NAME, true, true)
}

pub fn entry_resource(id: &str, key: &str, value: &str) -> Value {
    json!({
        "id": id,
        "type": "vars",
        "attributes": {
            "key": key,
            "value": value,
            "description": null,
            "sensitive": false,
            "category": "terraform",
            "hcl": false,
        }
    })
}

pub fn sensitive_entry_resource(id: &str, key: &str) -> Value {
    json!({
        "id": id,
        "type": "vars",
        "attributes": {
            "key": key,
            "value": null,
            "sensitive": true,
            "category": "env",
            "hcl": false,
        }
    })
}

pub fn tenant_resource(name: &str) -> Value {
    json!({ "id": name, "type": "organizations", "attributes": { "name": name } })
}

/// A listing page; `next` is the advertised next page number
pub fn list_page(data: Vec<Value>, next: Option<u32>) -> Value {
    json!({
        "data": data,
        "links": { "next": next.map(|n| format!("https://tfe.test/next?page[number]={n}")) },
        "meta": { "pagination": { "next-page": next } },
    })
}

pub fn error_document(status: u16, detail: &str) -> Value {
    json!({ "errors": [{ "status": status.to_string(), "detail": detail }] })
}

pub fn json_api(status: u16, body: Value) -> ResponseTemplate {
    ResponseTemplate::new(status)
        .insert_header("content-type", "application/vnd.api+json")
        .set_body_json(body)
}

pub fn name_taken() -> ResponseTemplate {
    json_api(422, error_document(422, "Name has already been taken"))
}

pub fn sets_path(tenant: &str) -> String {
    format!("/api/v2/organizations/{tenant}/varsets")
}

pub fn entries_path(set_id: &str) -> String {
    format!("/api/v2/varsets/{set_id}/relationships/vars")
}

pub fn entry_path(set_id: &str, entry_id: &str) -> String {
    format!("/api/v2/varsets/{set_id}/relationships/vars/{entry_id}")
}

/// Serve `sets` as the only page of a tenant's set listing
pub async fn mount_sets(server: &MockServer, tenant: &str, sets: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(sets_path(tenant)))
        .and(query_param("page[number]", "1"))
        .respond_with(json_api(200, list_page(sets, None)))
        .mount(server)
        .await;
}

/// Serve `entries` as the set's entry listing
pub async fn mount_entries(server: &MockServer, set_id: &str, entries: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(entries_path(set_id)))
        .respond_with(json_api(200, json!({ "data": entries })))
        .mount(server)
        .await;
}

/// Fail fast: three immediate attempts, no settle delay
pub fn test_options() -> SyncOptions {
    SyncOptions::new()
        .with_retry(RetryPolicy::immediate(3))
        .with_settle_delay(Duration::ZERO)
        .with_request_timeout(Duration::from_secs(5))
}

pub fn target_config(url: &str, entries: Vec<DesiredEntry>) -> TargetConfig {
    TargetConfig {
        control_plane_url: url.to_string(),
        target_set_name: SET_NAME.to_string(),
        target_set_description: "Managed by varsync".to_string(),
        desired_entries: entries,
        organizations: None,
    }
}

/// Mock control plane plus the report every reconciler built here shares
pub struct TestContext {
    pub server: MockServer,
    pub report: Arc<RunReport>,
}

impl TestContext {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
            report: Arc::new(RunReport::new()),
        }
    }

    pub fn control_plane(&self, options: &SyncOptions) -> ControlPlane {
        ControlPlane::connect(&self.server.uri(), "test-token", options).unwrap()
    }

    pub fn reconciler(&self, entries: Vec<DesiredEntry>) -> Reconciler {
        self.reconciler_with(entries, test_options())
    }

    pub fn reconciler_with(&self, entries: Vec<DesiredEntry>, options: SyncOptions) -> Reconciler {
        let target = Arc::new(target_config(&self.server.uri(), entries));
        Reconciler::new(
            self.control_plane(&options),
            target,
            options,
            Arc::clone(&self.report),
        )
    }

    /// Requests the server received with a mutating method
    pub async fn mutating_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.method.as_str() != "GET")
            .count()
    }
}
