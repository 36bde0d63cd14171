//! Credentials from `DC_AUTHKEY`. Kept in its own binary because it sets a
//! process-wide environment variable.

mod common;

use std::io::Write;

use common::{Cloud, KEY_JSON};
use doublecloud_provider::provider::AUTHKEY_ENV;
use doublecloud_provider::testing::ProviderTester;
use doublecloud_provider::{DoubleCloudProvider, ProviderService};
use serde_json::json;

#[tokio::test]
async fn test_configure_from_key_file() {
    let cloud = Cloud::start().await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(KEY_JSON.as_bytes()).unwrap();
    std::env::set_var(AUTHKEY_ENV, file.path());

    let tester = ProviderTester::new(DoubleCloudProvider::new("test"));
    tester
        .configure(json!({
            "endpoint": cloud.server.uri(),
            "auth_endpoint": cloud.token_url()
        }))
        .await
        .unwrap();

    let state = tester
        .read("doublecloud_kafka_cluster", json!({"id": "cka-missing"}))
        .await
        .unwrap();
    assert!(state.is_null());

    std::env::set_var(AUTHKEY_ENV, "/nonexistent/authorized_key.json");
    let diags = DoubleCloudProvider::new("test")
        .configure(json!({}))
        .await
        .unwrap();
    assert_eq!(diags[0].summary, "failed to use credentials");
    assert!(diags[0]
        .detail
        .as_deref()
        .unwrap()
        .contains("failed to read authorized key"));

    std::env::remove_var(AUTHKEY_ENV);
}
