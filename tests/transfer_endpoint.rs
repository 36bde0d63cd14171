mod common;

use common::{Cloud, PROJECT_ID};
use doublecloud_provider::testing::{assert_plan_changes_attribute, ProviderTester, TestError};
use doublecloud_provider::DoubleCloudProvider;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const ENDPOINT: &str = "doublecloud_transfer_endpoint";
const TRANSFER: &str = "doublecloud_transfer";

fn mysql_source() -> Value {
    json!({
        "project_id": PROJECT_ID,
        "name": "tf-acc-mysql-source",
        "settings": {
            "mysql_source": {
                "connection": {"on_premise": {"hosts": ["mysql.internal"], "port": 3306}},
                "database": "shop",
                "user": "replicator",
                "password": "hunter2",
                "include_tables_regex": ["orders_.*"]
            }
        }
    })
}

fn mysql_target() -> Value {
    json!({
        "project_id": PROJECT_ID,
        "name": "tf-acc-mysql-target",
        "settings": {
            "mysql_target": {
                "connection": {"on_premise": {"hosts": ["replica.internal"]}},
                "database": "shop_copy",
                "user": "loader",
                "password": "secret"
            }
        }
    })
}

fn diagnostics(err: TestError) -> Vec<String> {
    match err {
        TestError::Diagnostics(diags) => diags.into_iter().map(|d| d.summary).collect(),
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn test_endpoint_settings_need_one_kind() {
    let tester = ProviderTester::new(DoubleCloudProvider::new("test"));

    let mut config = mysql_source();
    config["settings"] = json!({});
    let err = tester
        .validate_resource_config(ENDPOINT, config)
        .await
        .unwrap_err();
    assert_eq!(diagnostics(err), vec!["invalid settings"]);

    let mut config = mysql_source();
    config["settings"]["mysql_target"] = mysql_target()["settings"]["mysql_target"].clone();
    let err = tester
        .validate_resource_config(ENDPOINT, config)
        .await
        .unwrap_err();
    assert_eq!(diagnostics(err), vec!["invalid settings"]);
}

#[tokio::test]
async fn test_endpoint_connection_needs_on_premise() {
    let tester = ProviderTester::new(DoubleCloudProvider::new("test"));

    let mut config = mysql_target();
    config["settings"]["mysql_target"]["connection"] = json!({});
    let err = tester
        .validate_resource_config(ENDPOINT, config)
        .await
        .unwrap_err();
    assert_eq!(diagnostics(err), vec!["unknown connection"]);
}

#[tokio::test]
async fn test_mysql_source_endpoint() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;

    let state = tester
        .lifecycle_create(ENDPOINT, mysql_source())
        .await
        .unwrap();
    let id = state["id"].as_str().unwrap().to_string();

    let source = &state["settings"]["mysql_source"];
    assert_eq!(source["database"], "shop");
    assert_eq!(source["include_tables_regex"], json!(["orders_.*"]));
    assert_eq!(source["connection"]["on_premise"]["port"], 3306);
    // write-only, kept from configuration
    assert_eq!(source["password"], "hunter2");
    assert!(state["settings"]["mysql_target"].is_null());

    let posted = cloud.fake.calls("POST", "/transfer/v1/endpoints");
    let settings = &posted[0].body["settings"]["mysqlSource"];
    assert_eq!(settings["password"], json!({"raw": "hunter2"}));
    assert_eq!(settings["connection"]["onPremise"]["port"], "3306");

    let mut config = mysql_source();
    config["description"] = json!("orders only");
    let updated = tester
        .lifecycle_update(ENDPOINT, state, config)
        .await
        .unwrap();
    assert_eq!(updated["description"], "orders only");

    let patches = cloud
        .fake
        .calls("PATCH", &format!("/transfer/v1/endpoints/{}", id));
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].body, json!({"description": "orders only"}));

    tester.lifecycle_delete(ENDPOINT, updated).await.unwrap();
    assert!(cloud.fake.ids("/transfer/v1/endpoints").is_empty());
}

#[tokio::test]
async fn test_transfer_activation() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;

    let source = tester
        .lifecycle_create(ENDPOINT, mysql_source())
        .await
        .unwrap();
    let target = tester
        .lifecycle_create(ENDPOINT, mysql_target())
        .await
        .unwrap();

    let config = |activated: bool| {
        json!({
            "project_id": PROJECT_ID,
            "name": "tf-acc-transfer",
            "source": source["id"],
            "target": target["id"],
            "type": "SNAPSHOT_AND_INCREMENT",
            "activated": activated
        })
    };

    let transfer = tester.lifecycle_create(TRANSFER, config(true)).await.unwrap();
    let id = transfer["id"].as_str().unwrap().to_string();
    assert_eq!(transfer["activated"], true);
    assert_eq!(transfer["status"], "RUNNING");
    assert_eq!(
        cloud.fake.calls("POST", &format!("/transfer/v1/transfers/{}:activate", id)).len(),
        1
    );

    let stopped = tester
        .lifecycle_update(TRANSFER, transfer, config(false))
        .await
        .unwrap();
    assert_eq!(stopped["activated"], false);
    assert_eq!(stopped["status"], "STOPPED");
    // activation alone does not patch the transfer
    assert!(cloud
        .fake
        .calls("PATCH", "/transfer/v1/transfers")
        .is_empty());

    tester.lifecycle_delete(TRANSFER, stopped).await.unwrap();
    assert!(cloud.fake.ids("/transfer/v1/transfers").is_empty());
}

#[tokio::test]
async fn test_transfer_stopped_outside_is_reactivated() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;
    let config = json!({
        "project_id": PROJECT_ID,
        "name": "tf-acc-transfer",
        "source": "dte-source",
        "target": "dte-target",
        "type": "SNAPSHOT_AND_INCREMENT",
        "activated": true
    });

    let transfer = tester
        .lifecycle_create(TRANSFER, config.clone())
        .await
        .unwrap();
    let id = transfer["id"].as_str().unwrap().to_string();

    let client = cloud.client();
    let op = client.transfers().deactivate(&id).await.unwrap();
    client.wait(op).await.unwrap();

    let refreshed = tester.read(TRANSFER, transfer).await.unwrap();
    assert_eq!(refreshed["activated"], false);
    assert_eq!(refreshed["status"], "STOPPED");

    let plan = tester
        .plan_update(TRANSFER, refreshed.clone(), config.clone())
        .await
        .unwrap();
    assert_plan_changes_attribute(&plan, "activated");
    assert!(!plan.requires_replace);

    let restarted = tester
        .lifecycle_update(TRANSFER, refreshed, config)
        .await
        .unwrap();
    assert_eq!(restarted["activated"], true);
    assert_eq!(restarted["status"], "RUNNING");
    assert_eq!(
        cloud.fake.calls("POST", &format!("/transfer/v1/transfers/{}:activate", id)).len(),
        2
    );
}

#[tokio::test]
async fn test_active_transfer_is_stopped_before_delete() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;

    let transfer = tester
        .lifecycle_create(
            TRANSFER,
            json!({
                "project_id": PROJECT_ID,
                "name": "tf-acc-transfer",
                "source": "dte-source",
                "target": "dte-target",
                "type": "SNAPSHOT_ONLY",
                "activated": true
            }),
        )
        .await
        .unwrap();
    let id = transfer["id"].as_str().unwrap().to_string();

    tester.lifecycle_delete(TRANSFER, transfer).await.unwrap();

    let deactivations = cloud
        .fake
        .calls("POST", &format!("/transfer/v1/transfers/{}:deactivate", id));
    assert_eq!(deactivations.len(), 1);
    assert_eq!(
        cloud
            .fake
            .calls("DELETE", &format!("/transfer/v1/transfers/{}", id))
            .len(),
        1
    );
}

#[tokio::test]
async fn test_transfer_type_is_checked() {
    let tester = ProviderTester::new(DoubleCloudProvider::new("test"));
    let err = tester
        .validate_resource_config(
            TRANSFER,
            json!({
                "project_id": PROJECT_ID,
                "name": "tf-acc-transfer",
                "source": "dte1",
                "target": "dte2",
                "type": "ONCE"
            }),
        )
        .await
        .unwrap_err();
    assert!(err.to_string().contains("type"), "{}", err);
}
