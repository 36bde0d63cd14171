mod common;

use common::{Cloud, PROJECT_ID, WORKBOOKS};
use doublecloud_provider::testing::assert_plan_changes_attribute;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

const RESOURCE: &str = "doublecloud_workbook";

fn workbook_config(title: &str, connect: Value) -> Value {
    json!({
        "project_id": PROJECT_ID,
        "title": title,
        "config": r#"{"datasets": [], "charts": []}"#,
        "connect": connect
    })
}

#[tokio::test]
async fn test_workbook_lifecycle() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;

    let created = tester
        .lifecycle_create(
            RESOURCE,
            workbook_config(
                "tf-acc-workbook",
                json!([
                    {"name": "clickhouse", "config": r#"{"kind": "clickhouse", "host": "rw.chc1.at.double.cloud"}"#},
                    {"name": "postgres", "config": r#"{"kind": "postgres"}"#}
                ]),
            ),
        )
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();
    assert!(id.starts_with("wb"));
    // configured formatting survives the read
    assert_eq!(created["config"], r#"{"datasets": [], "charts": []}"#);
    assert_eq!(created["connect"][0]["name"], "clickhouse");
    assert_eq!(created["connect"][1]["name"], "postgres");

    let base = format!("{}/{}", WORKBOOKS, id);
    assert_eq!(cloud.fake.calls("POST", WORKBOOKS).len(), 1);
    let configs = cloud.fake.calls("PUT", &format!("{}/config", base));
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].body, json!({"config": {"datasets": [], "charts": []}}));
    assert_eq!(cloud.fake.calls("PUT", &format!("{}/connections/", base)).len(), 2);
    assert_eq!(
        cloud.fake.connections(&id)["clickhouse"],
        json!({"kind": "clickhouse", "host": "rw.chc1.at.double.cloud"})
    );

    let config = workbook_config(
        "tf-acc-workbook-renamed",
        json!([
            {"name": "clickhouse", "config": r#"{"kind": "clickhouse", "host": "rw.chc2.at.double.cloud"}"#}
        ]),
    );
    let plan = tester
        .plan_update(RESOURCE, created.clone(), config.clone())
        .await
        .unwrap();
    assert!(!plan.requires_replace);
    assert_plan_changes_attribute(&plan, "title");
    assert_plan_changes_attribute(&plan, "connect");

    let updated = tester
        .lifecycle_update(RESOURCE, created, config)
        .await
        .unwrap();
    assert_eq!(updated["id"], id.as_str());
    assert_eq!(updated["title"], "tf-acc-workbook-renamed");
    assert_eq!(updated["connect"].as_array().unwrap().len(), 1);

    let renames = cloud.fake.calls("PATCH", &base);
    assert_eq!(renames.len(), 1);
    assert_eq!(renames[0].body, json!({"title": "tf-acc-workbook-renamed"}));
    // config did not change
    assert_eq!(cloud.fake.calls("PUT", &format!("{}/config", base)).len(), 1);

    let clickhouse_puts = cloud
        .fake
        .calls("PUT", &format!("{}/connections/clickhouse", base));
    assert_eq!(clickhouse_puts.len(), 2);
    assert_eq!(
        clickhouse_puts[1].body,
        json!({"config": {"kind": "clickhouse", "host": "rw.chc2.at.double.cloud"}})
    );
    assert_eq!(
        cloud
            .fake
            .calls("PUT", &format!("{}/connections/postgres", base))
            .len(),
        1
    );
    assert_eq!(
        cloud
            .fake
            .calls("DELETE", &format!("{}/connections/postgres", base))
            .len(),
        1
    );
    let remaining: Vec<String> = cloud.fake.connections(&id).into_keys().collect();
    assert_eq!(remaining, vec!["clickhouse"]);

    tester.lifecycle_delete(RESOURCE, updated.clone()).await.unwrap();
    assert!(cloud.fake.get(WORKBOOKS, &id).is_none());
    assert!(tester.read(RESOURCE, updated).await.unwrap().is_null());
}

#[tokio::test]
async fn test_connection_name_is_escaped_in_the_path() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;

    let created = tester
        .lifecycle_create(
            RESOURCE,
            workbook_config(
                "tf-acc-workbook",
                json!([{"name": "sales/eu?region=1", "config": "{}"}]),
            ),
        )
        .await
        .unwrap();
    let id = created["id"].as_str().unwrap().to_string();

    let puts = cloud
        .fake
        .calls("PUT", &format!("{}/{}/connections/", WORKBOOKS, id));
    assert_eq!(puts.len(), 1);
    assert_eq!(
        puts[0].path,
        format!("{}/{}/connections/sales%2Feu%3Fregion%3D1", WORKBOOKS, id)
    );
    assert!(cloud.fake.connections(&id).contains_key("sales/eu?region=1"));
    assert_eq!(created["connect"][0]["name"], "sales/eu?region=1");
}

#[tokio::test]
async fn test_unchanged_workbook_plans_nothing() {
    let cloud = Cloud::start().await;
    let tester = cloud.tester().await;
    let config = workbook_config(
        "tf-acc-workbook",
        json!([{"name": "clickhouse", "config": r#"{ "kind": "clickhouse" }"#}]),
    );

    let created = tester
        .lifecycle_create(RESOURCE, config.clone())
        .await
        .unwrap();
    let plan = tester
        .plan_update(RESOURCE, created.clone(), config)
        .await
        .unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.planned_state, created);
}
