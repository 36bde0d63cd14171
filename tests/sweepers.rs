mod common;

use common::{object, Cloud, PROJECT_ID};
use doublecloud_provider::testing::acc::acc_enabled;
use doublecloud_provider::testing::sweep::{client_from_env, sweep, Sweeper};
use doublecloud_provider::ProviderError;
use pretty_assertions::assert_eq;
use serde_json::json;

const NETWORKS: &str = "/network/v1/networks";
const CLUSTERS: &str = "/clickhouse/v1/clusters";
const TRANSFERS: &str = "/transfer/v1/transfers";

const SWEEPERS: [Sweeper; 4] = [
    Sweeper::Transfer,
    Sweeper::Endpoint,
    Sweeper::Clickhouse,
    Sweeper::Network,
];

fn named(name: &str) -> serde_json::Value {
    object(&[("projectId", json!(PROJECT_ID)), ("name", json!(name))])
}

#[tokio::test]
async fn test_sweep_deletes_only_test_objects() {
    let cloud = Cloud::start().await;
    let client = cloud.client();

    let leaked_net = cloud.fake.seed(NETWORKS, named("tf-acc-network-1"));
    let prod_net = cloud.fake.seed(NETWORKS, named("production"));
    let leaked_ch = cloud.fake.seed(CLUSTERS, named("tf-acc-clickhouse-1"));
    let other_project = cloud.fake.seed(
        CLUSTERS,
        object(&[("projectId", json!("prj_other")), ("name", json!("tf-acc-clickhouse-2"))]),
    );
    let mut running = named("tf-acc-transfer-1");
    running["status"] = json!("RUNNING");
    let leaked_transfer = cloud.fake.seed(TRANSFERS, running);

    let deleted = sweep(&client, PROJECT_ID, &SWEEPERS).await.unwrap();
    assert_eq!(
        deleted,
        vec![leaked_transfer.clone(), leaked_ch.clone(), leaked_net.clone()]
    );

    assert_eq!(cloud.fake.ids(NETWORKS), vec![prod_net]);
    assert_eq!(cloud.fake.ids(CLUSTERS), vec![other_project]);
    assert!(cloud.fake.ids(TRANSFERS).is_empty());

    // running transfers are stopped first
    let deactivations = cloud
        .fake
        .calls("POST", &format!("{}/{}:deactivate", TRANSFERS, leaked_transfer));
    assert_eq!(deactivations.len(), 1);
}

#[tokio::test]
async fn test_sweep_collects_failures() {
    let cloud = Cloud::start().await;
    let client = cloud.client();

    let stuck = cloud.fake.seed(NETWORKS, named("tf-acc-network-stuck"));
    let gone = cloud.fake.seed(NETWORKS, named("tf-acc-network-gone"));
    let cluster = cloud.fake.seed(CLUSTERS, named("tf-acc-clickhouse-1"));
    cloud.fake.fail_mutations(&stuck);

    let err = sweep(&client, PROJECT_ID, &SWEEPERS).await.unwrap_err();
    assert_eq!(err.failures.len(), 1);
    assert_eq!(err.failures[0].kind, "network");
    assert_eq!(err.failures[0].id, stuck);
    assert!(matches!(err.failures[0].error, ProviderError::Unavailable(_)));
    assert_eq!(
        err.to_string(),
        format!(
            "failed to sweep network {}: Service unavailable: backend unavailable",
            stuck
        )
    );

    // the failure did not stop the rest of the sweep
    assert!(cloud.fake.get(CLUSTERS, &cluster).is_none());
    assert!(cloud.fake.get(NETWORKS, &gone).is_none());
    assert!(cloud.fake.get(NETWORKS, &stuck).is_some());
}

/// Cleans the real project named by `DC_PROJECT_ID` when `TF_ACC` is set.
#[tokio::test]
async fn test_sweep_live_project() {
    if !acc_enabled() {
        eprintln!("TF_ACC is not set, skipping");
        return;
    }
    let (client, project_id) = client_from_env().unwrap();
    let deleted = sweep(&client, &project_id, &Sweeper::ALL).await.unwrap();
    eprintln!("swept {} objects", deleted.len());
}
