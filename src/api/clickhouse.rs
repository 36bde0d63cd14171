//! `/clickhouse/v1` service.

use serde::{Deserialize, Serialize};

use super::{int64, ApiClient, Operation};
use crate::error::ProviderError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    pub id: String,
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    pub description: String,
    pub version: String,
    pub network_id: String,
    pub status: String,
    pub resources: Option<ClusterResources>,
    pub config: Option<ClickhouseConfig>,
    pub connection_info: Option<ConnectionInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickhouse: Option<ClickhouseResources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseResources {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource_preset_id: String,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub disk_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub replica_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub shard_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseConfig {
    /// `LOG_LEVEL_*` enum name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub max_connections: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub max_concurrent_queries: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub keep_alive_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionInfo {
    pub host: String,
    pub user: String,
    pub password: String,
    #[serde(with = "int64")]
    pub https_port: Option<i64>,
    #[serde(with = "int64")]
    pub tcp_port_secure: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClusterRequest {
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    pub network_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ClusterResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClickhouseConfig>,
}

/// Body of `PATCH /clickhouse/v1/clusters/{id}`. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClusterRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<ClusterResources>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ClickhouseConfig>,
}

/// Handle for the ClickHouse cluster service.
pub struct ClickhouseService<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// ClickHouse cluster service.
    pub fn clickhouse(&self) -> ClickhouseService<'_> {
        ClickhouseService { client: self }
    }
}

impl ClickhouseService<'_> {
    pub async fn get(&self, id: &str) -> Result<Cluster, ProviderError> {
        self.client
            .get(&format!("/clickhouse/v1/clusters/{}", id))
            .await
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Cluster>, ProviderError> {
        self.client
            .list_all("/clickhouse/v1/clusters", project_id, "clusters")
            .await
    }

    pub async fn create(&self, request: &CreateClusterRequest) -> Result<Operation, ProviderError> {
        self.client.post("/clickhouse/v1/clusters", request).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateClusterRequest,
    ) -> Result<Operation, ProviderError> {
        self.client
            .patch(&format!("/clickhouse/v1/clusters/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .delete(&format!("/clickhouse/v1/clusters/{}", id))
            .await
    }
}
