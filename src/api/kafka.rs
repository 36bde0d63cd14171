//! `/kafka/v1` service.

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
    pub schema_registry_config: Option<SchemaRegistryConfig>,
    pub connection_info: Option<ConnectionInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClusterResources {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kafka: Option<KafkaResources>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KafkaResources {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub resource_preset_id: String,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub disk_size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub broker_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub zone_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchemaRegistryConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConnectionInfo {
    pub connection_string: String,
    pub user: String,
    pub password: String,
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
    pub schema_registry_config: Option<SchemaRegistryConfig>,
}

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
    pub schema_registry_config: Option<SchemaRegistryConfig>,
}

/// Handle for the Kafka cluster service.
pub struct KafkaService<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Kafka cluster service.
    pub fn kafka(&self) -> KafkaService<'_> {
        KafkaService { client: self }
    }
}

impl KafkaService<'_> {
    pub async fn get(&self, id: &str) -> Result<Cluster, ProviderError> {
        self.client.get(&format!("/kafka/v1/clusters/{}", id)).await
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Cluster>, ProviderError> {
        self.client
            .list_all("/kafka/v1/clusters", project_id, "clusters")
            .await
    }

    pub async fn create(&self, request: &CreateClusterRequest) -> Result<Operation, ProviderError> {
        self.client.post("/kafka/v1/clusters", request).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateClusterRequest,
    ) -> Result<Operation, ProviderError> {
        self.client
            .patch(&format!("/kafka/v1/clusters/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .delete(&format!("/kafka/v1/clusters/{}", id))
            .await
    }
}
