//! `/network/v1` service.

use serde::{Deserialize, Serialize};

use super::{ApiClient, Operation};
use crate::error::ProviderError;

/// A project network.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Network {
    pub id: String,
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    pub description: String,
    pub ipv4_cidr_block: String,
    pub ipv6_cidr_block: String,
    pub is_external: bool,
    pub status: String,
}

/// Body of `POST /network/v1/networks`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNetworkRequest {
    pub project_id: String,
    pub cloud_type: String,
    pub region_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub ipv4_cidr_block: String,
}

/// Handle for the network service.
pub struct NetworkService<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Network service.
    pub fn networks(&self) -> NetworkService<'_> {
        NetworkService { client: self }
    }
}

impl NetworkService<'_> {
    pub async fn get(&self, id: &str) -> Result<Network, ProviderError> {
        self.client.get(&format!("/network/v1/networks/{}", id)).await
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Network>, ProviderError> {
        self.client
            .list_all("/network/v1/networks", project_id, "networks")
            .await
    }

    pub async fn create(&self, request: &CreateNetworkRequest) -> Result<Operation, ProviderError> {
        self.client.post("/network/v1/networks", request).await
    }

    pub async fn delete(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .delete(&format!("/network/v1/networks/{}", id))
            .await
    }
}
