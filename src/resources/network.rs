//! `doublecloud_network`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::network::{CreateNetworkRequest, Network};
use crate::api::ApiClient;
use crate::convert::{non_empty, string_or_empty};
use crate::error::ProviderError;
use crate::resource::{found, from_state, state_id, to_state, Resource};
use crate::schema::{Attribute, Schema};

pub(crate) const TYPE_NAME: &str = "doublecloud_network";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct NetworkModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub ipv4_cidr_block: Option<String>,
    pub ipv6_cidr_block: Option<String>,
    pub description: Option<String>,
    pub is_external: Option<bool>,
}

impl NetworkModel {
    pub fn convert(&self) -> CreateNetworkRequest {
        CreateNetworkRequest {
            project_id: string_or_empty(&self.project_id),
            cloud_type: string_or_empty(&self.cloud_type),
            region_id: string_or_empty(&self.region_id),
            name: string_or_empty(&self.name),
            description: string_or_empty(&self.description),
            ipv4_cidr_block: string_or_empty(&self.ipv4_cidr_block),
        }
    }

    pub fn parse(&mut self, network: Network) {
        self.id = Some(network.id);
        self.project_id = Some(network.project_id);
        self.name = Some(network.name);
        self.region_id = Some(network.region_id);
        self.cloud_type = Some(network.cloud_type);
        self.ipv4_cidr_block = Some(network.ipv4_cidr_block);
        self.ipv6_cidr_block = Some(network.ipv6_cidr_block);
        self.description = non_empty(network.description);
        self.is_external = Some(network.is_external);
    }
}

pub(crate) fn network_schema() -> Schema {
    Schema::v0()
        .with_description("Network in a DoubleCloud region")
        .with_attribute(
            "id",
            Attribute::computed_string()
                .use_state_for_unknown()
                .with_description("Network ID"),
        )
        .with_attribute(
            "project_id",
            Attribute::required_string()
                .with_force_new()
                .with_description("Project ID"),
        )
        .with_attribute(
            "name",
            Attribute::required_string()
                .with_force_new()
                .with_description("Network name"),
        )
        .with_attribute(
            "region_id",
            Attribute::required_string()
                .with_force_new()
                .with_description("Region, e.g. `eu-central-1`"),
        )
        .with_attribute(
            "cloud_type",
            Attribute::required_string()
                .with_force_new()
                .with_description("Cloud provider: `aws` or `gcp`"),
        )
        .with_attribute(
            "ipv4_cidr_block",
            Attribute::required_string()
                .with_force_new()
                .with_description("IPv4 CIDR block of the network"),
        )
        .with_attribute(
            "ipv6_cidr_block",
            Attribute::computed_string().use_state_for_unknown(),
        )
        .with_attribute("description", Attribute::optional_string().with_force_new())
        .with_attribute(
            "is_external",
            Attribute::computed_bool().use_state_for_unknown(),
        )
}

pub(crate) struct NetworkResource;

#[async_trait]
impl Resource for NetworkResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        network_schema()
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let mut model: NetworkModel = from_state(planned)?;
        let op = client.networks().create(&model.convert()).await?;
        let id = client.wait_for_resource(op).await?;
        info!(network_id = %id, "Network created");

        model.parse(client.networks().get(&id).await?);
        to_state(&model)
    }

    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError> {
        let mut model: NetworkModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        match found(client.networks().get(&id).await)? {
            Some(network) => {
                model.parse(network);
                to_state(&model)
            }
            None => Ok(Value::Null),
        }
    }

    // every settable attribute forces replacement
    async fn update(
        &self,
        client: &ApiClient,
        _prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        self.read(client, planned).await
    }

    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError> {
        let model: NetworkModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        if let Some(op) = found(client.networks().delete(&id).await)? {
            client.wait(op).await?;
        }
        info!(network_id = %id, "Network deleted");
        Ok(())
    }
}
