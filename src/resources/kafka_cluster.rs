//! `doublecloud_kafka_cluster`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::kafka::{
    Cluster, ClusterResources, ConnectionInfo, CreateClusterRequest, KafkaResources,
    SchemaRegistryConfig, UpdateClusterRequest,
};
use crate::api::ApiClient;
use crate::convert::{non_empty, string_or_empty};
use crate::error::ProviderError;
use crate::resource::{found, from_state, state_id, to_state, Resource};
use crate::schema::{Attribute, AttributeType, Block, NestedBlock, Schema};

pub(crate) const TYPE_NAME: &str = "doublecloud_kafka_cluster";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct KafkaClusterModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub network_id: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub resources: Option<ResourcesModel>,
    pub schema_registry: Option<SchemaRegistryModel>,
    pub connection_info: Option<ConnectionInfoModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ResourcesModel {
    pub kafka: Option<KafkaResourcesModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct KafkaResourcesModel {
    pub resource_preset_id: Option<String>,
    pub disk_size: Option<i64>,
    pub broker_count: Option<i64>,
    pub zone_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SchemaRegistryModel {
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectionInfoModel {
    pub connection_string: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

impl From<ConnectionInfo> for ConnectionInfoModel {
    fn from(info: ConnectionInfo) -> Self {
        Self {
            connection_string: non_empty(info.connection_string),
            user: non_empty(info.user),
            password: non_empty(info.password),
        }
    }
}

fn convert_resources(model: &ResourcesModel) -> ClusterResources {
    ClusterResources {
        kafka: model.kafka.as_ref().map(|k| KafkaResources {
            resource_preset_id: string_or_empty(&k.resource_preset_id),
            disk_size: k.disk_size,
            broker_count: k.broker_count,
            zone_count: k.zone_count,
        }),
    }
}

fn convert_schema_registry(model: &SchemaRegistryModel) -> SchemaRegistryConfig {
    SchemaRegistryConfig {
        enabled: model.enabled.unwrap_or(false),
    }
}

impl KafkaClusterModel {
    pub fn convert(&self) -> CreateClusterRequest {
        CreateClusterRequest {
            project_id: string_or_empty(&self.project_id),
            cloud_type: string_or_empty(&self.cloud_type),
            region_id: string_or_empty(&self.region_id),
            name: string_or_empty(&self.name),
            description: string_or_empty(&self.description),
            version: string_or_empty(&self.version),
            network_id: string_or_empty(&self.network_id),
            resources: self.resources.as_ref().map(convert_resources),
            schema_registry_config: self.schema_registry.as_ref().map(convert_schema_registry),
        }
    }

    pub fn convert_update(&self, prior: &Self) -> UpdateClusterRequest {
        let changed = |a: &Option<String>, b: &Option<String>| (a != b).then(|| string_or_empty(a));
        UpdateClusterRequest {
            name: changed(&self.name, &prior.name),
            description: changed(&self.description, &prior.description),
            version: changed(&self.version, &prior.version),
            resources: if self.resources != prior.resources {
                self.resources.as_ref().map(convert_resources)
            } else {
                None
            },
            schema_registry_config: if self.schema_registry != prior.schema_registry {
                self.schema_registry.as_ref().map(convert_schema_registry)
            } else {
                None
            },
        }
    }

    pub fn parse(&mut self, cluster: Cluster) {
        self.id = Some(cluster.id);
        self.project_id = Some(cluster.project_id);
        self.name = Some(cluster.name);
        self.region_id = Some(cluster.region_id);
        self.cloud_type = Some(cluster.cloud_type);
        self.network_id = non_empty(cluster.network_id);
        self.description = non_empty(cluster.description);
        self.version = non_empty(cluster.version);

        self.resources = cluster.resources.and_then(|r| r.kafka).map(|k| ResourcesModel {
            kafka: Some(KafkaResourcesModel {
                resource_preset_id: non_empty(k.resource_preset_id),
                disk_size: k.disk_size,
                broker_count: k.broker_count,
                zone_count: k.zone_count,
            }),
        });

        // only when configured
        if self.schema_registry.is_some() {
            self.schema_registry = cluster.schema_registry_config.map(|s| SchemaRegistryModel {
                enabled: Some(s.enabled),
            });
        }

        self.connection_info = cluster.connection_info.map(Into::into);
    }
}

pub(crate) fn kafka_cluster_schema() -> Schema {
    let kafka = Block::new()
        .with_attribute("resource_preset_id", Attribute::required_string())
        .with_attribute(
            "disk_size",
            Attribute::optional_computed_int64()
                .use_state_for_unknown()
                .with_description("Disk size per broker in bytes"),
        )
        .with_attribute(
            "broker_count",
            Attribute::optional_computed_int64().use_state_for_unknown(),
        )
        .with_attribute(
            "zone_count",
            Attribute::optional_computed_int64().use_state_for_unknown(),
        );

    let connection_info = AttributeType::object([
        ("connection_string", AttributeType::String),
        ("user", AttributeType::String),
        ("password", AttributeType::String),
    ]);

    Schema::v0()
        .with_description("Managed Apache Kafka cluster")
        .with_attribute(
            "id",
            Attribute::computed_string().use_state_for_unknown(),
        )
        .with_attribute("project_id", Attribute::required_string().with_force_new())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("region_id", Attribute::required_string().with_force_new())
        .with_attribute("cloud_type", Attribute::required_string().with_force_new())
        .with_attribute("network_id", Attribute::required_string().with_force_new())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "version",
            Attribute::optional_computed_string().use_state_for_unknown(),
        )
        .with_attribute(
            "connection_info",
            Attribute::computed_object(connection_info)
                .use_state_for_unknown()
                .sensitive(),
        )
        .with_block(
            "resources",
            NestedBlock::single(
                Block::new().with_block("kafka", NestedBlock::single(kafka).with_min_items(1)),
            )
            .with_min_items(1),
        )
        .with_block(
            "schema_registry",
            NestedBlock::single(Block::new().with_attribute(
                "enabled",
                Attribute::optional_computed_bool().use_state_for_unknown(),
            )),
        )
}

pub(crate) struct KafkaClusterResource;

impl KafkaClusterResource {
    async fn refresh(
        &self,
        client: &ApiClient,
        mut model: KafkaClusterModel,
        id: &str,
    ) -> Result<Value, ProviderError> {
        match found(client.kafka().get(id).await)? {
            Some(cluster) => {
                model.parse(cluster);
                to_state(&model)
            }
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl Resource for KafkaClusterResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        kafka_cluster_schema()
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let model: KafkaClusterModel = from_state(planned)?;
        let op = client.kafka().create(&model.convert()).await?;
        let id = client.wait_for_resource(op).await?;
        info!(cluster_id = %id, "Kafka cluster created");

        let state = self.refresh(client, model, &id).await?;
        if state.is_null() {
            return Err(ProviderError::NotFound(format!("kafka cluster {}", id)));
        }
        Ok(state)
    }

    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError> {
        let model: KafkaClusterModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        self.refresh(client, model, &id).await
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: KafkaClusterModel = from_state(prior)?;
        let mut model: KafkaClusterModel = from_state(planned)?;
        let id = state_id(&prior.id, TYPE_NAME)?;
        model.id = Some(id.clone());

        let op = client
            .kafka()
            .update(&id, &model.convert_update(&prior))
            .await?;
        client.wait(op).await?;
        info!(cluster_id = %id, "Kafka cluster updated");

        self.refresh(client, model, &id).await
    }

    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError> {
        let model: KafkaClusterModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        if let Some(op) = found(client.kafka().delete(&id).await)? {
            client.wait(op).await?;
        }
        info!(cluster_id = %id, "Kafka cluster deleted");
        Ok(())
    }
}
