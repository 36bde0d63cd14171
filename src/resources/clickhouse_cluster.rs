//! `doublecloud_clickhouse_cluster`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::clickhouse::{
    ClickhouseConfig, ClickhouseResources, Cluster, ClusterResources, ConnectionInfo,
    CreateClusterRequest, UpdateClusterRequest,
};
use crate::api::ApiClient;
use crate::convert::{enum_or_empty, non_empty, string_or_empty, LOG_LEVELS};
use crate::diag::Diagnostics;
use crate::error::ProviderError;
use crate::resource::{found, from_state, state_id, to_state, Resource};
use crate::schema::{Attribute, AttributeType, Block, NestedBlock, Schema};

pub(crate) const TYPE_NAME: &str = "doublecloud_clickhouse_cluster";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ClickhouseClusterModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub region_id: Option<String>,
    pub cloud_type: Option<String>,
    pub network_id: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub resources: Option<ResourcesModel>,
    pub config: Option<ConfigModel>,
    pub connection_info: Option<ConnectionInfoModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ResourcesModel {
    pub clickhouse: Option<ClickhouseResourcesModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ClickhouseResourcesModel {
    pub resource_preset_id: Option<String>,
    pub disk_size: Option<i64>,
    pub replica_count: Option<i64>,
    pub shard_count: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConfigModel {
    pub log_level: Option<String>,
    pub max_connections: Option<i64>,
    pub max_concurrent_queries: Option<i64>,
    pub keep_alive_timeout: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectionInfoModel {
    pub host: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub https_port: Option<i64>,
    pub tcp_port_secure: Option<i64>,
}

impl From<ConnectionInfo> for ConnectionInfoModel {
    fn from(info: ConnectionInfo) -> Self {
        Self {
            host: non_empty(info.host),
            user: non_empty(info.user),
            password: non_empty(info.password),
            https_port: info.https_port,
            tcp_port_secure: info.tcp_port_secure,
        }
    }
}

impl ResourcesModel {
    fn convert(&self) -> ClusterResources {
        ClusterResources {
            clickhouse: self.clickhouse.as_ref().map(|ch| ClickhouseResources {
                resource_preset_id: string_or_empty(&ch.resource_preset_id),
                disk_size: ch.disk_size,
                replica_count: ch.replica_count,
                shard_count: ch.shard_count,
            }),
        }
    }
}

impl ConfigModel {
    fn convert(&self, diags: &mut Diagnostics) -> ClickhouseConfig {
        let log_level = enum_or_empty(&self.log_level, LOG_LEVELS, "config.log_level", diags);
        ClickhouseConfig {
            log_level: non_empty(log_level),
            max_connections: self.max_connections,
            max_concurrent_queries: self.max_concurrent_queries,
            keep_alive_timeout: self.keep_alive_timeout,
        }
    }
}

impl ClickhouseClusterModel {
    pub fn convert(&self) -> Result<CreateClusterRequest, Diagnostics> {
        let mut diags = Diagnostics::new();
        let request = CreateClusterRequest {
            project_id: string_or_empty(&self.project_id),
            cloud_type: string_or_empty(&self.cloud_type),
            region_id: string_or_empty(&self.region_id),
            name: string_or_empty(&self.name),
            description: string_or_empty(&self.description),
            version: string_or_empty(&self.version),
            network_id: string_or_empty(&self.network_id),
            resources: self.resources.as_ref().map(ResourcesModel::convert),
            config: self.config.as_ref().map(|c| c.convert(&mut diags)),
        };
        diags.into_result(request)
    }

    /// Request carrying only what differs from `prior`.
    pub fn convert_update(&self, prior: &Self) -> Result<UpdateClusterRequest, Diagnostics> {
        let mut diags = Diagnostics::new();
        let changed = |a: &Option<String>, b: &Option<String>| {
            (a != b).then(|| string_or_empty(a))
        };
        let request = UpdateClusterRequest {
            name: changed(&self.name, &prior.name),
            description: changed(&self.description, &prior.description),
            version: changed(&self.version, &prior.version),
            resources: (self.resources != prior.resources)
                .then(|| self.resources.as_ref().map(ResourcesModel::convert))
                .flatten(),
            config: (self.config != prior.config)
                .then(|| self.config.as_ref().map(|c| c.convert(&mut diags)))
                .flatten(),
        };
        diags.into_result(request)
    }

    /// Write an API response into the model.
    ///
    /// The `config` block is only written back when it is configured.
    pub fn parse(&mut self, cluster: Cluster) {
        self.id = Some(cluster.id);
        self.project_id = Some(cluster.project_id);
        self.name = Some(cluster.name);
        self.region_id = Some(cluster.region_id);
        self.cloud_type = Some(cluster.cloud_type);
        self.network_id = non_empty(cluster.network_id);
        self.description = non_empty(cluster.description);
        self.version = non_empty(cluster.version);

        self.resources = cluster
            .resources
            .and_then(|r| r.clickhouse)
            .map(|ch| ResourcesModel {
                clickhouse: Some(ClickhouseResourcesModel {
                    resource_preset_id: non_empty(ch.resource_preset_id),
                    disk_size: ch.disk_size,
                    replica_count: ch.replica_count,
                    shard_count: ch.shard_count,
                }),
            });

        if self.config.is_some() {
            self.config = cluster.config.map(|c| ConfigModel {
                log_level: c.log_level.and_then(non_empty),
                max_connections: c.max_connections,
                max_concurrent_queries: c.max_concurrent_queries,
                keep_alive_timeout: c.keep_alive_timeout,
            });
        }

        self.connection_info = cluster.connection_info.map(Into::into);
    }
}

fn optional_computed_int64(description: &str) -> Attribute {
    Attribute::optional_computed_int64()
        .use_state_for_unknown()
        .with_description(description)
}

pub(crate) fn clickhouse_cluster_schema() -> Schema {
    let clickhouse = Block::new()
        .with_attribute(
            "resource_preset_id",
            Attribute::required_string().with_description("Resource preset, e.g. `s1-c2-m4`"),
        )
        .with_attribute("disk_size", optional_computed_int64("Disk size in bytes"))
        .with_attribute("replica_count", optional_computed_int64("Replicas per shard"))
        .with_attribute("shard_count", optional_computed_int64("Number of shards"));

    let config = Block::new()
        .with_description("ClickHouse server settings")
        .with_attribute(
            "log_level",
            Attribute::optional_computed_string()
                .use_state_for_unknown()
                .one_of(LOG_LEVELS),
        )
        .with_attribute("max_connections", optional_computed_int64("Maximum client connections"))
        .with_attribute(
            "max_concurrent_queries",
            optional_computed_int64("Maximum simultaneously processed queries"),
        )
        .with_attribute(
            "keep_alive_timeout",
            optional_computed_int64("HTTP keep-alive timeout in seconds"),
        );

    let connection_info = AttributeType::object([
        ("host", AttributeType::String),
        ("user", AttributeType::String),
        ("password", AttributeType::String),
        ("https_port", AttributeType::Int64),
        ("tcp_port_secure", AttributeType::Int64),
    ]);

    Schema::v0()
        .with_description("Managed ClickHouse cluster")
        .with_attribute(
            "id",
            Attribute::computed_string().use_state_for_unknown(),
        )
        .with_attribute(
            "project_id",
            Attribute::required_string().with_force_new(),
        )
        .with_attribute("name", Attribute::required_string())
        .with_attribute(
            "region_id",
            Attribute::required_string().with_force_new(),
        )
        .with_attribute(
            "cloud_type",
            Attribute::required_string().with_force_new(),
        )
        .with_attribute(
            "network_id",
            Attribute::required_string().with_force_new(),
        )
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "version",
            Attribute::optional_computed_string()
                .use_state_for_unknown()
                .with_description("ClickHouse version"),
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
                Block::new().with_block(
                    "clickhouse",
                    NestedBlock::single(clickhouse).with_min_items(1),
                ),
            )
            .with_min_items(1),
        )
        .with_block("config", NestedBlock::single(config))
}

pub(crate) struct ClickhouseClusterResource;

impl ClickhouseClusterResource {
    async fn refresh(
        &self,
        client: &ApiClient,
        mut model: ClickhouseClusterModel,
        id: &str,
    ) -> Result<Value, ProviderError> {
        match found(client.clickhouse().get(id).await)? {
            Some(cluster) => {
                model.parse(cluster);
                to_state(&model)
            }
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl Resource for ClickhouseClusterResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        clickhouse_cluster_schema()
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let model: ClickhouseClusterModel = from_state(planned)?;
        let request = model.convert()?;

        let op = client.clickhouse().create(&request).await?;
        let id = client.wait_for_resource(op).await?;
        info!(cluster_id = %id, "ClickHouse cluster created");

        let state = self.refresh(client, model, &id).await?;
        if state.is_null() {
            return Err(ProviderError::NotFound(format!("clickhouse cluster {}", id)));
        }
        Ok(state)
    }

    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError> {
        let model: ClickhouseClusterModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        self.refresh(client, model, &id).await
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: ClickhouseClusterModel = from_state(prior)?;
        let mut model: ClickhouseClusterModel = from_state(planned)?;
        let id = state_id(&prior.id, TYPE_NAME)?;
        model.id = Some(id.clone());

        let request = model.convert_update(&prior)?;
        let op = client.clickhouse().update(&id, &request).await?;
        client.wait(op).await?;
        info!(cluster_id = %id, "ClickHouse cluster updated");

        self.refresh(client, model, &id).await
    }

    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError> {
        let model: ClickhouseClusterModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        if let Some(op) = found(client.clickhouse().delete(&id).await)? {
            client.wait(op).await?;
        }
        info!(cluster_id = %id, "ClickHouse cluster deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{coerce, validate};
    use serde_json::json;

    fn model(log_level: &str, max_connections: i64) -> ClickhouseClusterModel {
        ClickhouseClusterModel {
            id: Some("chc1".to_string()),
            project_id: Some("prj".to_string()),
            name: Some("tf-acc-clickhouse".to_string()),
            region_id: Some("eu-central-1".to_string()),
            cloud_type: Some("aws".to_string()),
            network_id: Some("net".to_string()),
            resources: Some(ResourcesModel {
                clickhouse: Some(ClickhouseResourcesModel {
                    resource_preset_id: Some("s1-c2-m4".to_string()),
                    disk_size: Some(34359738368),
                    replica_count: Some(1),
                    shard_count: None,
                }),
            }),
            config: Some(ConfigModel {
                log_level: Some(log_level.to_string()),
                max_connections: Some(max_connections),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_convert_rejects_unknown_log_level() {
        let diags = model("LOG_LEVEL_LOUD", 120).convert().unwrap_err();
        assert_eq!(diags.len(), 1);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("config.log_level")
        );
    }

    #[test]
    fn test_update_sends_only_changes() {
        let prior = model("LOG_LEVEL_INFORMATION", 100);
        let planned = model("LOG_LEVEL_TRACE", 120);

        let request = planned.convert_update(&prior).unwrap();
        assert_eq!(request.name, None);
        assert_eq!(request.resources, None);
        let config = request.config.unwrap();
        assert_eq!(config.log_level.as_deref(), Some("LOG_LEVEL_TRACE"));
        assert_eq!(config.max_connections, Some(120));

        let mut renamed = prior.clone();
        renamed.name = Some("tf-acc-clickhouse-changed".to_string());
        let request = renamed.convert_update(&prior).unwrap();
        assert_eq!(request.name.as_deref(), Some("tf-acc-clickhouse-changed"));
        assert_eq!(request.config, None);
    }

    #[test]
    fn test_parse_skips_unconfigured_config_block() {
        let cluster = Cluster {
            id: "chc1".to_string(),
            config: Some(ClickhouseConfig {
                log_level: Some("LOG_LEVEL_INFORMATION".to_string()),
                ..Default::default()
            }),
            connection_info: Some(ConnectionInfo {
                host: "rw.chc1.at.double.cloud".to_string(),
                https_port: Some(8443),
                ..Default::default()
            }),
            ..Default::default()
        };

        let mut unconfigured = ClickhouseClusterModel::default();
        unconfigured.parse(cluster.clone());
        assert_eq!(unconfigured.config, None);
        assert_eq!(
            unconfigured.connection_info.unwrap().https_port,
            Some(8443)
        );

        let mut configured = ClickhouseClusterModel {
            config: Some(ConfigModel::default()),
            ..Default::default()
        };
        configured.parse(cluster);
        assert_eq!(
            configured.config.unwrap().log_level.as_deref(),
            Some("LOG_LEVEL_INFORMATION")
        );
    }

    #[test]
    fn test_quoted_disk_size_is_coerced() {
        let schema = clickhouse_cluster_schema();
        let config = coerce(
            &schema,
            json!({
                "project_id": "prj",
                "name": "tf-acc-clickhouse",
                "region_id": "eu-central-1",
                "cloud_type": "aws",
                "network_id": "net",
                "resources": {"clickhouse": {
                    "resource_preset_id": "s1-c2-m4",
                    "disk_size": "34359738368",
                    "replica_count": "1"
                }},
                "config": {"log_level": "LOG_LEVEL_INFORMATION", "max_connections": 120}
            }),
        );
        assert!(validate(&schema, &config).is_empty());

        let model: ClickhouseClusterModel = from_state(config).unwrap();
        let resources = model.resources.unwrap().clickhouse.unwrap();
        assert_eq!(resources.disk_size, Some(34359738368));
        assert_eq!(resources.replica_count, Some(1));
    }
}
