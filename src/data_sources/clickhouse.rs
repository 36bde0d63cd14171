//! `doublecloud_clickhouse` data source.

use async_trait::async_trait;
use serde_json::Value;

use super::{by_name, lookup_schema, Lookup, LookupKey};
use crate::api::ApiClient;
use crate::error::ProviderError;
use crate::resource::{to_state, DataSource};
use crate::resources::clickhouse_cluster::{
    clickhouse_cluster_schema, ClickhouseClusterModel, ConfigModel,
};
use crate::schema::Schema;

pub(crate) struct ClickhouseDataSource;

#[async_trait]
impl DataSource for ClickhouseDataSource {
    fn type_name(&self) -> &'static str {
        "doublecloud_clickhouse"
    }

    fn schema(&self) -> Schema {
        lookup_schema(
            clickhouse_cluster_schema(),
            "Look up a ClickHouse cluster by id or name",
        )
    }

    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError> {
        let lookup = Lookup::from_config(&config)?;
        let cluster = match lookup.key()? {
            LookupKey::Id(id) => client.clickhouse().get(id).await?,
            LookupKey::Name { project_id, name } => by_name(
                client.clickhouse().list(project_id).await?,
                name,
                "clickhouse cluster",
                |c| c.name.as_str(),
            )?,
        };

        // lookups always report server settings
        let mut model = ClickhouseClusterModel {
            config: Some(ConfigModel::default()),
            ..Default::default()
        };
        model.parse(cluster);
        to_state(&model)
    }
}
