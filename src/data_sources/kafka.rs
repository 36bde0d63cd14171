//! `doublecloud_kafka` data source.

use async_trait::async_trait;
use serde_json::Value;

use super::{by_name, lookup_schema, Lookup, LookupKey};
use crate::api::ApiClient;
use crate::error::ProviderError;
use crate::resource::{to_state, DataSource};
use crate::resources::kafka_cluster::{kafka_cluster_schema, KafkaClusterModel, SchemaRegistryModel};
use crate::schema::Schema;

pub(crate) struct KafkaDataSource;

#[async_trait]
impl DataSource for KafkaDataSource {
    fn type_name(&self) -> &'static str {
        "doublecloud_kafka"
    }

    fn schema(&self) -> Schema {
        lookup_schema(kafka_cluster_schema(), "Look up a Kafka cluster by id or name")
    }

    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError> {
        let lookup = Lookup::from_config(&config)?;
        let cluster = match lookup.key()? {
            LookupKey::Id(id) => client.kafka().get(id).await?,
            LookupKey::Name { project_id, name } => by_name(
                client.kafka().list(project_id).await?,
                name,
                "kafka cluster",
                |c| c.name.as_str(),
            )?,
        };

        let mut model = KafkaClusterModel {
            schema_registry: Some(SchemaRegistryModel::default()),
            ..Default::default()
        };
        model.parse(cluster);
        to_state(&model)
    }
}
