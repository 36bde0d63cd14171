//! `doublecloud_network` data source.

use async_trait::async_trait;
use serde_json::Value;

use super::{by_name, lookup_schema, Lookup, LookupKey};
use crate::api::ApiClient;
use crate::error::ProviderError;
use crate::resource::{to_state, DataSource};
use crate::resources::network::{network_schema, NetworkModel};
use crate::schema::Schema;

pub(crate) struct NetworkDataSource;

#[async_trait]
impl DataSource for NetworkDataSource {
    fn type_name(&self) -> &'static str {
        "doublecloud_network"
    }

    fn schema(&self) -> Schema {
        lookup_schema(network_schema(), "Look up a network by id or name")
    }

    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError> {
        let lookup = Lookup::from_config(&config)?;
        let network = match lookup.key()? {
            LookupKey::Id(id) => client.networks().get(id).await?,
            LookupKey::Name { project_id, name } => by_name(
                client.networks().list(project_id).await?,
                name,
                "network",
                |n| n.name.as_str(),
            )?,
        };

        let mut model = NetworkModel::default();
        model.parse(network);
        to_state(&model)
    }
}
