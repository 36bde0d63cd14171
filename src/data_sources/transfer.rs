//! `doublecloud_transfer` data source.

use async_trait::async_trait;
use serde_json::Value;

use super::{by_name, lookup_schema, Lookup, LookupKey};
use crate::api::ApiClient;
use crate::error::ProviderError;
use crate::resource::{to_state, DataSource};
use crate::resources::transfer::{transfer_schema, TransferModel};
use crate::schema::Schema;

pub(crate) struct TransferDataSource;

#[async_trait]
impl DataSource for TransferDataSource {
    fn type_name(&self) -> &'static str {
        "doublecloud_transfer"
    }

    fn schema(&self) -> Schema {
        lookup_schema(transfer_schema(), "Look up a transfer by id or name")
    }

    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError> {
        let lookup = Lookup::from_config(&config)?;
        let transfer = match lookup.key()? {
            LookupKey::Id(id) => client.transfers().get(id).await?,
            LookupKey::Name { project_id, name } => by_name(
                client.transfers().list(project_id).await?,
                name,
                "transfer",
                |t| t.name.as_str(),
            )?,
        };

        let mut model = TransferModel::default();
        model.parse(transfer);
        to_state(&model)
    }
}
