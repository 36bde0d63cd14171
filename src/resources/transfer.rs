//! `doublecloud_transfer`: a data transfer between two endpoints.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::api::transfer::{CreateTransferRequest, Transfer, UpdateTransferRequest};
use crate::api::ApiClient;
use crate::convert::{non_empty, parse_enum, string_or_empty, TRANSFER_TYPES};
use crate::diag::Diagnostics;
use crate::error::ProviderError;
use crate::resource::{found, from_state, state_id, to_state, Resource};
use crate::schema::{Attribute, Schema};

pub(crate) const TYPE_NAME: &str = "doublecloud_transfer";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct TransferModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub source: Option<String>,
    pub target: Option<String>,
    #[serde(rename = "type")]
    pub transfer_type: Option<String>,
    pub activated: Option<bool>,
    pub status: Option<String>,
}

impl TransferModel {
    pub fn convert(&self) -> Result<CreateTransferRequest, Diagnostics> {
        let mut diags = Diagnostics::new();
        let transfer_type = parse_enum(
            self.transfer_type.as_deref().unwrap_or_default(),
            TRANSFER_TYPES,
            "type",
        )
        .unwrap_or_else(|diag| {
            diags.push(diag);
            String::new()
        });

        diags.into_result(CreateTransferRequest {
            project_id: string_or_empty(&self.project_id),
            name: string_or_empty(&self.name),
            description: string_or_empty(&self.description),
            source_id: string_or_empty(&self.source),
            target_id: string_or_empty(&self.target),
            transfer_type,
        })
    }

    pub fn parse(&mut self, transfer: Transfer) {
        self.activated = Some(transfer.is_active());
        self.id = Some(transfer.id);
        self.project_id = Some(transfer.project_id);
        self.name = Some(transfer.name);
        self.description = non_empty(transfer.description);
        self.source = Some(transfer.source_id);
        self.target = Some(transfer.target_id);
        self.transfer_type = Some(transfer.transfer_type);
        self.status = non_empty(transfer.status);
    }
}

pub(crate) fn transfer_schema() -> Schema {
    Schema::v0()
        .with_description("Data transfer from a source endpoint to a target endpoint")
        .with_attribute(
            "id",
            Attribute::computed_string().use_state_for_unknown(),
        )
        .with_attribute("project_id", Attribute::required_string().with_force_new())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_attribute(
            "source",
            Attribute::required_string()
                .with_force_new()
                .with_description("Source endpoint ID"),
        )
        .with_attribute(
            "target",
            Attribute::required_string()
                .with_force_new()
                .with_description("Target endpoint ID"),
        )
        .with_attribute(
            "type",
            Attribute::required_string()
                .with_force_new()
                .one_of(TRANSFER_TYPES),
        )
        .with_attribute(
            "activated",
            Attribute::optional_bool()
                .with_default(json!(false))
                .with_description("Run the transfer"),
        )
        .with_attribute("status", Attribute::computed_string())
}

pub(crate) struct TransferResource;

impl TransferResource {
    async fn set_activated(
        &self,
        client: &ApiClient,
        id: &str,
        activated: bool,
    ) -> Result<(), ProviderError> {
        let op = if activated {
            client.transfers().activate(id).await?
        } else {
            client.transfers().deactivate(id).await?
        };
        client.wait(op).await?;
        info!(transfer_id = %id, activated, "Transfer activation changed");
        Ok(())
    }

    /// Re-read the transfer. `requested` is the activation just asked for;
    /// it stands while the transfer is still changing state.
    async fn refresh(
        &self,
        client: &ApiClient,
        mut model: TransferModel,
        id: &str,
        requested: Option<bool>,
    ) -> Result<Value, ProviderError> {
        match found(client.transfers().get(id).await)? {
            Some(transfer) => {
                let settling = transfer.is_settling();
                model.parse(transfer);
                if let (Some(requested), true) = (requested, settling) {
                    model.activated = Some(requested);
                }
                to_state(&model)
            }
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl Resource for TransferResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        transfer_schema()
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let model: TransferModel = from_state(planned)?;
        let op = client.transfers().create(&model.convert()?).await?;
        let id = client.wait_for_resource(op).await?;
        info!(transfer_id = %id, "Transfer created");

        let requested = (model.activated == Some(true)).then_some(true);
        if requested.is_some() {
            self.set_activated(client, &id, true).await?;
        }

        let state = self.refresh(client, model, &id, requested).await?;
        if state.is_null() {
            return Err(ProviderError::NotFound(format!("transfer {}", id)));
        }
        Ok(state)
    }

    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError> {
        let model: TransferModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        self.refresh(client, model, &id, None).await
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: TransferModel = from_state(prior)?;
        let mut model: TransferModel = from_state(planned)?;
        let id = state_id(&prior.id, TYPE_NAME)?;
        model.id = Some(id.clone());

        let request = UpdateTransferRequest {
            name: (model.name != prior.name).then(|| string_or_empty(&model.name)),
            description: (model.description != prior.description)
                .then(|| string_or_empty(&model.description)),
        };
        if request.name.is_some() || request.description.is_some() {
            let op = client.transfers().update(&id, &request).await?;
            client.wait(op).await?;
        }

        let activated = model.activated.unwrap_or(false);
        let requested = (activated != prior.activated.unwrap_or(false)).then_some(activated);
        if requested.is_some() {
            self.set_activated(client, &id, activated).await?;
        }

        self.refresh(client, model, &id, requested).await
    }

    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError> {
        let model: TransferModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;

        let Some(transfer) = found(client.transfers().get(&id).await)? else {
            return Ok(());
        };
        if transfer.is_active() {
            self.set_activated(client, &id, false).await?;
        }
        if let Some(op) = found(client.transfers().delete(&id).await)? {
            client.wait(op).await?;
        }
        info!(transfer_id = %id, "Transfer deleted");
        Ok(())
    }
}
