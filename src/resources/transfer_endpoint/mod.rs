//! `doublecloud_transfer_endpoint`: a source or target of a transfer.
//!
//! The `settings` block carries exactly one endpoint kind. Each kind lives in
//! its own module with its schema, model and the conversions to and from the
//! API settings.

mod clickhouse;
mod mysql;
mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::api::endpoint::{
    Connection, CreateEndpointRequest, Endpoint, EndpointSettings, OnPremise,
    UpdateEndpointRequest,
};
use crate::api::ApiClient;
use crate::convert::{
    non_empty, parse_tls_mode, string_list, string_or_empty, tls_mode, tls_mode_block,
    to_string_list, TlsModeModel,
};
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::resource::{found, from_state, state_id, to_state, Resource};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::validation;

pub(crate) use clickhouse::ClickhouseTargetModel;
pub(crate) use mysql::{MysqlSourceModel, MysqlTargetModel};
pub(crate) use postgres::{PostgresSourceModel, PostgresTargetModel};

pub(crate) const TYPE_NAME: &str = "doublecloud_transfer_endpoint";

const SETTINGS_KINDS: &[&str] = &[
    "mysql_source",
    "mysql_target",
    "postgres_source",
    "postgres_target",
    "clickhouse_target",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct EndpointModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub settings: Option<SettingsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SettingsModel {
    pub mysql_source: Option<MysqlSourceModel>,
    pub mysql_target: Option<MysqlTargetModel>,
    pub postgres_source: Option<PostgresSourceModel>,
    pub postgres_target: Option<PostgresTargetModel>,
    pub clickhouse_target: Option<ClickhouseTargetModel>,
}

impl SettingsModel {
    fn kinds(&self) -> Vec<&'static str> {
        let set = [
            self.mysql_source.is_some(),
            self.mysql_target.is_some(),
            self.postgres_source.is_some(),
            self.postgres_target.is_some(),
            self.clickhouse_target.is_some(),
        ];
        SETTINGS_KINDS
            .iter()
            .zip(set)
            .filter_map(|(kind, set)| set.then_some(*kind))
            .collect()
    }

    fn check(&self) -> Result<(), Diagnostic> {
        let kinds = self.kinds();
        if kinds.len() == 1 {
            return Ok(());
        }
        let detail = if kinds.is_empty() {
            format!("one of {} is required", SETTINGS_KINDS.join(", "))
        } else {
            format!("only one endpoint kind is allowed, got {}", kinds.join(", "))
        };
        Err(Diagnostic::error("invalid settings")
            .with_detail(detail)
            .with_attribute("settings"))
    }

    pub fn convert(&self) -> Result<EndpointSettings, Diagnostics> {
        let mut diags = Diagnostics::new();
        if let Err(diag) = self.check() {
            diags.push(diag);
            return Err(diags);
        }

        let settings = EndpointSettings {
            mysql_source: self.mysql_source.as_ref().map(|m| m.convert(&mut diags)),
            mysql_target: self.mysql_target.as_ref().map(|m| m.convert(&mut diags)),
            postgres_source: self.postgres_source.as_ref().map(|m| m.convert(&mut diags)),
            postgres_target: self.postgres_target.as_ref().map(|m| m.convert(&mut diags)),
            clickhouse_target: self
                .clickhouse_target
                .as_ref()
                .map(|m| m.convert(&mut diags)),
        };
        diags.into_result(settings)
    }

    /// Parse the response into the configured kind, or into whichever kind
    /// the API returned when nothing is configured yet.
    pub fn parse(&mut self, settings: EndpointSettings) {
        let EndpointSettings {
            mysql_source,
            mysql_target,
            postgres_source,
            postgres_target,
            clickhouse_target,
        } = settings;

        self.mysql_source = mysql_source.map(|api| {
            let mut model = self.mysql_source.take().unwrap_or_default();
            model.parse(api);
            model
        });
        self.mysql_target = mysql_target.map(|api| {
            let mut model = self.mysql_target.take().unwrap_or_default();
            model.parse(api);
            model
        });
        self.postgres_source = postgres_source.map(|api| {
            let mut model = self.postgres_source.take().unwrap_or_default();
            model.parse(api);
            model
        });
        self.postgres_target = postgres_target.map(|api| {
            let mut model = self.postgres_target.take().unwrap_or_default();
            model.parse(api);
            model
        });
        self.clickhouse_target = clickhouse_target.map(|api| {
            let mut model = self.clickhouse_target.take().unwrap_or_default();
            model.parse(api);
            model
        });
    }
}

impl EndpointModel {
    pub fn convert(&self) -> Result<CreateEndpointRequest, Diagnostics> {
        let settings = self.settings.clone().unwrap_or_default().convert()?;
        Ok(CreateEndpointRequest {
            project_id: string_or_empty(&self.project_id),
            name: string_or_empty(&self.name),
            description: string_or_empty(&self.description),
            settings,
        })
    }

    pub fn convert_update(&self, prior: &Self) -> Result<UpdateEndpointRequest, Diagnostics> {
        let settings = if self.settings != prior.settings {
            Some(self.settings.clone().unwrap_or_default().convert()?)
        } else {
            None
        };
        Ok(UpdateEndpointRequest {
            name: (self.name != prior.name).then(|| string_or_empty(&self.name)),
            description: (self.description != prior.description)
                .then(|| string_or_empty(&self.description)),
            settings,
        })
    }

    pub fn parse(&mut self, endpoint: Endpoint) {
        self.id = Some(endpoint.id);
        self.project_id = Some(endpoint.project_id);
        self.name = Some(endpoint.name);
        self.description = non_empty(endpoint.description);
        if let Some(settings) = endpoint.settings {
            self.settings
                .get_or_insert_with(SettingsModel::default)
                .parse(settings);
        }
    }
}

/// `connection { on_premise { ... } }` shared by MySQL and PostgreSQL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectionModel {
    pub on_premise: Option<OnPremiseModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct OnPremiseModel {
    pub hosts: Option<Vec<String>>,
    pub port: Option<i64>,
    pub tls_mode: Option<TlsModeModel>,
}

pub(crate) fn convert_connection(
    model: Option<&ConnectionModel>,
    path: &str,
    diags: &mut Diagnostics,
) -> Option<Connection> {
    let Some(on_premise) = model.and_then(|c| c.on_premise.as_ref()) else {
        diags.push(
            Diagnostic::error("unknown connection")
                .with_detail("required on_premise block")
                .with_attribute(format!("{}.connection", path)),
        );
        return None;
    };
    Some(Connection {
        on_premise: Some(OnPremise {
            hosts: string_list(&on_premise.hosts),
            port: on_premise.port,
            tls_mode: Some(tls_mode(on_premise.tls_mode.as_ref())),
        }),
    })
}

pub(crate) fn parse_connection(connection: Option<Connection>) -> Option<ConnectionModel> {
    let on_premise = connection?.on_premise?;
    Some(ConnectionModel {
        on_premise: Some(OnPremiseModel {
            hosts: to_string_list(on_premise.hosts),
            port: on_premise.port,
            tls_mode: parse_tls_mode(on_premise.tls_mode.as_ref()),
        }),
    })
}

pub(crate) fn connection_block(default_port: &str) -> NestedBlock {
    let on_premise = Block::new()
        .with_description("Self-managed database server")
        .with_attribute("hosts", Attribute::optional_string_list())
        .with_attribute(
            "port",
            Attribute::optional_int64().with_description(default_port),
        )
        .with_block("tls_mode", tls_mode_block());

    NestedBlock::single(Block::new().with_block("on_premise", NestedBlock::single(on_premise)))
        .with_min_items(1)
}

pub(crate) fn password_attribute() -> Attribute {
    Attribute::required_string()
        .sensitive()
        .with_description("Password. It is never read back from the API")
}

/// Optional enum-valued attribute the API fills in when unset.
pub(crate) fn computed_enum(names: &[&str]) -> Attribute {
    Attribute::optional_computed_string()
        .use_state_for_unknown()
        .one_of(names)
}

pub(crate) fn optional_computed_string() -> Attribute {
    Attribute::optional_computed_string().use_state_for_unknown()
}

pub(crate) fn transfer_endpoint_schema() -> Schema {
    let settings = Block::new()
        .with_description("Endpoint settings. Exactly one kind must be set")
        .with_block("mysql_source", mysql::source_block())
        .with_block("mysql_target", mysql::target_block())
        .with_block("postgres_source", postgres::source_block())
        .with_block("postgres_target", postgres::target_block())
        .with_block("clickhouse_target", clickhouse::target_block());

    Schema::v0()
        .with_description("Transfer endpoint")
        .with_attribute(
            "id",
            Attribute::computed_string().use_state_for_unknown(),
        )
        .with_attribute("project_id", Attribute::required_string().with_force_new())
        .with_attribute("name", Attribute::required_string())
        .with_attribute("description", Attribute::optional_string())
        .with_block(
            "settings",
            NestedBlock::single(settings).with_min_items(1),
        )
}

pub(crate) struct TransferEndpointResource;

impl TransferEndpointResource {
    async fn refresh(
        &self,
        client: &ApiClient,
        mut model: EndpointModel,
        id: &str,
    ) -> Result<Value, ProviderError> {
        match found(client.endpoints().get(id).await)? {
            Some(endpoint) => {
                model.parse(endpoint);
                to_state(&model)
            }
            None => Ok(Value::Null),
        }
    }
}

#[async_trait]
impl Resource for TransferEndpointResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        transfer_endpoint_schema()
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags: Diagnostics = validation::validate(&self.schema(), config).into();
        if diags.has_error() {
            return diags;
        }
        if let Ok(model) = serde_json::from_value::<EndpointModel>(config.clone()) {
            if let Err(errors) = model.convert() {
                diags.append(errors);
            }
        }
        diags
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let model: EndpointModel = from_state(planned)?;
        let op = client.endpoints().create(&model.convert()?).await?;
        let id = client.wait_for_resource(op).await?;
        info!(endpoint_id = %id, "Transfer endpoint created");

        let state = self.refresh(client, model, &id).await?;
        if state.is_null() {
            return Err(ProviderError::NotFound(format!("transfer endpoint {}", id)));
        }
        Ok(state)
    }

    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError> {
        let model: EndpointModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        self.refresh(client, model, &id).await
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: EndpointModel = from_state(prior)?;
        let mut model: EndpointModel = from_state(planned)?;
        let id = state_id(&prior.id, TYPE_NAME)?;
        model.id = Some(id.clone());

        let op = client
            .endpoints()
            .update(&id, &model.convert_update(&prior)?)
            .await?;
        client.wait(op).await?;
        info!(endpoint_id = %id, "Transfer endpoint updated");

        self.refresh(client, model, &id).await
    }

    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError> {
        let model: EndpointModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        if let Some(op) = found(client.endpoints().delete(&id).await)? {
            client.wait(op).await?;
        }
        info!(endpoint_id = %id, "Transfer endpoint deleted");
        Ok(())
    }
}
