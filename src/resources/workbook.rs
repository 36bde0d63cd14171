//! `doublecloud_workbook`: a visualization workbook with its connections.
//!
//! `config` and each `connect.config` hold JSON text. Reads keep the
//! configured text whenever it is the same JSON document the API returns, so
//! formatting differences never show up as changes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::api::visualization::{CreateWorkbookRequest, Workbook, WorkbookConnection};
use crate::api::ApiClient;
use crate::diag::{Diagnostic, Diagnostics};
use crate::error::ProviderError;
use crate::resource::{found, from_state, state_id, to_state, Resource};
use crate::schema::{Attribute, Block, NestedBlock, Schema};
use crate::validation;

pub(crate) const TYPE_NAME: &str = "doublecloud_workbook";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct WorkbookModel {
    pub id: Option<String>,
    pub project_id: Option<String>,
    pub title: Option<String>,
    pub config: Option<String>,
    pub connect: Option<Vec<ConnectModel>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectModel {
    pub name: Option<String>,
    pub config: Option<String>,
}

fn parse_json(text: &str, attribute: &str) -> Result<Value, Diagnostic> {
    serde_json::from_str(text).map_err(|e| {
        Diagnostic::error(format!("invalid {}", attribute))
            .with_detail(format!("not a JSON document: {}", e))
            .with_attribute(attribute)
    })
}

/// Keep `prior` text when it encodes `value`, otherwise render `value`.
fn json_text(prior: &Option<String>, value: Value) -> Option<String> {
    if value.is_null() {
        return None;
    }
    if let Some(text) = prior {
        if serde_json::from_str::<Value>(text).ok().as_ref() == Some(&value) {
            return Some(text.clone());
        }
    }
    Some(value.to_string())
}

impl WorkbookModel {
    fn config_value(&self) -> Result<Option<Value>, Diagnostics> {
        match self.config.as_deref() {
            Some(text) => parse_json(text, "config")
                .map(Some)
                .map_err(|d| Diagnostics::from(vec![d])),
            None => Ok(None),
        }
    }

    /// Connections keyed by name with parsed configs.
    fn connections(&self) -> Result<BTreeMap<String, Value>, Diagnostics> {
        let mut diags = Diagnostics::new();
        let mut connections = BTreeMap::new();
        for (i, connect) in self.connect.iter().flatten().enumerate() {
            let attribute = format!("connect.{}.config", i);
            let name = connect.name.clone().unwrap_or_default();
            match parse_json(connect.config.as_deref().unwrap_or("{}"), &attribute) {
                Ok(config) => {
                    if connections.insert(name.clone(), config).is_some() {
                        diags.push(
                            Diagnostic::error("duplicate connection")
                                .with_detail(format!("connection {:?} is declared twice", name))
                                .with_attribute(format!("connect.{}.name", i)),
                        );
                    }
                }
                Err(diag) => diags.push(diag),
            }
        }
        diags.into_result(connections)
    }

    fn check(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if let Err(errors) = self.config_value() {
            diags.append(errors);
        }
        if let Err(errors) = self.connections() {
            diags.append(errors);
        }
        diags
    }

    fn parse(&mut self, workbook: Workbook, connections: Vec<WorkbookConnection>) {
        self.id = Some(workbook.id);
        self.project_id = Some(workbook.project_id);
        self.title = Some(workbook.title);
        self.config = json_text(&self.config, workbook.config);

        let prior: Vec<ConnectModel> = self.connect.take().unwrap_or_default();
        let mut remote: BTreeMap<String, Value> = connections
            .into_iter()
            .map(|c| (c.name, c.config))
            .collect();

        // configured order first, then connections created elsewhere
        let mut parsed = Vec::new();
        for connect in prior {
            let name = connect.name.clone().unwrap_or_default();
            if let Some(config) = remote.remove(&name) {
                parsed.push(ConnectModel {
                    name: Some(name),
                    config: json_text(&connect.config, config),
                });
            }
        }
        for (name, config) in remote {
            parsed.push(ConnectModel {
                name: Some(name),
                config: json_text(&None, config),
            });
        }

        self.connect = if parsed.is_empty() { None } else { Some(parsed) };
    }
}

pub(crate) fn workbook_schema() -> Schema {
    Schema::v0()
        .with_description("Visualization workbook")
        .with_attribute(
            "id",
            Attribute::computed_string().use_state_for_unknown(),
        )
        .with_attribute(
            "project_id",
            Attribute::required_string()
                .with_force_new()
                .with_description("Project ID"),
        )
        .with_attribute(
            "title",
            Attribute::required_string().with_description("Workbook title"),
        )
        .with_attribute(
            "config",
            Attribute::optional_computed_string()
                .use_state_for_unknown()
                .with_description("Workbook configuration as JSON"),
        )
        .with_block(
            "connect",
            NestedBlock::list(
                Block::new()
                    .with_description("Data connection used by the workbook")
                    .with_attribute("name", Attribute::required_string())
                    .with_attribute(
                        "config",
                        Attribute::required_string()
                            .with_description("Connection configuration as JSON"),
                    ),
            ),
        )
}

pub(crate) struct WorkbookResource;

impl WorkbookResource {
    async fn refresh(
        &self,
        client: &ApiClient,
        model: &mut WorkbookModel,
        id: &str,
    ) -> Result<bool, ProviderError> {
        let Some(workbook) = found(client.workbooks().get(id).await)? else {
            return Ok(false);
        };
        let connections = client.workbooks().connections(id).await?;
        model.parse(workbook, connections);
        Ok(true)
    }

    async fn put_connections(
        &self,
        client: &ApiClient,
        id: &str,
        prior: &BTreeMap<String, Value>,
        planned: &BTreeMap<String, Value>,
    ) -> Result<(), ProviderError> {
        for (name, config) in planned {
            if prior.get(name) != Some(config) {
                debug!(workbook_id = %id, connection = %name, "Putting workbook connection");
                let op = client.workbooks().put_connection(id, name, config).await?;
                client.wait(op).await?;
            }
        }
        for name in prior.keys().filter(|name| !planned.contains_key(*name)) {
            debug!(workbook_id = %id, connection = %name, "Deleting workbook connection");
            let op = client.workbooks().delete_connection(id, name).await?;
            client.wait(op).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Resource for WorkbookResource {
    fn type_name(&self) -> &'static str {
        TYPE_NAME
    }

    fn schema(&self) -> Schema {
        workbook_schema()
    }

    fn validate(&self, config: &Value) -> Diagnostics {
        let mut diags: Diagnostics = validation::validate(&self.schema(), config).into();
        if !diags.has_error() {
            if let Ok(model) = serde_json::from_value::<WorkbookModel>(config.clone()) {
                diags.append(model.check());
            }
        }
        diags
    }

    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError> {
        let mut model: WorkbookModel = from_state(planned)?;
        let config = model.config_value()?;
        let connections = model.connections()?;

        let request = CreateWorkbookRequest {
            project_id: model.project_id.clone().unwrap_or_default(),
            title: model.title.clone().unwrap_or_default(),
        };
        let op = client.workbooks().create(&request).await?;
        let id = client.wait_for_resource(op).await?;
        info!(workbook_id = %id, "Workbook created");

        if let Some(config) = &config {
            let op = client.workbooks().put_config(&id, config).await?;
            client.wait(op).await?;
        }
        self.put_connections(client, &id, &BTreeMap::new(), &connections)
            .await?;

        if !self.refresh(client, &mut model, &id).await? {
            return Err(ProviderError::NotFound(format!("workbook {}", id)));
        }
        to_state(&model)
    }

    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError> {
        let mut model: WorkbookModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        if self.refresh(client, &mut model, &id).await? {
            to_state(&model)
        } else {
            Ok(Value::Null)
        }
    }

    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError> {
        let prior: WorkbookModel = from_state(prior)?;
        let mut model: WorkbookModel = from_state(planned)?;
        let id = state_id(&prior.id, TYPE_NAME)?;

        if model.title != prior.title {
            let title = model.title.clone().unwrap_or_default();
            let op = client.workbooks().rename(&id, &title).await?;
            client.wait(op).await?;
        }

        let prior_config = prior.config_value().unwrap_or(None);
        if let Some(config) = model.config_value()? {
            if Some(&config) != prior_config.as_ref() {
                let op = client.workbooks().put_config(&id, &config).await?;
                client.wait(op).await?;
            }
        }

        let planned_connections = model.connections()?;
        let prior_connections = prior.connections().unwrap_or_default();
        self.put_connections(client, &id, &prior_connections, &planned_connections)
            .await?;

        model.id = Some(id.clone());
        if !self.refresh(client, &mut model, &id).await? {
            return Err(ProviderError::NotFound(format!("workbook {}", id)));
        }
        to_state(&model)
    }

    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError> {
        let model: WorkbookModel = from_state(state)?;
        let id = state_id(&model.id, TYPE_NAME)?;
        if let Some(op) = found(client.workbooks().delete(&id).await)? {
            client.wait(op).await?;
        }
        info!(workbook_id = %id, "Workbook deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connect(name: &str, config: &str) -> ConnectModel {
        ConnectModel {
            name: Some(name.to_string()),
            config: Some(config.to_string()),
        }
    }

    #[test]
    fn test_json_text_keeps_formatting() {
        let prior = Some("{ \"kind\": \"wizard\" }".to_string());
        assert_eq!(json_text(&prior, json!({"kind": "wizard"})), prior);
        assert_eq!(
            json_text(&prior, json!({"kind": "ql"})).as_deref(),
            Some(r#"{"kind":"ql"}"#)
        );
        assert_eq!(json_text(&prior, Value::Null), None);
    }

    #[test]
    fn test_parse_orders_connections() {
        let mut model = WorkbookModel {
            config: Some("{}".to_string()),
            connect: Some(vec![
                connect("ch", r#"{"kind": "clickhouse"}"#),
                connect("gone", "{}"),
            ]),
            ..Default::default()
        };
        model.parse(
            Workbook {
                id: "wb1".to_string(),
                project_id: "prj".to_string(),
                title: "tf-acc-workbook".to_string(),
                config: json!({}),
            },
            vec![
                WorkbookConnection {
                    name: "extra".to_string(),
                    config: json!({"kind": "pg"}),
                },
                WorkbookConnection {
                    name: "ch".to_string(),
                    config: json!({"kind": "clickhouse"}),
                },
            ],
        );

        let connect = model.connect.unwrap();
        assert_eq!(connect.len(), 2);
        assert_eq!(connect[0].name.as_deref(), Some("ch"));
        assert_eq!(connect[0].config.as_deref(), Some(r#"{"kind": "clickhouse"}"#));
        assert_eq!(connect[1].name.as_deref(), Some("extra"));
        assert_eq!(model.config.as_deref(), Some("{}"));
    }

    #[test]
    fn test_validate_rejects_bad_json() {
        let diags = WorkbookResource.validate(&json!({
            "project_id": "prj",
            "title": "t",
            "config": "{not json",
            "connect": [
                {"name": "a", "config": "{}"},
                {"name": "a", "config": "{}"}
            ]
        }));
        let summaries: Vec<&str> = diags.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(summaries, vec!["invalid config", "duplicate connection"]);
    }
}
