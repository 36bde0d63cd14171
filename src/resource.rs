//! Resource and data source traits.
//!
//! Each managed object type implements [`Resource`]; the provider dispatches
//! host calls to it by type name. Implementations deserialize the JSON state
//! into a model struct with [`from_state`], map it onto API requests, and
//! serialize the parsed API response back with [`to_state`].

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::api::ApiClient;
use crate::diag::Diagnostics;
use crate::error::ProviderError;
use crate::schema::Schema;
use crate::validation;

/// A managed resource type.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. `doublecloud_clickhouse_cluster`.
    fn type_name(&self) -> &'static str;

    /// Resource schema.
    fn schema(&self) -> Schema;

    /// Validate a configuration. The default checks it against [`Resource::schema`].
    fn validate(&self, config: &Value) -> Diagnostics {
        validation::validate(&self.schema(), config).into()
    }

    /// Create the object and return its state.
    async fn create(&self, client: &ApiClient, planned: Value) -> Result<Value, ProviderError>;

    /// Refresh state. Returns `Value::Null` when the object no longer exists.
    async fn read(&self, client: &ApiClient, state: Value) -> Result<Value, ProviderError>;

    /// Apply a planned change to an existing object.
    async fn update(
        &self,
        client: &ApiClient,
        prior: Value,
        planned: Value,
    ) -> Result<Value, ProviderError>;

    /// Delete the object.
    async fn delete(&self, client: &ApiClient, state: Value) -> Result<(), ProviderError>;

    /// Import an existing object by id.
    async fn import(&self, client: &ApiClient, id: &str) -> Result<Value, ProviderError> {
        let state = self.read(client, json!({ "id": id })).await?;
        if state.is_null() {
            return Err(ProviderError::NotFound(format!(
                "{} {}",
                self.type_name(),
                id
            )));
        }
        Ok(state)
    }
}

/// A read-only data source type.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Type name, e.g. `doublecloud_network`.
    fn type_name(&self) -> &'static str;

    /// Data source schema.
    fn schema(&self) -> Schema;

    /// Look up the object described by `config`.
    async fn read(&self, client: &ApiClient, config: Value) -> Result<Value, ProviderError>;
}

/// Deserialize a JSON state into a model.
pub fn from_state<T: DeserializeOwned>(state: Value) -> Result<T, ProviderError> {
    Ok(serde_json::from_value(state)?)
}

/// Serialize a model into JSON state.
pub fn to_state<T: Serialize>(model: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(model)?)
}

/// Map a not-found error to `None` so reads can drop vanished objects.
pub fn found<T>(result: Result<T, ProviderError>) -> Result<Option<T>, ProviderError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}

/// The `id` of a state, or an error if the state has none.
pub fn state_id(id: &Option<String>, type_name: &str) -> Result<String, ProviderError> {
    match id.as_deref() {
        Some(id) if !id.is_empty() => Ok(id.to_string()),
        _ => Err(ProviderError::Validation(format!(
            "{} state has no id",
            type_name
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Model {
        id: Option<String>,
        name: Option<String>,
    }

    #[test]
    fn test_state_conversions() {
        let model: Model = from_state(json!({"id": "net1", "name": "tf-acc-net"})).unwrap();
        assert_eq!(model.name.as_deref(), Some("tf-acc-net"));

        let partial: Model = from_state(json!({"name": "x"})).unwrap();
        assert_eq!(partial.id, None);

        assert_eq!(
            to_state(&Model::default()).unwrap(),
            json!({"id": null, "name": null})
        );
        assert!(from_state::<Model>(json!({"name": 5})).is_err());
    }

    #[test]
    fn test_found() {
        assert_eq!(found(Ok::<_, ProviderError>(1)).unwrap(), Some(1));
        assert_eq!(
            found::<i32>(Err(ProviderError::NotFound("x".into()))).unwrap(),
            None
        );
        assert!(found::<i32>(Err(ProviderError::Unavailable("x".into()))).is_err());
    }

    #[test]
    fn test_state_id() {
        assert_eq!(state_id(&Some("chc1".into()), "t").unwrap(), "chc1");
        assert!(state_id(&None, "t").is_err());
        assert!(state_id(&Some(String::new()), "t").is_err());
    }
}
