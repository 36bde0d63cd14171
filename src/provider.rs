//! The `doublecloud` provider.
//!
//! [`DoubleCloudProvider`] owns the registered resources and data sources and
//! the API client built by `Configure`. Every other call is dispatched by type
//! name to the matching [`Resource`] or [`DataSource`].

use serde::Deserialize;
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{info, instrument, warn};

use crate::api::{resolve_credentials, ApiClient, ClientOptions};
use crate::data_sources;
use crate::diag::Diagnostic;
use crate::error::ProviderError;
use crate::plan::plan_resource;
use crate::resource::{DataSource, Resource};
use crate::resources;
use crate::schema::{Attribute, ProviderSchema, Schema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};
use crate::validation;

/// Provider type name.
pub const TYPE_NAME: &str = "doublecloud";

/// Environment variable holding the path of an authorized key file.
pub const AUTHKEY_ENV: &str = "DC_AUTHKEY";

/// Provider configuration block.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Authorized key JSON.
    pub authorized_key: Option<String>,
    /// API base URL override.
    pub endpoint: Option<String>,
    /// Token exchange URL override.
    pub auth_endpoint: Option<String>,
}

/// DoubleCloud provider.
pub struct DoubleCloudProvider {
    version: String,
    options: ClientOptions,
    client: OnceCell<ApiClient>,
    resources: Vec<Box<dyn Resource>>,
    data_sources: Vec<Box<dyn DataSource>>,
}

impl DoubleCloudProvider {
    /// Create an unconfigured provider reporting `version`.
    pub fn new(version: impl Into<String>) -> Self {
        let version = version.into();
        Self {
            options: ClientOptions::default().with_provider_version(&version),
            version,
            client: OnceCell::new(),
            resources: resources::all(),
            data_sources: data_sources::all(),
        }
    }

    /// Replace the client settings used by `Configure`.
    ///
    /// The `endpoint` and `auth_endpoint` attributes still override the URLs.
    pub fn with_client_options(mut self, options: ClientOptions) -> Self {
        self.options = options.with_provider_version(&self.version);
        self
    }

    /// Provider version.
    pub fn version(&self) -> &str {
        &self.version
    }

    fn provider_schema() -> Schema {
        Schema::v0()
            .with_description("DoubleCloud managed data platform")
            .with_attribute(
                "authorized_key",
                Attribute::optional_string()
                    .sensitive()
                    .with_description(
                        "Authorized key JSON. Falls back to the file named by DC_AUTHKEY",
                    ),
            )
            .with_attribute(
                "endpoint",
                Attribute::optional_string().with_description("API endpoint"),
            )
            .with_attribute(
                "auth_endpoint",
                Attribute::optional_string().with_description("Token exchange endpoint"),
            )
    }

    fn client(&self) -> Result<&ApiClient, ProviderError> {
        self.client.get().ok_or_else(|| {
            ProviderError::Configuration("provider is not configured".to_string())
        })
    }

    fn resource(&self, type_name: &str) -> Result<&dyn Resource, ProviderError> {
        self.resources
            .iter()
            .find(|r| r.type_name() == type_name)
            .map(|r| &**r)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    fn data_source(&self, type_name: &str) -> Result<&dyn DataSource, ProviderError> {
        self.data_sources
            .iter()
            .find(|d| d.type_name() == type_name)
            .map(|r| &**r)
            .ok_or_else(|| ProviderError::UnknownResource(type_name.to_string()))
    }

    fn build_client(&self, config: ProviderConfig) -> Result<ApiClient, Diagnostic> {
        let env_path = std::env::var(AUTHKEY_ENV).ok();
        let key = resolve_credentials(config.authorized_key.as_deref(), env_path.as_deref())
            .map_err(|e| Diagnostic::error("failed to use credentials").with_detail(e.to_string()))?;

        let mut options = self.options.clone();
        if let Some(endpoint) = config.endpoint.filter(|e| !e.is_empty()) {
            options = options.with_endpoint(endpoint);
        }
        if let Some(auth_endpoint) = config.auth_endpoint.filter(|e| !e.is_empty()) {
            options = options.with_auth_endpoint(auth_endpoint);
        }

        ApiClient::new(key, options)
            .map_err(|e| Diagnostic::error("failed to init client").with_detail(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ProviderService for DoubleCloudProvider {
    fn schema(&self) -> ProviderSchema {
        let schema = self.resources.iter().fold(
            ProviderSchema::new().with_provider_config(Self::provider_schema()),
            |schema, r| schema.with_resource(r.type_name(), r.schema()),
        );
        self.data_sources
            .iter()
            .fold(schema, |schema, d| schema.with_data_source(d.type_name(), d.schema()))
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(validation::validate(&Self::provider_schema(), &config))
    }

    #[instrument(skip_all, fields(version = %self.version))]
    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        if self.client.initialized() {
            warn!("Provider configured twice, keeping the first client");
            return Ok(vec![Diagnostic::warning("provider already configured")
                .with_detail("the first configuration stays in effect")]);
        }

        let config: ProviderConfig = if config.is_null() {
            ProviderConfig::default()
        } else {
            serde_json::from_value(config)?
        };

        let client = match self.build_client(config) {
            Ok(client) => client,
            Err(diagnostic) => return Ok(vec![diagnostic]),
        };
        if self.client.set(client).is_err() {
            return Ok(vec![Diagnostic::warning("provider already configured")]);
        }

        info!("Provider configured");
        Ok(vec![])
    }

    async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.resource(resource_type)?.validate(&config).into())
    }

    async fn plan(
        &self,
        resource_type: &str,
        prior_state: Option<Value>,
        proposed_state: Value,
        _config: Value,
    ) -> Result<PlanResult, ProviderError> {
        let schema = self.resource(resource_type)?.schema();
        let prior = prior_state.filter(|s| !s.is_null());
        Ok(plan_resource(&schema, prior.as_ref(), proposed_state))
    }

    async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.create(self.client()?, planned_state).await
    }

    async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.read(self.client()?, current_state).await
    }

    async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let resource = self.resource(resource_type)?;
        resource
            .update(self.client()?, prior_state, planned_state)
            .await
    }

    async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        let resource = self.resource(resource_type)?;
        resource.delete(self.client()?, current_state).await
    }

    async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        let resource = self.resource(resource_type)?;
        let state = resource.import(self.client()?, id).await?;
        Ok(vec![ImportedResource::new(resource_type, state)])
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        Ok(validation::validate(&data_source.schema(), &config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let data_source = self.data_source(data_source_type)?;
        data_source.read(self.client()?, config).await
    }
}
