//! Test harness for the provider.
//!
//! [`ProviderTester`] drives a [`ProviderService`] directly, without a gRPC
//! server, so integration tests can exercise the provider against a mock API.
//! [`acc`] layers HCL configurations and attribute checks on top of it and
//! [`sweep`] removes leftovers of acceptance runs.
//!
//! # Example
//!
//! ```ignore
//! use doublecloud_provider::testing::ProviderTester;
//! use doublecloud_provider::DoubleCloudProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn test_network() {
//!     let tester = ProviderTester::new(DoubleCloudProvider::new("test"));
//!     tester.configure(json!({"authorized_key": key})).await.unwrap();
//!
//!     let state = tester
//!         .lifecycle_create("doublecloud_network", json!({"name": "tf-acc-net"}))
//!         .await
//!         .unwrap();
//!     assert_eq!(state["name"], "tf-acc-net");
//! }
//! ```

pub mod acc;
pub mod sweep;

use serde_json::Value;

use crate::diag::Diagnostic;
use crate::error::ProviderError;
use crate::schema::{ProviderSchema, Schema};
use crate::server::ProviderService;
use crate::types::{ImportedResource, PlanResult};

/// Calls a [`ProviderService`] the way the host would.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Wrap a provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// The wrapped provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The provider's full schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Schema of one resource type.
    pub fn resource_schema(&self, resource_type: &str) -> Result<Schema, ProviderError> {
        self.provider
            .schema()
            .resources
            .remove(resource_type)
            .ok_or_else(|| ProviderError::UnknownResource(resource_type.to_string()))
    }

    /// Schema of one data source type.
    pub fn data_source_schema(&self, data_source_type: &str) -> Result<Schema, ProviderError> {
        self.provider
            .schema()
            .data_sources
            .remove(data_source_type)
            .ok_or_else(|| ProviderError::UnknownResource(data_source_type.to_string()))
    }

    /// Configure the provider, failing on error diagnostics.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a resource configuration, failing on error diagnostics.
    pub async fn validate_resource_config(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_resource_config(resource_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Plan creating a resource from `config`.
    pub async fn plan_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, None, config.clone(), config)
            .await
    }

    /// Plan moving `prior_state` to `config`.
    pub async fn plan_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), config.clone(), config)
            .await
    }

    /// Plan destroying a resource.
    pub async fn plan_delete(
        &self,
        resource_type: &str,
        prior_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        self.provider
            .plan(resource_type, Some(prior_state), Value::Null, Value::Null)
            .await
    }

    /// Create a resource from a planned state.
    pub async fn create(&self, resource_type: &str, planned_state: Value) -> Result<Value, ProviderError> {
        self.provider.create(resource_type, planned_state).await
    }

    /// Refresh a resource. Null means it is gone.
    pub async fn read(&self, resource_type: &str, current_state: Value) -> Result<Value, ProviderError> {
        self.provider.read(resource_type, current_state).await
    }

    /// Apply a planned update.
    pub async fn update(
        &self,
        resource_type: &str,
        prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .update(resource_type, prior_state, planned_state)
            .await
    }

    /// Delete a resource.
    pub async fn delete(&self, resource_type: &str, current_state: Value) -> Result<(), ProviderError> {
        self.provider.delete(resource_type, current_state).await
    }

    /// Import a resource by id.
    pub async fn import_resource(
        &self,
        resource_type: &str,
        id: &str,
    ) -> Result<Vec<ImportedResource>, ProviderError> {
        self.provider.import_resource(resource_type, id).await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider.read_data_source(data_source_type, config).await
    }

    /// Validate, plan, create, then read back.
    pub async fn lifecycle_create(
        &self,
        resource_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let plan = self.plan_create(resource_type, config).await?;
        let created = self.create(resource_type, plan.planned_state).await?;
        Ok(self.read(resource_type, created).await?)
    }

    /// Validate, plan, update, then read back.
    pub async fn lifecycle_update(
        &self,
        resource_type: &str,
        prior_state: Value,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_resource_config(resource_type, config.clone())
            .await?;
        let plan = self
            .plan_update(resource_type, prior_state.clone(), config)
            .await?;
        if plan.requires_replace {
            self.delete(resource_type, prior_state).await?;
            let created = self.create(resource_type, plan.planned_state).await?;
            return Ok(self.read(resource_type, created).await?);
        }
        let updated = self
            .update(resource_type, prior_state, plan.planned_state)
            .await?;
        Ok(self.read(resource_type, updated).await?)
    }

    /// Plan a destroy, then delete.
    pub async fn lifecycle_delete(
        &self,
        resource_type: &str,
        current_state: Value,
    ) -> Result<(), ProviderError> {
        self.plan_delete(resource_type, current_state.clone())
            .await?;
        self.delete(resource_type, current_state).await
    }
}

/// Failure of a test operation.
#[derive(Debug, thiserror::Error)]
pub enum TestError {
    /// The provider answered with error diagnostics.
    #[error("{}", render_diagnostics(.0))]
    Diagnostics(Vec<Diagnostic>),
    /// The provider call itself failed.
    #[error("provider error: {0}")]
    Provider(#[from] ProviderError),
}

fn render_diagnostics(diagnostics: &[Diagnostic]) -> String {
    let mut out = format!("{} error diagnostic(s):", diagnostics.len());
    for diagnostic in diagnostics {
        out.push_str("\n  ");
        out.push_str(&diagnostic.to_string());
    }
    out
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<Diagnostic> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

/// Assert that a plan changes `path`.
///
/// # Panics
///
/// Panics if no change has that path.
pub fn assert_plan_changes_attribute(plan: &PlanResult, path: &str) {
    assert!(
        plan.touches(path),
        "expected a change under '{}', changed: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that a plan leaves `path` alone.
///
/// # Panics
///
/// Panics if a change has that path.
pub fn assert_plan_does_not_change_attribute(plan: &PlanResult, path: &str) {
    assert!(
        !plan.touches(path),
        "expected '{}' to stay unchanged, changed: {:?}",
        path,
        plan.changes.iter().map(|c| &c.path).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain an error whose summary contains `substring`.
///
/// # Panics
///
/// Panics if there is no such error.
pub fn assert_error_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.summary.contains(substring)),
        "expected an error containing '{}', got: {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::DoubleCloudProvider;
    use serde_json::json;

    fn tester() -> ProviderTester<DoubleCloudProvider> {
        ProviderTester::new(DoubleCloudProvider::new("test"))
    }

    fn network_config() -> Value {
        json!({
            "project_id": "prj",
            "name": "tf-acc-net",
            "region_id": "eu-central-1",
            "cloud_type": "aws",
            "ipv4_cidr_block": "10.0.0.0/16"
        })
    }

    #[test]
    fn test_resource_schema_lookup() {
        let tester = tester();
        let schema = tester.resource_schema("doublecloud_network").unwrap();
        assert!(schema.block.attributes.contains_key("ipv4_cidr_block"));
        assert!(matches!(
            tester.resource_schema("doublecloud_bucket"),
            Err(ProviderError::UnknownResource(_))
        ));
        assert!(tester.data_source_schema("doublecloud_kafka").is_ok());
    }

    #[tokio::test]
    async fn test_plan_replace_on_region_change() {
        let tester = tester();
        let mut prior = network_config();
        prior["id"] = json!("net1");
        prior["ipv6_cidr_block"] = json!("2a05:d014::/56");
        prior["is_external"] = json!(false);

        let mut config = network_config();
        config["region_id"] = json!("eu-west-1");

        let plan = tester
            .plan_update("doublecloud_network", prior.clone(), config)
            .await
            .unwrap();
        assert!(plan.requires_replace);
        assert_plan_changes_attribute(&plan, "region_id");
        assert_plan_does_not_change_attribute(&plan, "id");

        let destroy = tester
            .plan_delete("doublecloud_network", prior)
            .await
            .unwrap();
        assert!(destroy.planned_state.is_null());
    }

    #[tokio::test]
    async fn test_lifecycle_create_reports_validation_errors() {
        let err = tester()
            .lifecycle_create("doublecloud_network", json!({"name": "tf-acc-net"}))
            .await
            .unwrap_err();
        match err {
            TestError::Diagnostics(diags) => assert!(!diags.is_empty()),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn test_configure_without_credentials() {
        let tester = tester();
        let diags = tester
            .provider()
            .configure(json!({"authorized_key": "{}"}))
            .await
            .unwrap();
        assert_error_contains(&diags, "failed to use credentials");
    }

    #[test]
    fn test_error_display() {
        let err = TestError::Diagnostics(vec![
            Diagnostic::error("unknown connection")
                .with_detail("required on_premise block")
                .with_attribute("settings.mysql_source.connection"),
            Diagnostic::error("invalid settings"),
        ]);

        let display = err.to_string();
        assert!(display.starts_with("2 error diagnostic(s):"));
        assert!(display.contains("required on_premise block"));
        assert!(display.contains("settings.mysql_source.connection"));
        assert!(display.contains("invalid settings"));
    }
}
