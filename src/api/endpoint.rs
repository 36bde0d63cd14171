//! `/transfer/v1/endpoints` service.
//!
//! Endpoint settings are a oneof: exactly one of the [`EndpointSettings`]
//! fields is set.

use serde::{Deserialize, Serialize};

use super::{int64, ApiClient, Empty, Operation};
use crate::error::ProviderError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Endpoint {
    pub id: String,
    pub project_id: String,
    pub name: String,
    pub description: String,
    pub settings: Option<EndpointSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EndpointSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_source: Option<MysqlSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mysql_target: Option<MysqlTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres_source: Option<PostgresSource>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postgres_target: Option<PostgresTarget>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clickhouse_target: Option<ClickhouseTarget>,
}

/// TLS oneof: `disabled {}` or `enabled { caCertificate }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsMode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<Empty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<TlsConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TlsConfig {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub ca_certificate: String,
}

/// Write-only secret. The API never returns its value.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Secret {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub raw: String,
}

impl Secret {
    pub fn raw(value: impl Into<String>) -> Self {
        Self { raw: value.into() }
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Connection oneof shared by the MySQL and PostgreSQL endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Connection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_premise: Option<OnPremise>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OnPremise {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_mode: Option<TlsMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MysqlSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_database: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_tables_regex: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_tables_regex: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_transfer_settings: Option<MysqlObjectTransferSettings>,
}

/// `OBJECT_TRANSFER_STAGE_*` per object kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MysqlObjectTransferSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub view: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub routine: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trigger: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tables: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MysqlTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sql_mode: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_constraint_checks: Option<bool>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub timezone: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cleanup_policy: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_database: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostgresSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include_tables: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub exclude_tables: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub slot_byte_lag_limit: Option<i64>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub service_schema: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_transfer_settings: Option<PostgresObjectTransferSettings>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostgresObjectTransferSettings {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub sequence: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub table: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub primary_key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub fk_constraint: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub index: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub view: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub function: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub trigger: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PostgresTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<Connection>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cleanup_policy: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ClickhouseConnection>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub clickhouse_cluster_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cleanup_policy: String,
}

/// ClickHouse connection: a managed cluster id or an on-premise shard list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseConnection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_premise: Option<ClickhouseOnPremise>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub database: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<Secret>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClickhouseOnPremise {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub shards: Vec<ClickhouseShard>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub http_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none", with = "int64")]
    pub native_port: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tls_mode: Option<TlsMode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClickhouseShard {
    pub name: String,
    pub hosts: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEndpointRequest {
    pub project_id: String,
    pub name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub settings: EndpointSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEndpointRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<EndpointSettings>,
}

/// Handle for the transfer endpoint service.
pub struct EndpointService<'a> {
    client: &'a ApiClient,
}

impl ApiClient {
    /// Transfer endpoint service.
    pub fn endpoints(&self) -> EndpointService<'_> {
        EndpointService { client: self }
    }
}

impl EndpointService<'_> {
    pub async fn get(&self, id: &str) -> Result<Endpoint, ProviderError> {
        self.client
            .get(&format!("/transfer/v1/endpoints/{}", id))
            .await
    }

    pub async fn list(&self, project_id: &str) -> Result<Vec<Endpoint>, ProviderError> {
        self.client
            .list_all("/transfer/v1/endpoints", project_id, "endpoints")
            .await
    }

    pub async fn create(&self, request: &CreateEndpointRequest) -> Result<Operation, ProviderError> {
        self.client.post("/transfer/v1/endpoints", request).await
    }

    pub async fn update(
        &self,
        id: &str,
        request: &UpdateEndpointRequest,
    ) -> Result<Operation, ProviderError> {
        self.client
            .patch(&format!("/transfer/v1/endpoints/{}", id), request)
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<Operation, ProviderError> {
        self.client
            .delete(&format!("/transfer/v1/endpoints/{}", id))
            .await
    }
}
