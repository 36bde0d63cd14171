//! ClickHouse target settings.

use serde::{Deserialize, Serialize};

use super::{computed_enum, optional_computed_string, password_attribute};
use crate::api::endpoint::{
    ClickhouseConnection, ClickhouseOnPremise, ClickhouseShard, ClickhouseTarget, Secret,
};
use crate::convert::{
    enum_or_empty, non_empty, parse_tls_mode, string_list, string_or_empty, tls_mode,
    tls_mode_block, to_string_list, TlsModeModel, CLEANUP_POLICIES,
};
use crate::diag::{Diagnostic, Diagnostics};
use crate::schema::{Attribute, Block, NestedBlock};

const TARGET_PATH: &str = "settings.clickhouse_target";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ClickhouseTargetModel {
    pub connection: Option<ConnectionModel>,
    pub clickhouse_cluster_name: Option<String>,
    pub cleanup_policy: Option<String>,
}

/// Either a managed `cluster_id` or an `on_premise` shard list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ConnectionModel {
    pub cluster_id: Option<String>,
    pub on_premise: Option<OnPremiseModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct OnPremiseModel {
    pub shard: Option<Vec<ShardModel>>,
    pub http_port: Option<i64>,
    pub native_port: Option<i64>,
    pub tls_mode: Option<TlsModeModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ShardModel {
    pub name: Option<String>,
    pub hosts: Option<Vec<String>>,
}

impl ConnectionModel {
    fn convert(&self, diags: &mut Diagnostics) -> ClickhouseConnection {
        let cluster_id = self.cluster_id.clone().filter(|id| !id.is_empty());
        if cluster_id.is_some() == self.on_premise.is_some() {
            diags.push(
                Diagnostic::error("unknown connection")
                    .with_detail("exactly one of cluster_id or on_premise is required")
                    .with_attribute(format!("{}.connection", TARGET_PATH)),
            );
        }

        ClickhouseConnection {
            cluster_id,
            on_premise: self.on_premise.as_ref().map(|on_premise| ClickhouseOnPremise {
                shards: on_premise
                    .shard
                    .iter()
                    .flatten()
                    .map(|shard| ClickhouseShard {
                        name: string_or_empty(&shard.name),
                        hosts: string_list(&shard.hosts),
                    })
                    .collect(),
                http_port: on_premise.http_port,
                native_port: on_premise.native_port,
                tls_mode: Some(tls_mode(on_premise.tls_mode.as_ref())),
            }),
            database: string_or_empty(&self.database),
            user: string_or_empty(&self.user),
            password: self.password.as_ref().map(Secret::raw),
        }
    }

    fn parse(&mut self, connection: ClickhouseConnection) {
        self.cluster_id = connection.cluster_id.and_then(non_empty);
        self.on_premise = connection.on_premise.map(|on_premise| {
            let shards: Vec<ShardModel> = on_premise
                .shards
                .into_iter()
                .map(|shard| ShardModel {
                    name: non_empty(shard.name),
                    hosts: to_string_list(shard.hosts),
                })
                .collect();
            OnPremiseModel {
                shard: (!shards.is_empty()).then_some(shards),
                http_port: on_premise.http_port,
                native_port: on_premise.native_port,
                tls_mode: parse_tls_mode(on_premise.tls_mode.as_ref()),
            }
        });
        self.database = non_empty(connection.database);
        self.user = non_empty(connection.user);
    }
}

impl ClickhouseTargetModel {
    pub fn convert(&self, diags: &mut Diagnostics) -> ClickhouseTarget {
        let connection = match &self.connection {
            Some(connection) => Some(connection.convert(diags)),
            None => {
                diags.push(
                    Diagnostic::error("unknown connection")
                        .with_detail("required connection block")
                        .with_attribute(format!("{}.connection", TARGET_PATH)),
                );
                None
            }
        };

        ClickhouseTarget {
            connection,
            clickhouse_cluster_name: string_or_empty(&self.clickhouse_cluster_name),
            cleanup_policy: enum_or_empty(
                &self.cleanup_policy,
                CLEANUP_POLICIES,
                &format!("{}.cleanup_policy", TARGET_PATH),
                diags,
            ),
        }
    }

    pub fn parse(&mut self, target: ClickhouseTarget) {
        self.connection = target.connection.map(|api| {
            let mut connection = self.connection.take().unwrap_or_default();
            connection.parse(api);
            connection
        });
        self.clickhouse_cluster_name = non_empty(target.clickhouse_cluster_name);
        self.cleanup_policy = non_empty(target.cleanup_policy);
    }
}

pub(super) fn target_block() -> NestedBlock {
    let shard = Block::new()
        .with_attribute("name", Attribute::required_string())
        .with_attribute("hosts", Attribute::optional_string_list());

    let on_premise = Block::new()
        .with_description("Self-managed ClickHouse")
        .with_attribute("http_port", Attribute::optional_int64())
        .with_attribute("native_port", Attribute::optional_int64())
        .with_block("shard", NestedBlock::list(shard).with_min_items(1))
        .with_block("tls_mode", tls_mode_block());

    let connection = Block::new()
        .with_attribute(
            "cluster_id",
            Attribute::optional_string().with_description("Managed ClickHouse cluster ID"),
        )
        .with_block("on_premise", NestedBlock::single(on_premise))
        .with_attribute("database", Attribute::required_string())
        .with_attribute("user", Attribute::required_string())
        .with_attribute("password", password_attribute());

    NestedBlock::single(
        Block::new()
            .with_description("ClickHouse target")
            .with_block("connection", NestedBlock::single(connection).with_min_items(1))
            .with_attribute("clickhouse_cluster_name", optional_computed_string())
            .with_attribute("cleanup_policy", computed_enum(CLEANUP_POLICIES)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn managed(cluster_id: Option<&str>) -> ClickhouseTargetModel {
        ClickhouseTargetModel {
            connection: Some(ConnectionModel {
                cluster_id: cluster_id.map(str::to_string),
                database: Some("default".to_string()),
                user: Some("admin".to_string()),
                password: Some("secret".to_string()),
                ..Default::default()
            }),
            cleanup_policy: Some("CLEANUP_POLICY_DROP".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_exactly_one_address() {
        let mut diags = Diagnostics::new();
        managed(Some("chc1")).convert(&mut diags);
        assert!(diags.is_empty());

        managed(None).convert(&mut diags);
        assert_eq!(diags.len(), 1);

        let mut both = managed(Some("chc1"));
        if let Some(connection) = both.connection.as_mut() {
            connection.on_premise = Some(OnPremiseModel::default());
        }
        let mut diags = Diagnostics::new();
        both.convert(&mut diags);
        assert_eq!(diags.iter().next().unwrap().summary, "unknown connection");
    }

    #[test]
    fn test_parse_keeps_write_only_password() {
        let model = ClickhouseTargetModel {
            connection: Some(ConnectionModel {
                on_premise: Some(OnPremiseModel {
                    shard: Some(vec![ShardModel {
                        name: Some("s1".to_string()),
                        hosts: Some(vec!["ch1.internal".to_string(), "ch2.internal".to_string()]),
                    }]),
                    http_port: Some(8443),
                    native_port: Some(9440),
                    tls_mode: Some(TlsModeModel::default()),
                }),
                database: Some("default".to_string()),
                user: Some("admin".to_string()),
                password: Some("secret".to_string()),
                ..Default::default()
            }),
            clickhouse_cluster_name: Some("company_cluster".to_string()),
            cleanup_policy: Some("CLEANUP_POLICY_DROP".to_string()),
        };

        let mut diags = Diagnostics::new();
        let mut api = model.convert(&mut diags);
        assert!(diags.is_empty());
        if let Some(connection) = api.connection.as_mut() {
            connection.password = None;
        }

        let mut parsed = model.clone();
        parsed.parse(api);
        assert_eq!(parsed, model);
    }
}
