//! PostgreSQL source and target settings.

use serde::{Deserialize, Serialize};

use super::{
    computed_enum, connection_block, convert_connection, optional_computed_string,
    parse_connection, password_attribute, ConnectionModel,
};
use crate::api::endpoint::{PostgresObjectTransferSettings, PostgresSource, PostgresTarget, Secret};
use crate::convert::{
    enum_or_empty, non_empty, string_list, string_or_empty, to_string_list, CLEANUP_POLICIES,
    OBJECT_TRANSFER_STAGES,
};
use crate::diag::Diagnostics;
use crate::schema::{Attribute, Block, NestedBlock};

const SOURCE_PATH: &str = "settings.postgres_source";
const TARGET_PATH: &str = "settings.postgres_target";

/// Object kinds with a configurable transfer stage.
const OBJECT_KINDS: &[&str] = &[
    "sequence",
    "table",
    "primary_key",
    "fk_constraint",
    "index",
    "view",
    "function",
    "trigger",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PostgresSourceModel {
    pub connection: Option<ConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub include_tables: Option<Vec<String>>,
    pub exclude_tables: Option<Vec<String>>,
    pub slot_byte_lag_limit: Option<i64>,
    pub service_schema: Option<String>,
    pub object_transfer_settings: Option<ObjectTransferSettingsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ObjectTransferSettingsModel {
    pub sequence: Option<String>,
    pub table: Option<String>,
    pub primary_key: Option<String>,
    pub fk_constraint: Option<String>,
    pub index: Option<String>,
    pub view: Option<String>,
    pub function: Option<String>,
    pub trigger: Option<String>,
}

impl ObjectTransferSettingsModel {
    fn convert(&self, diags: &mut Diagnostics) -> PostgresObjectTransferSettings {
        let mut stage = |value: &Option<String>, name: &str| {
            enum_or_empty(
                value,
                OBJECT_TRANSFER_STAGES,
                &format!("{}.object_transfer_settings.{}", SOURCE_PATH, name),
                diags,
            )
        };
        PostgresObjectTransferSettings {
            sequence: stage(&self.sequence, "sequence"),
            table: stage(&self.table, "table"),
            primary_key: stage(&self.primary_key, "primary_key"),
            fk_constraint: stage(&self.fk_constraint, "fk_constraint"),
            index: stage(&self.index, "index"),
            view: stage(&self.view, "view"),
            function: stage(&self.function, "function"),
            trigger: stage(&self.trigger, "trigger"),
        }
    }

    fn parse(settings: PostgresObjectTransferSettings) -> Option<Self> {
        let model = Self {
            sequence: non_empty(settings.sequence),
            table: non_empty(settings.table),
            primary_key: non_empty(settings.primary_key),
            fk_constraint: non_empty(settings.fk_constraint),
            index: non_empty(settings.index),
            view: non_empty(settings.view),
            function: non_empty(settings.function),
            trigger: non_empty(settings.trigger),
        };
        (model != Self::default()).then_some(model)
    }
}

impl PostgresSourceModel {
    pub fn convert(&self, diags: &mut Diagnostics) -> PostgresSource {
        PostgresSource {
            connection: convert_connection(self.connection.as_ref(), SOURCE_PATH, diags),
            database: string_or_empty(&self.database),
            user: string_or_empty(&self.user),
            password: self.password.as_ref().map(Secret::raw),
            include_tables: string_list(&self.include_tables),
            exclude_tables: string_list(&self.exclude_tables),
            slot_byte_lag_limit: self.slot_byte_lag_limit,
            service_schema: string_or_empty(&self.service_schema),
            object_transfer_settings: self
                .object_transfer_settings
                .as_ref()
                .map(|s| s.convert(diags)),
        }
    }

    pub fn parse(&mut self, source: PostgresSource) {
        self.connection = parse_connection(source.connection);
        self.database = non_empty(source.database);
        self.user = non_empty(source.user);
        self.include_tables = to_string_list(source.include_tables);
        self.exclude_tables = to_string_list(source.exclude_tables);
        self.slot_byte_lag_limit = source.slot_byte_lag_limit;
        self.service_schema = non_empty(source.service_schema);
        self.object_transfer_settings = source
            .object_transfer_settings
            .and_then(ObjectTransferSettingsModel::parse);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct PostgresTargetModel {
    pub connection: Option<ConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub cleanup_policy: Option<String>,
}

impl PostgresTargetModel {
    pub fn convert(&self, diags: &mut Diagnostics) -> PostgresTarget {
        PostgresTarget {
            connection: convert_connection(self.connection.as_ref(), TARGET_PATH, diags),
            database: string_or_empty(&self.database),
            user: string_or_empty(&self.user),
            password: self.password.as_ref().map(Secret::raw),
            cleanup_policy: enum_or_empty(
                &self.cleanup_policy,
                CLEANUP_POLICIES,
                &format!("{}.cleanup_policy", TARGET_PATH),
                diags,
            ),
        }
    }

    pub fn parse(&mut self, target: PostgresTarget) {
        self.connection = parse_connection(target.connection);
        self.database = non_empty(target.database);
        self.user = non_empty(target.user);
        self.cleanup_policy = non_empty(target.cleanup_policy);
    }
}

pub(super) fn source_block() -> NestedBlock {
    let object_transfer_settings = OBJECT_KINDS.iter().fold(
        Block::new().with_description("When to transfer schema objects relative to the data"),
        |block, kind| block.with_attribute(*kind, computed_enum(OBJECT_TRANSFER_STAGES)),
    );

    NestedBlock::single(
        Block::new()
            .with_description("PostgreSQL source")
            .with_block("connection", connection_block("Port, 5432 by default"))
            .with_attribute("database", Attribute::required_string())
            .with_attribute("user", Attribute::required_string())
            .with_attribute("password", password_attribute())
            .with_attribute("include_tables", Attribute::optional_string_list())
            .with_attribute("exclude_tables", Attribute::optional_string_list())
            .with_attribute(
                "slot_byte_lag_limit",
                Attribute::optional_computed_int64()
                    .use_state_for_unknown()
                    .with_description("Maximum WAL lag of the replication slot in bytes"),
            )
            .with_attribute(
                "service_schema",
                optional_computed_string().with_description("Schema for service tables"),
            )
            .with_block(
                "object_transfer_settings",
                NestedBlock::single(object_transfer_settings),
            ),
    )
}

pub(super) fn target_block() -> NestedBlock {
    NestedBlock::single(
        Block::new()
            .with_description("PostgreSQL target")
            .with_block("connection", connection_block("Port, 5432 by default"))
            .with_attribute("database", Attribute::required_string())
            .with_attribute("user", Attribute::required_string())
            .with_attribute("password", password_attribute())
            .with_attribute("cleanup_policy", computed_enum(CLEANUP_POLICIES)),
    )
}
