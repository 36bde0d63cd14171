//! MySQL source and target settings.

use serde::{Deserialize, Serialize};

use super::{
    computed_enum, connection_block, convert_connection, optional_computed_string,
    parse_connection, password_attribute, ConnectionModel,
};
use crate::api::endpoint::{MysqlObjectTransferSettings, MysqlSource, MysqlTarget, Secret};
use crate::convert::{
    enum_or_empty, non_empty, refresh_string_list, string_list, string_or_empty,
    CLEANUP_POLICIES, OBJECT_TRANSFER_STAGES,
};
use crate::diag::Diagnostics;
use crate::schema::{Attribute, Block, NestedBlock};

const SOURCE_PATH: &str = "settings.mysql_source";
const TARGET_PATH: &str = "settings.mysql_target";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MysqlSourceModel {
    pub connection: Option<ConnectionModel>,
    pub database: Option<String>,
    pub service_database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub include_tables_regex: Option<Vec<String>>,
    pub exclude_tables_regex: Option<Vec<String>>,
    pub timezone: Option<String>,
    pub object_transfer_settings: Option<ObjectTransferSettingsModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct ObjectTransferSettingsModel {
    pub view: Option<String>,
    pub routine: Option<String>,
    pub trigger: Option<String>,
    pub tables: Option<String>,
}

impl ObjectTransferSettingsModel {
    fn convert(&self, diags: &mut Diagnostics) -> MysqlObjectTransferSettings {
        let stage = |value: &Option<String>, name: &str, diags: &mut Diagnostics| {
            enum_or_empty(
                value,
                OBJECT_TRANSFER_STAGES,
                &format!("{}.object_transfer_settings.{}", SOURCE_PATH, name),
                diags,
            )
        };
        MysqlObjectTransferSettings {
            view: stage(&self.view, "view", diags),
            routine: stage(&self.routine, "routine", diags),
            trigger: stage(&self.trigger, "trigger", diags),
            tables: stage(&self.tables, "tables", diags),
        }
    }

    fn parse(settings: MysqlObjectTransferSettings) -> Option<Self> {
        let model = Self {
            view: non_empty(settings.view),
            routine: non_empty(settings.routine),
            trigger: non_empty(settings.trigger),
            tables: non_empty(settings.tables),
        };
        (model != Self::default()).then_some(model)
    }
}

fn secret(password: &Option<String>) -> Option<Secret> {
    password.as_ref().map(Secret::raw)
}

impl MysqlSourceModel {
    pub fn convert(&self, diags: &mut Diagnostics) -> MysqlSource {
        MysqlSource {
            connection: convert_connection(self.connection.as_ref(), SOURCE_PATH, diags),
            database: string_or_empty(&self.database),
            service_database: string_or_empty(&self.service_database),
            user: string_or_empty(&self.user),
            password: secret(&self.password),
            include_tables_regex: string_list(&self.include_tables_regex),
            exclude_tables_regex: string_list(&self.exclude_tables_regex),
            timezone: string_or_empty(&self.timezone),
            object_transfer_settings: self
                .object_transfer_settings
                .as_ref()
                .map(|s| s.convert(diags)),
        }
    }

    /// Every field is taken from the response except the write-only password.
    /// Table filters configured as `[]` stay `[]`.
    pub fn parse(&mut self, source: MysqlSource) {
        self.connection = parse_connection(source.connection);
        self.database = non_empty(source.database);
        self.service_database = non_empty(source.service_database);
        self.user = non_empty(source.user);
        self.include_tables_regex =
            refresh_string_list(&self.include_tables_regex, source.include_tables_regex);
        self.exclude_tables_regex =
            refresh_string_list(&self.exclude_tables_regex, source.exclude_tables_regex);
        self.timezone = non_empty(source.timezone);
        self.object_transfer_settings = source
            .object_transfer_settings
            .and_then(ObjectTransferSettingsModel::parse);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct MysqlTargetModel {
    pub connection: Option<ConnectionModel>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub sql_mode: Option<String>,
    pub skip_constraint_checks: Option<bool>,
    pub timezone: Option<String>,
    pub cleanup_policy: Option<String>,
    pub service_database: Option<String>,
}

impl MysqlTargetModel {
    pub fn convert(&self, diags: &mut Diagnostics) -> MysqlTarget {
        MysqlTarget {
            connection: convert_connection(self.connection.as_ref(), TARGET_PATH, diags),
            database: string_or_empty(&self.database),
            user: string_or_empty(&self.user),
            password: secret(&self.password),
            sql_mode: string_or_empty(&self.sql_mode),
            skip_constraint_checks: self.skip_constraint_checks,
            timezone: string_or_empty(&self.timezone),
            cleanup_policy: enum_or_empty(
                &self.cleanup_policy,
                CLEANUP_POLICIES,
                &format!("{}.cleanup_policy", TARGET_PATH),
                diags,
            ),
            service_database: string_or_empty(&self.service_database),
        }
    }

    pub fn parse(&mut self, target: MysqlTarget) {
        self.connection = parse_connection(target.connection);
        self.database = non_empty(target.database);
        self.user = non_empty(target.user);
        self.sql_mode = non_empty(target.sql_mode);
        self.skip_constraint_checks = target.skip_constraint_checks;
        self.timezone = non_empty(target.timezone);
        self.cleanup_policy = non_empty(target.cleanup_policy);
        self.service_database = non_empty(target.service_database);
    }
}

pub(super) fn source_block() -> NestedBlock {
    let object_transfer_settings = Block::new()
        .with_description("When to transfer schema objects relative to the data")
        .with_attribute("view", computed_enum(OBJECT_TRANSFER_STAGES))
        .with_attribute("routine", computed_enum(OBJECT_TRANSFER_STAGES))
        .with_attribute("trigger", computed_enum(OBJECT_TRANSFER_STAGES))
        .with_attribute("tables", computed_enum(OBJECT_TRANSFER_STAGES));

    NestedBlock::single(
        Block::new()
            .with_description("MySQL source")
            .with_block("connection", connection_block("Port, 3306 by default"))
            .with_attribute("database", Attribute::optional_string())
            .with_attribute(
                "service_database",
                optional_computed_string()
                    .with_description("Database for service tables"),
            )
            .with_attribute("user", Attribute::optional_string())
            .with_attribute("password", password_attribute())
            .with_attribute("include_tables_regex", Attribute::optional_string_list())
            .with_attribute("exclude_tables_regex", Attribute::optional_string_list())
            .with_attribute(
                "timezone",
                optional_computed_string().with_description("Server timezone, e.g. `UTC`"),
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
            .with_description("MySQL target")
            .with_block("connection", connection_block("Port, 3306 by default"))
            .with_attribute("database", Attribute::optional_string())
            .with_attribute("user", Attribute::optional_string())
            .with_attribute("password", password_attribute())
            .with_attribute("sql_mode", optional_computed_string())
            .with_attribute(
                "skip_constraint_checks",
                Attribute::optional_computed_bool().use_state_for_unknown(),
            )
            .with_attribute("timezone", optional_computed_string())
            .with_attribute("cleanup_policy", computed_enum(CLEANUP_POLICIES))
            .with_attribute("service_database", optional_computed_string()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::endpoint::{Connection, OnPremise};
    use crate::resources::transfer_endpoint::OnPremiseModel;

    fn on_premise(host: &str) -> ConnectionModel {
        ConnectionModel {
            on_premise: Some(OnPremiseModel {
                hosts: Some(vec![host.to_string()]),
                port: Some(3306),
                tls_mode: None,
            }),
        }
    }

    #[test]
    fn test_source_parse_overwrites_from_response() {
        let mut model = MysqlSourceModel {
            connection: Some(on_premise("old.internal")),
            database: Some("shop".to_string()),
            user: Some("replicator".to_string()),
            password: Some("hunter2".to_string()),
            timezone: Some("Europe/Berlin".to_string()),
            ..Default::default()
        };

        model.parse(MysqlSource {
            connection: Some(Connection {
                on_premise: Some(OnPremise {
                    hosts: vec!["new.internal".to_string()],
                    port: Some(3306),
                    tls_mode: None,
                }),
            }),
            database: "shop".to_string(),
            service_database: "__dc_service".to_string(),
            user: "replicator".to_string(),
            timezone: "UTC".to_string(),
            ..Default::default()
        });

        assert_eq!(model.connection, Some(on_premise("new.internal")));
        assert_eq!(model.timezone.as_deref(), Some("UTC"));
        assert_eq!(model.service_database.as_deref(), Some("__dc_service"));
        assert_eq!(model.password.as_deref(), Some("hunter2"));
        assert_eq!(model.object_transfer_settings, None);
    }

    #[test]
    fn test_configured_empty_filters_read_back_empty() {
        let mut model = MysqlSourceModel {
            include_tables_regex: Some(vec![]),
            ..Default::default()
        };
        model.parse(MysqlSource::default());
        assert_eq!(model.include_tables_regex, Some(vec![]));
        assert_eq!(model.exclude_tables_regex, None);
    }

    #[test]
    fn test_target_convert_checks_cleanup_policy() {
        let model = MysqlTargetModel {
            connection: Some(on_premise("mysql.internal")),
            database: Some("dwh".to_string()),
            user: Some("loader".to_string()),
            password: Some("secret".to_string()),
            cleanup_policy: Some("CLEANUP_POLICY_TRUNCATE".to_string()),
            skip_constraint_checks: Some(true),
            ..Default::default()
        };
        let mut diags = Diagnostics::new();
        let target = model.convert(&mut diags);
        assert!(diags.is_empty());
        assert_eq!(target.cleanup_policy, "CLEANUP_POLICY_TRUNCATE");
        assert_eq!(target.password, Some(Secret::raw("secret")));

        let bad = MysqlTargetModel {
            cleanup_policy: Some("TRUNCATE".to_string()),
            ..model
        };
        bad.convert(&mut diags);
        assert_eq!(
            diags.iter().next().unwrap().attribute.as_deref(),
            Some("settings.mysql_target.cleanup_policy")
        );
    }

    #[test]
    fn test_object_transfer_settings() {
        let settings = ObjectTransferSettingsModel {
            view: Some("OBJECT_TRANSFER_AFTER_DATA".to_string()),
            routine: Some("OBJECT_TRANSFER_NEVER".to_string()),
            ..Default::default()
        };
        let mut diags = Diagnostics::new();
        let api = settings.convert(&mut diags);
        assert!(diags.is_empty());
        assert_eq!(api.tables, "");
        assert_eq!(ObjectTransferSettingsModel::parse(api), Some(settings));
        assert_eq!(
            ObjectTransferSettingsModel::parse(MysqlObjectTransferSettings::default()),
            None
        );
    }
}
