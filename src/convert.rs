//! Conversions shared by several resources.
//!
//! Model structs hold `Option` fields mirroring the schema; API structs use
//! empty strings and vectors for "unset". The helpers here translate between
//! the two and check enum-valued strings.

use serde::{Deserialize, Serialize};

use crate::api::endpoint::{TlsConfig, TlsMode};
use crate::api::Empty;
use crate::diag::Diagnostic;
use crate::schema::{Attribute, Block, NestedBlock};

/// `CLEANUP_POLICY_*` names accepted by target endpoints.
pub const CLEANUP_POLICIES: &[&str] = &[
    "CLEANUP_POLICY_UNSPECIFIED",
    "CLEANUP_POLICY_DISABLED",
    "CLEANUP_POLICY_DROP",
    "CLEANUP_POLICY_TRUNCATE",
];

/// `OBJECT_TRANSFER_STAGE_*` names for schema object transfer settings.
pub const OBJECT_TRANSFER_STAGES: &[&str] = &[
    "OBJECT_TRANSFER_STAGE_UNSPECIFIED",
    "OBJECT_TRANSFER_BEFORE_DATA",
    "OBJECT_TRANSFER_AFTER_DATA",
    "OBJECT_TRANSFER_NEVER",
];

/// ClickHouse server log levels.
pub const LOG_LEVELS: &[&str] = &[
    "LOG_LEVEL_UNSPECIFIED",
    "LOG_LEVEL_TRACE",
    "LOG_LEVEL_DEBUG",
    "LOG_LEVEL_INFORMATION",
    "LOG_LEVEL_WARNING",
    "LOG_LEVEL_ERROR",
];

/// Transfer types.
pub const TRANSFER_TYPES: &[&str] = &["SNAPSHOT_ONLY", "INCREMENT_ONLY", "SNAPSHOT_AND_INCREMENT"];

/// Model list → API list. `None` becomes empty.
pub fn string_list(values: &Option<Vec<String>>) -> Vec<String> {
    values.clone().unwrap_or_default()
}

/// API list → model list. Empty becomes `None`.
pub fn to_string_list(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Like [`to_string_list`], but a configured empty list stays empty
/// instead of reading back as unset.
pub fn refresh_string_list(
    prior: &Option<Vec<String>>,
    values: Vec<String>,
) -> Option<Vec<String>> {
    match prior {
        Some(prior) if prior.is_empty() && values.is_empty() => Some(Vec::new()),
        _ => to_string_list(values),
    }
}

/// Model string → API string. `None` becomes empty.
pub fn string_or_empty(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// API string → model string. Empty becomes `None`.
pub fn non_empty(value: impl Into<String>) -> Option<String> {
    let value = value.into();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Look up an enum name, producing a diagnostic for unknown names.
pub fn parse_enum(value: &str, names: &[&str], attribute: &str) -> Result<String, Diagnostic> {
    if names.contains(&value) {
        return Ok(value.to_string());
    }
    Err(Diagnostic::error(format!("unknown {}", attribute))
        .with_detail(format!(
            "{:?} is not one of: {}",
            value,
            names.join(", ")
        ))
        .with_attribute(attribute))
}

/// Optional enum attribute → API string, collecting a diagnostic on failure.
pub fn enum_or_empty(
    value: &Option<String>,
    names: &[&str],
    attribute: &str,
    diags: &mut crate::diag::Diagnostics,
) -> String {
    match value.as_deref() {
        None | Some("") => String::new(),
        Some(v) => match parse_enum(v, names, attribute) {
            Ok(v) => v,
            Err(diag) => {
                diags.push(diag);
                String::new()
            }
        },
    }
}

/// `tls_mode` block. Present means TLS is enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TlsModeModel {
    /// PEM certificate of the CA that signed the server certificate.
    pub ca_certificate: Option<String>,
}

/// TLS block → API oneof. No block means TLS is disabled.
pub fn tls_mode(model: Option<&TlsModeModel>) -> TlsMode {
    match model {
        Some(model) => TlsMode {
            disabled: None,
            enabled: Some(TlsConfig {
                ca_certificate: string_or_empty(&model.ca_certificate),
            }),
        },
        None => TlsMode {
            disabled: Some(Empty {}),
            enabled: None,
        },
    }
}

/// API oneof → TLS block. Disabled (or unset) yields no block.
pub fn parse_tls_mode(mode: Option<&TlsMode>) -> Option<TlsModeModel> {
    let enabled = mode?.enabled.as_ref()?;
    Some(TlsModeModel {
        ca_certificate: non_empty(enabled.ca_certificate.clone()),
    })
}

/// Schema of the `tls_mode` block.
pub fn tls_mode_block() -> NestedBlock {
    NestedBlock::single(
        Block::new()
            .with_description("Enable TLS. Omit the block to connect without TLS")
            .with_attribute(
                "ca_certificate",
                Attribute::optional_string()
                    .with_description("CA certificate in PEM format"),
            ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_lists() {
        assert!(string_list(&None).is_empty());
        assert_eq!(
            string_list(&Some(vec!["a".to_string()])),
            vec!["a".to_string()]
        );
        assert_eq!(to_string_list(vec![]), None);
        assert_eq!(refresh_string_list(&Some(vec![]), vec![]), Some(vec![]));
        assert_eq!(refresh_string_list(&None, vec![]), None);
        assert_eq!(
            refresh_string_list(&Some(vec![]), vec!["orders_.*".to_string()]),
            Some(vec!["orders_.*".to_string()])
        );
        assert_eq!(
            to_string_list(vec!["h1".to_string(), "h2".to_string()]),
            Some(vec!["h1".to_string(), "h2".to_string()])
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(""), None);
        assert_eq!(non_empty("UTC"), Some("UTC".to_string()));
        assert_eq!(string_or_empty(&None), "");
    }

    #[test]
    fn test_parse_enum() {
        assert_eq!(
            parse_enum("CLEANUP_POLICY_DROP", CLEANUP_POLICIES, "cleanup_policy").unwrap(),
            "CLEANUP_POLICY_DROP"
        );

        let diag = parse_enum("DROP", CLEANUP_POLICIES, "cleanup_policy").unwrap_err();
        assert!(diag.is_error());
        assert_eq!(diag.summary, "unknown cleanup_policy");
        assert_eq!(diag.attribute.as_deref(), Some("cleanup_policy"));
    }

    #[test]
    fn test_enum_or_empty_collects() {
        let mut diags = crate::diag::Diagnostics::new();
        assert_eq!(
            enum_or_empty(&None, LOG_LEVELS, "log_level", &mut diags),
            ""
        );
        assert_eq!(
            enum_or_empty(
                &Some("LOG_LEVEL_TRACE".to_string()),
                LOG_LEVELS,
                "log_level",
                &mut diags
            ),
            "LOG_LEVEL_TRACE"
        );
        assert!(!diags.has_error());

        enum_or_empty(&Some("verbose".to_string()), LOG_LEVELS, "log_level", &mut diags);
        assert!(diags.has_error());
    }

    #[test]
    fn test_tls_mode_mapping() {
        let disabled = tls_mode(None);
        assert!(disabled.disabled.is_some());
        assert_eq!(parse_tls_mode(Some(&disabled)), None);

        let model = TlsModeModel {
            ca_certificate: Some("-----BEGIN CERTIFICATE-----".to_string()),
        };
        let enabled = tls_mode(Some(&model));
        assert!(enabled.disabled.is_none());
        assert_eq!(parse_tls_mode(Some(&enabled)), Some(model));

        let no_ca = tls_mode(Some(&TlsModeModel::default()));
        assert_eq!(
            parse_tls_mode(Some(&no_ca)),
            Some(TlsModeModel {
                ca_certificate: None
            })
        );
        assert_eq!(parse_tls_mode(None), None);
    }
}
