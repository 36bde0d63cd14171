//! Typed client for the DoubleCloud REST API.
//!
//! [`ApiClient`] owns the HTTP connection pool and the IAM token cache. Each
//! service is reached through a borrowed handle (`client.clickhouse()`,
//! `client.transfers()`, ...) whose methods map one-to-one onto REST calls.
//! Mutating calls return an [`Operation`] that is awaited with
//! [`ApiClient::wait`].

pub mod auth;
pub mod client;
pub mod operation;

// Wire types mirror the REST API field for field.
#[allow(missing_docs)]
pub mod clickhouse;
#[allow(missing_docs)]
pub mod endpoint;
#[allow(missing_docs)]
pub mod kafka;
#[allow(missing_docs)]
pub mod network;
#[allow(missing_docs)]
pub mod transfer;
#[allow(missing_docs)]
pub mod visualization;

pub use auth::{resolve_credentials, AuthorizedKey, IamTokenSource};
pub use client::{ApiClient, ClientOptions, DEFAULT_AUTH_ENDPOINT, DEFAULT_ENDPOINT};
pub use operation::{Operation, OperationError};

/// Serde adapter for int64 fields, which the API encodes as JSON strings.
///
/// Serializes `Some(n)` as `"n"` and accepts either a string or a number.
pub(crate) mod int64 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_str(&v.to_string()),
            None => serializer.serialize_none(),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(i64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Repr::Number(n)) => Ok(Some(n)),
            Some(Repr::Text(s)) if s.is_empty() => Ok(None),
            Some(Repr::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

/// `{}` message used by oneof variants without fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Empty {}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Disk {
        #[serde(default, skip_serializing_if = "Option::is_none", with = "super::int64")]
        disk_size: Option<i64>,
    }

    #[test]
    fn test_int64_as_string() {
        let value = serde_json::to_value(Disk {
            disk_size: Some(34359738368),
        })
        .unwrap();
        assert_eq!(value, json!({"disk_size": "34359738368"}));
    }

    #[test]
    fn test_int64_accepts_both_forms() {
        let from_text: Disk = serde_json::from_value(json!({"disk_size": "51539607552"})).unwrap();
        let from_number: Disk = serde_json::from_value(json!({"disk_size": 51539607552_i64})).unwrap();
        assert_eq!(from_text, from_number);

        let missing: Disk = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.disk_size, None);

        assert!(serde_json::from_value::<Disk>(json!({"disk_size": "big"})).is_err());
    }
}
