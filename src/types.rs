//! Values passed between [`ProviderService`](crate::ProviderService) and the
//! protocol server: plan results, imported objects and metadata.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::generated as pb;

/// Protocol version announced in the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// First field of the handshake line.
pub const HANDSHAKE_PREFIX: &str = "DOUBLECLOUD_PROVIDER";

/// One attribute that a plan will change, addressed by dotted path
/// such as `resources.clickhouse.disk_size`.
///
/// `before` is `None` for attributes being set for the first time and
/// `after` is `None` for attributes being cleared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub path: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl AttributeChange {
    pub fn new(path: impl Into<String>, before: Option<Value>, after: Option<Value>) -> Self {
        Self {
            path: path.into(),
            before,
            after,
        }
    }

    pub fn added(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, None, Some(value))
    }

    pub fn removed(path: impl Into<String>, value: Value) -> Self {
        Self::new(path, Some(value), None)
    }

    pub fn modified(path: impl Into<String>, before: Value, after: Value) -> Self {
        Self::new(path, Some(before), Some(after))
    }

    /// True when this change is at `path` or somewhere below it.
    pub fn is_under(&self, path: &str) -> bool {
        match self.path.strip_prefix(path) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

// The wire form carries each side as JSON bytes, with empty bytes for "absent".
fn to_wire(value: Option<Value>) -> Vec<u8> {
    value
        .and_then(|v| serde_json::to_vec(&v).ok())
        .unwrap_or_default()
}

fn from_wire(bytes: &[u8]) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    serde_json::from_slice(bytes).ok()
}

impl From<AttributeChange> for pb::AttributeChange {
    fn from(change: AttributeChange) -> Self {
        Self {
            path: change.path,
            before: to_wire(change.before),
            after: to_wire(change.after),
        }
    }
}

impl From<pb::AttributeChange> for AttributeChange {
    fn from(wire: pb::AttributeChange) -> Self {
        Self::new(wire.path, from_wire(&wire.before), from_wire(&wire.after))
    }
}

/// Outcome of planning one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanResult {
    /// State the resource will have once applied. Computed attributes the
    /// cloud has not reported yet are absent.
    pub planned_state: Value,
    pub changes: Vec<AttributeChange>,
    /// Set when a changed attribute can only be applied by recreating the
    /// object, for example the region of a cluster.
    pub requires_replace: bool,
}

impl PlanResult {
    /// The resource stays as it is.
    pub fn no_change(state: Value) -> Self {
        Self::with_changes(state, Vec::new(), false)
    }

    pub fn with_changes(
        planned_state: Value,
        changes: Vec<AttributeChange>,
        requires_replace: bool,
    ) -> Self {
        Self {
            planned_state,
            changes,
            requires_replace,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// True when any change is at `path` or nested under it.
    pub fn touches(&self, path: &str) -> bool {
        self.changes.iter().any(|c| c.is_under(path))
    }
}

/// A cloud object adopted into state by `terraform import`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedResource {
    pub resource_type: String,
    pub state: Value,
}

impl ImportedResource {
    pub fn new(resource_type: impl Into<String>, state: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            state,
        }
    }
}

/// Answer to GetMetadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    pub resources: Vec<String>,
    pub data_sources: Vec<String>,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerCapabilities {
    /// The host may call Plan with a null proposed state before a destroy.
    pub plan_destroy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_disk_resize_crosses_the_wire() {
        let change = AttributeChange::modified(
            "resources.clickhouse.disk_size",
            json!(34359738368_i64),
            json!(51539607552_i64),
        );

        let wire: pb::AttributeChange = change.clone().into();
        assert_eq!(wire.before, b"34359738368");
        assert_eq!(wire.after, b"51539607552");
        assert_eq!(AttributeChange::from(wire), change);
    }

    #[test]
    fn test_absent_side_is_empty_on_the_wire() {
        let wire: pb::AttributeChange = AttributeChange::added("description", json!("orders only")).into();
        assert!(wire.before.is_empty());

        let back = AttributeChange::from(wire);
        assert_eq!(back.before, None);
        assert_eq!(back.after, Some(json!("orders only")));
    }

    #[test]
    fn test_nested_paths_belong_to_their_block() {
        let change = AttributeChange::modified("config.log_level", json!("LOG_LEVEL_INFORMATION"), json!("LOG_LEVEL_TRACE"));
        assert!(change.is_under("config"));
        assert!(change.is_under("config.log_level"));
        assert!(!change.is_under("config.log"));
        assert!(!change.is_under("connection_info"));
    }

    #[test]
    fn test_plan_touches() {
        let plan = PlanResult::with_changes(
            json!({"id": "chc0001", "name": "tf-acc-clickhouse"}),
            vec![AttributeChange::modified(
                "resources.clickhouse.replica_count",
                json!(1),
                json!(2),
            )],
            false,
        );
        assert!(plan.touches("resources"));
        assert!(!plan.touches("name"));
        assert!(!plan.is_empty());

        assert!(PlanResult::no_change(json!({"id": "net0001"})).is_empty());
    }
}
