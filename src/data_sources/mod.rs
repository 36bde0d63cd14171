//! Read-only lookups of existing objects.
//!
//! Every data source finds one object either by `id` or by `project_id` and
//! `name`, and exposes the same attributes as the matching resource, all
//! computed.

mod clickhouse;
mod kafka;
mod network;
mod transfer;

use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::resource::DataSource;
use crate::schema::{Attribute, AttributeFlags, Block, Schema};

/// Every data source the provider serves.
pub(crate) fn all() -> Vec<Box<dyn DataSource>> {
    vec![
        Box::new(network::NetworkDataSource),
        Box::new(kafka::KafkaDataSource),
        Box::new(transfer::TransferDataSource),
        Box::new(clickhouse::ClickhouseDataSource),
    ]
}

/// Lookup keys of a data source configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Lookup {
    id: Option<String>,
    project_id: Option<String>,
    name: Option<String>,
}

/// How to find the object.
pub(crate) enum LookupKey<'a> {
    Id(&'a str),
    Name { project_id: &'a str, name: &'a str },
}

impl Lookup {
    pub fn from_config(config: &Value) -> Result<Self, ProviderError> {
        Ok(serde_json::from_value(config.clone())?)
    }

    pub fn key(&self) -> Result<LookupKey<'_>, ProviderError> {
        match (present(&self.id), present(&self.project_id), present(&self.name)) {
            (Some(id), _, _) => Ok(LookupKey::Id(id)),
            (None, Some(project_id), Some(name)) => Ok(LookupKey::Name { project_id, name }),
            _ => Err(ProviderError::Validation(
                "either id or both project_id and name must be set".to_string(),
            )),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Pick the single item called `name`.
pub(crate) fn by_name<T>(
    items: Vec<T>,
    name: &str,
    kind: &str,
    name_of: impl Fn(&T) -> &str,
) -> Result<T, ProviderError> {
    let mut matches: Vec<T> = items.into_iter().filter(|i| name_of(i) == name).collect();
    match matches.len() {
        0 => Err(ProviderError::NotFound(format!("{} named {:?}", kind, name))),
        1 => Ok(matches.remove(0)),
        n => Err(ProviderError::Validation(format!(
            "{} {} named {:?} found, use id instead",
            n, kind, name
        ))),
    }
}

/// Derive a lookup schema from a resource schema: every attribute becomes
/// computed, and `id`, `project_id` and `name` become optional lookup keys.
pub(crate) fn lookup_schema(resource: Schema, description: &str) -> Schema {
    let mut block = computed_block(resource.block);
    for key in ["id", "project_id", "name"] {
        if let Some(attr) = block.attributes.get_mut(key) {
            attr.flags = AttributeFlags::optional_computed();
        }
    }
    block.description = Some(description.to_string());
    Schema {
        version: resource.version,
        block,
    }
}

fn computed_block(block: Block) -> Block {
    Block {
        attributes: block
            .attributes
            .into_iter()
            .map(|(name, attr)| {
                let flags = AttributeFlags {
                    sensitive: attr.flags.sensitive,
                    ..AttributeFlags::computed()
                };
                let mut computed = Attribute::new(attr.attr_type, flags);
                computed.description = attr.description;
                (name, computed)
            })
            .collect(),
        blocks: block
            .blocks
            .into_iter()
            .map(|(name, mut nested)| {
                nested.block = computed_block(nested.block);
                nested.min_items = 0;
                (name, nested)
            })
            .collect(),
        description: block.description,
    }
}
