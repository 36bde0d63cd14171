//! Schema-driven planning.
//!
//! The planner merges the proposed configuration with prior state and reports
//! what changes. Computed attributes the configuration leaves unset stay null
//! ("known after apply") unless they carry [`PlanModifier::UseStateForUnknown`],
//! in which case the prior value is kept.

use serde_json::Value;

use crate::schema::{Block, BlockNestingMode, PlanModifier, Schema};
use crate::types::{AttributeChange, PlanResult};

static NULL: Value = Value::Null;

/// Plan a resource change.
///
/// `prior` is `None` for a resource that does not exist yet. A null `proposed`
/// value plans a destroy.
pub fn plan_resource(schema: &Schema, prior: Option<&Value>, proposed: Value) -> PlanResult {
    if proposed.is_null() {
        let mut changes = Vec::new();
        if let Some(prior) = prior {
            diff_block(&schema.block, prior, &NULL, "", &mut changes, &mut false);
        }
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let prior_value = prior.unwrap_or(&NULL);
    let planned = fill_block(&schema.block, prior_value, proposed);

    let mut changes = Vec::new();
    let mut replace = false;
    diff_block(
        &schema.block,
        prior_value,
        &planned,
        "",
        &mut changes,
        &mut replace,
    );

    match prior {
        Some(prior) if changes.is_empty() => PlanResult::no_change(prior.clone()),
        Some(_) => PlanResult::with_changes(planned, changes, replace),
        None => PlanResult::with_changes(planned, changes, false),
    }
}

fn fill_block(block: &Block, prior: &Value, proposed: Value) -> Value {
    let Value::Object(mut obj) = proposed else {
        return proposed;
    };

    for (name, attr) in &block.attributes {
        let unset = obj.get(name).map_or(true, Value::is_null);
        if !unset {
            continue;
        }
        if let Some(default) = &attr.default {
            obj.insert(name.clone(), default.clone());
            continue;
        }
        if attr.flags.computed && attr.plan_modifier == Some(PlanModifier::UseStateForUnknown) {
            if let Some(value) = prior.get(name).filter(|v| !v.is_null()) {
                obj.insert(name.clone(), value.clone());
            }
        }
    }

    for (name, nested) in &block.blocks {
        let Some(value) = obj.remove(name) else {
            continue;
        };
        let prior_nested = prior.get(name).unwrap_or(&NULL);
        let filled = match (nested.nesting_mode, value) {
            (BlockNestingMode::Single, value) => fill_block(&nested.block, prior_nested, value),
            (BlockNestingMode::List, Value::Array(items)) => Value::Array(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(i, item)| {
                        fill_block(&nested.block, prior_nested.get(i).unwrap_or(&NULL), item)
                    })
                    .collect(),
            ),
            (BlockNestingMode::List, value) => value,
        };
        obj.insert(name.clone(), filled);
    }

    Value::Object(obj)
}

fn diff_block(
    block: &Block,
    prior: &Value,
    planned: &Value,
    path: &str,
    changes: &mut Vec<AttributeChange>,
    replace: &mut bool,
) {
    let mut names: Vec<&String> = block.attributes.keys().collect();
    names.sort();

    for name in names {
        let attr = &block.attributes[name];
        let before = prior.get(name).filter(|v| !v.is_null());
        let after = planned.get(name).filter(|v| !v.is_null());
        let attr_path = join_path(path, name);

        let change = match (before, after) {
            // unknown until apply
            (_, None) if attr.flags.computed && !planned.is_null() => None,
            (None, None) => None,
            (Some(b), Some(a)) if b == a => None,
            (None, Some(a)) => Some(AttributeChange::added(attr_path, a.clone())),
            (Some(b), None) => Some(AttributeChange::removed(attr_path, b.clone())),
            (Some(b), Some(a)) => Some(AttributeChange::modified(attr_path, b.clone(), a.clone())),
        };

        if let Some(change) = change {
            if attr.force_new {
                *replace = true;
            }
            changes.push(change);
        }
    }

    let mut names: Vec<&String> = block.blocks.keys().collect();
    names.sort();

    for name in names {
        let nested = &block.blocks[name];
        let before = prior.get(name).unwrap_or(&NULL);
        let after = planned.get(name).unwrap_or(&NULL);
        let block_path = join_path(path, name);

        match nested.nesting_mode {
            BlockNestingMode::Single => {
                diff_block(&nested.block, before, after, &block_path, changes, replace)
            }
            BlockNestingMode::List => {
                let len = list_len(before).max(list_len(after));
                for i in 0..len {
                    diff_block(
                        &nested.block,
                        before.get(i).unwrap_or(&NULL),
                        after.get(i).unwrap_or(&NULL),
                        &format!("{}.{}", block_path, i),
                        changes,
                        replace,
                    );
                }
            }
        }
    }
}

fn list_len(value: &Value) -> usize {
    value.as_array().map_or(0, Vec::len)
}

fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}
