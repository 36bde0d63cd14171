//! Checking and normalizing configuration against a [`Schema`].
//!
//! [`coerce`] turns HCL literals into the declared types the way the host does
//! before planning: `"34359738368"` becomes an int64 and a list block written
//! once becomes a one-element array. [`validate`] then reports what is still
//! wrong as diagnostics addressed by dotted path.
//!
//! ```
//! use doublecloud_provider::schema::{Schema, Attribute};
//! use doublecloud_provider::validation::{coerce, validate};
//! use serde_json::json;
//!
//! let schema = Schema::v0()
//!     .with_attribute("name", Attribute::required_string())
//!     .with_attribute("disk_size", Attribute::optional_int64());
//!
//! let config = coerce(&schema, json!({"name": "tf-acc", "disk_size": "34359738368"}));
//! assert_eq!(config["disk_size"], 34359738368_i64);
//! assert!(validate(&schema, &config).is_empty());
//! ```

use serde_json::{Map, Value};

use crate::diag::Diagnostic;
use crate::schema::{Attribute, AttributeType, Block, BlockNestingMode, NestedBlock, Schema};

/// Report every problem in `value`. Read-only computed attributes are not
/// checked, and keys the schema does not know are left for the resource.
pub fn validate(schema: &Schema, value: &Value) -> Vec<Diagnostic> {
    let mut checker = Checker::default();
    checker.block(&schema.block, value, "");
    checker.found
}

/// Convert literals to the schema's types. Anything that does not convert is
/// returned unchanged so [`validate`] can report it.
pub fn coerce(schema: &Schema, value: Value) -> Value {
    coerce_block(&schema.block, value)
}

#[derive(Default)]
struct Checker {
    found: Vec<Diagnostic>,
}

impl Checker {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.found.push(diagnostic);
    }

    fn block(&mut self, block: &Block, value: &Value, path: &str) {
        let fields = match value {
            Value::Object(fields) => fields,
            Value::Null => return,
            other => {
                let diag = Diagnostic::error("Expected object")
                    .with_detail(format!("Got {}", kind(other)));
                self.report(if path.is_empty() {
                    diag
                } else {
                    diag.with_attribute(path)
                });
                return;
            }
        };

        for (name, attr) in &block.attributes {
            self.attribute(attr, fields.get(name), &join(path, name));
        }
        for (name, nested) in &block.blocks {
            self.nested(nested, fields.get(name), &join(path, name));
        }
    }

    fn attribute(&mut self, attr: &Attribute, value: Option<&Value>, path: &str) {
        if attr.flags.is_read_only() {
            return;
        }

        let Some(value) = value.filter(|v| !v.is_null()) else {
            if attr.flags.required {
                self.report(
                    Diagnostic::error(format!("Missing required attribute '{}'", path))
                        .with_detail("This attribute is required and must be provided")
                        .with_attribute(path),
                );
            }
            return;
        };

        // validators only see values of the right type
        if !self.typed(&attr.attr_type, value, path) {
            return;
        }
        let Some(s) = value.as_str() else {
            return;
        };
        for validator in &attr.validators {
            if let Err(detail) = validator.check(s) {
                self.report(
                    Diagnostic::error(format!("Invalid value for attribute '{}'", path))
                        .with_detail(detail)
                        .with_attribute(path),
                );
            }
        }
    }

    /// Returns false when a type error was reported at or below `path`.
    fn typed(&mut self, ty: &AttributeType, value: &Value, path: &str) -> bool {
        let expected = match ty {
            AttributeType::String if value.is_string() => return true,
            AttributeType::Bool if value.is_boolean() => return true,
            AttributeType::Int64 if is_int64(value) => return true,
            AttributeType::List(element) => match value.as_array() {
                Some(items) => {
                    return items.iter().enumerate().fold(true, |ok, (i, item)| {
                        self.typed(element, item, &format!("{}.{}", path, i)) && ok
                    })
                }
                None => "list",
            },
            AttributeType::Object(fields) => match value.as_object() {
                Some(obj) => {
                    return fields.iter().fold(true, |ok, (name, field_ty)| {
                        match obj.get(name).filter(|v| !v.is_null()) {
                            Some(v) => self.typed(field_ty, v, &join(path, name)) && ok,
                            None => ok,
                        }
                    })
                }
                None => "object",
            },
            AttributeType::String => "string",
            AttributeType::Bool => "bool",
            AttributeType::Int64 => "int64",
        };

        self.report(
            Diagnostic::error(format!("Invalid type for attribute '{}'", path))
                .with_detail(format!("Expected {}, got {}", expected, kind(value)))
                .with_attribute(path),
        );
        false
    }

    fn nested(&mut self, nested: &NestedBlock, value: Option<&Value>, path: &str) {
        let value = value.filter(|v| !v.is_null());
        match (nested.nesting_mode, value) {
            (_, None) if nested.min_items == 0 => {}
            (BlockNestingMode::Single, None) => self.report(
                Diagnostic::error(format!("Missing required block '{}'", path))
                    .with_detail("At least one block is required")
                    .with_attribute(path),
            ),
            (BlockNestingMode::List, None) => self.report(
                Diagnostic::error(format!(
                    "Block '{}' requires at least {} item(s)",
                    path, nested.min_items
                ))
                .with_attribute(path),
            ),
            (BlockNestingMode::Single, Some(v)) => self.block(&nested.block, v, path),
            (BlockNestingMode::List, Some(Value::Array(items))) => {
                self.item_count(nested, items.len() as u32, path);
                for (i, item) in items.iter().enumerate() {
                    self.block(&nested.block, item, &format!("{}.{}", path, i));
                }
            }
            (BlockNestingMode::List, Some(other)) => self.report(
                Diagnostic::error(format!("Expected list for block '{}'", path))
                    .with_detail(format!("Got {}", kind(other)))
                    .with_attribute(path),
            ),
        }
    }

    fn item_count(&mut self, nested: &NestedBlock, len: u32, path: &str) {
        if len < nested.min_items {
            self.report(
                Diagnostic::error(format!(
                    "Block '{}' requires at least {} item(s), got {}",
                    path, nested.min_items, len
                ))
                .with_attribute(path),
            );
        }
        if nested.max_items > 0 && len > nested.max_items {
            self.report(
                Diagnostic::error(format!(
                    "Block '{}' allows at most {} item(s), got {}",
                    path, nested.max_items, len
                ))
                .with_attribute(path),
            );
        }
    }
}

fn coerce_block(block: &Block, value: Value) -> Value {
    let Value::Object(mut fields) = value else {
        return value;
    };

    for (name, attr) in &block.attributes {
        convert_field(&mut fields, name, |v| coerce_value(&attr.attr_type, v));
    }
    for (name, nested) in &block.blocks {
        convert_field(&mut fields, name, |v| coerce_nested(nested, v));
    }

    Value::Object(fields)
}

fn coerce_nested(nested: &NestedBlock, value: Value) -> Value {
    match (nested.nesting_mode, value) {
        (BlockNestingMode::Single, Value::Array(items)) if items.len() == 1 => {
            let item = items.into_iter().next().unwrap_or(Value::Null);
            coerce_block(&nested.block, item)
        }
        (BlockNestingMode::Single, v) => coerce_block(&nested.block, v),
        (BlockNestingMode::List, Value::Array(items)) => items
            .into_iter()
            .map(|item| coerce_block(&nested.block, item))
            .collect(),
        (BlockNestingMode::List, Value::Null) => Value::Null,
        (BlockNestingMode::List, v) => Value::Array(vec![coerce_block(&nested.block, v)]),
    }
}

fn coerce_value(ty: &AttributeType, value: Value) -> Value {
    match (ty, value) {
        (AttributeType::Int64, Value::String(s)) => s
            .trim()
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or(Value::String(s)),
        (AttributeType::Bool, Value::String(s)) if s == "true" || s == "false" => {
            Value::Bool(s == "true")
        }
        (AttributeType::String, Value::Number(n)) => Value::String(n.to_string()),
        (AttributeType::String, Value::Bool(b)) => Value::String(b.to_string()),
        (AttributeType::List(element), Value::Array(items)) => items
            .into_iter()
            .map(|item| coerce_value(element, item))
            .collect(),
        (AttributeType::Object(field_types), Value::Object(mut fields)) => {
            for (name, field_ty) in field_types {
                convert_field(&mut fields, name, |v| coerce_value(field_ty, v));
            }
            Value::Object(fields)
        }
        (_, value) => value,
    }
}

fn convert_field(fields: &mut Map<String, Value>, name: &str, f: impl FnOnce(Value) -> Value) {
    if let Some(v) = fields.get_mut(name) {
        *v = f(v.take());
    }
}

fn join(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", base, name)
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whole numbers only. HCL hands `3306` over as `3306.0` in some paths.
fn is_int64(value: &Value) -> bool {
    let Value::Number(n) = value else {
        return false;
    };
    n.is_i64()
        || n.as_f64()
            .is_some_and(|f| f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64)
}
