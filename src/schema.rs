//! Resource and data source schemas.
//!
//! A [`Schema`] is the single description of a DoubleCloud object's shape. The
//! same value is reported to the host in GetSchema, checked by
//! [`validate`](crate::validate) and walked by the planner, so a flag set here
//! changes all three.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    /// Sent to the API as a decimal string, stored in state as a number.
    Int64,
    Bool,
    List(Box<AttributeType>),
    /// Fixed set of named fields. Ordered so the reported type is stable.
    Object(BTreeMap<String, AttributeType>),
}

impl AttributeType {
    pub fn list(element: AttributeType) -> Self {
        Self::List(Box::new(element))
    }

    pub fn object<'a>(fields: impl IntoIterator<Item = (&'a str, AttributeType)>) -> Self {
        Self::Object(
            fields
                .into_iter()
                .map(|(name, ty)| (name.to_owned(), ty))
                .collect(),
        )
    }
}

/// Who may set an attribute: the configuration, the cloud, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AttributeFlags {
    pub required: bool,
    pub optional: bool,
    /// Reported by the API. Combined with `optional`, the configuration may
    /// set it and the cloud picks a value otherwise.
    pub computed: bool,
    /// Hidden in plan output.
    pub sensitive: bool,
}

impl AttributeFlags {
    const NONE: Self = Self {
        required: false,
        optional: false,
        computed: false,
        sensitive: false,
    };

    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::NONE
        }
    }

    pub fn optional() -> Self {
        Self {
            optional: true,
            ..Self::NONE
        }
    }

    pub fn computed() -> Self {
        Self {
            computed: true,
            ..Self::NONE
        }
    }

    pub fn optional_computed() -> Self {
        Self {
            optional: true,
            computed: true,
            ..Self::NONE
        }
    }

    pub fn sensitive(self) -> Self {
        Self {
            sensitive: true,
            ..self
        }
    }

    /// Set only by the cloud, never by configuration.
    pub fn is_read_only(&self) -> bool {
        self.computed && !self.optional && !self.required
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanModifier {
    /// An unset computed value keeps its prior state instead of becoming
    /// "known after apply". Used for ids and values the cloud never changes
    /// on its own.
    UseStateForUnknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StringValidator {
    OneOf(Vec<String>),
}

impl StringValidator {
    pub fn one_of(names: &[&str]) -> Self {
        Self::OneOf(names.iter().map(|&n| n.to_owned()).collect())
    }

    /// `Err` carries the detail shown under the diagnostic.
    pub fn check(&self, value: &str) -> Result<(), String> {
        match self {
            Self::OneOf(names) if names.iter().any(|n| n == value) => Ok(()),
            Self::OneOf(names) => Err(format!(
                "value must be one of: {}, got: {:?}",
                names.join(", "),
                value
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    #[serde(flatten)]
    pub flags: AttributeFlags,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Changing the value recreates the object.
    #[serde(default)]
    pub force_new: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan_modifier: Option<PlanModifier>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validators: Vec<StringValidator>,
}

macro_rules! shorthand {
    ($($name:ident => $ty:expr, $flags:ident;)+) => {
        $(pub fn $name() -> Self {
            Self::new($ty, AttributeFlags::$flags())
        })+
    };
}

impl Attribute {
    pub fn new(attr_type: AttributeType, flags: AttributeFlags) -> Self {
        Self {
            attr_type,
            flags,
            description: None,
            force_new: false,
            default: None,
            plan_modifier: None,
            validators: Vec::new(),
        }
    }

    shorthand! {
        required_string => AttributeType::String, required;
        optional_string => AttributeType::String, optional;
        computed_string => AttributeType::String, computed;
        optional_computed_string => AttributeType::String, optional_computed;
        optional_int64 => AttributeType::Int64, optional;
        optional_computed_int64 => AttributeType::Int64, optional_computed;
        optional_bool => AttributeType::Bool, optional;
        computed_bool => AttributeType::Bool, computed;
        optional_computed_bool => AttributeType::Bool, optional_computed;
        optional_string_list => AttributeType::list(AttributeType::String), optional;
    }

    /// A nested read-only value such as `connection_info`.
    pub fn computed_object(object: AttributeType) -> Self {
        Self::new(object, AttributeFlags::computed())
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn use_state_for_unknown(mut self) -> Self {
        self.plan_modifier = Some(PlanModifier::UseStateForUnknown);
        self
    }

    pub fn one_of(mut self, names: &[&str]) -> Self {
        self.validators.push(StringValidator::one_of(names));
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.flags = self.flags.sensitive();
        self
    }
}

/// JSON shape of a nested block: an object for `Single`, an array of objects
/// for `List`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BlockNestingMode {
    #[default]
    Single,
    List,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Block {
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attributes: HashMap<String, Attribute>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub blocks: HashMap<String, NestedBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.attributes.insert(name.into(), attr);
        self
    }

    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.blocks.insert(name.into(), block);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NestedBlock {
    #[serde(flatten)]
    pub block: Block,
    #[serde(default)]
    pub nesting_mode: BlockNestingMode,
    #[serde(default)]
    pub min_items: u32,
    /// 0 means unbounded.
    #[serde(default)]
    pub max_items: u32,
}

impl NestedBlock {
    fn with_mode(block: Block, nesting_mode: BlockNestingMode, max_items: u32) -> Self {
        Self {
            block,
            nesting_mode,
            min_items: 0,
            max_items,
        }
    }

    pub fn single(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::Single, 1)
    }

    pub fn list(block: Block) -> Self {
        Self::with_mode(block, BlockNestingMode::List, 0)
    }

    /// For a single block, `with_min_items(1)` makes the block required.
    pub fn with_min_items(mut self, min: u32) -> Self {
        self.min_items = min;
        self
    }

    pub fn with_max_items(mut self, max: u32) -> Self {
        self.max_items = max;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Schema {
    #[serde(default)]
    pub version: u64,
    #[serde(flatten)]
    pub block: Block,
}

impl Schema {
    /// Every DoubleCloud schema is still at its first version.
    pub fn v0() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: impl Into<String>, attr: Attribute) -> Self {
        self.block = self.block.with_attribute(name, attr);
        self
    }

    pub fn with_block(mut self, name: impl Into<String>, block: NestedBlock) -> Self {
        self.block = self.block.with_block(name, block);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.block = self.block.with_description(description);
        self
    }
}

/// Everything reported by GetSchema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProviderSchema {
    #[serde(default)]
    pub provider: Schema,
    #[serde(default)]
    pub resources: HashMap<String, Schema>,
    #[serde(default)]
    pub data_sources: HashMap<String, Schema>,
}

impl ProviderSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider_config(mut self, schema: Schema) -> Self {
        self.provider = schema;
        self
    }

    pub fn with_resource(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.resources.insert(name.into(), schema);
        self
    }

    pub fn with_data_source(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.data_sources.insert(name.into(), schema);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_flags() {
        assert!(AttributeFlags::computed().is_read_only());
        assert!(!AttributeFlags::optional_computed().is_read_only());
        assert!(!AttributeFlags::required().is_read_only());

        let key = Attribute::optional_string().sensitive();
        assert!(key.flags.optional && key.flags.sensitive);
    }

    #[test]
    fn test_cleanup_policy_attribute() {
        let attr = Attribute::optional_computed_string()
            .with_description("Cleanup policy for activate, reactivate and reupload processes")
            .use_state_for_unknown()
            .one_of(&["DISABLED", "DROP", "TRUNCATE"]);

        assert_eq!(attr.attr_type, AttributeType::String);
        assert!(attr.flags.optional && attr.flags.computed);
        assert_eq!(attr.plan_modifier, Some(PlanModifier::UseStateForUnknown));
        assert!(attr.validators[0].check("DROP").is_ok());
        assert!(!attr.force_new);
    }

    #[test]
    fn test_one_of_names_the_accepted_values() {
        let validator = StringValidator::one_of(&["BEFORE_DATA", "AFTER_DATA"]);
        assert!(validator.check("AFTER_DATA").is_ok());

        let err = validator.check("SOMETIMES").unwrap_err();
        assert_eq!(err, r#"value must be one of: BEFORE_DATA, AFTER_DATA, got: "SOMETIMES""#);
    }

    #[test]
    fn test_nested_block_bounds() {
        let resources = NestedBlock::single(Block::new()).with_min_items(1);
        assert_eq!(resources.nesting_mode, BlockNestingMode::Single);
        assert_eq!((resources.min_items, resources.max_items), (1, 1));

        let hosts = NestedBlock::list(Block::new()).with_max_items(5);
        assert_eq!(hosts.nesting_mode, BlockNestingMode::List);
        assert_eq!((hosts.min_items, hosts.max_items), (0, 5));
    }

    #[test]
    fn test_reported_type_is_stable() {
        let ty = AttributeType::object([
            ("user", AttributeType::String),
            ("host", AttributeType::String),
            ("port", AttributeType::Int64),
        ]);
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, r#"{"object":{"host":"string","port":"int64","user":"string"}}"#);

        let attr = serde_json::to_value(Attribute::computed_string().with_force_new()).unwrap();
        assert_eq!(attr["type"], "string");
        assert_eq!(attr["computed"], true);
        assert_eq!(attr["force_new"], true);
    }
}
