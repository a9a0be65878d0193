//! # Schema Nodes
//!
//! [`JsonNode`] is a small OpenAPI-flavoured schema tree. Each typed node
//! carries a [`Context`] (format, required, nullable, allowed values) plus a
//! type-specific context; combinator nodes hold child nodes.
//!
//! A node renders two ways:
//!
//! - [`JsonNode::to_openapi`] writes an OpenAPI schema object (`nullable`
//!   keyword, `required` derived from the properties).
//! - [`JsonNode::to_json_schema`] writes the Draft 2020-12 equivalent, where
//!   nullability becomes a `["<type>", "null"]` type list.
//!
//! Whether a node is required only matters to the object that holds it: an
//! object's `required` array lists every property whose node is required.

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::error::SchemaError;

/// The JSON type of a typed node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JsonType {
    Boolean,
    Object,
    Array,
    Number,
    Integer,
    String,
}

impl JsonType {
    /// The `type` keyword value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::String => value.is_string(),
        }
    }
}

/// A format qualifier for one JSON type.
pub trait Format: Copy + PartialEq + std::fmt::Debug + Default {
    /// The JSON type this format refines.
    const JSON_TYPE: JsonType;

    /// The `format` keyword value, `None` for the generic format.
    fn name(self) -> Option<&'static str>;
}

macro_rules! format_enum {
    ($($(#[$doc:meta])* $name:ident => $json:ident { $($variant:ident => $wire:literal),* })+) => {
        $(
            $(#[$doc])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
            pub enum $name {
                /// No `format` keyword.
                #[default]
                Generic,
                $(
                    #[doc = concat!("`\"", $wire, "\"`")]
                    $variant,
                )*
            }

            impl Format for $name {
                const JSON_TYPE: JsonType = JsonType::$json;

                fn name(self) -> Option<&'static str> {
                    match self {
                        Self::Generic => None,
                        $(Self::$variant => Some($wire),)*
                    }
                }
            }
        )+
    };
}

format_enum! {
    /// Formats of a `boolean` node.
    BooleanFormat => Boolean {}
    /// Formats of an `object` node.
    ObjectFormat => Object {}
    /// Formats of an `array` node.
    ArrayFormat => Array {}
    /// Formats of a `number` node.
    NumberFormat => Number { Float => "float", Double => "double" }
    /// Formats of an `integer` node.
    IntegerFormat => Integer { Int32 => "int32", Int64 => "int64" }
    /// Formats of a `string` node.
    StringFormat => String {
        Byte => "byte",
        Binary => "binary",
        Date => "date",
        DateTime => "date-time",
        Password => "password",
        Uuid => "uuid"
    }
}

/// Settings shared by every typed node.
#[derive(Debug, Clone, PartialEq)]
pub struct Context<F> {
    pub format: F,
    pub required: bool,
    pub nullable: bool,
    /// Rendered as `enum`. `None` allows any value of the type.
    pub allowed_values: Option<Vec<Value>>,
}

impl<F: Format> Context<F> {
    /// A required, non-nullable context with the given format.
    pub fn new(format: F) -> Self {
        Self {
            format,
            required: true,
            nullable: false,
            allowed_values: None,
        }
    }

    fn flags(&self) -> Flags<'_> {
        Flags {
            json_type: F::JSON_TYPE,
            format: self.format.name(),
            nullable: self.nullable,
            allowed_values: self.allowed_values.as_deref(),
        }
    }

    fn flags_mut(&mut self) -> FlagsMut<'_> {
        FlagsMut {
            json_type: F::JSON_TYPE,
            required: &mut self.required,
            nullable: &mut self.nullable,
            allowed_values: &mut self.allowed_values,
        }
    }
}

impl<F: Format> Default for Context<F> {
    fn default() -> Self {
        Self::new(F::default())
    }
}

struct Flags<'a> {
    json_type: JsonType,
    format: Option<&'static str>,
    nullable: bool,
    allowed_values: Option<&'a [Value]>,
}

struct FlagsMut<'a> {
    json_type: JsonType,
    required: &'a mut bool,
    nullable: &'a mut bool,
    allowed_values: &'a mut Option<Vec<Value>>,
}

/// Bounds of a `number` or `integer` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NumericContext {
    pub multiple_of: Option<f64>,
    pub maximum: Option<f64>,
    pub exclusive_maximum: Option<f64>,
    pub minimum: Option<f64>,
    pub exclusive_minimum: Option<f64>,
}

/// Bounds of a `string` node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StringContext {
    pub max_length: Option<usize>,
    pub min_length: usize,
    /// Regular expression.
    pub pattern: Option<String>,
}

/// Element type and bounds of an `array` node.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayContext {
    pub items: Box<JsonNode>,
    pub max_items: Option<usize>,
    pub min_items: usize,
    pub unique_items: bool,
}

impl ArrayContext {
    /// An unbounded array of `items`.
    pub fn new(items: JsonNode) -> Self {
        Self {
            items: Box::new(items),
            max_items: None,
            min_items: 0,
            unique_items: false,
        }
    }
}

/// Properties of an `object` node, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectContext {
    pub properties: Vec<(String, JsonNode)>,
    pub additional_properties: Option<Box<JsonNode>>,
    pub max_properties: Option<usize>,
    pub min_properties: usize,
}

impl ObjectContext {
    /// An object with no declared properties.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a property, replacing any earlier one with the same name.
    pub fn property(mut self, name: impl Into<String>, node: JsonNode) -> Self {
        let name = name.into();
        match self.properties.iter().position(|(n, _)| *n == name) {
            Some(idx) => self.properties[idx].1 = node,
            None => self.properties.push((name, node)),
        }
        self
    }

    /// The node of a declared property.
    pub fn get(&self, name: &str) -> Option<&JsonNode> {
        self.properties
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Names of the properties whose node is required.
    pub fn required_properties(&self) -> Vec<&str> {
        self.properties
            .iter()
            .filter(|(_, node)| node.required())
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

/// A schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonNode {
    Boolean(Context<BooleanFormat>),
    Object(Context<ObjectFormat>, ObjectContext),
    Array(Context<ArrayFormat>, ArrayContext),
    Number(Context<NumberFormat>, NumericContext),
    Integer(Context<IntegerFormat>, NumericContext),
    String(Context<StringFormat>, StringContext),
    AllOf(Vec<JsonNode>),
    OneOf(Vec<JsonNode>),
    AnyOf(Vec<JsonNode>),
    Not(Box<JsonNode>),
}

impl JsonNode {
    /// A required generic boolean.
    pub fn boolean() -> Self {
        Self::Boolean(Context::default())
    }

    /// A required string of the given format.
    pub fn string(format: StringFormat) -> Self {
        Self::String(Context::new(format), StringContext::default())
    }

    /// A required number of the given format.
    pub fn number(format: NumberFormat) -> Self {
        Self::Number(Context::new(format), NumericContext::default())
    }

    /// A required integer of the given format.
    pub fn integer(format: IntegerFormat) -> Self {
        Self::Integer(Context::new(format), NumericContext::default())
    }

    /// A required array of `items`.
    pub fn array(items: JsonNode) -> Self {
        Self::Array(Context::default(), ArrayContext::new(items))
    }

    /// A required object with the given properties.
    pub fn object(properties: ObjectContext) -> Self {
        Self::Object(Context::default(), properties)
    }

    /// The JSON type of a typed node, `None` for combinators.
    pub fn json_type(&self) -> Option<JsonType> {
        self.flags().map(|flags| flags.json_type)
    }

    /// The `format` keyword, if any.
    pub fn format(&self) -> Option<&'static str> {
        self.flags().and_then(|flags| flags.format)
    }

    /// Whether an enclosing object requires this property. Combinators are
    /// always required.
    pub fn required(&self) -> bool {
        match self {
            Self::Boolean(c) => c.required,
            Self::Object(c, _) => c.required,
            Self::Array(c, _) => c.required,
            Self::Number(c, _) => c.required,
            Self::Integer(c, _) => c.required,
            Self::String(c, _) => c.required,
            Self::AllOf(_) | Self::OneOf(_) | Self::AnyOf(_) | Self::Not(_) => true,
        }
    }

    /// Whether `null` is accepted.
    pub fn nullable(&self) -> bool {
        self.flags().is_some_and(|flags| flags.nullable)
    }

    /// The `enum` values, if restricted.
    pub fn allowed_values(&self) -> Option<&[Value]> {
        self.flags().and_then(|flags| flags.allowed_values)
    }

    /// A declared property of an object node.
    pub fn property(&self, name: &str) -> Option<&JsonNode> {
        match self {
            Self::Object(_, object) => object.get(name),
            _ => None,
        }
    }

    /// This node as a non-required property. Combinators are unchanged.
    pub fn optional_node(mut self) -> Self {
        if let Some(flags) = self.flags_mut() {
            *flags.required = false;
        }
        self
    }

    /// This node as a required property. Combinators are unchanged.
    pub fn required_node(mut self) -> Self {
        if let Some(flags) = self.flags_mut() {
            *flags.required = true;
        }
        self
    }

    /// This node accepting `null`. Combinators are unchanged.
    pub fn nullable_node(mut self) -> Self {
        if let Some(flags) = self.flags_mut() {
            *flags.nullable = true;
        }
        self
    }

    /// Restrict this node to the given values.
    ///
    /// # Errors
    ///
    /// [`SchemaError::AllowedValues`] when the node is a combinator or a
    /// value does not match the node's JSON type. `null` is accepted only by
    /// nullable nodes.
    pub fn with_allowed_values<I>(mut self, values: I) -> Result<Self, SchemaError>
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        let Some(flags) = self.flags_mut() else {
            return Err(SchemaError::AllowedValues {
                expected: None,
                found: values.first().map_or("nothing", value_kind),
            });
        };
        let json_type = flags.json_type;
        let nullable = *flags.nullable;
        if let Some(bad) = values
            .iter()
            .find(|v| !(json_type.accepts(v) || (nullable && v.is_null())))
        {
            return Err(SchemaError::AllowedValues {
                expected: Some(json_type),
                found: value_kind(bad),
            });
        }
        *flags.allowed_values = Some(values);
        Ok(self)
    }

    /// Render as an OpenAPI schema object.
    pub fn to_openapi(&self) -> Value {
        self.render(Dialect::OpenApi)
    }

    /// Render as a JSON Schema (Draft 2020-12) document.
    pub fn to_json_schema(&self) -> Value {
        self.render(Dialect::JsonSchema)
    }

    fn flags(&self) -> Option<Flags<'_>> {
        match self {
            Self::Boolean(c) => Some(c.flags()),
            Self::Object(c, _) => Some(c.flags()),
            Self::Array(c, _) => Some(c.flags()),
            Self::Number(c, _) => Some(c.flags()),
            Self::Integer(c, _) => Some(c.flags()),
            Self::String(c, _) => Some(c.flags()),
            Self::AllOf(_) | Self::OneOf(_) | Self::AnyOf(_) | Self::Not(_) => None,
        }
    }

    fn flags_mut(&mut self) -> Option<FlagsMut<'_>> {
        match self {
            Self::Boolean(c) => Some(c.flags_mut()),
            Self::Object(c, _) => Some(c.flags_mut()),
            Self::Array(c, _) => Some(c.flags_mut()),
            Self::Number(c, _) => Some(c.flags_mut()),
            Self::Integer(c, _) => Some(c.flags_mut()),
            Self::String(c, _) => Some(c.flags_mut()),
            Self::AllOf(_) | Self::OneOf(_) | Self::AnyOf(_) | Self::Not(_) => None,
        }
    }

    fn render(&self, dialect: Dialect) -> Value {
        let mut out = Map::new();
        match self {
            Self::Boolean(c) => write_context(&mut out, c.flags(), dialect),
            Self::Object(c, object) => {
                write_context(&mut out, c.flags(), dialect);
                write_object(&mut out, object, dialect);
            }
            Self::Array(c, array) => {
                write_context(&mut out, c.flags(), dialect);
                write_array(&mut out, array, dialect);
            }
            Self::Number(c, numeric) => {
                write_context(&mut out, c.flags(), dialect);
                write_numeric(&mut out, numeric);
            }
            Self::Integer(c, numeric) => {
                write_context(&mut out, c.flags(), dialect);
                write_numeric(&mut out, numeric);
            }
            Self::String(c, string) => {
                write_context(&mut out, c.flags(), dialect);
                write_string(&mut out, string);
            }
            Self::AllOf(nodes) => {
                out.insert("allOf".into(), render_all(nodes, dialect));
            }
            Self::OneOf(nodes) => {
                out.insert("oneOf".into(), render_all(nodes, dialect));
            }
            Self::AnyOf(nodes) => {
                out.insert("anyOf".into(), render_all(nodes, dialect));
            }
            Self::Not(node) => {
                out.insert("not".into(), node.render(dialect));
            }
        }
        Value::Object(out)
    }
}

/// Serializes as the OpenAPI rendering.
impl Serialize for JsonNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_openapi().serialize(serializer)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dialect {
    OpenApi,
    JsonSchema,
}

fn render_all(nodes: &[JsonNode], dialect: Dialect) -> Value {
    Value::Array(nodes.iter().map(|node| node.render(dialect)).collect())
}

fn write_context(out: &mut Map<String, Value>, flags: Flags<'_>, dialect: Dialect) {
    let type_name = flags.json_type.as_str();
    match dialect {
        Dialect::OpenApi => {
            out.insert("type".into(), type_name.into());
        }
        Dialect::JsonSchema if flags.nullable => {
            out.insert("type".into(), Value::from(vec![type_name, "null"]));
        }
        Dialect::JsonSchema => {
            out.insert("type".into(), type_name.into());
        }
    }
    if let Some(format) = flags.format {
        out.insert("format".into(), format.into());
    }
    if let Some(values) = flags.allowed_values {
        let mut values = values.to_vec();
        if dialect == Dialect::JsonSchema && flags.nullable && !values.contains(&Value::Null) {
            values.push(Value::Null);
        }
        out.insert("enum".into(), Value::Array(values));
    }
    if dialect == Dialect::OpenApi {
        out.insert("nullable".into(), flags.nullable.into());
    }
}

fn write_numeric(out: &mut Map<String, Value>, numeric: &NumericContext) {
    let bounds = [
        ("multipleOf", numeric.multiple_of),
        ("maximum", numeric.maximum),
        ("exclusiveMaximum", numeric.exclusive_maximum),
        ("minimum", numeric.minimum),
        ("exclusiveMinimum", numeric.exclusive_minimum),
    ];
    for (key, bound) in bounds {
        if let Some(bound) = bound {
            out.insert(key.into(), Value::from(bound));
        }
    }
}

fn write_string(out: &mut Map<String, Value>, string: &StringContext) {
    if let Some(max) = string.max_length {
        out.insert("maxLength".into(), max.into());
    }
    out.insert("minLength".into(), string.min_length.into());
    if let Some(pattern) = &string.pattern {
        out.insert("pattern".into(), pattern.as_str().into());
    }
}

fn write_array(out: &mut Map<String, Value>, array: &ArrayContext, dialect: Dialect) {
    out.insert("items".into(), array.items.render(dialect));
    if let Some(max) = array.max_items {
        out.insert("maxItems".into(), max.into());
    }
    out.insert("minItems".into(), array.min_items.into());
    out.insert("uniqueItems".into(), array.unique_items.into());
}

fn write_object(out: &mut Map<String, Value>, object: &ObjectContext, dialect: Dialect) {
    if let Some(max) = object.max_properties {
        out.insert("maxProperties".into(), max.into());
    }
    let properties: Map<String, Value> = object
        .properties
        .iter()
        .map(|(name, node)| (name.clone(), node.render(dialect)))
        .collect();
    out.insert("properties".into(), Value::Object(properties));
    if let Some(additional) = &object.additional_properties {
        out.insert("additionalProperties".into(), additional.render(dialect));
    }
    out.insert(
        "required".into(),
        Value::from(object.required_properties()),
    );
    out.insert("minProperties".into(), object.min_properties.into());
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn person() -> JsonNode {
        JsonNode::object(
            ObjectContext::new()
                .property("name", JsonNode::string(StringFormat::Generic))
                .property(
                    "nickname",
                    JsonNode::string(StringFormat::Generic)
                        .optional_node()
                        .nullable_node(),
                )
                .property("age", JsonNode::integer(IntegerFormat::Int32)),
        )
    }

    #[test]
    fn test_openapi_rendering() {
        assert_eq!(
            person().to_openapi(),
            json!({
                "type": "object",
                "nullable": false,
                "properties": {
                    "name": {"type": "string", "nullable": false, "minLength": 0},
                    "nickname": {"type": "string", "nullable": true, "minLength": 0},
                    "age": {"type": "integer", "format": "int32", "nullable": false}
                },
                "required": ["name", "age"],
                "minProperties": 0
            })
        );
    }

    #[test]
    fn test_json_schema_nullable_type_list() {
        let schema = person().to_json_schema();
        assert_eq!(
            schema["properties"]["nickname"]["type"],
            json!(["string", "null"])
        );
        assert!(schema["properties"]["nickname"].get("nullable").is_none());
        assert_eq!(schema["properties"]["name"]["type"], json!("string"));
    }

    #[test]
    fn test_property_order_is_declaration_order() {
        let schema = person().to_openapi();
        let keys: Vec<&String> = schema["properties"]
            .as_object()
            .expect("properties should be an object")
            .keys()
            .collect();
        assert_eq!(keys, ["name", "nickname", "age"]);
    }

    #[test]
    fn test_property_replaces_same_name() {
        let object = ObjectContext::new()
            .property("a", JsonNode::boolean())
            .property("a", JsonNode::string(StringFormat::Date));
        assert_eq!(object.properties.len(), 1);
        assert_eq!(object.get("a").and_then(JsonNode::format), Some("date"));
    }

    #[test]
    fn test_modifiers_leave_combinators_alone() {
        let one_of = JsonNode::OneOf(vec![JsonNode::boolean()]);
        let modified = one_of.clone().optional_node().nullable_node();
        assert_eq!(modified, one_of);
        assert!(modified.required());
        assert!(!modified.nullable());
        assert_eq!(modified.json_type(), None);
    }

    #[test]
    fn test_required_node_restores() {
        let node = JsonNode::boolean().optional_node();
        assert!(!node.required());
        assert!(node.required_node().required());
    }

    #[test]
    fn test_allowed_values_type_checked() {
        let node = JsonNode::string(StringFormat::Generic)
            .with_allowed_values(["people", "robots"])
            .expect("strings are allowed");
        assert_eq!(
            node.allowed_values(),
            Some(&[json!("people"), json!("robots")][..])
        );

        let err = JsonNode::string(StringFormat::Generic)
            .with_allowed_values([1, 2])
            .expect_err("numbers should be rejected");
        assert!(matches!(
            err,
            SchemaError::AllowedValues {
                expected: Some(JsonType::String),
                found: "a number"
            }
        ));

        let err = JsonNode::AllOf(vec![])
            .with_allowed_values([true])
            .expect_err("combinators take no values");
        assert!(matches!(err, SchemaError::AllowedValues { expected: None, .. }));
    }

    #[test]
    fn test_integer_rejects_fractional_allowed_values() {
        assert!(JsonNode::integer(IntegerFormat::Generic)
            .with_allowed_values([1.5])
            .is_err());
        assert!(JsonNode::number(NumberFormat::Double)
            .with_allowed_values([1.5])
            .is_ok());
    }

    #[test]
    fn test_nullable_enum_gains_null_in_json_schema() {
        let node = JsonNode::boolean()
            .nullable_node()
            .with_allowed_values([Value::Bool(true), Value::Null])
            .expect("null is allowed when nullable");
        assert_eq!(node.to_json_schema()["enum"], json!([true, null]));

        let node = JsonNode::boolean()
            .nullable_node()
            .with_allowed_values([true])
            .expect("should build");
        assert_eq!(node.to_json_schema()["enum"], json!([true, null]));
        assert_eq!(node.to_openapi()["enum"], json!([true]));
    }

    #[test]
    fn test_numeric_and_array_bounds() {
        let JsonNode::Integer(context, _) = JsonNode::integer(IntegerFormat::Int64) else {
            panic!("expected an integer node");
        };
        let node = JsonNode::Integer(
            context,
            NumericContext {
                minimum: Some(0.0),
                ..NumericContext::default()
            },
        );
        assert_eq!(node.to_openapi()["minimum"], json!(0.0));
        assert!(node.to_openapi().get("maximum").is_none());

        let JsonNode::Array(context, mut array) = JsonNode::array(node) else {
            panic!("expected an array node");
        };
        array.min_items = 1;
        array.unique_items = true;
        let rendered = JsonNode::Array(context, array).to_openapi();
        assert_eq!(rendered["minItems"], json!(1));
        assert_eq!(rendered["uniqueItems"], json!(true));
        assert_eq!(rendered["items"]["format"], json!("int64"));
    }

    #[test]
    fn test_combinator_rendering() {
        let node = JsonNode::Not(Box::new(JsonNode::AnyOf(vec![
            JsonNode::boolean(),
            JsonNode::number(NumberFormat::Float),
        ])));
        assert_eq!(
            node.to_openapi(),
            json!({"not": {"anyOf": [
                {"type": "boolean", "nullable": false},
                {"type": "number", "format": "float", "nullable": false}
            ]}})
        );
    }

    #[test]
    fn test_serialize_is_openapi() {
        let node = JsonNode::string(StringFormat::DateTime);
        assert_eq!(
            serde_json::to_value(&node).expect("should serialize"),
            node.to_openapi()
        );
    }
}
