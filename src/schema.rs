// Schema model for the processed API description.
//
// Nodes are decoded once and stay read-only for the whole render pass. The
// serde structs mirror the wire shape; `Shape` is the closed classification
// the renderer matches on.
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{RenderError, Result};
use crate::path_id::PathId;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// `{ "api": { "<name>": Namespace, ... } }`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiDocument {
    pub api: IndexMap<String, Namespace>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Namespace {
    pub namespace: String,
    #[serde(default)]
    pub types: IndexMap<String, SchemaNode>,
    #[serde(default)]
    pub functions: IndexMap<String, SchemaNode>,
    /// Generic node fields: top-level `properties`, `description`, `nodoc`, ...
    #[serde(flatten)]
    pub node: SchemaNode,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<String>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_: Option<Vec<EnumMember>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(rename = "additionalProperties", default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(rename = "minItems", default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u32>,
    #[serde(rename = "maxItems", default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns_async: Option<Box<SchemaNode>>,
    /// Present (any non-null, non-false value) on `returns_async` when only the
    /// callback calling convention exists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub does_not_support_promises: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub nodoc: bool,
    /// absent → `None`, bare `null` marker → `Some(None)`, reason → `Some(Some(..))`
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "isInstanceOf", default, skip_serializing_if = "Option::is_none")]
    pub is_instance_of: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// An `enum` member: either a bare primitive or a `{name, description}` record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumMember {
    Record {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Bare(Value),
}

/// Closed classification of a node, in rule precedence order.
#[derive(Debug, Clone, Copy)]
pub enum Shape<'a> {
    InstanceOf(&'a str),
    Enum(&'a [EnumMember]),
    Choices(&'a [SchemaNode]),
    Array {
        items: Option<&'a SchemaNode>,
        min_items: Option<u32>,
        max_items: Option<u32>,
    },
    Object,
    Reference(&'a str),
    Literal(&'a Value),
    Function,
    Primitive(Primitive),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Number,
    Binary,
    Any,
    Boolean,
    String,
    Void,
    Undefined,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

fn present<'de, D>(de: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(de).map(Some)
}

impl EnumMember {
    /// JSON literal for the member value, e.g. `"foo"` or `3`.
    pub fn literal(&self) -> String {
        match self {
            EnumMember::Record { name, .. } => Value::from(name.as_str()).to_string(),
            EnumMember::Bare(value) => value.to_string(),
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            EnumMember::Record { description, .. } => description.as_deref(),
            EnumMember::Bare(_) => None,
        }
    }
}

impl Primitive {
    fn parse(ty: &str) -> Option<Self> {
        match ty {
            "int64" | "integer" | "number" | "double" => Some(Primitive::Number),
            "binary" => Some(Primitive::Binary),
            "any" => Some(Primitive::Any),
            "boolean" => Some(Primitive::Boolean),
            "string" => Some(Primitive::String),
            "void" => Some(Primitive::Void),
            "undefined" => Some(Primitive::Undefined),
            _ => None,
        }
    }

    pub fn as_ts(self) -> &'static str {
        match self {
            Primitive::Number => "number",
            Primitive::Binary => "ArrayBuffer",
            Primitive::Any => "any",
            Primitive::Boolean => "boolean",
            Primitive::String => "string",
            Primitive::Void => "void",
            Primitive::Undefined => "undefined",
        }
    }
}

impl SchemaNode {
    pub fn of_type(ty: &str) -> Self {
        Self { ty: Some(ty.to_string()), ..Self::default() }
    }

    pub fn void() -> Self { Self::of_type("void") }

    /// Decode a node from a raw JSON value (template arguments, overrides).
    pub fn from_value(value: &Value, id: &PathId) -> Result<Self> {
        serde_json::from_value(value.clone())
            .map_err(|error| RenderError::Input(format!("node at {id}: {error}")))
    }

    /// `{"$ref": "Promise", "value": ["return", result]}`: a reference whose
    /// only explicit template argument is `result`.
    pub fn promise_of(result: &SchemaNode) -> Result<Self> {
        let result = serde_json::to_value(result)
            .map_err(|error| RenderError::Input(format!("async result: {error}")))?;
        Ok(Self {
            reference: Some("Promise".to_string()),
            value: Some(Value::Array(vec![Value::from("return"), result])),
            ..Self::default()
        })
    }

    pub fn is_object(&self) -> bool { self.ty.as_deref() == Some("object") }

    /// Object types carrying the `instanceType` marker render as classes.
    pub fn has_instance_type(&self) -> bool {
        self.properties.as_ref().is_some_and(|props| props.contains_key("instanceType"))
    }

    /// Whether a `returns_async` node also allows the deferred-result form.
    pub fn supports_promises(&self) -> bool {
        !matches!(&self.does_not_support_promises, Some(v) if !v.is_null() && v != &Value::Bool(false))
    }

    /// Classify the node. First matching rule wins.
    pub fn shape(&self, id: &PathId) -> Result<Shape<'_>> {
        if let Some(instance) = &self.is_instance_of {
            return Ok(Shape::InstanceOf(instance));
        }
        if let Some(members) = &self.enum_ {
            if !matches!(self.ty.as_deref(), Some("string" | "integer")) {
                return Err(RenderError::BadEnumType { id: id.clone(), ty: self.ty.clone() });
            }
            if members.is_empty() {
                return Err(RenderError::EmptyEnum { id: id.clone() });
            }
            return Ok(Shape::Enum(members));
        }
        if let Some(choices) = &self.choices {
            if choices.is_empty() {
                return Err(RenderError::EmptyChoices { id: id.clone() });
            }
            return Ok(Shape::Choices(choices));
        }
        match self.ty.as_deref() {
            Some("array") => {
                return Ok(Shape::Array {
                    items: self.items.as_deref(),
                    min_items: self.min_items,
                    max_items: self.max_items,
                });
            }
            Some("object") => return Ok(Shape::Object),
            _ => {}
        }
        if let Some(reference) = &self.reference {
            return Ok(Shape::Reference(reference));
        }
        if let Some(value) = &self.value {
            return Ok(Shape::Literal(value));
        }
        match self.ty.as_deref() {
            Some("function") => Ok(Shape::Function),
            None if self.parameters.is_some() => Ok(Shape::Function),
            Some(ty) => Primitive::parse(ty)
                .map(Shape::Primitive)
                .ok_or_else(|| RenderError::unsupported(id, self)),
            None => Err(RenderError::unsupported(id, self)),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(v: Value) -> SchemaNode { serde_json::from_value(v).unwrap() }

    fn id() -> PathId { PathId::namespace("test").child("x") }

    #[test]
    fn deprecated_distinguishes_absent_null_and_reason() {
        assert_eq!(node(json!({"type": "string"})).deprecated, None);
        assert_eq!(node(json!({"type": "string", "deprecated": null})).deprecated, Some(None));
        assert_eq!(
            node(json!({"type": "string", "deprecated": "Use y"})).deprecated,
            Some(Some("Use y".to_string()))
        );
    }

    #[test]
    fn instance_of_wins_over_everything() {
        let n = node(json!({"type": "object", "isInstanceOf": "Window", "enum": []}));
        assert!(matches!(n.shape(&id()).unwrap(), Shape::InstanceOf("Window")));
    }

    #[test]
    fn enum_requires_string_or_integer() {
        let n = node(json!({"type": "boolean", "enum": [true]}));
        assert!(matches!(n.shape(&id()), Err(RenderError::BadEnumType { .. })));
        let n = node(json!({"type": "string", "enum": []}));
        assert!(matches!(n.shape(&id()), Err(RenderError::EmptyEnum { .. })));
    }

    #[test]
    fn enum_members_both_forms() {
        let n = node(json!({"type": "string", "enum": ["a", {"name": "b", "description": "B"}]}));
        let members = n.enum_.as_ref().unwrap();
        assert_eq!(members[0].literal(), "\"a\"");
        assert_eq!(members[1].literal(), "\"b\"");
        assert_eq!(members[1].description(), Some("B"));
    }

    #[test]
    fn object_type_precedes_ref() {
        let n = node(json!({"type": "object", "$ref": "Foo"}));
        assert!(matches!(n.shape(&id()).unwrap(), Shape::Object));
    }

    #[test]
    fn parameters_without_type_is_function() {
        let n = node(json!({"parameters": []}));
        assert!(matches!(n.shape(&id()).unwrap(), Shape::Function));
    }

    #[test]
    fn unknown_type_is_unsupported_and_names_node() {
        let n = node(json!({"type": "quaternion"}));
        match n.shape(&id()) {
            Err(RenderError::Unsupported { id, node }) => {
                assert_eq!(id.to_string(), "test.x");
                assert!(node.contains("quaternion"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(SchemaNode::default().shape(&id()), Err(RenderError::Unsupported { .. })));
    }

    #[test]
    fn promise_wrapper_carries_result_as_second_value() {
        let p = SchemaNode::promise_of(&SchemaNode::of_type("string")).unwrap();
        assert_eq!(p.reference.as_deref(), Some("Promise"));
        assert_eq!(p.value, Some(json!(["return", {"type": "string"}])));
    }

    #[test]
    fn namespace_flattens_generic_fields() {
        let ns: Namespace = serde_json::from_value(json!({
            "namespace": "a",
            "description": "Doc",
            "nodoc": true,
            "properties": {"x": {"type": "string", "value": "1"}},
            "functions": {}
        })).unwrap();
        assert_eq!(ns.namespace, "a");
        assert!(ns.node.nodoc);
        assert_eq!(ns.node.description.as_deref(), Some("Doc"));
        assert!(ns.node.properties.unwrap().contains_key("x"));
        assert!(ns.types.is_empty());
    }

    #[test]
    fn promise_support_flag() {
        assert!(SchemaNode::default().supports_promises());
        let n = node(json!({"does_not_support_promises": "Multiple results"}));
        assert!(!n.supports_promises());
    }
}
