//! Schema node model
//!
//! Resource schemas arrive as nested JSON mappings owned by the resource
//! configuration system. This module parses them into a typed tree the
//! flattener dispatches on, instead of probing raw maps for key presence.
//!
//! A node is one field declaration: its container kind, an optional relation
//! to another resource, and the declarative attribute set. Nested mappings
//! keep their declaration order.

use serde_json::Value;

use crate::error::{DocError, Result};

/// One field declaration in a resource schema
#[derive(Debug, Clone)]
pub struct SchemaNode {
    /// Container kind the flattener dispatches on
    pub kind: SchemaKind,
    /// Relation to another resource, when the field holds identifiers
    pub relation: Option<DataRelation>,
    /// Declarative attributes, fully populated (absent keys are `None`)
    pub attrs: FieldAttributes,
}

/// Container kind of a field
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// Scalar leaf carrying its primitive type name (`string`, `objectid`, ...)
    Primitive(String),
    /// List, with its element schema when declared
    List(Option<Box<SchemaNode>>),
    /// Dict, with its nested schema when declared
    Dict(Option<NestedSchema>),
}

/// What a dict-typed field nests
#[derive(Debug, Clone)]
pub enum NestedSchema {
    /// Plain field mapping, expanded into dotted child fields
    Fields(Vec<(String, SchemaNode)>),
    /// The nested schema is a known resource type, kept opaque
    Resource(String),
}

/// Relation of a field to another resource
#[derive(Debug, Clone)]
pub struct DataRelation {
    /// Resource name the relation targets
    pub resource: String,
    /// Field on the target the relation stores, `_id` unless declared
    pub field: String,
    /// Whether the full document may be embedded in responses
    pub embeddable: bool,
}

/// Declarative metadata of one field
///
/// Every slot exists on every field; consumers never need existence checks.
/// `sink` weights output ordering, `modifiable` defaults to true.
#[derive(Debug, Clone, Default)]
pub struct FieldAttributes {
    pub unique: Option<bool>,
    pub default: Option<Value>,
    pub allowed: Option<Vec<Value>>,
    pub required: Option<bool>,
    pub description: Option<String>,
    pub doc: Option<String>,
    pub readonly: Option<bool>,
    pub writeonly: Option<bool>,
    pub modifiable: Option<bool>,
    pub sink: i64,
    pub unit_code: Option<String>,
    pub write_roles: Option<Vec<String>>,
    pub or_groups: Option<Vec<String>>,
    pub excludes: Option<Vec<String>>,
}

impl FieldAttributes {
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly.unwrap_or(false)
    }

    pub fn is_writeonly(&self) -> bool {
        self.writeonly.unwrap_or(false)
    }

    pub fn is_modifiable(&self) -> bool {
        self.modifiable.unwrap_or(true)
    }
}

/// Parse a top-level resource schema: a mapping from field name to node
pub fn parse_schema(value: &Value) -> Result<Vec<(String, SchemaNode)>> {
    let map = value.as_object().ok_or_else(|| DocError::MalformedSchema {
        field: "<root>".to_string(),
        detail: "schema must be a JSON object".to_string(),
    })?;

    let mut fields = Vec::with_capacity(map.len());
    for (name, node) in map {
        fields.push((name.clone(), SchemaNode::from_value(name, node)?));
    }
    Ok(fields)
}

impl SchemaNode {
    /// Parse one field declaration; `field` names it in error messages
    pub fn from_value(field: &str, value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| malformed(field, "field declaration must be a JSON object"))?;

        let type_name = map
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed(field, "missing 'type'"))?;

        let kind = match type_name {
            "list" => {
                let inner = match map.get("schema") {
                    Some(v) => Some(Box::new(SchemaNode::from_value(field, v)?)),
                    None => None,
                };
                SchemaKind::List(inner)
            }
            "dict" => {
                let nested = match map.get("schema") {
                    Some(Value::String(resource)) => Some(NestedSchema::Resource(resource.clone())),
                    Some(v @ Value::Object(_)) => Some(NestedSchema::Fields(parse_schema(v)?)),
                    Some(_) => return Err(malformed(field, "'schema' must be an object or a resource name")),
                    None => None,
                };
                SchemaKind::Dict(nested)
            }
            primitive => SchemaKind::Primitive(primitive.to_string()),
        };

        let relation = match map.get("data_relation") {
            Some(v) => Some(DataRelation::from_value(field, v)?),
            None => None,
        };

        Ok(SchemaNode {
            kind,
            relation,
            attrs: parse_attrs(map),
        })
    }
}

impl DataRelation {
    fn from_value(field: &str, value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| malformed(field, "'data_relation' must be a JSON object"))?;
        let resource = map
            .get("resource")
            .and_then(|v| v.as_str())
            .ok_or_else(|| malformed(field, "'data_relation' missing 'resource'"))?;

        Ok(DataRelation {
            resource: resource.to_string(),
            field: map
                .get("field")
                .and_then(|v| v.as_str())
                .unwrap_or("_id")
                .to_string(),
            embeddable: map.get("embeddable").and_then(|v| v.as_bool()).unwrap_or(false),
        })
    }
}

fn parse_attrs(map: &serde_json::Map<String, Value>) -> FieldAttributes {
    FieldAttributes {
        unique: map.get("unique").and_then(|v| v.as_bool()),
        default: map.get("default").cloned(),
        allowed: map.get("allowed").and_then(|v| v.as_array()).cloned(),
        required: map.get("required").and_then(|v| v.as_bool()),
        description: string_attr(map, "description"),
        doc: string_attr(map, "doc"),
        readonly: map.get("readonly").and_then(|v| v.as_bool()),
        writeonly: map.get("writeonly").and_then(|v| v.as_bool()),
        modifiable: map.get("modifiable").and_then(|v| v.as_bool()),
        sink: map.get("sink").and_then(|v| v.as_i64()).unwrap_or(0),
        unit_code: string_attr(map, "unitCode"),
        write_roles: string_list_attr(map, "allowed_write_roles"),
        or_groups: string_list_attr(map, "or"),
        excludes: string_list_attr(map, "excludes"),
    }
}

fn string_attr(map: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    map.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn string_list_attr(map: &serde_json::Map<String, Value>, key: &str) -> Option<Vec<String>> {
    map.get(key).and_then(|v| v.as_array()).map(|items| {
        items
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    })
}

fn malformed(field: &str, detail: &str) -> DocError {
    DocError::MalformedSchema {
        field: field.to_string(),
        detail: detail.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_node() {
        let node = SchemaNode::from_value("label", &json!({"type": "string", "required": true})).unwrap();
        assert!(matches!(node.kind, SchemaKind::Primitive(ref t) if t == "string"));
        assert!(node.attrs.is_required());
        assert!(node.relation.is_none());
    }

    #[test]
    fn test_missing_type_is_malformed() {
        let err = SchemaNode::from_value("label", &json!({"required": true})).unwrap_err();
        assert!(matches!(err, DocError::MalformedSchema { .. }));
    }

    #[test]
    fn test_dict_with_nested_fields() {
        let node = SchemaNode::from_value(
            "meta",
            &json!({"type": "dict", "schema": {"color": {"type": "string"}}}),
        )
        .unwrap();
        match node.kind {
            SchemaKind::Dict(Some(NestedSchema::Fields(ref fields))) => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields[0].0, "color");
            }
            ref other => panic!("expected nested fields, got {:?}", other),
        }
    }

    #[test]
    fn test_dict_of_resource() {
        let node = SchemaNode::from_value("place", &json!({"type": "dict", "schema": "places"})).unwrap();
        assert!(matches!(
            node.kind,
            SchemaKind::Dict(Some(NestedSchema::Resource(ref r))) if r == "places"
        ));
    }

    #[test]
    fn test_data_relation_defaults() {
        let node = SchemaNode::from_value(
            "owner",
            &json!({"type": "objectid", "data_relation": {"resource": "users"}}),
        )
        .unwrap();
        let relation = node.relation.unwrap();
        assert_eq!(relation.resource, "users");
        assert_eq!(relation.field, "_id");
        assert!(!relation.embeddable);
    }

    #[test]
    fn test_declaration_order_preserved() {
        let schema = json!({"zeta": {"type": "string"}, "alpha": {"type": "string"}, "mid": {"type": "integer"}});
        let fields = parse_schema(&schema).unwrap();
        let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_modifiable_defaults_true() {
        let node = SchemaNode::from_value("label", &json!({"type": "string"})).unwrap();
        assert!(node.attrs.is_modifiable());
        assert_eq!(node.attrs.sink, 0);
    }
}
