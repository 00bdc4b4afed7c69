//! Field flattening
//!
//! The core transformation: a nested resource schema becomes a flat list of
//! documentable fields. Nested dict schemas expand into dotted `parent.child`
//! names, relations resolve to type names through the catalog, and a handful
//! of irregular fields are overridden by the special-case table before any
//! generic inference runs.
//!
//! Flattening is a pure function of the schema and the access-mode context;
//! a field suppressed for the current mode simply produces no descriptor.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use crate::catalog::ResourceCatalog;
use crate::error::Result;
use crate::schema::{FieldAttributes, NestedSchema, SchemaKind, SchemaNode};
use crate::special;
use crate::units;

/// Operation under which a schema is being flattened
///
/// Governs read-only/write-only/non-modifiable suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Create,
    Read,
    PartialUpdate,
    FullUpdate,
    Delete,
    /// No operation context (e.g. class diagrams)
    None,
}

impl AccessMode {
    /// Map an HTTP method token to its access mode
    pub fn from_method(method: &str) -> Self {
        match method {
            "POST" => AccessMode::Create,
            "GET" => AccessMode::Read,
            "PATCH" => AccessMode::PartialUpdate,
            "PUT" => AccessMode::FullUpdate,
            "DELETE" => AccessMode::Delete,
            _ => AccessMode::None,
        }
    }

    pub fn is_write(self) -> bool {
        matches!(
            self,
            AccessMode::Create | AccessMode::PartialUpdate | AccessMode::FullUpdate
        )
    }

    pub fn is_update(self) -> bool {
        matches!(self, AccessMode::PartialUpdate | AccessMode::FullUpdate)
    }

    pub fn is_read(self) -> bool {
        self == AccessMode::Read
    }
}

/// Documented type of a field
///
/// Composite forms are synthesized when a list/dict field nests a known
/// resource type rather than a plain field mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Scalar type by its primitive name
    Primitive(String),
    List,
    Dict,
    /// List whose elements are a known resource type
    ListOf(String),
    /// Dict holding an embedded resource of a known type
    DictOf(String),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Primitive(name) => write!(f, "{}", name),
            FieldType::List => write!(f, "list"),
            FieldType::Dict => write!(f, "dict"),
            FieldType::ListOf(resource) => write!(f, "list_of_{}", resource),
            FieldType::DictOf(resource) => write!(f, "dict_of_{}", resource),
        }
    }
}

/// One flat, documentable field
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Dotted path; nested fields are named `parent.child`
    pub name: String,
    pub field_type: FieldType,
    /// Target type name when the field denotes a relation to another resource
    pub reference: Option<String>,
    /// Declarative attributes, every slot present
    pub attributes: FieldAttributes,
}

/// Context for one flattening pass, constructed once and never mutated
#[derive(Debug, Clone)]
pub struct FlattenContext<'a> {
    /// Type name of the resource being flattened
    pub type_name: &'a str,
    pub mode: AccessMode,
    /// Read projection; fields mapped to `false` never appear under read mode
    pub projection: Option<&'a BTreeMap<String, bool>>,
}

impl<'a> FlattenContext<'a> {
    pub fn new(type_name: &'a str, mode: AccessMode) -> Self {
        FlattenContext {
            type_name,
            mode,
            projection: None,
        }
    }

    pub fn with_projection(mut self, projection: &'a BTreeMap<String, bool>) -> Self {
        self.projection = Some(projection);
        self
    }
}

/// Flattens resource schemas against a catalog
pub struct Flattener<'a> {
    catalog: &'a ResourceCatalog,
}

impl<'a> Flattener<'a> {
    pub fn new(catalog: &'a ResourceCatalog) -> Self {
        Flattener { catalog }
    }

    /// Flatten a field mapping into descriptors, preserving declaration order
    ///
    /// An empty result means no field is documentable under this context;
    /// callers treat that as nothing to emit, not as a failure.
    pub fn flatten(
        &self,
        fields: &[(String, SchemaNode)],
        ctx: &FlattenContext<'_>,
    ) -> Result<Vec<FieldDescriptor>> {
        let mut out = Vec::new();
        for (name, node) in fields {
            out.extend(self.resolve_field(name, node, ctx)?);
        }
        Ok(out)
    }

    /// Resolve one field into zero or more descriptors
    ///
    /// Zero when the field is suppressed for the context's access mode; more
    /// than one when a nested dict schema expands into child fields.
    pub fn resolve_field(
        &self,
        name: &str,
        node: &SchemaNode,
        ctx: &FlattenContext<'_>,
    ) -> Result<Vec<FieldDescriptor>> {
        if self.suppressed(name, node, ctx) {
            return Ok(Vec::new());
        }

        let mut draft = FieldDescriptor {
            name: name.to_string(),
            field_type: initial_type(&node.kind),
            reference: None,
            attributes: documented_attrs(&node.attrs),
        };

        // Irregular fields bypass inference entirely; their shape depends on
        // the access mode, not on the declared schema.
        if let Some((field_type, reference)) = special::resolve(ctx.type_name, name, ctx.mode) {
            draft.field_type = field_type;
            draft.reference = reference;
            return Ok(vec![draft]);
        }

        let mut expansion = None;

        if let Some(relation) = &node.relation {
            draft.reference = Some(self.catalog.type_name(&relation.resource)?.to_string());
        } else {
            match &node.kind {
                SchemaKind::List(Some(inner)) => {
                    if let Some(relation) = &inner.relation {
                        draft.reference =
                            Some(self.catalog.type_name(&relation.resource)?.to_string());
                    } else if let SchemaKind::Dict(Some(nested)) = &inner.kind {
                        expansion = self.expand_nested(&mut draft, nested, ctx)?;
                    }
                }
                SchemaKind::Dict(Some(nested)) => {
                    expansion = self.expand_nested(&mut draft, nested, ctx)?;
                }
                _ => {}
            }
        }

        Ok(expansion.unwrap_or_else(|| vec![draft]))
    }

    /// Expand a nested dict schema
    ///
    /// A nested known resource turns the parent's type into the composite
    /// `list_of_X`/`dict_of_X` form and stays opaque (`None`: the parent
    /// descriptor stands alone). A plain field mapping flattens recursively
    /// into dotted children, which replace the parent in the output.
    fn expand_nested(
        &self,
        parent: &mut FieldDescriptor,
        nested: &NestedSchema,
        ctx: &FlattenContext<'_>,
    ) -> Result<Option<Vec<FieldDescriptor>>> {
        match nested {
            NestedSchema::Resource(resource) => {
                let type_name = self.catalog.type_name(resource)?.to_string();
                parent.field_type = if matches!(parent.field_type, FieldType::List) {
                    FieldType::ListOf(type_name)
                } else {
                    FieldType::DictOf(type_name)
                };
                Ok(None)
            }
            NestedSchema::Fields(fields) => {
                let mut children = self.flatten(fields, ctx)?;
                for child in &mut children {
                    child.name = format!("{}.{}", parent.name, child.name);
                }
                Ok(Some(children))
            }
        }
    }

    fn suppressed(&self, name: &str, node: &SchemaNode, ctx: &FlattenContext<'_>) -> bool {
        let attrs = &node.attrs;
        if attrs.is_readonly() && ctx.mode.is_write() {
            return true;
        }
        if attrs.is_writeonly() && ctx.mode.is_read() {
            return true;
        }
        if !attrs.is_modifiable() && ctx.mode.is_update() {
            return true;
        }
        if ctx.mode.is_read() {
            if let Some(projection) = ctx.projection {
                if projection.get(name) == Some(&false) {
                    return true;
                }
            }
        }
        false
    }
}

/// Stable descending sort on each descriptor's sink weight
///
/// Ties keep their discovery order, so structural fields (negative sink)
/// land after regular fields (sink 0) after prioritized fields.
pub fn order_by_sink(fields: &mut [FieldDescriptor]) {
    fields.sort_by_key(|f| Reverse(f.attributes.sink));
}

fn initial_type(kind: &SchemaKind) -> FieldType {
    match kind {
        SchemaKind::Primitive(name) => FieldType::Primitive(name.clone()),
        SchemaKind::List(_) => FieldType::List,
        SchemaKind::Dict(_) => FieldType::Dict,
    }
}

/// Attributes as they appear on a descriptor: unit codes humanized
fn documented_attrs(attrs: &FieldAttributes) -> FieldAttributes {
    let mut attrs = attrs.clone();
    attrs.unit_code = attrs.unit_code.as_deref().map(units::humanize);
    attrs
}
