//! Resource catalog
//!
//! The catalog owns everything the documentation engine treats as external
//! input: resource definitions, their schemas, endpoint settings, and the
//! mapping from resource names to type names. Definitions are loaded from
//! JSON, either one document for the whole catalog or a directory of
//! `*.resource.json` files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{DocError, Result};
use crate::naming;
use crate::schema::{parse_schema, SchemaNode};

/// Secondary lookup endpoint for a resource (e.g. by label instead of id)
#[derive(Debug, Clone, Deserialize)]
pub struct AdditionalLookup {
    pub url: String,
    pub field: String,
}

/// Raw resource definition as it appears in catalog JSON
#[derive(Debug, Clone, Deserialize)]
struct RawResourceDef {
    #[serde(default)]
    name: Option<String>,
    url: String,
    #[serde(default)]
    type_name: Option<String>,
    #[serde(default = "default_methods")]
    resource_methods: Vec<String>,
    #[serde(default = "default_methods")]
    item_methods: Vec<String>,
    #[serde(default = "default_item_url")]
    item_url: String,
    #[serde(default)]
    additional_lookup: Option<AdditionalLookup>,
    #[serde(default)]
    extra_response_fields: Vec<String>,
    #[serde(default)]
    projection: BTreeMap<String, bool>,
    #[serde(default)]
    parent: Option<String>,
    #[serde(default)]
    group: Option<String>,
    schema: Value,
}

fn default_methods() -> Vec<String> {
    vec!["GET".to_string()]
}

fn default_item_url() -> String {
    "string".to_string()
}

/// One documented resource: endpoint settings plus its parsed schema
#[derive(Debug, Clone)]
pub struct ResourceDef {
    /// Resource name, e.g. `events_snapshot`
    pub name: String,
    /// Type name shown in documentation, e.g. `Snapshot`
    pub type_name: String,
    /// Endpoint URL fragment
    pub url: String,
    /// Methods on the resource endpoint
    pub resource_methods: Vec<String>,
    /// Methods on the item endpoint
    pub item_methods: Vec<String>,
    /// URL converter for item ids (`string`, `objectid`, ...)
    pub item_url: String,
    pub additional_lookup: Option<AdditionalLookup>,
    /// Fields re-documented in write responses
    pub extra_response_fields: Vec<String>,
    /// Read projection; fields mapped to `false` are never returned
    pub projection: BTreeMap<String, bool>,
    /// Super-resource, drawn as an inheritance edge in diagrams
    pub parent: Option<String>,
    /// Diagram cluster this resource belongs to
    pub group: Option<String>,
    /// Top-level field declarations in declaration order
    pub fields: Vec<(String, SchemaNode)>,
}

impl ResourceDef {
    fn from_raw(name: String, raw: RawResourceDef) -> Result<Self> {
        let fields = parse_schema(&raw.schema).map_err(|e| DocError::MalformedResource {
            name: name.clone(),
            detail: e.to_string(),
        })?;

        let type_name = raw
            .type_name
            .unwrap_or_else(|| naming::type_name(&name));

        Ok(ResourceDef {
            name,
            type_name,
            url: raw.url,
            resource_methods: raw.resource_methods,
            item_methods: raw.item_methods,
            item_url: raw.item_url,
            additional_lookup: raw.additional_lookup,
            extra_response_fields: raw.extra_response_fields,
            projection: raw.projection,
            parent: raw.parent,
            group: raw.group,
            fields,
        })
    }

    /// Whether the schema declares its own id field
    pub fn declares_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }
}

/// The full set of documented resources, iterated in name order
#[derive(Debug, Clone, Default)]
pub struct ResourceCatalog {
    resources: BTreeMap<String, ResourceDef>,
}

impl ResourceCatalog {
    /// Build a catalog from one JSON document mapping resource names to definitions
    pub fn from_value(value: &Value) -> Result<Self> {
        let map = value.as_object().ok_or_else(|| DocError::MalformedResource {
            name: "<catalog>".to_string(),
            detail: "catalog must be a JSON object".to_string(),
        })?;

        let mut resources = BTreeMap::new();
        for (name, def) in map {
            let raw: RawResourceDef =
                serde_json::from_value(def.clone()).map_err(|e| DocError::MalformedResource {
                    name: name.clone(),
                    detail: e.to_string(),
                })?;
            let name = raw.name.clone().unwrap_or_else(|| name.clone());
            resources.insert(name.clone(), ResourceDef::from_raw(name, raw)?);
        }

        Ok(ResourceCatalog { resources })
    }

    /// Load a catalog from a single JSON file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content)?;
        Self::from_value(&value)
    }

    /// Collect `*.resource.json` definitions from a directory tree
    pub fn from_directory(dir: &Path) -> Result<Self> {
        let mut resources = BTreeMap::new();

        for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let filename = path.file_name().unwrap_or_default().to_string_lossy();
            if !filename.ends_with(".resource.json") {
                continue;
            }

            let content = fs::read_to_string(path)?;
            let raw: RawResourceDef =
                serde_json::from_str(&content).map_err(|e| DocError::MalformedResource {
                    name: filename.to_string(),
                    detail: e.to_string(),
                })?;

            let name = raw.name.clone().unwrap_or_else(|| {
                filename.trim_end_matches(".resource.json").to_string()
            });
            debug!(resource = %name, path = %path.display(), "loaded resource definition");
            resources.insert(name.clone(), ResourceDef::from_raw(name, raw)?);
        }

        Ok(ResourceCatalog { resources })
    }

    /// Number of resources in the catalog
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Get a resource definition by resource name
    pub fn get(&self, name: &str) -> Option<&ResourceDef> {
        self.resources.get(name)
    }

    /// Resolve a resource name to its type name
    ///
    /// Failing here is the unknown-reference condition: a `data_relation`
    /// points at a resource the catalog does not know.
    pub fn type_name(&self, resource: &str) -> Result<&str> {
        self.resources
            .get(resource)
            .map(|def| def.type_name.as_str())
            .ok_or_else(|| DocError::UnknownResource(resource.to_string()))
    }

    /// Resources in name order
    pub fn iter(&self) -> impl Iterator<Item = &ResourceDef> {
        self.resources.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn catalog() -> ResourceCatalog {
        ResourceCatalog::from_value(&json!({
            "users": {
                "url": "users",
                "schema": {"email": {"type": "string", "required": true}}
            },
            "events_snapshot": {
                "url": "events/snapshot",
                "resource_methods": ["POST"],
                "schema": {"device": {"type": "dict"}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_type_names_derived() {
        let catalog = catalog();
        assert_eq!(catalog.type_name("users").unwrap(), "User");
        assert_eq!(catalog.type_name("events_snapshot").unwrap(), "Snapshot");
    }

    #[test]
    fn test_unknown_resource() {
        let err = catalog().type_name("nowhere").unwrap_err();
        assert!(matches!(err, DocError::UnknownResource(ref r) if r == "nowhere"));
    }

    #[test]
    fn test_iteration_is_name_ordered() {
        let catalog = catalog();
        let names: Vec<&str> = catalog.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["events_snapshot", "users"]);
    }

    #[test]
    fn test_method_defaults() {
        let catalog = catalog();
        let users = catalog.get("users").unwrap();
        assert_eq!(users.resource_methods, vec!["GET"]);
        let snapshot = catalog.get("events_snapshot").unwrap();
        assert_eq!(snapshot.resource_methods, vec!["POST"]);
    }

    #[test]
    fn test_bad_schema_is_malformed_resource() {
        let err = ResourceCatalog::from_value(&json!({
            "users": {"url": "users", "schema": {"email": {"required": true}}}
        }))
        .unwrap_err();
        assert!(matches!(err, DocError::MalformedResource { .. }));
    }
}
