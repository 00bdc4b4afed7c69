//! Flattening engine tests over the fixture catalog
//!
//! Exercises the full path from raw catalog JSON to flat field descriptors:
//! declaration order, access-mode suppression, nested expansion, references,
//! special-case overrides, and sink ordering.

use std::path::PathBuf;

use resdoc::{order_by_sink, AccessMode, FieldType, FlattenContext, Flattener, ResourceCatalog};
use serde_json::json;

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn catalog() -> ResourceCatalog {
    ResourceCatalog::from_directory(&fixtures_path()).unwrap()
}

// =============================================================================
// Catalog Loading
// =============================================================================

#[test]
fn test_catalog_loads_fixtures() {
    let catalog = catalog();
    assert_eq!(catalog.len(), 6);
    assert_eq!(catalog.type_name("users").unwrap(), "User");
    assert_eq!(catalog.type_name("devices").unwrap(), "Device");
    assert_eq!(catalog.type_name("components").unwrap(), "Component");
    assert_eq!(catalog.type_name("events_snapshot").unwrap(), "Snapshot");
    assert_eq!(catalog.type_name("events").unwrap(), "Event");
    assert_eq!(catalog.type_name("places").unwrap(), "Place");
}

#[test]
fn test_catalog_from_written_directory() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("gadgets.resource.json"),
        r#"{"url": "gadgets", "schema": {"label": {"type": "string"}}}"#,
    )
    .unwrap();

    let catalog = ResourceCatalog::from_directory(dir.path()).unwrap();
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.type_name("gadgets").unwrap(), "Gadget");
}

// =============================================================================
// Flattening by Access Mode
// =============================================================================

#[test]
fn test_read_flatten_preserves_declaration_order() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let users = catalog.get("users").unwrap();

    let ctx = FlattenContext::new(&users.type_name, AccessMode::Read).with_projection(&users.projection);
    let descriptors = flattener.flatten(&users.fields, &ctx).unwrap();

    // password is write-only and projected out
    let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["email", "role", "name", "active"]);
}

#[test]
fn test_create_keeps_writeonly_and_non_modifiable() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let users = catalog.get("users").unwrap();

    let ctx = FlattenContext::new(&users.type_name, AccessMode::Create).with_projection(&users.projection);
    let descriptors = flattener.flatten(&users.fields, &ctx).unwrap();
    let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["email", "password", "role", "name", "active"]);
}

#[test]
fn test_updates_drop_non_modifiable() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let users = catalog.get("users").unwrap();

    for mode in [AccessMode::PartialUpdate, AccessMode::FullUpdate] {
        let ctx = FlattenContext::new(&users.type_name, mode).with_projection(&users.projection);
        let descriptors = flattener.flatten(&users.fields, &ctx).unwrap();
        let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["email", "password", "role", "name"]);
    }
}

#[test]
fn test_all_fields_suppressed_is_empty_not_error() {
    let catalog = ResourceCatalog::from_value(&json!({
        "stats": {"url": "stats", "schema": {"computed": {"type": "natural", "readonly": true}}}
    }))
    .unwrap();
    let flattener = Flattener::new(&catalog);
    let stats = catalog.get("stats").unwrap();

    let ctx = FlattenContext::new(&stats.type_name, AccessMode::Create);
    assert!(flattener.flatten(&stats.fields, &ctx).unwrap().is_empty());
}

// =============================================================================
// References and Nested Expansion
// =============================================================================

#[test]
fn test_relation_field_references_target_type() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let devices = catalog.get("devices").unwrap();

    let ctx = FlattenContext::new(&devices.type_name, AccessMode::Read);
    let descriptors = flattener.flatten(&devices.fields, &ctx).unwrap();

    let owner = descriptors.iter().find(|d| d.name == "owner").unwrap();
    assert_eq!(owner.field_type, FieldType::Primitive("objectid".to_string()));
    assert_eq!(owner.reference.as_deref(), Some("User"));
}

#[test]
fn test_nested_resource_becomes_composite_type() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let devices = catalog.get("devices").unwrap();

    let ctx = FlattenContext::new(&devices.type_name, AccessMode::Read);
    let descriptors = flattener.flatten(&devices.fields, &ctx).unwrap();

    let place = descriptors.iter().find(|d| d.name == "place").unwrap();
    assert_eq!(place.field_type, FieldType::DictOf("Place".to_string()));
    assert!(place.reference.is_none());
    // none of the place's own fields leak into the parent resource
    assert!(!descriptors.iter().any(|d| d.name.starts_with("place.")));
}

#[test]
fn test_nested_dict_expands_into_dotted_children() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let devices = catalog.get("devices").unwrap();

    let ctx = FlattenContext::new(&devices.type_name, AccessMode::Read);
    let descriptors = flattener.flatten(&devices.fields, &ctx).unwrap();

    let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert!(names.contains(&"condition.appearance"));
    assert!(names.contains(&"condition.score"));
    assert!(!names.contains(&"condition"));
}

#[test]
fn test_list_of_references() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let places = catalog.get("places").unwrap();

    let ctx = FlattenContext::new(&places.type_name, AccessMode::Read);
    let descriptors = flattener.flatten(&places.fields, &ctx).unwrap();

    let devices = descriptors.iter().find(|d| d.name == "devices").unwrap();
    assert_eq!(devices.field_type, FieldType::List);
    assert_eq!(devices.reference.as_deref(), Some("Device"));
}

#[test]
fn test_unknown_reference_propagates() {
    let catalog = ResourceCatalog::from_value(&json!({
        "tickets": {"url": "tickets", "schema": {
            "assignee": {"type": "objectid", "data_relation": {"resource": "nowhere"}}
        }}
    }))
    .unwrap();
    let flattener = Flattener::new(&catalog);
    let tickets = catalog.get("tickets").unwrap();

    let ctx = FlattenContext::new(&tickets.type_name, AccessMode::Read);
    assert!(flattener.flatten(&tickets.fields, &ctx).is_err());
}

// =============================================================================
// Special-Case Overrides
// =============================================================================

#[test]
fn test_snapshot_device_override_beats_relation() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let snapshot = catalog.get("events_snapshot").unwrap();

    // the declared data_relation would make this a Device reference of type
    // dict; the override wins on both read and write
    let ctx = FlattenContext::new(&snapshot.type_name, AccessMode::Read);
    let descriptors = flattener.flatten(&snapshot.fields, &ctx).unwrap();
    let device = descriptors.iter().find(|d| d.name == "device").unwrap();
    assert_eq!(device.field_type, FieldType::Primitive("string".to_string()));
    assert_eq!(device.reference.as_deref(), Some("Device"));

    let ctx = FlattenContext::new(&snapshot.type_name, AccessMode::Create);
    let descriptors = flattener.flatten(&snapshot.fields, &ctx).unwrap();
    let device = descriptors.iter().find(|d| d.name == "device").unwrap();
    assert_eq!(device.field_type, FieldType::DictOf("Device".to_string()));
    assert!(device.reference.is_none());
}

#[test]
fn test_device_components_by_mode() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let devices = catalog.get("devices").unwrap();

    let ctx = FlattenContext::new(&devices.type_name, AccessMode::Read);
    let descriptors = flattener.flatten(&devices.fields, &ctx).unwrap();
    let components = descriptors.iter().find(|d| d.name == "components").unwrap();
    assert_eq!(components.field_type, FieldType::List);
    assert_eq!(components.reference.as_deref(), Some("Component"));

    let ctx = FlattenContext::new(&devices.type_name, AccessMode::PartialUpdate);
    let descriptors = flattener.flatten(&devices.fields, &ctx).unwrap();
    let components = descriptors.iter().find(|d| d.name == "components").unwrap();
    assert_eq!(components.field_type, FieldType::ListOf("Component".to_string()));
    assert!(components.reference.is_none());
}

#[test]
fn test_special_case_keeps_node_attributes() {
    let catalog = catalog();
    let flattener = Flattener::new(&catalog);
    let snapshot = catalog.get("events_snapshot").unwrap();

    let ctx = FlattenContext::new(&snapshot.type_name, AccessMode::Create);
    let descriptors = flattener.flatten(&snapshot.fields, &ctx).unwrap();
    let device = descriptors.iter().find(|d| d.name == "device").unwrap();
    assert!(device.attributes.is_required());
}

// =============================================================================
// End-to-End Examples
// =============================================================================

fn things_catalog(name_readonly: bool) -> ResourceCatalog {
    let mut name = json!({"type": "string", "required": true});
    if name_readonly {
        name["readonly"] = json!(true);
    }
    ResourceCatalog::from_value(&json!({
        "users": {"url": "users", "schema": {"email": {"type": "string"}}},
        "things": {"url": "things", "schema": {
            "name": name,
            "owner": {"type": "objectid", "data_relation": {"resource": "users"}},
            "meta": {"type": "dict", "schema": {"color": {"type": "string", "sink": 5}}}
        }}
    }))
    .unwrap()
}

#[test]
fn test_end_to_end_read() {
    let catalog = things_catalog(false);
    let flattener = Flattener::new(&catalog);
    let things = catalog.get("things").unwrap();

    let ctx = FlattenContext::new(&things.type_name, AccessMode::Read);
    let mut descriptors = flattener.flatten(&things.fields, &ctx).unwrap();

    assert_eq!(descriptors.len(), 3);
    assert_eq!(descriptors[0].name, "name");
    assert!(descriptors[0].attributes.is_required());
    assert_eq!(descriptors[1].name, "owner");
    assert_eq!(descriptors[1].field_type, FieldType::Primitive("objectid".to_string()));
    assert_eq!(descriptors[1].reference.as_deref(), Some("User"));
    assert_eq!(descriptors[2].name, "meta.color");
    assert_eq!(descriptors[2].attributes.sink, 5);

    order_by_sink(&mut descriptors);
    let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["meta.color", "name", "owner"]);
}

#[test]
fn test_end_to_end_write_omits_readonly() {
    let catalog = things_catalog(true);
    let flattener = Flattener::new(&catalog);
    let things = catalog.get("things").unwrap();

    let ctx = FlattenContext::new(&things.type_name, AccessMode::Create);
    let descriptors = flattener.flatten(&things.fields, &ctx).unwrap();

    let names: Vec<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["owner", "meta.color"]);
}
