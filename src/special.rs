//! Special-case field overrides
//!
//! A few resources expose `device` and `components` fields whose documented
//! shape depends on the access mode rather than on the declared schema: reads
//! return identifiers, writes take embedded representations. The table below
//! overrides type and reference for exactly those fields; everything else
//! goes through generic inference.

use crate::fields::{AccessMode, FieldType};

/// Resources whose `device`/`components` fields are irregular
const SPECIAL_RESOURCES: &[&str] = &["Snapshot", "Register", "Device"];

/// Look up an override for `(resource type name, field name)`
///
/// A hit fully determines the field's type and reference; the caller must
/// not run generic inference afterwards, even when the underlying node also
/// declares a relation.
pub fn resolve(
    type_name: &str,
    field_name: &str,
    mode: AccessMode,
) -> Option<(FieldType, Option<String>)> {
    if !SPECIAL_RESOURCES.contains(&type_name) {
        return None;
    }

    match field_name {
        "device" => Some(if mode.is_read() {
            (FieldType::Primitive("string".to_string()), Some("Device".to_string()))
        } else {
            (FieldType::DictOf("Device".to_string()), None)
        }),
        "components" => Some(if mode.is_read() {
            (FieldType::List, Some("Component".to_string()))
        } else {
            (FieldType::ListOf("Component".to_string()), None)
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_on_read() {
        let (field_type, reference) = resolve("Snapshot", "device", AccessMode::Read).unwrap();
        assert_eq!(field_type, FieldType::Primitive("string".to_string()));
        assert_eq!(reference.as_deref(), Some("Device"));
    }

    #[test]
    fn test_device_on_write() {
        for mode in [AccessMode::Create, AccessMode::PartialUpdate, AccessMode::FullUpdate] {
            let (field_type, reference) = resolve("Register", "device", mode).unwrap();
            assert_eq!(field_type, FieldType::DictOf("Device".to_string()));
            assert!(reference.is_none());
        }
    }

    #[test]
    fn test_components_on_read() {
        let (field_type, reference) = resolve("Device", "components", AccessMode::Read).unwrap();
        assert_eq!(field_type, FieldType::List);
        assert_eq!(reference.as_deref(), Some("Component"));
    }

    #[test]
    fn test_components_on_write() {
        let (field_type, reference) = resolve("Snapshot", "components", AccessMode::Create).unwrap();
        assert_eq!(field_type, FieldType::ListOf("Component".to_string()));
        assert!(reference.is_none());
    }

    #[test]
    fn test_other_resources_untouched() {
        assert!(resolve("User", "device", AccessMode::Read).is_none());
        assert!(resolve("Snapshot", "label", AccessMode::Read).is_none());
    }
}
