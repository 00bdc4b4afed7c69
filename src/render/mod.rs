//! Documentation renderers
//!
//! Both renderers consume the same ordered field descriptors from the
//! flattening engine; this module only holds the shared display helpers.

pub mod diagram;
pub mod rst;

pub use diagram::DiagramRenderer;
pub use rst::RstRenderer;

use serde_json::Value;

/// Render a JSON value for human-facing output (strings unquoted)
pub(crate) fn value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Render a list of JSON values as a comma-separated label
pub(crate) fn value_list_label(values: &[Value]) -> String {
    values.iter().map(value_label).collect::<Vec<_>>().join(", ")
}
