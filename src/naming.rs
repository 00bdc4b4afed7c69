//! Resource naming
//!
//! Resolves plural, snake_case resource names to the PascalCase type names
//! used in documentation output. Compound resource names keep only their
//! final segment: `events_snapshot` names the `Snapshot` type.

/// Derive a type name from a resource name (`users` -> `User`)
pub fn type_name(resource: &str) -> String {
    let last = resource.rsplit('_').next().unwrap_or(resource);
    to_pascal_case(&singularize(last))
}

/// Naive English singularization, sufficient for resource-name vocabulary
fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies") {
        return format!("{}y", stem);
    }
    for suffix in ["ses", "xes", "zes", "ches", "shes"] {
        if let Some(stem) = word.strip_suffix(suffix) {
            return format!("{}{}", stem, &suffix[..suffix.len() - 2]);
        }
    }
    if word.ends_with('s') && !word.ends_with("ss") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

/// Convert a snake_case or kebab-case name to PascalCase
pub fn to_pascal_case(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut capitalize_next = true;

    for c in s.chars() {
        if c == '_' || c == '-' || c == ' ' {
            capitalize_next = true;
        } else if capitalize_next {
            result.push(c.to_ascii_uppercase());
            capitalize_next = false;
        } else {
            result.push(c);
        }
    }

    result
}
