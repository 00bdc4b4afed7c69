//! UN/CEFACT unit codes
//!
//! Fields may carry a `unitCode` constraint naming the unit of their numeric
//! value. Documentation output shows the human-readable label next to the
//! raw code, e.g. `gigabyte (E34)`.

/// Unit codes appearing in resource schemas, with their human labels
const UNIT_CODES: &[(&str, &str)] = &[
    ("A99", "bit"),
    ("4L", "megabyte"),
    ("E34", "gigabyte"),
    ("E20", "megabit per second"),
    ("MHZ", "megahertz"),
    ("A86", "gigahertz"),
    ("KGM", "kilogram"),
    ("MTR", "metre"),
];

/// Render a unit code as `label (CODE)`, or the bare code when unknown
pub fn humanize(code: &str) -> String {
    match UNIT_CODES.iter().find(|(c, _)| *c == code) {
        Some((_, label)) => format!("{} ({})", label, code),
        None => code.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code() {
        assert_eq!(humanize("E34"), "gigabyte (E34)");
        assert_eq!(humanize("MHZ"), "megahertz (MHZ)");
    }

    #[test]
    fn test_unknown_code_passes_through() {
        assert_eq!(humanize("XYZ"), "XYZ");
    }
}
