//! Key naming helpers
//!
//! Callers key cached reads as `resource:segment`, e.g. `patients:42` or
//! `appointments:list:doctor=7`, so a write to a resource can drop every
//! cached read of it with `resource:*`.

/// Separator between key segments.
pub const SEPARATOR: char = ':';

/// Key of a single record, e.g. `patients:42`.
pub fn entity_key(resource: &str, id: impl std::fmt::Display) -> String {
    format!("{resource}{SEPARATOR}{id}")
}

/// Key of a list query, e.g. `patients:list:ward=3&page=1`.
pub fn list_key(resource: &str, query: &str) -> String {
    format!("{resource}{SEPARATOR}list{SEPARATOR}{query}")
}

/// Pattern matching every key of `resource`.
pub fn resource_pattern(resource: &str) -> String {
    format!("{resource}{SEPARATOR}*")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::KeyPattern;

    #[test]
    fn test_key_shapes() {
        assert_eq!(entity_key("patients", 42), "patients:42");
        assert_eq!(list_key("appointments", "doctor=7"), "appointments:list:doctor=7");
        assert_eq!(resource_pattern("labs"), "labs:*");
    }

    #[test]
    fn test_resource_pattern_covers_its_keys_only() {
        let pattern = KeyPattern::compile(&resource_pattern("patients")).unwrap();

        assert!(pattern.is_match(&entity_key("patients", 1)));
        assert!(pattern.is_match(&list_key("patients", "ward=2")));
        assert!(!pattern.is_match(&entity_key("patients_archive", 1)));
        assert!(!pattern.is_match(&entity_key("doctors", 1)));
    }
}
