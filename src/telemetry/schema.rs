//! Positional column schema for the analytics sink
//!
//! The sink stores each event as two positional arrays: string "blob" slots
//! and numeric "double" slots, addressed by ordinal rather than by name.
//! This module is the single source of truth for the field <-> slot mapping.
//!
//! Slot assignment is append-only: a slot, once assigned, is never reused or
//! renumbered. Removing or reordering an entry in the tables below would
//! silently corrupt every row already written under the old layout, so new
//! fields may only be appended.

/// Blob (text) fields in slot order. `BLOB_FIELDS[n]` occupies slot `n + 1`.
pub const BLOB_FIELDS: [&str; 17] = [
    "slug",
    "url",
    "user_agent",
    "ip",
    "referer",
    "country",
    "region",
    "city",
    "timezone",
    "language",
    "os",
    "browser",
    "browser_type",
    "device",
    "device_type",
    "colo",
    "event_type",
];

/// Double (numeric) fields in slot order. `DOUBLE_FIELDS[n]` occupies slot `n + 1`.
pub const DOUBLE_FIELDS: [&str; 2] = ["latitude", "longitude"];

/// Bidirectional mapping between field names and positional slot identifiers.
///
/// Built once at startup and shared immutably; the encoder, decoder and
/// logger all borrow the same instance.
#[derive(Debug, Clone)]
pub struct ColumnSchema {
    blob_slots: Vec<(&'static str, String)>,
    double_slots: Vec<(&'static str, String)>,
}

impl ColumnSchema {
    pub fn new() -> Self {
        Self {
            blob_slots: Self::build_channel("blob", &BLOB_FIELDS),
            double_slots: Self::build_channel("double", &DOUBLE_FIELDS),
        }
    }

    fn build_channel(prefix: &str, fields: &[&'static str]) -> Vec<(&'static str, String)> {
        fields
            .iter()
            .enumerate()
            .map(|(i, field)| (*field, format!("{}{}", prefix, i + 1)))
            .collect()
    }

    /// Slot identifier for a blob field name, e.g. `"referer"` -> `"blob5"`.
    pub fn blob_slot(&self, field: &str) -> Option<&str> {
        self.blob_slots
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, slot)| slot.as_str())
    }

    /// Field name for a blob slot identifier, e.g. `"blob5"` -> `"referer"`.
    pub fn blob_field(&self, slot: &str) -> Option<&'static str> {
        self.blob_slots
            .iter()
            .find(|(_, s)| s == slot)
            .map(|(f, _)| *f)
    }

    pub fn double_slot(&self, field: &str) -> Option<&str> {
        self.double_slots
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, slot)| slot.as_str())
    }

    pub fn double_field(&self, slot: &str) -> Option<&'static str> {
        self.double_slots
            .iter()
            .find(|(_, s)| s == slot)
            .map(|(f, _)| *f)
    }

    /// Numeric ordinal embedded in a slot identifier (`"blob12"` -> `12`).
    ///
    /// Used as the sort key wherever slot order matters, so ordering never
    /// depends on table declaration order.
    pub fn slot_ordinal(slot: &str) -> Option<u32> {
        let digits = slot.trim_start_matches(|c: char| c.is_ascii_alphabetic());
        if digits.is_empty() || digits.len() == slot.len() {
            return None;
        }
        digits.parse().ok()
    }

    /// Blob field names in ascending slot-ordinal order.
    pub fn ordered_blob_fields(&self) -> Vec<&'static str> {
        Self::ordered_fields(&self.blob_slots)
    }

    /// Double field names in ascending slot-ordinal order.
    pub fn ordered_double_fields(&self) -> Vec<&'static str> {
        Self::ordered_fields(&self.double_slots)
    }

    fn ordered_fields(slots: &[(&'static str, String)]) -> Vec<&'static str> {
        let mut entries: Vec<(&'static str, u32)> = slots
            .iter()
            .map(|(field, slot)| (*field, Self::slot_ordinal(slot).unwrap_or(u32::MAX)))
            .collect();
        entries.sort_by_key(|(_, ordinal)| *ordinal);
        entries.into_iter().map(|(field, _)| field).collect()
    }
}

impl Default for ColumnSchema {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_blob_mapping_roundtrip() {
        let schema = ColumnSchema::new();

        assert_eq!(schema.blob_slot("slug"), Some("blob1"));
        assert_eq!(schema.blob_slot("event_type"), Some("blob17"));
        assert_eq!(schema.blob_field("blob1"), Some("slug"));
        assert_eq!(schema.blob_field("blob17"), Some("event_type"));
        assert_eq!(schema.blob_slot("no_such_field"), None);
        assert_eq!(schema.blob_field("blob99"), None);
    }

    #[test]
    fn test_double_mapping_roundtrip() {
        let schema = ColumnSchema::new();

        assert_eq!(schema.double_slot("latitude"), Some("double1"));
        assert_eq!(schema.double_slot("longitude"), Some("double2"));
        assert_eq!(schema.double_field("double2"), Some("longitude"));
    }

    #[test]
    fn test_mapping_is_bijective() {
        let schema = ColumnSchema::new();

        let slots: HashSet<&str> = BLOB_FIELDS
            .iter()
            .map(|f| schema.blob_slot(f).unwrap())
            .collect();
        assert_eq!(slots.len(), BLOB_FIELDS.len());

        for field in BLOB_FIELDS {
            let slot = schema.blob_slot(field).unwrap();
            assert_eq!(schema.blob_field(slot), Some(field));
        }

        for field in DOUBLE_FIELDS {
            let slot = schema.double_slot(field).unwrap();
            assert_eq!(schema.double_field(slot), Some(field));
        }
    }

    #[test]
    fn test_slot_ordinal() {
        assert_eq!(ColumnSchema::slot_ordinal("blob1"), Some(1));
        assert_eq!(ColumnSchema::slot_ordinal("blob17"), Some(17));
        assert_eq!(ColumnSchema::slot_ordinal("double2"), Some(2));
        assert_eq!(ColumnSchema::slot_ordinal("blob"), None);
        assert_eq!(ColumnSchema::slot_ordinal("17"), None);
    }

    // Encode and decode both derive their order from the slot ordinal, but
    // the ordinals themselves come from table positions. This pins the two
    // together: if a table edit ever breaks the alignment, old rows would
    // decode into the wrong fields.
    #[test]
    fn test_declaration_order_matches_ordinal_order() {
        let schema = ColumnSchema::new();

        assert_eq!(schema.ordered_blob_fields(), BLOB_FIELDS.to_vec());
        assert_eq!(schema.ordered_double_fields(), DOUBLE_FIELDS.to_vec());
    }
}
