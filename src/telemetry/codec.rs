//! Encoding between named event records and the sink's positional arrays
//!
//! The sink has no column names and no null type: every write carries the
//! full blob and double arrays, with absent values as `""` / `0.0`. Both
//! directions iterate fields in ascending slot-ordinal order, so encoded
//! output never depends on the order a record was populated, and rows
//! written under an older (shorter) schema decode with the trailing fields
//! defaulted.

use super::schema::ColumnSchema;

/// A fully assembled telemetry event, one per logged access or create.
///
/// Blob fields hold `""` for absent values and doubles hold `0.0`, mirroring
/// the sink's representation. Constructed fresh per event, encoded once,
/// never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventRecord {
    pub slug: String,
    pub url: String,
    pub user_agent: String,
    pub ip: String,
    pub referer: String,
    pub country: String,
    pub region: String,
    pub city: String,
    pub timezone: String,
    pub language: String,
    pub os: String,
    pub browser: String,
    pub browser_type: String,
    pub device: String,
    pub device_type: String,
    pub colo: String,
    pub event_type: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl EventRecord {
    /// Value of a blob field by schema name.
    pub fn blob(&self, field: &str) -> Option<&str> {
        let value = match field {
            "slug" => &self.slug,
            "url" => &self.url,
            "user_agent" => &self.user_agent,
            "ip" => &self.ip,
            "referer" => &self.referer,
            "country" => &self.country,
            "region" => &self.region,
            "city" => &self.city,
            "timezone" => &self.timezone,
            "language" => &self.language,
            "os" => &self.os,
            "browser" => &self.browser,
            "browser_type" => &self.browser_type,
            "device" => &self.device,
            "device_type" => &self.device_type,
            "colo" => &self.colo,
            "event_type" => &self.event_type,
            _ => return None,
        };
        Some(value.as_str())
    }

    pub fn set_blob(&mut self, field: &str, value: impl Into<String>) {
        let target = match field {
            "slug" => &mut self.slug,
            "url" => &mut self.url,
            "user_agent" => &mut self.user_agent,
            "ip" => &mut self.ip,
            "referer" => &mut self.referer,
            "country" => &mut self.country,
            "region" => &mut self.region,
            "city" => &mut self.city,
            "timezone" => &mut self.timezone,
            "language" => &mut self.language,
            "os" => &mut self.os,
            "browser" => &mut self.browser,
            "browser_type" => &mut self.browser_type,
            "device" => &mut self.device,
            "device_type" => &mut self.device_type,
            "colo" => &mut self.colo,
            "event_type" => &mut self.event_type,
            _ => return,
        };
        *target = value.into();
    }

    pub fn double(&self, field: &str) -> Option<f64> {
        match field {
            "latitude" => Some(self.latitude),
            "longitude" => Some(self.longitude),
            _ => None,
        }
    }

    pub fn set_double(&mut self, field: &str, value: f64) {
        match field {
            "latitude" => self.latitude = value,
            "longitude" => self.longitude = value,
            _ => {}
        }
    }
}

/// Encode the blob channel: one string per slot, ascending ordinal order.
pub fn encode_blobs(schema: &ColumnSchema, record: &EventRecord) -> Vec<String> {
    schema
        .ordered_blob_fields()
        .into_iter()
        .map(|field| record.blob(field).unwrap_or_default().to_string())
        .collect()
}

/// Encode the double channel: one number per slot, ascending ordinal order.
pub fn encode_doubles(schema: &ColumnSchema, record: &EventRecord) -> Vec<f64> {
    schema
        .ordered_double_fields()
        .into_iter()
        .map(|field| record.double(field).unwrap_or(0.0))
        .collect()
}

/// Reconstruct the named blob fields from a positional row into `record`.
///
/// Inputs shorter than the current schema are valid (rows written before a
/// slot was appended); the missing trailing fields stay at their defaults.
pub fn decode_blobs(schema: &ColumnSchema, values: &[String], record: &mut EventRecord) {
    for (field, value) in schema.ordered_blob_fields().into_iter().zip(values) {
        record.set_blob(field, value.clone());
    }
}

/// Reconstruct the named double fields from a positional row into `record`.
pub fn decode_doubles(schema: &ColumnSchema, values: &[f64], record: &mut EventRecord) {
    for (field, value) in schema.ordered_double_fields().into_iter().zip(values) {
        record.set_double(field, *value);
    }
}

/// Decode both channels of one sink row.
pub fn decode(schema: &ColumnSchema, blobs: &[String], doubles: &[f64]) -> EventRecord {
    let mut record = EventRecord::default();
    decode_blobs(schema, blobs, &mut record);
    decode_doubles(schema, doubles, &mut record);
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::schema::BLOB_FIELDS;

    fn sample_record() -> EventRecord {
        EventRecord {
            slug: "docs".into(),
            url: "https://example.com/docs".into(),
            user_agent: "Mozilla/5.0".into(),
            ip: "203.0.113.9".into(),
            referer: "news.ycombinator.com".into(),
            country: "JP".into(),
            region: "🇯🇵 Tokyo,Japan".into(),
            city: "🇯🇵 Shibuya,Japan".into(),
            timezone: "Asia/Tokyo".into(),
            language: "ja".into(),
            os: "macOS".into(),
            browser: "Firefox".into(),
            browser_type: "browser".into(),
            device: String::new(),
            device_type: "desktop".into(),
            colo: "NRT".into(),
            event_type: "access".into(),
            latitude: 35.6895,
            longitude: 139.6917,
        }
    }

    #[test]
    fn test_encode_blobs_positions() {
        let schema = ColumnSchema::new();
        let blobs = encode_blobs(&schema, &sample_record());

        assert_eq!(blobs.len(), BLOB_FIELDS.len());
        assert_eq!(blobs[0], "docs"); // blob1 = slug
        assert_eq!(blobs[4], "news.ycombinator.com"); // blob5 = referer
        assert_eq!(blobs[13], ""); // blob14 = device, absent
        assert_eq!(blobs[16], "access"); // blob17 = event_type
    }

    #[test]
    fn test_blob_roundtrip() {
        let schema = ColumnSchema::new();
        let record = sample_record();

        let mut decoded = EventRecord::default();
        decode_blobs(&schema, &encode_blobs(&schema, &record), &mut decoded);

        // Doubles travel on the other channel, so compare blob fields only.
        for field in BLOB_FIELDS {
            assert_eq!(decoded.blob(field), record.blob(field), "field {field}");
        }
    }

    #[test]
    fn test_double_roundtrip() {
        let schema = ColumnSchema::new();
        let record = sample_record();

        let doubles = encode_doubles(&schema, &record);
        assert_eq!(doubles, vec![35.6895, 139.6917]);

        let mut decoded = EventRecord::default();
        decode_doubles(&schema, &doubles, &mut decoded);
        assert_eq!(decoded.latitude, record.latitude);
        assert_eq!(decoded.longitude, record.longitude);
    }

    #[test]
    fn test_absent_fields_encode_as_defaults() {
        let schema = ColumnSchema::new();
        let record = EventRecord::default();

        assert!(encode_blobs(&schema, &record).iter().all(String::is_empty));
        assert!(encode_doubles(&schema, &record).iter().all(|d| *d == 0.0));
    }

    // Populating the record in any order must produce identical positional
    // output: ordering comes from slot ordinals alone.
    #[test]
    fn test_encoding_is_insertion_order_independent() {
        let schema = ColumnSchema::new();
        let reference = sample_record();

        let mut forward = EventRecord::default();
        for field in BLOB_FIELDS {
            forward.set_blob(field, reference.blob(field).unwrap());
        }

        let mut reversed = EventRecord::default();
        for field in BLOB_FIELDS.iter().rev() {
            reversed.set_blob(field, reference.blob(field).unwrap());
        }

        assert_eq!(
            encode_blobs(&schema, &forward),
            encode_blobs(&schema, &reversed)
        );
        assert_eq!(encode_blobs(&schema, &forward), encode_blobs(&schema, &reference));
    }

    #[test]
    fn test_decode_shorter_row_from_older_schema() {
        let schema = ColumnSchema::new();

        // A row written before the trailing slots existed.
        let old_row: Vec<String> = vec!["docs".into(), "https://example.com/docs".into()];
        let decoded = decode(&schema, &old_row, &[]);

        assert_eq!(decoded.slug, "docs");
        assert_eq!(decoded.url, "https://example.com/docs");
        assert_eq!(decoded.event_type, "");
    }

    #[test]
    fn test_decode_combines_both_channels() {
        let schema = ColumnSchema::new();
        let record = sample_record();

        let decoded = decode(
            &schema,
            &encode_blobs(&schema, &record),
            &encode_doubles(&schema, &record),
        );

        assert_eq!(decoded, record);
    }
}
