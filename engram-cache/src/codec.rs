//! Flat-record codec.
//!
//! Converts a typed record into the flat cache representation (field name to
//! string-encoded value) and back. Encoding drops null fields entirely —
//! absence, not a stored null, means "no value". Dates pass through as their
//! ISO-8601 serde form; nested objects and arrays are stored as compact JSON
//! text; primitive scalars are stored in display form.
//!
//! No type tag is stored, so decoding recovers primitive types with ordered
//! heuristics. The order is a wire-compatibility contract — reordering the
//! rules changes behavior on ambiguous inputs:
//!
//! 1. JSON parse (catches canonical numbers, booleans, nested JSON);
//! 2. ISO-8601-shaped strings become dates;
//! 3. `"true"` / `"false"` become booleans;
//! 4. all-digit strings become integers;
//! 5. decimal-shaped strings become floats;
//! 6. everything else stays a string.
//!
//! Non-canonical numerics: a digit string with a leading zero fails rule 1
//! and is converted by rule 4 (`"007"` reads back as `7`); a digit string
//! overflowing `i64` falls through rule 4 and is read as a float by rule 5.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use engram_core::CacheError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};

use crate::tier::FlatRecord;

/// A decoded flat-cache scalar, tagged with the type the heuristics
/// recovered. Confines the reconstruction ambiguity to [`decode_value`];
/// everything downstream works with explicit variants.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheValue {
    /// Nested JSON (object, array, or literal null).
    Json(Value),
    DateTime(DateTime<Utc>),
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl CacheValue {
    /// Lower the tagged value back into a JSON value for serde
    /// deserialization.
    pub fn into_json(self) -> Value {
        match self {
            CacheValue::Json(v) => v,
            CacheValue::DateTime(dt) => Value::String(dt.to_rfc3339()),
            CacheValue::Bool(b) => Value::Bool(b),
            CacheValue::Int(i) => Value::Number(i.into()),
            CacheValue::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CacheValue::Str(s) => Value::String(s),
        }
    }
}

/// Encode a record into the flat cache representation.
///
/// Null fields are dropped; the record must serialize to a JSON object.
pub fn encode_flat<T: Serialize>(record: &T) -> Result<FlatRecord, CacheError> {
    let value = serde_json::to_value(record).map_err(|e| CacheError::Serialization {
        reason: e.to_string(),
    })?;
    let Value::Object(object) = value else {
        return Err(CacheError::Serialization {
            reason: "flat encoding requires an object-shaped record".to_string(),
        });
    };

    let mut fields = HashMap::with_capacity(object.len());
    for (name, value) in object {
        let encoded = match value {
            Value::Null => continue,
            Value::String(s) => s,
            Value::Bool(_) | Value::Number(_) => value.to_string(),
            nested @ (Value::Array(_) | Value::Object(_)) => {
                serde_json::to_string(&nested).map_err(|e| CacheError::Serialization {
                    reason: e.to_string(),
                })?
            }
        };
        fields.insert(name, encoded);
    }
    Ok(fields)
}

/// Decode one stored string with the ordered reconstruction heuristics.
pub fn decode_value(raw: &str) -> CacheValue {
    // Rule 1: JSON parse. Scalars are unwrapped into their tagged variants;
    // nested shapes stay JSON.
    if let Ok(value) = serde_json::from_str::<Value>(raw) {
        return match value {
            Value::Bool(b) => CacheValue::Bool(b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CacheValue::Int(i)
                } else {
                    CacheValue::Float(n.as_f64().unwrap_or(0.0))
                }
            }
            Value::String(s) => CacheValue::Str(s),
            nested => CacheValue::Json(nested),
        };
    }

    // Rule 2: ISO-8601 dates.
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return CacheValue::DateTime(dt.with_timezone(&Utc));
    }

    // Rule 3: bare booleans. (Canonical forms are caught by rule 1; the rule
    // keeps its slot so reordering stays observable.)
    match raw {
        "true" => return CacheValue::Bool(true),
        "false" => return CacheValue::Bool(false),
        _ => {}
    }

    // Rule 4: all-digit integers, including non-canonical leading zeros.
    if is_int_shaped(raw) {
        if let Ok(i) = raw.parse::<i64>() {
            return CacheValue::Int(i);
        }
        // Overflow falls through to the float rule.
        if let Ok(f) = raw.parse::<f64>() {
            return CacheValue::Float(f);
        }
    }

    // Rule 5: decimal-shaped floats.
    if is_decimal_shaped(raw) {
        if let Ok(f) = raw.parse::<f64>() {
            return CacheValue::Float(f);
        }
    }

    CacheValue::Str(raw.to_string())
}

/// Decode a flat record back into a typed record.
///
/// A shape mismatch (field missing that the type requires, or a value that
/// decoded to an incompatible type) is a [`CacheError::Decode`]; the
/// mediator treats that as a cache miss.
pub fn decode_flat<T: DeserializeOwned>(fields: &FlatRecord) -> Result<T, CacheError> {
    let mut object = Map::with_capacity(fields.len());
    for (name, raw) in fields {
        object.insert(name.clone(), decode_value(raw).into_json());
    }
    serde_json::from_value(Value::Object(object)).map_err(|e| CacheError::Decode {
        reason: e.to_string(),
    })
}

fn is_int_shaped(raw: &str) -> bool {
    let digits = raw.strip_prefix('-').unwrap_or(raw);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn is_decimal_shaped(raw: &str) -> bool {
    let unsigned = raw.strip_prefix('-').unwrap_or(raw);
    match unsigned.split_once('.') {
        Some((whole, frac)) => {
            !whole.is_empty()
                && !frac.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
        None => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use engram_core::{CreateContext, CreateOrganization, Entity, Organization};
    use serde::Deserialize;

    #[test]
    fn test_decode_canonical_scalars() {
        assert_eq!(decode_value("15"), CacheValue::Int(15));
        assert_eq!(decode_value("-3"), CacheValue::Int(-3));
        assert_eq!(decode_value("10.0"), CacheValue::Float(10.0));
        assert_eq!(decode_value("true"), CacheValue::Bool(true));
        assert_eq!(decode_value("false"), CacheValue::Bool(false));
        assert_eq!(
            decode_value("hello world"),
            CacheValue::Str("hello world".to_string())
        );
    }

    #[test]
    fn test_decode_date() {
        let decoded = decode_value("2024-01-15T10:30:00Z");
        let expected = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(decoded, CacheValue::DateTime(expected));
    }

    #[test]
    fn test_decode_nested_json() {
        let decoded = decode_value(r#"{"a":1,"b":[true,null]}"#);
        match decoded {
            CacheValue::Json(Value::Object(map)) => {
                assert_eq!(map["a"], Value::from(1));
            }
            other => panic!("expected nested json, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_leading_zero_integer() {
        // Not valid JSON, so rule 4 handles it: reads back as the integer.
        assert_eq!(decode_value("007"), CacheValue::Int(7));
    }

    #[test]
    fn test_decode_overflowing_integer_falls_to_float() {
        // One past i64::MAX; invalid JSON path is not taken (canonical JSON
        // would parse it as u64/f64), so force the fallback with a leading 0.
        let raw = "09223372036854775808";
        match decode_value(raw) {
            CacheValue::Float(f) => assert!(f > 9.2e18),
            other => panic!("expected float fallback, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_quoted_string_loses_quotes() {
        // Inherent flat-form ambiguity: a raw value that happens to be valid
        // JSON text is interpreted as JSON.
        assert_eq!(
            decode_value("\"quoted\""),
            CacheValue::Str("quoted".to_string())
        );
    }

    #[test]
    fn test_year_alone_is_an_integer_not_a_date() {
        assert_eq!(decode_value("2024"), CacheValue::Int(2024));
    }

    #[test]
    fn test_encode_drops_null_fields() {
        #[derive(serde::Serialize)]
        struct Row {
            name: String,
            note: Option<String>,
        }
        let fields = encode_flat(&Row {
            name: "Acme".to_string(),
            note: None,
        })
        .unwrap();
        assert_eq!(fields.get("name").map(String::as_str), Some("Acme"));
        assert!(!fields.contains_key("note"));
    }

    #[test]
    fn test_encode_rejects_non_object() {
        assert!(encode_flat(&42i32).is_err());
    }

    #[derive(Debug, Clone, PartialEq, serde::Serialize, Deserialize)]
    struct Mixed {
        name: String,
        active: bool,
        count: i64,
        ratio: f64,
        seen_at: DateTime<Utc>,
        tags: Vec<String>,
        note: Option<String>,
    }

    #[test]
    fn test_round_trip_preserves_primitive_types() {
        let row = Mixed {
            name: "Acme".to_string(),
            active: true,
            count: 42,
            ratio: 10.0,
            seen_at: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            tags: vec!["a".to_string(), "b".to_string()],
            note: None,
        };
        let fields = encode_flat(&row).unwrap();

        // Wire format holds strings only.
        assert_eq!(fields["ratio"], "10.0");
        assert_eq!(fields["count"], "42");
        assert_eq!(fields["active"], "true");
        assert!(!fields.contains_key("note"));

        let back: Mixed = decode_flat(&fields).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_round_trip_organization_record() {
        let ctx = CreateContext::resolve(
            engram_core::new_entity_id(),
            Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap(),
            None,
            None,
        );
        let org = Organization::from_create(
            CreateOrganization {
                name: "Acme".to_string(),
                credits: 10.0,
            },
            &ctx,
        );

        let fields = encode_flat(&org).unwrap();
        // The reconstruction heuristic must map the stored credits back to a
        // number, not the string form.
        assert_eq!(decode_value(&fields["credits"]), CacheValue::Float(10.0));

        let back: Organization = decode_flat(&fields).unwrap();
        assert_eq!(back, org);
    }

    #[test]
    fn test_decode_flat_shape_mismatch_is_decode_error() {
        let mut fields = FlatRecord::new();
        fields.insert("name".to_string(), "15".to_string());
        // Mixed.name is a String but "15" decodes to an integer.
        let result: Result<Mixed, _> = decode_flat(&fields);
        assert!(matches!(result, Err(CacheError::Decode { .. })));
    }
}
