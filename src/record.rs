// src/record.rs - typed access to the raw key-value records printers report
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("field {field}: expected {expected}")]
    Invalid {
        field: &'static str,
        expected: &'static str,
    },
}

pub(crate) fn require<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a Value, RecordError> {
    record.get(field).ok_or(RecordError::MissingField(field))
}

pub(crate) fn string(record: &Map<String, Value>, field: &'static str) -> Result<String, RecordError> {
    match require(record, field)? {
        Value::String(s) => Ok(s.clone()),
        _ => Err(RecordError::Invalid {
            field,
            expected: "string",
        }),
    }
}

// Firmware in this family reports most integers as strings, so numeric
// getters accept both JSON numbers and numeric strings.
pub(crate) fn integer(record: &Map<String, Value>, field: &'static str) -> Result<i64, RecordError> {
    let invalid = RecordError::Invalid {
        field,
        expected: "integer",
    };
    match require(record, field)? {
        Value::Number(n) => n.as_i64().ok_or(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

pub(crate) fn float(record: &Map<String, Value>, field: &'static str) -> Result<f64, RecordError> {
    let invalid = RecordError::Invalid {
        field,
        expected: "number",
    };
    match require(record, field)? {
        Value::Number(n) => n.as_f64().ok_or(invalid),
        Value::String(s) => s.trim().parse().map_err(|_| invalid),
        _ => Err(invalid),
    }
}

pub(crate) fn list<'a>(
    record: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a [Value], RecordError> {
    match require(record, field)? {
        Value::Array(items) => Ok(items),
        _ => Err(RecordError::Invalid {
            field,
            expected: "list",
        }),
    }
}

pub(crate) fn opt_string_list(
    record: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<Vec<String>>, RecordError> {
    let Some(value) = record.get(field) else {
        return Ok(None);
    };
    let invalid = RecordError::Invalid {
        field,
        expected: "list of strings",
    };
    match value {
        Value::Null => Ok(None),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(invalid.clone()),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Some),
        _ => Err(invalid),
    }
}

/// Slot index carried on a record, if any. Bulk ingestion is positional
/// unless the record names its own slot with an `id` key.
pub(crate) fn explicit_index(record: &Map<String, Value>) -> Result<Option<u8>, RecordError> {
    let invalid = RecordError::Invalid {
        field: "id",
        expected: "small integer",
    };
    let Some(value) = record.get("id") else {
        return Ok(None);
    };
    let id = match value {
        Value::Number(n) => n.as_u64().ok_or(invalid)?,
        Value::String(s) => s.trim().parse().map_err(|_| invalid)?,
        _ => return Err(invalid),
    };
    u8::try_from(id).map(Some).map_err(|_| RecordError::Invalid {
        field: "id",
        expected: "small integer",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn numeric_fields_accept_strings() {
        let r = record(json!({"a": "42", "b": 42, "c": "21.5"}));
        assert_eq!(integer(&r, "a").unwrap(), 42);
        assert_eq!(integer(&r, "b").unwrap(), 42);
        assert_eq!(float(&r, "c").unwrap(), 21.5);
    }

    #[test]
    fn missing_field_is_reported_by_name() {
        let r = record(json!({}));
        assert_eq!(
            string(&r, "tray_type").unwrap_err(),
            RecordError::MissingField("tray_type")
        );
    }

    #[test]
    fn explicit_index_variants() {
        assert_eq!(explicit_index(&record(json!({"id": 2}))).unwrap(), Some(2));
        assert_eq!(explicit_index(&record(json!({"id": "3"}))).unwrap(), Some(3));
        assert_eq!(explicit_index(&record(json!({}))).unwrap(), None);
        assert!(explicit_index(&record(json!({"id": "x"}))).is_err());
        assert!(explicit_index(&record(json!({"id": 4096}))).is_err());
    }
}
