//! Single event transformation.

use gm_common::PartitionKeys;
use serde_json::{Map, Value};

use super::clock::PartitionClock;
use super::error::MalformedReason;

/// Fields used for routing only; they live in the storage path, not the
/// stored object.
pub const ROUTING_FIELDS: [&str; 2] = ["account_id", "region"];

/// One event ready for delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformedEvent {
    pub partition_keys: PartitionKeys,
    /// The event without its routing fields, in input key order.
    pub body: Map<String, Value>,
}

impl TransformedEvent {
    /// Single-line JSON text of the body.
    pub fn to_line(&self) -> String {
        Value::Object(self.body.clone()).to_string()
    }
}

/// Parse one event line and derive its partition keys.
pub fn transform_event(line: &str, clock: &PartitionClock) -> Result<TransformedEvent, MalformedReason> {
    let value: Value =
        serde_json::from_str(line).map_err(|e| MalformedReason::InvalidJson(e.to_string()))?;
    let Value::Object(object) = value else {
        return Err(MalformedReason::NotAnObject);
    };

    let timestamp = required_millis(&object, "timestamp")?;
    let civil = clock
        .civil_time(timestamp)
        .ok_or(MalformedReason::TimestampOutOfRange(timestamp))?;
    let partition_keys = PartitionKeys::from_civil_time(
        required_str(&object, "account_id")?,
        required_str(&object, "region")?,
        &civil,
    );

    Ok(TransformedEvent {
        partition_keys,
        body: strip_routing_fields(object),
    })
}

/// A new object holding every field except the routing fields.
pub fn strip_routing_fields(object: Map<String, Value>) -> Map<String, Value> {
    object
        .into_iter()
        .filter(|(key, _)| !ROUTING_FIELDS.contains(&key.as_str()))
        .collect()
}

fn required_str<'a>(
    object: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, MalformedReason> {
    match object.get(field) {
        None => Err(MalformedReason::MissingField(field)),
        Some(Value::String(s)) => Ok(s.as_str()),
        Some(_) => Err(MalformedReason::WrongType {
            field,
            expected: "a string",
        }),
    }
}

fn required_millis(object: &Map<String, Value>, field: &'static str) -> Result<i64, MalformedReason> {
    let value = object.get(field).ok_or(MalformedReason::MissingField(field))?;
    if let Some(millis) = value.as_i64() {
        return Ok(millis);
    }
    // Integral floats such as 1.7e12 are accepted as the same instant.
    if let Some(f) = value.as_f64() {
        if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 {
            return Ok(f as i64);
        }
    }
    Err(MalformedReason::WrongType {
        field,
        expected: "an integer count of epoch milliseconds",
    })
}
