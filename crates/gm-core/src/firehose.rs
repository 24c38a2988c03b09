//! Delivery pipeline invocation envelope.
//!
//! The delivery stream invokes the transformer with a batch of records whose
//! payloads are base64 text, and expects one response record per record it
//! should deliver. Records absent from the response are not delivered.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gm_common::{InvocationId, PartitionKeys, RecordId};
use serde::{Deserialize, Serialize};

/// Invocation input from the delivery stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseEvent {
    pub invocation_id: InvocationId,
    pub delivery_stream_arn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_kinesis_stream_arn: Option<String>,
    pub region: String,
    pub records: Vec<FirehoseRecord>,
}

/// One buffered record awaiting transformation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseRecord {
    pub record_id: RecordId,
    /// Base64-encoded payload.
    pub data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approximate_arrival_timestamp: Option<f64>,
}

impl FirehoseRecord {
    /// Build a record from a raw payload, encoding it as the stream does.
    pub fn from_payload(record_id: impl Into<RecordId>, payload: &[u8]) -> Self {
        Self {
            record_id: record_id.into(),
            data: BASE64.encode(payload),
            approximate_arrival_timestamp: None,
        }
    }
}

/// Invocation output returned to the delivery stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FirehoseResponse {
    pub records: Vec<FirehoseResponseRecord>,
}

/// Per-record outcome values the delivery stream understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirehoseRecordResult {
    /// Transformed; deliver under the returned partition keys.
    Ok,
    /// Intentionally discarded.
    Dropped,
    /// Send to the error prefix.
    ProcessingFailed,
}

/// A transformed record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirehoseResponseRecord {
    pub record_id: RecordId,
    pub result: FirehoseRecordResult,
    /// Base64-encoded transformed payload.
    pub data: String,
    pub metadata: FirehoseRecordMetadata,
}

impl FirehoseResponseRecord {
    pub fn ok(record_id: RecordId, payload: &[u8], partition_keys: PartitionKeys) -> Self {
        Self {
            record_id,
            result: FirehoseRecordResult::Ok,
            data: BASE64.encode(payload),
            metadata: FirehoseRecordMetadata { partition_keys },
        }
    }

    /// Decode the transformed payload.
    pub fn decoded_data(&self) -> Result<Vec<u8>, base64::DecodeError> {
        BASE64.decode(&self.data)
    }
}

/// Dynamic partitioning metadata consumed by the delivery stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirehoseRecordMetadata {
    #[serde(rename = "partitionKeys")]
    pub partition_keys: PartitionKeys,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_deserializes_with_extra_fields() {
        let event: FirehoseEvent = serde_json::from_value(json!({
            "invocationId": "invocationIdExample",
            "deliveryStreamArn": "arn:aws:kinesis:EXAMPLE",
            "region": "us-east-1",
            "records": [{
                "recordId": "49546986683135544286507457936321625675700192471156785154",
                "approximateArrivalTimestamp": 1495072949453u64,
                "data": "SGVsbG8=",
                "kinesisRecordMetadata": {"shardId": "shardId-000000000000"}
            }]
        }))
        .expect("event");
        assert_eq!(event.records.len(), 1);
        assert_eq!(event.records[0].data, "SGVsbG8=");
        assert_eq!(event.source_kinesis_stream_arn, None);
    }

    #[test]
    fn test_missing_region_is_rejected() {
        let result = serde_json::from_value::<FirehoseEvent>(json!({
            "invocationId": "i",
            "deliveryStreamArn": "arn",
            "records": []
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_response_wire_shape() {
        let keys = PartitionKeys {
            account_id: "123456789012".into(),
            region: "us-east-1".into(),
            year: "2023".into(),
            month: "11".into(),
            day: "14".into(),
            hour: "22".into(),
        };
        let response = FirehoseResponse {
            records: vec![FirehoseResponseRecord::ok("r-1".into(), b"{}\n", keys)],
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            json!({
                "records": [{
                    "recordId": "r-1",
                    "result": "Ok",
                    "data": "e30K",
                    "metadata": {"partitionKeys": {
                        "account_id": "123456789012",
                        "region": "us-east-1",
                        "year": "2023",
                        "month": "11",
                        "day": "14",
                        "hour": "22"
                    }}
                }]
            })
        );
    }

    #[test]
    fn test_from_payload_encodes_base64() {
        let record = FirehoseRecord::from_payload("r-9", b"Hello");
        assert_eq!(record.data, "SGVsbG8=");
        assert_eq!(record.record_id.as_str(), "r-9");
    }
}
