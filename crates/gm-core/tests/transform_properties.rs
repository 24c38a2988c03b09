//! Property-based tests for batch transformation invariants.

use std::collections::HashSet;

use gm_core::{FirehoseEvent, FirehoseRecord, PartitionClock, Transformer};
use gm_common::{InvocationId, PartitionKeys};
use proptest::prelude::*;
use serde_json::{json, Map, Value};

/// Up to 2100-01-01T00:00:00Z.
const MAX_MILLIS: i64 = 4_102_444_800_000;

fn event_strategy() -> impl Strategy<Value = Map<String, Value>> {
    (
        prop::sample::select(vec!["111111111111", "222222222222", "333333333333"]),
        prop::sample::select(vec!["us-east-1", "eu-west-1", "ap-northeast-1"]),
        0i64..MAX_MILLIS,
        "[a-zA-Z0-9 ._-]{0,16}",
        any::<u32>(),
        any::<bool>(),
    )
        .prop_map(|(account, region, timestamp, metric, count, routing_first)| {
            let mut object = Map::new();
            object.insert("metric_stream_name".into(), json!("glue-stream"));
            if routing_first {
                object.insert("account_id".into(), json!(account));
                object.insert("region".into(), json!(region));
            }
            object.insert("namespace".into(), json!("Glue"));
            object.insert("metric_name".into(), json!(metric));
            object.insert("timestamp".into(), json!(timestamp));
            object.insert("value".into(), json!({"count": count}));
            if !routing_first {
                object.insert("region".into(), json!(region));
                object.insert("account_id".into(), json!(account));
            }
            object.insert("unit".into(), json!("Count"));
            object
        })
}

/// A record payload: its events and whether the text ends with a newline.
fn payload_strategy() -> impl Strategy<Value = (Vec<Map<String, Value>>, bool)> {
    (prop::collection::vec(event_strategy(), 0..5), any::<bool>())
}

fn render(events: &[Map<String, Value>], trailing_newline: bool) -> String {
    let mut text = events
        .iter()
        .map(|e| Value::Object(e.clone()).to_string())
        .collect::<Vec<_>>()
        .join("\n");
    if trailing_newline && !events.is_empty() {
        text.push('\n');
    }
    text
}

fn expected_line(event: &Map<String, Value>) -> String {
    let stripped: Map<String, Value> = event
        .iter()
        .filter(|(key, _)| key.as_str() != "account_id" && key.as_str() != "region")
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    Value::Object(stripped).to_string()
}

fn expected_keys(event: &Map<String, Value>) -> PartitionKeys {
    let millis = event["timestamp"].as_i64().expect("timestamp");
    let civil = PartitionClock::utc().civil_time(millis).expect("in range");
    PartitionKeys::from_civil_time(
        event["account_id"].as_str().expect("account"),
        event["region"].as_str().expect("region"),
        &civil,
    )
}

fn batch(payloads: &[(Vec<Map<String, Value>>, bool)]) -> FirehoseEvent {
    FirehoseEvent {
        invocation_id: InvocationId::from("prop-invocation"),
        delivery_stream_arn: "arn:aws:firehose:us-east-1:111111111111:deliverystream/metrics"
            .to_string(),
        source_kinesis_stream_arn: None,
        region: "us-east-1".to_string(),
        records: payloads
            .iter()
            .enumerate()
            .map(|(i, (events, trailing))| {
                FirehoseRecord::from_payload(format!("record-{i}"), render(events, *trailing).as_bytes())
            })
            .collect(),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn output_ids_are_unique_ordered_and_drawn_from_input(
        payloads in prop::collection::vec(payload_strategy(), 0..12)
    ) {
        let event = batch(&payloads);
        let response = Transformer::new(PartitionClock::utc())
            .transform(&event)
            .expect("well-formed batch");

        prop_assert!(response.records.len() <= event.records.len());

        let mut seen = HashSet::new();
        for record in &response.records {
            prop_assert!(seen.insert(record.record_id.clone()), "duplicate id {}", record.record_id);
        }

        let expected_ids: Vec<_> = event
            .records
            .iter()
            .zip(&payloads)
            .filter(|(_, (events, _))| !events.is_empty())
            .map(|(record, _)| record.record_id.clone())
            .collect();
        let actual_ids: Vec<_> = response.records.iter().map(|r| r.record_id.clone()).collect();
        prop_assert_eq!(actual_ids, expected_ids);
    }

    #[test]
    fn payload_round_trips_without_routing_fields(
        payloads in prop::collection::vec(payload_strategy(), 1..6)
    ) {
        let response = Transformer::new(PartitionClock::utc())
            .transform(&batch(&payloads))
            .expect("well-formed batch");

        let non_empty: Vec<_> = payloads.iter().filter(|(events, _)| !events.is_empty()).collect();
        prop_assert_eq!(response.records.len(), non_empty.len());

        for (record, (events, _)) in response.records.iter().zip(non_empty) {
            let body = String::from_utf8(record.decoded_data().expect("base64")).expect("utf-8");
            let expected: String = events.iter().map(|e| expected_line(e) + "\n").collect();
            prop_assert_eq!(&body, &expected);
            prop_assert!(!body.contains("\"account_id\""));
            prop_assert!(!body.contains("\"region\""));

            let last = events.last().expect("non-empty");
            prop_assert_eq!(&record.metadata.partition_keys, &expected_keys(last));
        }
    }

    #[test]
    fn partition_keys_are_zero_padded(event in event_strategy()) {
        let response = Transformer::new(PartitionClock::utc())
            .transform(&batch(&[(vec![event], false)]))
            .expect("well-formed batch");
        let keys = &response.records[0].metadata.partition_keys;

        prop_assert_eq!(keys.year.len(), 4);
        for (field, max) in [(&keys.month, 12), (&keys.day, 31), (&keys.hour, 23)] {
            prop_assert_eq!(field.len(), 2);
            let value: u32 = field.parse().expect("numeric");
            prop_assert!(value <= max);
        }
    }

    #[test]
    fn one_malformed_line_fails_the_batch(
        payloads in prop::collection::vec(payload_strategy(), 0..6),
        garbage in "[a-z{}\\[\\]:,]{1,12}",
        position in any::<prop::sample::Index>(),
    ) {
        prop_assume!(serde_json::from_str::<Map<String, Value>>(&garbage).is_err());

        let mut event = batch(&payloads);
        let at = position.index(event.records.len() + 1);
        event
            .records
            .insert(at, FirehoseRecord::from_payload("poisoned", garbage.as_bytes()));

        let err = Transformer::new(PartitionClock::utc())
            .transform(&event)
            .expect_err("batch must fail");
        prop_assert_eq!(err.record_id().as_str(), "poisoned");
    }
}
