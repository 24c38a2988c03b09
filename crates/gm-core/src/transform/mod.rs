//! Record transformation and partitioning.
//!
//! Each input record carries newline-delimited metric events. The
//! transformer rewrites every event without its routing fields and attaches
//! one partition key set to the record, taken from the last event in the
//! payload. Records with no events are left out of the response.
//!
//! A payload whose events disagree on their partition keys is still
//! delivered as one object under the last event's keys; the transformer
//! logs a warning when that happens.

mod clock;
mod error;
mod event;

pub use clock::PartitionClock;
pub use error::{MalformedReason, TransformError};
pub use event::{strip_routing_fields, transform_event, TransformedEvent, ROUTING_FIELDS};

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use gm_common::{PartitionKeys, RecordId};
use gm_config::TransformConfig;
use tracing::{debug, info, warn};

use crate::firehose::{FirehoseEvent, FirehoseRecord, FirehoseResponse, FirehoseResponseRecord};

/// Result of transforming one record's payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadOutcome {
    /// Transformed events, each followed by `\n`.
    pub body: String,
    /// Keys of the last event, `None` when the payload held no events.
    pub partition_keys: Option<PartitionKeys>,
    pub event_count: usize,
    /// Some event's keys differed from the keys attached to the record.
    pub mixed_partitions: bool,
}

/// Stateless batch transformer.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformer {
    clock: PartitionClock,
}

impl Transformer {
    pub fn new(clock: PartitionClock) -> Self {
        Self { clock }
    }

    pub fn from_config(config: &TransformConfig) -> Self {
        Self::new(PartitionClock::new(config.time_zone))
    }

    pub fn clock(&self) -> PartitionClock {
        self.clock
    }

    /// Transform a whole invocation.
    ///
    /// Fails on the first bad record; nothing is returned for the batch in
    /// that case.
    pub fn transform(&self, event: &FirehoseEvent) -> Result<FirehoseResponse, TransformError> {
        info!(
            delivery_stream_arn = %event.delivery_stream_arn,
            region = %event.region,
            invocation_id = %event.invocation_id,
            records = event.records.len(),
            "Received records for processing"
        );

        let mut records = Vec::with_capacity(event.records.len());
        for record in &event.records {
            if let Some(output) = self.transform_record(record)? {
                records.push(output);
            }
        }

        info!(
            invocation_id = %event.invocation_id,
            received = event.records.len(),
            returned = records.len(),
            omitted = event.records.len() - records.len(),
            "batch transformed"
        );
        Ok(FirehoseResponse { records })
    }

    /// Transform one record; `None` when its payload holds no events.
    pub fn transform_record(
        &self,
        record: &FirehoseRecord,
    ) -> Result<Option<FirehoseResponseRecord>, TransformError> {
        let raw = BASE64
            .decode(&record.data)
            .map_err(|source| TransformError::InvalidBase64 {
                record_id: record.record_id.clone(),
                source,
            })?;
        let payload = String::from_utf8(raw).map_err(|source| TransformError::InvalidUtf8 {
            record_id: record.record_id.clone(),
            source,
        })?;
        debug!(record_id = %record.record_id, %payload, "payload received");

        let outcome = self.transform_payload(&record.record_id, &payload)?;
        let Some(partition_keys) = outcome.partition_keys else {
            debug!(record_id = %record.record_id, "payload holds no events; omitting record");
            return Ok(None);
        };

        if outcome.mixed_partitions {
            warn!(
                record_id = %record.record_id,
                events = outcome.event_count,
                partition = %partition_keys,
                "events span several partitions; delivering all under the last event's keys"
            );
        }
        debug!(
            record_id = %record.record_id,
            events = outcome.event_count,
            partition = %partition_keys,
            "partition keys computed"
        );

        Ok(Some(FirehoseResponseRecord::ok(
            record.record_id.clone(),
            outcome.body.as_bytes(),
            partition_keys,
        )))
    }

    /// Transform a decoded payload.
    pub fn transform_payload(
        &self,
        record_id: &RecordId,
        payload: &str,
    ) -> Result<PayloadOutcome, TransformError> {
        let mut outcome = PayloadOutcome::default();

        for (index, line) in payload.split('\n').enumerate() {
            if line.is_empty() {
                continue;
            }
            let event = transform_event(line, &self.clock).map_err(|reason| {
                TransformError::MalformedRecord {
                    record_id: record_id.clone(),
                    line: index + 1,
                    reason,
                }
            })?;

            outcome.body.push_str(&event.to_line());
            outcome.body.push('\n');
            outcome.event_count += 1;

            if let Some(previous) = &outcome.partition_keys {
                if *previous != event.partition_keys {
                    outcome.mixed_partitions = true;
                }
            }
            outcome.partition_keys = Some(event.partition_keys);
        }

        Ok(outcome)
    }
}
