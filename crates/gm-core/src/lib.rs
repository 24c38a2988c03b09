//! Glue metrics record transformer.
//!
//! The delivery pipeline hands this crate batches of metric stream records.
//! Each record is decoded, stripped of its routing fields, tagged with the
//! partition keys derived from its timestamp, and handed back for delivery
//! under the matching storage prefix.

pub mod cli;
pub mod exit_codes;
pub mod firehose;
pub mod lambda;
pub mod logging;
pub mod transform;

pub use exit_codes::ExitCode;
pub use firehose::{
    FirehoseEvent, FirehoseRecord, FirehoseRecordMetadata, FirehoseRecordResult,
    FirehoseResponse, FirehoseResponseRecord,
};
pub use transform::{MalformedReason, PartitionClock, PayloadOutcome, TransformError, Transformer};
