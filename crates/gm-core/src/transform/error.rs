//! Transform failures.
//!
//! Any of these aborts the whole invocation: the delivery stream retries the
//! batch and eventually routes it to the error prefix.

use gm_common::RecordId;
use thiserror::Error;

/// Invocation-level transform failure.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("record {record_id}: payload is not valid base64: {source}")]
    InvalidBase64 {
        record_id: RecordId,
        source: base64::DecodeError,
    },

    #[error("record {record_id}: payload is not valid UTF-8: {source}")]
    InvalidUtf8 {
        record_id: RecordId,
        source: std::string::FromUtf8Error,
    },

    #[error("record {record_id}, line {line}: malformed event: {reason}")]
    MalformedRecord {
        record_id: RecordId,
        /// One-based line number within the decoded payload.
        line: usize,
        reason: MalformedReason,
    },
}

impl TransformError {
    pub fn record_id(&self) -> &RecordId {
        match self {
            TransformError::InvalidBase64 { record_id, .. }
            | TransformError::InvalidUtf8 { record_id, .. }
            | TransformError::MalformedRecord { record_id, .. } => record_id,
        }
    }
}

/// Why an event line could not be transformed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("event is not a JSON object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` must be {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("timestamp {0} is outside the representable calendar range")]
    TimestampOutOfRange(i64),
}

impl From<TransformError> for gm_common::Error {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::MalformedRecord {
                record_id,
                line,
                reason,
            } => gm_common::Error::MalformedRecord {
                record_id: record_id.0,
                reason: format!("line {line}: {reason}"),
            },
            other => gm_common::Error::Transform(other.to_string()),
        }
    }
}
