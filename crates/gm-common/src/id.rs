//! Record and invocation identity types.
//!
//! The delivery pipeline correlates every transformed record with its input
//! through an opaque record id. These wrappers keep the two id kinds apart.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque record identifier assigned by the delivery pipeline.
///
/// Echoed unchanged on the output record so the caller can correlate it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub String);

impl RecordId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId(id.to_string())
    }
}

impl From<String> for RecordId {
    fn from(id: String) -> Self {
        RecordId(id)
    }
}

/// Invocation identifier for one transform batch.
///
/// Format assigned by the caller (a UUID in practice); never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvocationId(pub String);

impl fmt::Display for InvocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for InvocationId {
    fn from(id: &str) -> Self {
        InvocationId(id.to_string())
    }
}
