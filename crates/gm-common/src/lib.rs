//! Glue metrics pipeline common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the gm-* crates:
//! - The partition key set attached to every delivered record
//! - Record and invocation identifiers
//! - Common error types
//! - Output formats

pub mod error;
pub mod id;
pub mod output;
pub mod partition;

pub use error::{Error, Result};
pub use id::{InvocationId, RecordId};
pub use output::OutputFormat;
pub use partition::PartitionKeys;

/// Current schema version for all JSON outputs.
pub const SCHEMA_VERSION: &str = "1.0.0";
