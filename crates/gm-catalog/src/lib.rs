//! Glue metrics catalog contract.
//!
//! This crate provides:
//! - Arrow schema definitions for the metrics table and its partitions
//! - Hive type rendering for the catalog table definition
//! - Storage prefix layout shared with the delivery pipeline
//! - A JSON reader that checks delivered payloads against the table

pub mod error;
pub mod layout;
pub mod reader;
pub mod schema;
pub mod table;

pub use error::CatalogError;
pub use layout::StorageLayout;
pub use reader::decode_payload;
pub use schema::{hive_type, metrics_table_schema, partition_schema};
pub use table::{Column, TableDefinition};

/// Table classification recorded on the catalog table.
pub const CLASSIFICATION: &str = "json";

/// SerDe library the catalog uses to read delivered objects.
pub const SERDE_LIBRARY: &str = "org.openx.data.jsonserde.JsonSerDe";
