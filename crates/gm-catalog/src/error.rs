//! Error types for catalog operations.

use thiserror::Error;

/// Errors that can occur while building or checking the catalog contract.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Arrow error while reading a payload
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Arrow type with no Hive equivalent
    #[error("no catalog type for Arrow type {0}")]
    UnsupportedType(String),

    /// Table location needs a bucket
    #[error("catalog.bucket_name is required to render the table location")]
    MissingBucket,

    /// Partition columns drifted from the partition key set
    #[error("partition columns {actual:?} do not match partition keys {expected:?}")]
    PartitionDrift {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl From<CatalogError> for gm_common::Error {
    fn from(err: CatalogError) -> Self {
        gm_common::Error::Catalog(err.to_string())
    }
}

/// Result type alias for catalog operations.
pub type Result<T> = std::result::Result<T, CatalogError>;
