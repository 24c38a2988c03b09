//! Read delivered payloads the way the catalog table does.
//!
//! A transformed payload is newline-delimited JSON. Reading it against
//! [`metrics_table_schema`] shows what a query engine will see once the
//! crawler has registered the partition: unknown fields are ignored and
//! missing ones surface as nulls.

use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::json::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use tracing::debug;

use crate::error::Result;
use crate::schema::metrics_table_schema;

/// Decode newline-delimited JSON into a single batch of table rows.
pub fn decode_payload(payload: &[u8]) -> Result<RecordBatch> {
    let schema = Arc::new(metrics_table_schema());
    let reader = ReaderBuilder::new(Arc::clone(&schema)).build(payload)?;
    let batches = reader.collect::<std::result::Result<Vec<_>, _>>()?;
    let batch = concat_batches(&schema, &batches)?;
    debug!(rows = batch.num_rows(), "payload decoded against table schema");
    Ok(batch)
}
