//! Arrow schema definitions for the metrics table.
//!
//! The data columns mirror the JSON objects delivered by the transformer
//! (metric stream events with the routing fields removed). The partition
//! columns come from [`PartitionKeys::FIELD_NAMES`] and are never stored
//! inside the objects themselves.

use arrow::datatypes::{DataType, Field, Fields, Schema, TimeUnit};
use gm_common::PartitionKeys;

use crate::error::{CatalogError, Result};

/// Dimension keys the metrics source attaches to job metrics.
pub const DIMENSION_NAMES: [&str; 9] = [
    "JobName",
    "JobRunId",
    "Type",
    "Source",
    "Sink",
    "ObservabilityGroup",
    "ExecutionClass",
    "GlueVersion",
    "JobType",
];

/// Statistics carried in each metric `value`.
pub const STATISTIC_NAMES: [&str; 4] = ["max", "min", "sum", "count"];

fn dimension_fields() -> Fields {
    DIMENSION_NAMES
        .iter()
        .map(|name| Field::new(*name, DataType::Utf8, true))
        .collect()
}

fn statistic_fields() -> Fields {
    STATISTIC_NAMES
        .iter()
        .map(|name| Field::new(*name, DataType::Float64, true))
        .collect()
}

/// Data columns of the metrics table.
///
/// Schema fields:
/// - metric_stream_name: Utf8
/// - namespace: Utf8
/// - metric_name: Utf8
/// - dimensions: Struct of Utf8 (see [`DIMENSION_NAMES`])
/// - timestamp: Int64 (epoch milliseconds)
/// - value: Struct of Float64 (see [`STATISTIC_NAMES`])
/// - unit: Utf8
///
/// All columns are nullable: the crawler tolerates sparse objects.
pub fn metrics_table_schema() -> Schema {
    Schema::new(vec![
        Field::new("metric_stream_name", DataType::Utf8, true),
        Field::new("namespace", DataType::Utf8, true),
        Field::new("metric_name", DataType::Utf8, true),
        Field::new("dimensions", DataType::Struct(dimension_fields()), true),
        Field::new("timestamp", DataType::Int64, true),
        Field::new("value", DataType::Struct(statistic_fields()), true),
        Field::new("unit", DataType::Utf8, true),
    ])
}

/// Partition columns of the metrics table, one Utf8 column per partition key.
pub fn partition_schema() -> Schema {
    Schema::new(
        PartitionKeys::FIELD_NAMES
            .iter()
            .map(|name| Field::new(*name, DataType::Utf8, false))
            .collect::<Vec<_>>(),
    )
}

/// Render an Arrow type as a Hive/catalog column type.
pub fn hive_type(data_type: &DataType) -> Result<String> {
    let rendered = match data_type {
        DataType::Utf8 | DataType::LargeUtf8 => "string".to_string(),
        DataType::Boolean => "boolean".to_string(),
        DataType::Int8 => "tinyint".to_string(),
        DataType::Int16 => "smallint".to_string(),
        DataType::Int32 => "int".to_string(),
        DataType::Int64 => "bigint".to_string(),
        DataType::Float32 => "float".to_string(),
        DataType::Float64 => "double".to_string(),
        DataType::Date32 => "date".to_string(),
        DataType::Timestamp(TimeUnit::Millisecond, _) => "timestamp".to_string(),
        DataType::Binary | DataType::LargeBinary => "binary".to_string(),
        DataType::List(item) | DataType::LargeList(item) => {
            format!("array<{}>", hive_type(item.data_type())?)
        }
        DataType::Struct(fields) => {
            let members = fields
                .iter()
                .map(|field| -> Result<String> {
                    Ok(format!("{}:{}", field.name(), hive_type(field.data_type())?))
                })
                .collect::<Result<Vec<_>>>()?;
            format!("struct<{}>", members.join(","))
        }
        other => return Err(CatalogError::UnsupportedType(other.to_string())),
    };
    Ok(rendered)
}
