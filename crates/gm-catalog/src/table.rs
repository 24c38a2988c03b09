//! Catalog table definition for delivered metrics.

use std::collections::BTreeMap;

use gm_common::PartitionKeys;
use gm_config::{CatalogConfig, DeliveryConfig};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::error::{CatalogError, Result};
use crate::layout::StorageLayout;
use crate::schema::{hive_type, metrics_table_schema, partition_schema};
use crate::{CLASSIFICATION, SERDE_LIBRARY};

const INPUT_FORMAT: &str = "org.apache.hadoop.mapred.TextInputFormat";
const OUTPUT_FORMAT: &str = "org.apache.hadoop.hive.ql.io.HiveIgnoreKeyTextOutputFormat";

/// One catalog column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

/// Crawler settings that keep crawled partitions tied to the table schema.
#[derive(Debug, Clone, Serialize)]
pub struct CrawlerDefinition {
    pub name: String,
    pub configuration: serde_json::Value,
    pub update_behavior: String,
    pub delete_behavior: String,
}

/// External table over the delivered JSON objects.
#[derive(Debug, Clone, Serialize)]
pub struct TableDefinition {
    pub database_name: String,
    pub table_name: String,
    pub table_type: String,
    pub parameters: BTreeMap<String, String>,
    pub location: String,
    pub input_format: String,
    pub output_format: String,
    pub compressed: bool,
    pub serde_library: String,
    pub serde_parameters: BTreeMap<String, String>,
    pub columns: Vec<Column>,
    pub partition_keys: Vec<Column>,
    pub crawler: CrawlerDefinition,
}

impl TableDefinition {
    /// Build the table definition for the configured bucket and prefixes.
    pub fn from_config(catalog: &CatalogConfig, delivery: &DeliveryConfig) -> Result<Self> {
        let bucket = catalog
            .bucket_name
            .as_deref()
            .ok_or(CatalogError::MissingBucket)?;
        let layout = StorageLayout::from_config(delivery);

        let columns = to_columns(&metrics_table_schema())?;
        let partition_keys = to_columns(&partition_schema())?;

        let definition = Self {
            database_name: catalog.database_name.clone(),
            table_name: catalog.table_name.clone(),
            table_type: "EXTERNAL_TABLE".to_string(),
            parameters: BTreeMap::from([("classification".to_string(), CLASSIFICATION.to_string())]),
            location: format!("s3://{}/{}", bucket, layout.data_prefix()),
            input_format: INPUT_FORMAT.to_string(),
            output_format: OUTPUT_FORMAT.to_string(),
            compressed: false,
            serde_library: SERDE_LIBRARY.to_string(),
            serde_parameters: BTreeMap::from([(
                "serialization.format".to_string(),
                CLASSIFICATION.to_string(),
            )]),
            columns,
            partition_keys,
            crawler: CrawlerDefinition {
                name: catalog.crawler_name.clone(),
                configuration: json!({
                    "Version": 1.0,
                    "CrawlerOutput": {"Partitions": {"AddOrUpdateBehavior": "InheritFromTable"}},
                    "Grouping": {"TableGroupingPolicy": "CombineCompatibleSchemas"},
                }),
                update_behavior: "LOG".to_string(),
                delete_behavior: "LOG".to_string(),
            },
        };
        definition.check_partition_lockstep()?;
        debug!(
            database = %definition.database_name,
            table = %definition.table_name,
            location = %definition.location,
            "catalog table definition built"
        );
        Ok(definition)
    }

    pub fn partition_column_names(&self) -> Vec<&str> {
        self.partition_keys.iter().map(|c| c.name.as_str()).collect()
    }

    /// Partition columns must be exactly the partition key set, in order.
    pub fn check_partition_lockstep(&self) -> Result<()> {
        let actual = self.partition_column_names();
        if actual != PartitionKeys::FIELD_NAMES {
            return Err(CatalogError::PartitionDrift {
                expected: PartitionKeys::FIELD_NAMES.iter().map(|s| s.to_string()).collect(),
                actual: actual.iter().map(|s| s.to_string()).collect(),
            });
        }
        Ok(())
    }
}

fn to_columns(schema: &arrow::datatypes::Schema) -> Result<Vec<Column>> {
    schema
        .fields()
        .iter()
        .map(|field| -> Result<Column> {
            Ok(Column {
                name: field.name().clone(),
                data_type: hive_type(field.data_type())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_config() -> CatalogConfig {
        CatalogConfig {
            bucket_name: Some("glue-metrics-123456789012".to_string()),
            ..CatalogConfig::default()
        }
    }

    #[test]
    fn test_table_definition_from_defaults() {
        let table = TableDefinition::from_config(&catalog_config(), &DeliveryConfig::default())
            .expect("table definition");
        assert_eq!(table.location, "s3://glue-metrics-123456789012/data/");
        assert_eq!(table.table_type, "EXTERNAL_TABLE");
        assert_eq!(table.parameters["classification"], "json");
        assert_eq!(table.serde_library, SERDE_LIBRARY);
        assert_eq!(table.columns.len(), 7);
        assert_eq!(
            table.columns[4],
            Column {
                name: "timestamp".to_string(),
                data_type: "bigint".to_string()
            }
        );
    }

    #[test]
    fn test_partition_keys_are_strings_in_order() {
        let table = TableDefinition::from_config(&catalog_config(), &DeliveryConfig::default())
            .expect("table definition");
        assert_eq!(table.partition_column_names(), PartitionKeys::FIELD_NAMES.to_vec());
        assert!(table.partition_keys.iter().all(|c| c.data_type == "string"));
    }

    #[test]
    fn test_missing_bucket_is_an_error() {
        let err = TableDefinition::from_config(&CatalogConfig::default(), &DeliveryConfig::default())
            .unwrap_err();
        assert!(matches!(err, CatalogError::MissingBucket));
    }

    #[test]
    fn test_drift_detected() {
        let mut table = TableDefinition::from_config(&catalog_config(), &DeliveryConfig::default())
            .expect("table definition");
        table.partition_keys.swap(0, 1);
        let err = table.check_partition_lockstep().unwrap_err();
        assert!(matches!(err, CatalogError::PartitionDrift { .. }));
    }

    #[test]
    fn test_serialized_shape() {
        let table = TableDefinition::from_config(&catalog_config(), &DeliveryConfig::default())
            .expect("table definition");
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json["partition_keys"][0]["name"], "account_id");
        assert_eq!(json["partition_keys"][0]["type"], "string");
        assert_eq!(
            json["crawler"]["configuration"]["CrawlerOutput"]["Partitions"]["AddOrUpdateBehavior"],
            "InheritFromTable"
        );
    }
}
