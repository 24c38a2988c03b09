//! Storage prefix layout shared with the delivery pipeline.
//!
//! Delivered objects live under Hive-style prefixes:
//!
//! ```text
//! data/account_id=<v>/region=<v>/year=<v>/month=<v>/day=<v>/hour=<v>/
//! ```
//!
//! The delivery pipeline does not see [`PartitionKeys`] directly; it
//! substitutes the metadata returned by the transformer into the prefix
//! expression from [`StorageLayout::delivery_prefix_expression`].

use gm_common::PartitionKeys;
use gm_config::DeliveryConfig;
use serde::Serialize;

/// Prefix layout for delivered and failed objects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageLayout {
    data_prefix: String,
    error_prefix: String,
}

impl StorageLayout {
    pub fn new(data_prefix: impl Into<String>, error_prefix: impl Into<String>) -> Self {
        Self {
            data_prefix: data_prefix.into(),
            error_prefix: error_prefix.into(),
        }
    }

    pub fn from_config(delivery: &DeliveryConfig) -> Self {
        Self::new(&delivery.data_prefix, &delivery.error_prefix)
    }

    pub fn data_prefix(&self) -> &str {
        &self.data_prefix
    }

    /// Prefix for batches the delivery pipeline gave up on.
    pub fn error_prefix(&self) -> &str {
        &self.error_prefix
    }

    /// Partition segment names, in path order.
    pub fn partition_segments(&self) -> &'static [&'static str] {
        &PartitionKeys::FIELD_NAMES
    }

    /// Object prefix the delivery pipeline writes a record under.
    pub fn object_prefix(&self, keys: &PartitionKeys) -> String {
        let mut prefix = self.data_prefix.clone();
        for (name, value) in keys.pairs() {
            prefix.push_str(name);
            prefix.push('=');
            prefix.push_str(value);
            prefix.push('/');
        }
        prefix
    }

    /// Prefix expression configured on the delivery stream.
    ///
    /// Each segment references the metadata key the transformer returns,
    /// e.g. `region=!{partitionKeyFromLambda:region}/`.
    pub fn delivery_prefix_expression(&self) -> String {
        let mut expression = self.data_prefix.clone();
        for name in PartitionKeys::FIELD_NAMES {
            expression.push_str(&format!("{name}=!{{partitionKeyFromLambda:{name}}}/"));
        }
        expression
    }
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::from_config(&DeliveryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_keys() -> PartitionKeys {
        PartitionKeys {
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
            year: "2023".to_string(),
            month: "11".to_string(),
            day: "14".to_string(),
            hour: "22".to_string(),
        }
    }

    #[test]
    fn test_object_prefix() {
        let layout = StorageLayout::default();
        assert_eq!(
            layout.object_prefix(&sample_keys()),
            "data/account_id=123456789012/region=us-east-1/year=2023/month=11/day=14/hour=22/"
        );
    }

    #[test]
    fn test_delivery_prefix_expression() {
        let layout = StorageLayout::default();
        assert_eq!(
            layout.delivery_prefix_expression(),
            "data/account_id=!{partitionKeyFromLambda:account_id}\
             /region=!{partitionKeyFromLambda:region}\
             /year=!{partitionKeyFromLambda:year}\
             /month=!{partitionKeyFromLambda:month}\
             /day=!{partitionKeyFromLambda:day}\
             /hour=!{partitionKeyFromLambda:hour}/"
        );
        assert_eq!(layout.error_prefix(), "error/");
    }

    #[test]
    fn test_custom_prefixes() {
        let layout = StorageLayout::new("metrics/v2/", "failed/");
        assert!(layout.object_prefix(&sample_keys()).starts_with("metrics/v2/account_id="));
        assert_eq!(layout.error_prefix(), "failed/");
    }
}
