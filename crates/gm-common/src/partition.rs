//! The partition key set attached to delivered records.
//!
//! The delivery pipeline builds object prefixes from these keys and the
//! catalog declares one partition column per key. Both derive their column
//! order from [`PartitionKeys::FIELD_NAMES`], so a change here moves all
//! three together.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Partition values for one delivered record, all string-valued.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKeys {
    pub account_id: String,
    pub region: String,
    /// Four-digit year.
    pub year: String,
    /// Zero-padded month, `01`..`12`.
    pub month: String,
    /// Zero-padded day of month, `01`..`31`.
    pub day: String,
    /// Zero-padded hour, `00`..`23`.
    pub hour: String,
}

impl PartitionKeys {
    /// Partition key names, in storage path and catalog column order.
    pub const FIELD_NAMES: [&'static str; 6] =
        ["account_id", "region", "year", "month", "day", "hour"];

    /// Build the key set from the routing fields and an already-zoned
    /// civil time.
    pub fn from_civil_time(
        account_id: impl Into<String>,
        region: impl Into<String>,
        at: &NaiveDateTime,
    ) -> Self {
        PartitionKeys {
            account_id: account_id.into(),
            region: region.into(),
            year: format!("{:04}", at.year()),
            month: format!("{:02}", at.month()),
            day: format!("{:02}", at.day()),
            hour: format!("{:02}", at.hour()),
        }
    }

    /// Values in [`Self::FIELD_NAMES`] order.
    pub fn values(&self) -> [&str; 6] {
        [
            &self.account_id,
            &self.region,
            &self.year,
            &self.month,
            &self.day,
            &self.hour,
        ]
    }

    /// `(name, value)` pairs in [`Self::FIELD_NAMES`] order.
    pub fn pairs(&self) -> impl Iterator<Item = (&'static str, &str)> {
        Self::FIELD_NAMES.into_iter().zip(self.values())
    }
}

impl fmt::Display for PartitionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.pairs().enumerate() {
            if i > 0 {
                write!(f, "/")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
