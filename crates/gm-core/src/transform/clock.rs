//! Calendar conversion for partition keys.

use chrono::{DateTime, Local, NaiveDateTime, Utc};
use gm_config::TimeZoneMode;

/// Converts event timestamps into the civil time partitions are cut on.
///
/// Partitions follow the zone the transformer runs in by default, the same
/// way the delivery stream's hour boundaries are read by operators. UTC or
/// a fixed offset can be pinned through configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionClock {
    zone: TimeZoneMode,
}

impl PartitionClock {
    pub fn new(zone: TimeZoneMode) -> Self {
        Self { zone }
    }

    pub fn utc() -> Self {
        Self::new(TimeZoneMode::Utc)
    }

    pub fn local() -> Self {
        Self::new(TimeZoneMode::Local)
    }

    pub fn zone(&self) -> TimeZoneMode {
        self.zone
    }

    /// Civil time for an epoch-millisecond timestamp.
    ///
    /// Sub-second parts floor toward the past, so `-1` ms is the last
    /// second of 1969 rather than the epoch. Returns `None` outside the
    /// representable calendar range.
    pub fn civil_time(&self, epoch_millis: i64) -> Option<NaiveDateTime> {
        let instant = DateTime::<Utc>::from_timestamp_millis(epoch_millis)?;
        let civil = match self.zone {
            TimeZoneMode::Local => instant.with_timezone(&Local).naive_local(),
            TimeZoneMode::Utc => instant.naive_utc(),
            TimeZoneMode::Fixed(offset) => instant.with_timezone(&offset).naive_local(),
        };
        Some(civil)
    }
}

impl From<TimeZoneMode> for PartitionClock {
    fn from(zone: TimeZoneMode) -> Self {
        Self::new(zone)
    }
}
