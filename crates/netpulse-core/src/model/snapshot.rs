use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One timestamped aggregate throughput sample.
///
/// Immutable once appended to a `HistoryBuffer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandwidthSnapshot {
    /// Milliseconds since the Unix epoch.
    pub timestamp_ms: i64,
    /// Bytes per second.
    pub download_rate: u64,
    pub upload_rate: u64,
}

impl BandwidthSnapshot {
    pub const fn new(timestamp_ms: i64, download_rate: u64, upload_rate: u64) -> Self {
        Self {
            timestamp_ms,
            download_rate,
            upload_rate,
        }
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp_ms)
    }

    /// The larger of the two directions.
    pub fn peak_rate(&self) -> u64 {
        self.download_rate.max(self.upload_rate)
    }
}
