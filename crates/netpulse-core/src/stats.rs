//! Totals derived from the current device list.

use serde::{Deserialize, Serialize};

use crate::model::DeviceRecord;

/// Cumulative volume and instantaneous throughput across all devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficTotals {
    /// Bytes.
    pub downloaded: u64,
    pub uploaded: u64,
    /// `downloaded + uploaded`.
    pub combined: u64,
    /// Bytes per second.
    pub download_rate: u64,
    pub upload_rate: u64,
}

/// Sum counters and rates over `devices`. Empty input yields zeros;
/// sums saturate instead of overflowing.
pub fn aggregate<'a, I>(devices: I) -> TrafficTotals
where
    I: IntoIterator<Item = &'a DeviceRecord>,
{
    let mut totals = devices
        .into_iter()
        .fold(TrafficTotals::default(), |acc, d| TrafficTotals {
            downloaded: acc.downloaded.saturating_add(d.downloaded),
            uploaded: acc.uploaded.saturating_add(d.uploaded),
            combined: 0,
            download_rate: acc.download_rate.saturating_add(d.download_rate),
            upload_rate: acc.upload_rate.saturating_add(d.upload_rate),
        });
    totals.combined = totals.downloaded.saturating_add(totals.uploaded);
    totals
}
