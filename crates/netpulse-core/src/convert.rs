// ── API-to-domain type conversions ──
//
// Bridges raw `netpulse_api` wire types into canonical `netpulse_core::model`
// types. Unparseable addresses are dropped, missing counters are already
// zero from the wire layer, and records without a hardware address are
// skipped because they have no identity.

use std::collections::HashSet;
use std::net::IpAddr;

use chrono::{DateTime, Utc};
use tracing::debug;

use netpulse_api::models::{
    DeviceEntry, HistoryPoint, LimitPayload, SpeedLimitEntry, StatusEntry, TotalsEntry,
};

use crate::model::{
    BandwidthSnapshot, DeviceRecord, LimitRequest, MacAddress, ServiceStatus, SpeedLimit,
    status::UNKNOWN_INTERFACE,
};
use crate::stats::TrafficTotals;

// ── Helpers ────────────────────────────────────────────────────────

fn parse_ip(raw: Option<&str>) -> Option<IpAddr> {
    raw.and_then(|s| s.trim().parse().ok())
}

fn epoch_ms_to_datetime(epoch_ms: Option<i64>) -> Option<DateTime<Utc>> {
    epoch_ms.and_then(DateTime::from_timestamp_millis)
}

// ── Devices ────────────────────────────────────────────────────────

impl From<SpeedLimitEntry> for SpeedLimit {
    fn from(l: SpeedLimitEntry) -> Self {
        Self {
            enabled: l.enabled,
            download_kbps: l.download_limit,
            upload_kbps: l.upload_limit,
        }
    }
}

/// Convert one wire record. `None` when it carries no hardware address.
pub fn device_from_entry(entry: DeviceEntry) -> Option<DeviceRecord> {
    let mac = entry
        .mac
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(MacAddress::new)?;

    Some(DeviceRecord {
        mac,
        ip: parse_ip(entry.ip.as_deref()),
        name: entry.hostname.filter(|n| !n.trim().is_empty()),
        downloaded: entry.download,
        uploaded: entry.upload,
        download_rate: entry.download_speed,
        upload_rate: entry.upload_speed,
        last_seen: epoch_ms_to_datetime(entry.last_seen),
        speed_limit: entry.speed_limit.map(SpeedLimit::from),
    })
}

/// Convert the device list, keeping the first record per hardware address.
pub fn devices_from_entries(entries: Vec<DeviceEntry>) -> Vec<DeviceRecord> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut devices = Vec::with_capacity(entries.len());

    for entry in entries {
        let Some(device) = device_from_entry(entry) else {
            debug!("skipping device record without mac");
            continue;
        };
        if seen.insert(device.mac.clone()) {
            devices.push(device);
        } else {
            debug!(mac = %device.mac, "skipping duplicate device record");
        }
    }

    devices
}

// ── History / status / totals ──────────────────────────────────────

impl From<HistoryPoint> for BandwidthSnapshot {
    fn from(p: HistoryPoint) -> Self {
        Self::new(p.timestamp, p.download, p.upload)
    }
}

impl From<StatusEntry> for ServiceStatus {
    fn from(s: StatusEntry) -> Self {
        Self {
            running: s.running,
            interface: s
                .interface
                .filter(|i| !i.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_INTERFACE.into()),
            uptime_secs: s.uptime,
            version: s.version.filter(|v| !v.trim().is_empty()),
        }
    }
}

impl From<TotalsEntry> for TrafficTotals {
    fn from(t: TotalsEntry) -> Self {
        let combined = if t.total == 0 {
            t.downloaded.saturating_add(t.uploaded)
        } else {
            t.total
        };
        Self {
            downloaded: t.downloaded,
            uploaded: t.uploaded,
            combined,
            download_rate: 0,
            upload_rate: 0,
        }
    }
}

// ── Outbound ───────────────────────────────────────────────────────

impl From<&LimitRequest> for LimitPayload {
    fn from(r: &LimitRequest) -> Self {
        Self {
            enabled: r.enabled,
            download_limit: Some(r.download_kbps),
            upload_limit: Some(r.upload_kbps),
        }
    }
}
