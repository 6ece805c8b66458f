// Wire types for the measurement service.
//
// Field names follow the service's camelCase JSON. Numeric fields are
// decoded leniently (numbers, numeric strings, floats, or null) because
// collectors disagree on how they encode counters; anything unusable
// decodes to zero instead of failing the whole payload.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ── Reads ────────────────────────────────────────────────────────────

/// One monitored device from `GET /api/devices`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceEntry {
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, alias = "name")]
    pub hostname: Option<String>,
    /// Cumulative bytes downloaded.
    #[serde(default, alias = "downloaded", deserialize_with = "lenient_u64")]
    pub download: u64,
    /// Cumulative bytes uploaded.
    #[serde(default, alias = "uploaded", deserialize_with = "lenient_u64")]
    pub upload: u64,
    /// Bytes per second.
    #[serde(default, alias = "downloadRate", deserialize_with = "lenient_u64")]
    pub download_speed: u64,
    #[serde(default, alias = "uploadRate", deserialize_with = "lenient_u64")]
    pub upload_speed: u64,
    /// Milliseconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient_opt_i64")]
    pub last_seen: Option<i64>,
    #[serde(default)]
    pub speed_limit: Option<SpeedLimitEntry>,
}

/// Active limit attached to a device record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedLimitEntry {
    #[serde(default)]
    pub enabled: bool,
    /// Ceiling in kbps.
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub download_limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_opt_u64")]
    pub upload_limit: Option<u64>,
}

/// One aggregate throughput sample from `GET /api/history`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    /// Milliseconds since the Unix epoch.
    #[serde(default, alias = "time", deserialize_with = "lenient_i64")]
    pub timestamp: i64,
    #[serde(
        default,
        alias = "downloadSpeed",
        alias = "downloadRate",
        deserialize_with = "lenient_u64"
    )]
    pub download: u64,
    #[serde(
        default,
        alias = "uploadSpeed",
        alias = "uploadRate",
        deserialize_with = "lenient_u64"
    )]
    pub upload: u64,
}

/// Payload of `GET /api/status`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusEntry {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub interface: Option<String>,
    /// Seconds.
    #[serde(default, deserialize_with = "lenient_u64")]
    pub uptime: u64,
    #[serde(default)]
    pub version: Option<String>,
}

/// Payload of `GET /api/totals`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotalsEntry {
    #[serde(default, alias = "download", deserialize_with = "lenient_u64")]
    pub downloaded: u64,
    #[serde(default, alias = "upload", deserialize_with = "lenient_u64")]
    pub uploaded: u64,
    #[serde(default, alias = "combined", deserialize_with = "lenient_u64")]
    pub total: u64,
}

// ── Writes ───────────────────────────────────────────────────────────

/// Limit object sent to `POST /api/limit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitPayload {
    pub enabled: bool,
    pub download_limit: Option<u64>,
    pub upload_limit: Option<u64>,
}

/// Full body of `POST /api/limit`. `limit: null` clears the device's limit.
#[derive(Debug, Serialize)]
pub(crate) struct SetLimitBody<'a> {
    pub mac: &'a str,
    pub limit: Option<LimitPayload>,
}

/// Body of `POST /api/interface`.
#[derive(Debug, Serialize)]
pub(crate) struct SetInterfaceBody<'a> {
    pub interface: &'a str,
}

/// Service lifecycle action for `POST /api/service/{action}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceAction {
    Start,
    Stop,
    Restart,
}

impl ServiceAction {
    /// Path segment used by the service.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Restart => "restart",
        }
    }
}

impl std::fmt::Display for ServiceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Lenient numeric decoding ─────────────────────────────────────────

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::as_conversions
)]
fn value_to_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse::<f64>().ok().and_then(|f| {
            (f.is_finite() && f >= 0.0).then_some(f as u64)
        }),
        _ => None,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::as_conversions)]
fn value_to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn lenient_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_u64).unwrap_or(0))
}

fn lenient_opt_u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_u64))
}

fn lenient_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64).unwrap_or(0))
}

fn lenient_opt_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<i64>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_to_i64))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use serde_json::json;

    #[test]
    fn device_entry_decodes_service_shape() {
        let entry: DeviceEntry = serde_json::from_value(json!({
            "mac": "AA:BB:CC:DD:EE:FF",
            "ip": "192.168.1.20",
            "hostname": "laptop.local",
            "download": 1_048_576,
            "upload": 2048,
            "downloadSpeed": 1000,
            "uploadSpeed": 200,
            "lastSeen": 1_700_000_000_000_i64,
            "speedLimit": { "enabled": true, "downloadLimit": 512, "uploadLimit": 128 }
        }))
        .unwrap();

        assert_eq!(entry.download, 1_048_576);
        assert_eq!(entry.download_speed, 1000);
        assert_eq!(entry.last_seen, Some(1_700_000_000_000));
        let limit = entry.speed_limit.unwrap();
        assert!(limit.enabled);
        assert_eq!(limit.download_limit, Some(512));
    }

    #[test]
    fn missing_and_garbled_numbers_decode_as_zero() {
        let entry: DeviceEntry = serde_json::from_value(json!({
            "mac": "aa:bb:cc:dd:ee:01",
            "download": null,
            "uploadSpeed": "not-a-number",
            "downloadSpeed": "42"
        }))
        .unwrap();

        assert_eq!(entry.download, 0);
        assert_eq!(entry.upload, 0);
        assert_eq!(entry.upload_speed, 0);
        assert_eq!(entry.download_speed, 42);
        assert!(entry.speed_limit.is_none());
    }

    #[test]
    fn fractional_rates_are_truncated() {
        let point: HistoryPoint = serde_json::from_value(json!({
            "timestamp": 1000,
            "download": 12.9,
            "upload": -3.0
        }))
        .unwrap();
        assert_eq!(point.download, 12);
        assert_eq!(point.upload, 0);
    }

    #[test]
    fn clear_limit_body_serializes_null() {
        let body = SetLimitBody {
            mac: "aa:bb:cc:dd:ee:ff",
            limit: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "mac": "aa:bb:cc:dd:ee:ff", "limit": null })
        );
    }

    #[test]
    fn limit_payload_uses_camel_case() {
        let payload = LimitPayload {
            enabled: true,
            download_limit: Some(1024),
            upload_limit: Some(256),
        };
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({ "enabled": true, "downloadLimit": 1024, "uploadLimit": 256 })
        );
    }
}
