use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Hardware address, normalized to lowercase colon-separated form.
///
/// This is the stable identity of a device: address and name may change
/// between polls without creating a new logical device.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MacAddress(String);

impl MacAddress {
    /// Accepts colon-separated, dash-separated, or mixed-case input.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase().replace('-', ":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// A device's active limit as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeedLimit {
    pub enabled: bool,
    pub download_kbps: Option<u64>,
    pub upload_kbps: Option<u64>,
}

/// One monitored network endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub mac: MacAddress,
    pub ip: Option<IpAddr>,
    pub name: Option<String>,
    /// Cumulative bytes.
    pub downloaded: u64,
    pub uploaded: u64,
    /// Bytes per second.
    pub download_rate: u64,
    pub upload_rate: u64,
    pub last_seen: Option<DateTime<Utc>>,
    pub speed_limit: Option<SpeedLimit>,
}

impl DeviceRecord {
    /// A record with only the identity filled in.
    pub fn new(mac: MacAddress) -> Self {
        Self {
            mac,
            ip: None,
            name: None,
            downloaded: 0,
            uploaded: 0,
            download_rate: 0,
            upload_rate: 0,
            last_seen: None,
            speed_limit: None,
        }
    }

    /// Best human label: name, then IP, then MAC.
    pub fn display_name(&self) -> String {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned)
            .or_else(|| self.ip.map(|ip| ip.to_string()))
            .unwrap_or_else(|| self.mac.to_string())
    }

    /// The limit currently enforced, if any.
    pub fn active_limit(&self) -> Option<&SpeedLimit> {
        self.speed_limit.as_ref().filter(|l| l.enabled)
    }
}

/// A transient request to set or change a device's limit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitRequest {
    pub mac: MacAddress,
    pub enabled: bool,
    pub download_kbps: u64,
    pub upload_kbps: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn mac_is_normalized() {
        assert_eq!(MacAddress::new(" AA-BB-cc-DD-ee-FF ").as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(
            MacAddress::new("aa:bb:cc:dd:ee:ff"),
            "AA:BB:CC:DD:EE:FF".parse::<MacAddress>().unwrap()
        );
    }

    #[test]
    fn display_name_falls_back_to_ip_then_mac() {
        let mut device = DeviceRecord::new(MacAddress::new("aa:bb:cc:dd:ee:01"));
        assert_eq!(device.display_name(), "aa:bb:cc:dd:ee:01");

        device.ip = Some("10.0.0.7".parse().unwrap());
        assert_eq!(device.display_name(), "10.0.0.7");

        device.name = Some("  ".into());
        assert_eq!(device.display_name(), "10.0.0.7");

        device.name = Some("nas".into());
        assert_eq!(device.display_name(), "nas");
    }

    #[test]
    fn disabled_limit_is_not_active() {
        let mut device = DeviceRecord::new(MacAddress::new("aa:bb:cc:dd:ee:01"));
        device.speed_limit = Some(SpeedLimit {
            enabled: false,
            download_kbps: Some(100),
            upload_kbps: Some(50),
        });
        assert!(device.active_limit().is_none());
    }
}
