// ── Runtime dashboard configuration ──
//
// Describes how to reach the measurement service and how the pipeline is
// tuned. Built by the CLI/TUI from `netpulse-config`; core never reads
// config files.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

/// Built-in seed for the limit editor when no preset is configured.
pub const FALLBACK_PRESET: LimitPreset = LimitPreset {
    download_kbps: 1024,
    upload_kbps: 512,
};

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed measurement boxes).
    DangerAcceptInvalid,
}

/// A download/upload ceiling pair in kbps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitPreset {
    pub download_kbps: u64,
    pub upload_kbps: u64,
}

/// Configuration for one dashboard session.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Service root (e.g. `http://192.168.1.2:8080`).
    pub url: Url,
    pub tls: TlsVerification,
    /// Per-request timeout; an expired read falls back on its own.
    pub timeout: Duration,
    /// Delay between the end of one poll cycle and the start of the next.
    /// Must be non-zero.
    pub poll_interval: Duration,
    /// History window length in points.
    pub history_capacity: usize,
    /// Named limit presets, in display order.
    pub presets: Vec<(String, LimitPreset)>,
    /// Preset used to seed the limit editor.
    pub default_preset: Option<String>,
}

impl DashboardConfig {
    /// Defaults for everything but the service URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(1000),
            history_capacity: crate::history::DEFAULT_CAPACITY,
            presets: Vec::new(),
            default_preset: None,
        }
    }

    /// Look up a preset by name (case-insensitive).
    pub fn preset(&self, name: &str) -> Option<LimitPreset> {
        self.presets
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, p)| *p)
    }

    /// The preset the limit editor opens with.
    pub fn seed_preset(&self) -> LimitPreset {
        self.default_preset
            .as_deref()
            .and_then(|name| self.preset(name))
            .or_else(|| self.presets.first().map(|(_, p)| *p))
            .unwrap_or(FALLBACK_PRESET)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn base() -> DashboardConfig {
        DashboardConfig::new(Url::parse("http://127.0.0.1:8080").unwrap())
    }

    fn with_presets() -> DashboardConfig {
        DashboardConfig {
            presets: vec![
                (
                    "slow".into(),
                    LimitPreset {
                        download_kbps: 256,
                        upload_kbps: 64,
                    },
                ),
                (
                    "fast".into(),
                    LimitPreset {
                        download_kbps: 8192,
                        upload_kbps: 2048,
                    },
                ),
            ],
            ..base()
        }
    }

    #[test]
    fn seed_prefers_named_default() {
        let mut config = with_presets();
        config.default_preset = Some("FAST".into());
        assert_eq!(config.seed_preset().download_kbps, 8192);
    }

    #[test]
    fn seed_falls_back_to_first_then_builtin() {
        let config = with_presets();
        assert_eq!(config.seed_preset().download_kbps, 256);
        assert_eq!(base().seed_preset(), FALLBACK_PRESET);
    }
}
