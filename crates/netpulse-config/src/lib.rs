//! Shared configuration for the netpulse CLI and TUI.
//!
//! A TOML file under the platform config dir, overlaid by `NETPULSE_*`
//! environment variables, translated into `netpulse_core::DashboardConfig`.
//! Both binaries depend on this crate; the CLI layers its flags on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use netpulse_core::{DashboardConfig, LimitPreset, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Measurement service base URL (e.g. "http://192.168.1.2:8080").
    #[serde(default = "default_server")]
    pub server: String,

    /// Delay between poll cycles, in milliseconds. Must be non-zero.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// History window length in points.
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Skip TLS verification (self-signed measurement boxes).
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Preset the limit editor opens with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_preset: Option<String>,

    /// Named limit presets.
    #[serde(default)]
    pub presets: BTreeMap<String, Preset>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: default_server(),
            poll_interval_ms: default_poll_interval_ms(),
            history_capacity: default_history_capacity(),
            timeout_secs: default_timeout_secs(),
            insecure: false,
            ca_cert: None,
            default_preset: None,
            presets: BTreeMap::new(),
        }
    }
}

/// A named download/upload ceiling pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Preset {
    /// kbps
    pub download: u64,
    /// kbps
    pub upload: u64,
}

fn default_server() -> String {
    "http://127.0.0.1:8080".into()
}
fn default_poll_interval_ms() -> u64 {
    1000
}
fn default_history_capacity() -> usize {
    netpulse_core::history::DEFAULT_CAPACITY
}
fn default_timeout_secs() -> u64 {
    5
}

impl Config {
    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.server_url()?;
        if self.history_capacity == 0 {
            return Err(ConfigError::invalid(
                "history_capacity",
                "must be at least 1",
            ));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::invalid(
                "poll_interval_ms",
                "must be greater than 0",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "must be greater than 0"));
        }
        for (name, preset) in &self.presets {
            if preset.download == 0 || preset.upload == 0 {
                return Err(ConfigError::invalid(
                    "presets",
                    format!("preset '{name}' must have non-zero limits"),
                ));
            }
        }
        if let Some(ref name) = self.default_preset {
            if !self.presets.keys().any(|k| k.eq_ignore_ascii_case(name)) {
                return Err(ConfigError::invalid(
                    "default_preset",
                    format!("no preset named '{name}'"),
                ));
            }
        }
        Ok(())
    }

    /// Parse `server`, requiring an http(s) scheme.
    pub fn server_url(&self) -> Result<Url, ConfigError> {
        let url: Url = self
            .server
            .trim()
            .parse()
            .map_err(|_| ConfigError::invalid("server", format!("invalid URL: {}", self.server)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::invalid(
                "server",
                format!("unsupported scheme '{other}'"),
            )),
        }
    }

    /// Validate and build the runtime `DashboardConfig`.
    pub fn to_dashboard_config(&self) -> Result<DashboardConfig, ConfigError> {
        self.validate()?;

        let tls = if self.insecure {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = self.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let mut config = DashboardConfig::new(self.server_url()?);
        config.tls = tls;
        config.timeout = Duration::from_secs(self.timeout_secs);
        config.poll_interval = Duration::from_millis(self.poll_interval_ms);
        config.history_capacity = self.history_capacity;
        config.presets = self
            .presets
            .iter()
            .map(|(name, p)| {
                (
                    name.clone(),
                    LimitPreset {
                        download_kbps: p.download,
                        upload_kbps: p.upload,
                    },
                )
            })
            .collect();
        config.default_preset.clone_from(&self.default_preset);
        Ok(config)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "netpulse", "netpulse").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("netpulse");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment. A missing file is not an error.
///
/// Environment keys use `__` for nesting, e.g.
/// `NETPULSE_PRESETS__SLOW__DOWNLOAD=256`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("NETPULSE_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML at `path`, creating parent directories.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn preset(download: u64, upload: u64) -> Preset {
        Preset { download, upload }
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.history_capacity, 60);
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
server = "http://10.0.0.2:9000"
history_capacity = 120

[presets.slow]
download = 256
upload = 64
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.server, "http://10.0.0.2:9000");
        assert_eq!(config.history_capacity, 120);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.presets["slow"], preset(256, 64));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.server, default_server());
    }

    #[test]
    fn save_then_load_preserves_presets() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.presets.insert("fast".into(), preset(8192, 2048));
        config.default_preset = Some("fast".into());

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(loaded.presets, config.presets);
        assert_eq!(loaded.default_preset.as_deref(), Some("fast"));
    }

    #[test]
    fn zero_capacity_and_interval_are_rejected() {
        let config = Config {
            history_capacity: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "history_capacity"
        ));

        let config = Config {
            poll_interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Validation { ref field, .. }) if field == "poll_interval_ms"
        ));
    }

    #[test]
    fn bad_server_url_is_rejected() {
        for server in ["not a url", "ftp://box.lan"] {
            let config = Config {
                server: server.into(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{server} should be rejected");
        }
    }

    #[test]
    fn unknown_default_preset_is_rejected() {
        let config = Config {
            default_preset: Some("turbo".into()),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn dashboard_config_carries_tuning_and_presets() {
        let mut config = Config {
            poll_interval_ms: 250,
            timeout_secs: 2,
            insecure: true,
            ..Config::default()
        };
        config.presets.insert("slow".into(), preset(256, 64));
        config.default_preset = Some("SLOW".into());

        let dashboard = config.to_dashboard_config().unwrap();

        assert_eq!(dashboard.poll_interval, Duration::from_millis(250));
        assert_eq!(dashboard.timeout, Duration::from_secs(2));
        assert_eq!(dashboard.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(dashboard.seed_preset().download_kbps, 256);
    }
}
