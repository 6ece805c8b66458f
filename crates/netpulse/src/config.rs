//! CLI configuration: thin wrapper around `netpulse_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --insecure, --timeout).

use netpulse_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use netpulse_config::{Config, config_path, load_config, save_config_to};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Overlay CLI flags on a loaded `Config`.
pub fn apply_overrides(mut cfg: Config, global: &GlobalOpts) -> Config {
    if let Some(ref server) = global.server {
        cfg.server.clone_from(server);
    }
    if global.insecure {
        cfg.insecure = true;
    }
    if let Some(timeout) = global.timeout {
        cfg.timeout_secs = timeout;
    }
    cfg
}

/// Load file + env, apply flags, and build the runtime config.
///
/// Flag > env > file > defaults.
pub fn resolve(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = apply_overrides(load_config()?, global);
    Ok(cfg.to_dashboard_config()?)
}
