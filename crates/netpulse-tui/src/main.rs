//! `netpulse-tui`: live bandwidth dashboard for the terminal.
//!
//! Built on [ratatui](https://ratatui.rs) with state pushed from
//! `netpulse-core`'s [`DataStore`](netpulse_core::DataStore). Two screens,
//! switched with `1`/`2` or Tab: Dashboard (throughput chart, totals,
//! service status) and Devices (sortable table, limit editor).
//!
//! Logs go to a file (default `/tmp/netpulse-tui.log`) so they never
//! corrupt the terminal. A background data bridge forwards every store
//! commit into the TUI action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use netpulse_core::{Controller, DashboardConfig};

use crate::app::App;

/// Terminal dashboard for a bandwidth measurement service.
#[derive(Parser, Debug)]
#[command(name = "netpulse-tui", version, about)]
struct Cli {
    /// Measurement service URL (e.g., http://192.168.1.2:8080)
    #[arg(short = 's', long, env = "NETPULSE_SERVER")]
    server: Option<String>,

    /// Skip TLS certificate verification
    #[arg(short = 'k', long)]
    insecure: bool,

    /// Log file path
    #[arg(long, default_value = "/tmp/netpulse-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing; stdout/stderr belong to the terminal UI. The
/// returned guard must live as long as the app so buffered lines flush.
fn setup_tracing(cli: &Cli) -> WorkerGuard {
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("netpulse_tui={log_level},netpulse_core={log_level}"))
    });

    let log_dir = cli
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(std::path::Path::new("."));
    let log_filename = cli
        .log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("netpulse-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true),
        )
        .init();

    guard
}

/// Config file + env, then flags on top.
fn dashboard_config(cli: &Cli) -> Result<DashboardConfig> {
    let mut cfg = netpulse_config::load_config()?;
    if let Some(ref server) = cli.server {
        cfg.server.clone_from(server);
    }
    if cli.insecure {
        cfg.insecure = true;
    }
    Ok(cfg.to_dashboard_config()?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Hooks go in before the terminal is touched
    tui::install_hooks()?;

    let _log_guard = setup_tracing(&cli);

    // Configuration errors are reported before entering the alternate screen
    let config = dashboard_config(&cli)?;
    info!(url = %config.url, "starting netpulse-tui");

    let controller = Controller::new(config)?;
    let mut app = App::new(controller);
    app.run().await?;

    Ok(())
}
