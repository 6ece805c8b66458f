//! Clap derive structures for the `netpulse` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use netpulse_core::{ServiceAction, SortField};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netpulse -- bandwidth telemetry from the command line
#[derive(Debug, Parser)]
#[command(
    name = "netpulse",
    version,
    about = "Inspect and control a bandwidth measurement service",
    long_about = "One-shot reads and writes against a netpulse measurement service.\n\n\
        Lists devices and their throughput, shows totals and service status,\n\
        requests per-device speed limits, and exports the throughput chart.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Measurement service URL (overrides config)
    #[arg(long, short = 's', env = "NETPULSE_SERVER", global = true)]
    pub server: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETPULSE_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NETPULSE_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, env = "NETPULSE_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List monitored devices and their throughput
    #[command(alias = "dev", alias = "d")]
    Devices(DevicesArgs),

    /// Show measurement service status
    Status,

    /// Show cumulative traffic totals
    Totals,

    /// Show the recent throughput history
    History(HistoryArgs),

    /// Request or remove per-device speed limits
    Limit(LimitArgs),

    /// Show or switch the monitored interface
    #[command(alias = "iface")]
    Interface(InterfaceArgs),

    /// Start, stop, or restart the measurement service
    #[command(alias = "svc")]
    Service(ServiceArgs),

    /// Render the throughput chart to a PNG file
    Chart(ChartArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Devices ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DevicesArgs {
    /// Sort column: name, address, downloaded, uploaded, download-rate, upload-rate
    #[arg(long, default_value = "download-rate")]
    pub sort: SortField,

    /// Sort ascending (default depends on the column)
    #[arg(long, conflicts_with = "desc")]
    pub asc: bool,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,
}

// ── History ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Only show the most recent N samples
    #[arg(long, short = 'n')]
    pub last: Option<usize>,
}

// ── Limit ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LimitArgs {
    #[command(subcommand)]
    pub command: LimitCommand,
}

#[derive(Debug, Subcommand)]
pub enum LimitCommand {
    /// Request a download/upload ceiling for a device
    Set {
        /// Device MAC address
        mac: String,

        /// Download ceiling in kbps
        #[arg(long, required_unless_present = "preset", conflicts_with = "preset")]
        down: Option<u64>,

        /// Upload ceiling in kbps
        #[arg(long, required_unless_present = "preset", conflicts_with = "preset")]
        up: Option<u64>,

        /// Use a named preset from the config file
        #[arg(long)]
        preset: Option<String>,
    },

    /// Remove a device's limit
    #[command(alias = "rm")]
    Clear {
        /// Device MAC address
        mac: String,
    },
}

// ── Interface ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InterfaceArgs {
    #[command(subcommand)]
    pub command: InterfaceCommand,
}

#[derive(Debug, Subcommand)]
pub enum InterfaceCommand {
    /// Show the interface currently monitored
    Show,

    /// Switch the monitored interface
    Set {
        /// Interface name (e.g. eth0)
        name: String,
    },
}

// ── Service ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServiceArgs {
    /// Lifecycle action
    pub action: ServiceActionArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ServiceActionArg {
    Start,
    Stop,
    Restart,
}

impl From<ServiceActionArg> for ServiceAction {
    fn from(arg: ServiceActionArg) -> Self {
        match arg {
            ServiceActionArg::Start => Self::Start,
            ServiceActionArg::Stop => Self::Stop,
            ServiceActionArg::Restart => Self::Restart,
        }
    }
}

// ── Chart ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ChartArgs {
    /// Destination PNG file
    #[arg(long, short = 'f', default_value = "netpulse.png")]
    pub file: PathBuf,

    /// Image width in pixels
    #[arg(long, default_value = "800")]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value = "300")]
    pub height: u32,
}

// ── Config ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a starter config file (stores --server when given)
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell
    pub shell: clap_complete::Shell,
}
