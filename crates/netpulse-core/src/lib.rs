//! Telemetry pipeline between `netpulse-api` and the frontends (CLI / TUI).
//!
//! - **[`Controller`]**: cloneable facade that owns the API client, the
//!   [`DataStore`] and the background [`Poller`] task, and routes write
//!   [`Command`]s so their follow-up refresh lands after any in-flight cycle.
//!
//! - **[`Poller`]**: Idle/Refreshing scheduler. Each cycle reads devices,
//!   history, status and totals concurrently, masks failed reads with
//!   fallbacks, and commits one immutable [`DashboardState`].
//!
//! - **[`HistoryBuffer`]**: fixed-capacity, timestamp-ordered window of
//!   [`BandwidthSnapshot`]s.
//!
//! - **[`stats`]**, **[`sort`]**, **[`format`]**: pure helpers over the
//!   device list.
//!
//! - **[`chart`]**: dual-series area chart renderer over a [`Surface`],
//!   with a software [`Raster`] backend.
//!
//! - **[`LimitControl`]**: editor state machine for per-device limits.

pub mod chart;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod format;
pub mod history;
pub mod limit;
pub mod model;
pub mod poller;
pub mod sort;
pub mod stats;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use chart::{ChartRenderer, Raster, Rgba, Surface};
pub use command::{Command, CommandResult};
pub use config::{DashboardConfig, LimitPreset, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use history::{HistoryBuffer, HistoryError};
pub use limit::{LimitControl, LimitDraft, LimitField, LimitState};
pub use model::{
    BandwidthSnapshot, DeviceRecord, LimitRequest, MacAddress, ServiceStatus, SpeedLimit,
};
pub use poller::{CycleOutcome, CycleReport, PollState, Poller};
pub use sort::{SortDirection, SortField, SortSpec};
pub use stats::TrafficTotals;
pub use store::{DashboardState, DataStore, PollStats};

pub use netpulse_api::ServiceAction;
