// ── Controller abstraction ──
//
// Lifecycle for one dashboard session: builds the API client, owns the
// DataStore and Poller, spawns the background poll task, and routes write
// commands.

use std::sync::Arc;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use netpulse_api::transport::{TlsMode, TransportConfig};
use netpulse_api::{ApiClient, LimitPayload};

use crate::command::{Command, CommandResult};
use crate::config::{DashboardConfig, TlsVerification};
use crate::convert::devices_from_entries;
use crate::error::CoreError;
use crate::model::{BandwidthSnapshot, DeviceRecord, ServiceStatus};
use crate::poller::{CycleOutcome, PollState, Poller};
use crate::stats::TrafficTotals;
use crate::store::{DashboardState, DataStore};

/// The main entry point for frontends.
///
/// Cheaply cloneable via `Arc<ControllerInner>`.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: DashboardConfig,
    client: ApiClient,
    store: Arc<DataStore>,
    poller: Arc<Poller>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Serializes writes so two commands never interleave.
    write_lock: Mutex<()>,
}

impl Controller {
    /// Build a controller. Does not poll until [`start()`](Self::start).
    /// A zero poll interval is rejected.
    pub fn new(config: DashboardConfig) -> Result<Self, CoreError> {
        if config.poll_interval.is_zero() {
            return Err(CoreError::validation("poll interval must be greater than zero"));
        }
        let transport = build_transport(&config);
        let client = ApiClient::new(config.url.clone(), &transport)?;
        let store = Arc::new(DataStore::new(config.history_capacity));
        let poller = Arc::new(Poller::new(client.clone(), Arc::clone(&store)));

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                client,
                store,
                poller,
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
                write_lock: Mutex::new(()),
            }),
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    pub fn poller(&self) -> &Arc<Poller> {
        &self.inner.poller
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Spawn the background poller. Calling it again while it runs is a no-op.
    pub async fn start(&self) {
        let interval = self.inner.config.poll_interval;
        let mut handles = self.inner.task_handles.lock().await;
        if !handles.is_empty() {
            return;
        }
        let poller = Arc::clone(&self.inner.poller);
        let cancel = self.inner.cancel.child_token();
        handles.push(tokio::spawn(poller.run(interval, cancel)));
        info!(url = %self.inner.config.url, "dashboard polling started");
    }

    /// Stop background tasks and wait for them to exit.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "background task ended abnormally");
            }
        }
        debug!("controller shut down");
    }

    // ── Refresh ──────────────────────────────────────────────────

    /// Manual trigger. Dropped if a cycle is already in flight.
    pub async fn refresh(&self) -> CycleOutcome {
        self.inner.poller.run_cycle().await
    }

    /// Refresh sequenced after any in-flight cycle.
    pub async fn refresh_after_in_flight(&self) -> CycleOutcome {
        self.inner.poller.refresh_after_in_flight().await
    }

    // ── State observation ────────────────────────────────────────

    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.inner.store.snapshot()
    }

    /// Wakes on every store commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.store.subscribe()
    }

    pub fn poll_state(&self) -> watch::Receiver<PollState> {
        self.inner.poller.subscribe()
    }

    // ── Command execution ────────────────────────────────────────

    /// Validate and send a write, then refresh behind any in-flight cycle.
    ///
    /// Failures are returned once and never retried.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        cmd.validate()?;
        let _write = self.inner.write_lock.lock().await;
        debug!(command = %cmd.describe(), "executing command");

        self.route_command(&cmd).await?;
        info!(command = %cmd.describe(), "command accepted");

        match self.refresh_after_in_flight().await {
            CycleOutcome::Completed(report) => Ok(CommandResult::Refreshed(report)),
            CycleOutcome::Skipped => Ok(CommandResult::Ok),
        }
    }

    async fn route_command(&self, cmd: &Command) -> Result<(), CoreError> {
        let client = &self.inner.client;
        match cmd {
            Command::SetLimit(req) => client
                .set_limit(req.mac.as_str(), Some(LimitPayload::from(req)))
                .await
                .map_err(|e| not_found_as_device(e, req.mac.as_str())),
            Command::ClearLimit { mac } => client
                .set_limit(mac.as_str(), None)
                .await
                .map_err(|e| not_found_as_device(e, mac.as_str())),
            Command::SetInterface { interface } => Ok(client.set_interface(interface.trim()).await?),
            Command::Service(action) => Ok(client.control_service(*action).await?),
        }
    }

    // ── Direct reads ─────────────────────────────────────────────
    //
    // Single requests that surface errors instead of falling back. The
    // CLI uses these; the poller never does.

    pub async fn list_devices(&self) -> Result<Vec<DeviceRecord>, CoreError> {
        let entries = self.inner.client.list_devices().await?;
        Ok(devices_from_entries(entries))
    }

    pub async fn get_history(&self) -> Result<Vec<BandwidthSnapshot>, CoreError> {
        let points = self.inner.client.get_history().await?;
        Ok(points.into_iter().map(Into::into).collect())
    }

    pub async fn get_status(&self) -> Result<ServiceStatus, CoreError> {
        Ok(self.inner.client.get_status().await?.into())
    }

    pub async fn get_totals(&self) -> Result<TrafficTotals, CoreError> {
        Ok(self.inner.client.get_totals().await?.into())
    }
}

fn not_found_as_device(err: netpulse_api::Error, mac: &str) -> CoreError {
    if err.is_not_found() {
        CoreError::DeviceNotFound {
            identifier: mac.to_owned(),
        }
    } else {
        err.into()
    }
}

fn build_transport(config: &DashboardConfig) -> TransportConfig {
    let tls = match &config.tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    };
    TransportConfig {
        tls,
        timeout: config.timeout,
    }
}
