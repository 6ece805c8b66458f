// ── Poll scheduler ──
//
// Drives mutually exclusive refresh cycles. The Idle/Refreshing flag on a
// `watch` channel is the only mutual exclusion: a trigger that finds the
// scheduler Refreshing is dropped, never queued. The flag is reset by a
// drop guard, so a cycle that panics or is cancelled mid-flight still
// returns the scheduler to Idle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use netpulse_api::ApiClient;

use crate::convert::devices_from_entries;
use crate::history::HistoryBuffer;
use crate::model::{BandwidthSnapshot, DeviceRecord, ServiceStatus};
use crate::stats::{self, TrafficTotals};
use crate::store::{DashboardState, DataStore, PollStats};

/// Number of independent reads per cycle.
const READS_PER_CYCLE: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Idle,
    Refreshing,
}

/// What happened when a cycle was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was in flight; this trigger was dropped.
    Skipped,
    Completed(CycleReport),
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Reads that fell back to their default.
    pub failed_reads: u8,
    pub devices: usize,
    /// Snapshots added to the history window.
    pub history_added: usize,
}

/// Resets the scheduler to Idle when dropped.
struct RefreshGuard<'a> {
    state: &'a watch::Sender<PollState>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.state.send_replace(PollState::Idle);
    }
}

/// Raw results of one cycle's reads, `None` where the read failed.
#[derive(Debug, Default)]
pub(crate) struct CycleReads {
    pub devices: Option<Vec<DeviceRecord>>,
    pub history: Option<Vec<BandwidthSnapshot>>,
    pub status: Option<ServiceStatus>,
    pub totals: Option<TrafficTotals>,
}

impl CycleReads {
    fn failures(&self) -> u8 {
        [
            self.devices.is_none(),
            self.history.is_none(),
            self.status.is_none(),
            self.totals.is_none(),
        ]
        .into_iter()
        .map(u8::from)
        .sum()
    }
}

pub struct Poller {
    client: ApiClient,
    store: Arc<DataStore>,
    state: watch::Sender<PollState>,
}

impl Poller {
    pub fn new(client: ApiClient, store: Arc<DataStore>) -> Self {
        let (state, _) = watch::channel(PollState::Idle);
        Self {
            client,
            store,
            state,
        }
    }

    pub fn state(&self) -> PollState {
        *self.state.borrow()
    }

    /// Observe Idle/Refreshing transitions.
    pub fn subscribe(&self) -> watch::Receiver<PollState> {
        self.state.subscribe()
    }

    /// Atomic check-and-set Idle -> Refreshing.
    fn try_begin(&self) -> Option<RefreshGuard<'_>> {
        let acquired = self.state.send_if_modified(|state| {
            if *state == PollState::Idle {
                *state = PollState::Refreshing;
                true
            } else {
                false
            }
        });
        // Only build the guard on success: dropping one resets the flag.
        acquired.then(|| RefreshGuard { state: &self.state })
    }

    /// Run one cycle unless one is already in flight.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = self.try_begin() else {
            debug!("poll cycle already in flight; trigger dropped");
            return CycleOutcome::Skipped;
        };

        let (devices, history, status, totals) = tokio::join!(
            read("devices", self.client.list_devices()),
            read("history", self.client.get_history()),
            read("status", self.client.get_status()),
            read("totals", self.client.get_totals()),
        );

        let reads = CycleReads {
            devices: devices.map(devices_from_entries),
            history: history.map(|points| points.into_iter().map(Into::into).collect()),
            status: status.map(Into::into),
            totals: totals.map(Into::into),
        };

        let previous = self.store.snapshot();
        let (next, report) = build_state(&previous, reads, Utc::now().timestamp_millis());
        self.store.commit(next);

        debug!(
            devices = report.devices,
            failed_reads = report.failed_reads,
            history_added = report.history_added,
            "poll cycle committed"
        );
        CycleOutcome::Completed(report)
    }

    /// Wait for any in-flight cycle to finish, then run a fresh one.
    ///
    /// Write paths use this so their follow-up refresh observes the
    /// write instead of racing a cycle that started before it.
    pub async fn refresh_after_in_flight(&self) -> CycleOutcome {
        let mut rx = self.state.subscribe();
        loop {
            if rx.wait_for(|s| *s == PollState::Idle).await.is_err() {
                return CycleOutcome::Skipped;
            }
            match self.run_cycle().await {
                CycleOutcome::Skipped => {}
                done @ CycleOutcome::Completed(_) => return done,
            }
        }
    }

    /// Poll until cancelled. The next cycle starts `interval` after the
    /// previous one returned to Idle, so cycles never overlap and a slow
    /// cycle simply delays the next.
    pub async fn run(self: Arc<Self>, interval: Duration, cancel: CancellationToken) {
        info!(?interval, "poller started");
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = self.run_cycle() => {}
            }
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(interval) => {}
            }
        }
        info!("poller stopped");
    }
}

/// Await one read, logging and discarding its error.
async fn read<T>(
    endpoint: &'static str,
    fut: impl Future<Output = Result<T, netpulse_api::Error>>,
) -> Option<T> {
    match fut.await {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(endpoint, error = %e, transient = e.is_transient(), "read failed; using fallback");
            None
        }
    }
}

/// Fold one cycle's reads into the next snapshot.
///
/// Failed reads fall back independently: no devices, no new history, the
/// fallback status, no reported totals.
pub(crate) fn build_state(
    previous: &DashboardState,
    reads: CycleReads,
    now_ms: i64,
) -> (DashboardState, CycleReport) {
    let failed_reads = reads.failures();
    let devices_ok = reads.devices.is_some();
    let devices = reads.devices.unwrap_or_default();
    let totals = stats::aggregate(&devices);

    let mut history = previous.history.clone();
    let history_added = merge_history(&mut history, reads.history, devices_ok, &totals, now_ms);

    let now = chrono::DateTime::from_timestamp_millis(now_ms);
    let poll = PollStats {
        cycles: previous.poll.cycles.saturating_add(1),
        consecutive_failures: if failed_reads == READS_PER_CYCLE {
            previous.poll.consecutive_failures.saturating_add(1)
        } else {
            0
        },
        last_success: if failed_reads < READS_PER_CYCLE {
            now
        } else {
            previous.poll.last_success
        },
        last_cycle: now,
        last_cycle_failures: failed_reads,
    };

    let report = CycleReport {
        failed_reads,
        devices: devices.len(),
        history_added,
    };

    let next = DashboardState {
        devices: Arc::new(devices),
        history,
        totals,
        reported_totals: reads.totals,
        status: reads.status.unwrap_or_else(ServiceStatus::fallback),
        poll,
    };
    (next, report)
}

/// Merge the history endpoint's series into the window.
///
/// An empty window takes the series as a backfill; otherwise only points
/// newer than the last reported one are appended, displacing provisional
/// samples. When the endpoint adds nothing and the device read succeeded,
/// a provisional sample is synthesized from the aggregated rates at the
/// local clock, provided it is newer than the tail.
fn merge_history(
    history: &mut HistoryBuffer,
    fetched: Option<Vec<BandwidthSnapshot>>,
    devices_ok: bool,
    totals: &TrafficTotals,
    now_ms: i64,
) -> usize {
    let fetched = fetched.unwrap_or_default();
    let added = if history.is_empty() {
        history.backfill(fetched)
    } else {
        history.extend_newer(fetched)
    };
    if added > 0 || !devices_ok {
        return added;
    }

    let synthetic = BandwidthSnapshot::new(now_ms, totals.download_rate, totals.upload_rate);
    match history.append_provisional(synthetic) {
        Ok(()) => 1,
        Err(e) => {
            debug!(error = %e, "synthetic snapshot not appended");
            0
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MacAddress;

    fn device(mac: &str, down: u64, up: u64) -> DeviceRecord {
        DeviceRecord {
            download_rate: down,
            upload_rate: up,
            ..DeviceRecord::new(MacAddress::new(mac))
        }
    }

    fn all_ok() -> CycleReads {
        CycleReads {
            devices: Some(vec![device("a", 1000, 200), device("b", 500, 900)]),
            history: Some(Vec::new()),
            status: Some(ServiceStatus {
                running: true,
                interface: "eth0".into(),
                uptime_secs: 60,
                version: None,
            }),
            totals: Some(TrafficTotals::default()),
        }
    }

    #[test]
    fn failed_reads_fall_back_independently() {
        let previous = DashboardState::empty(10);
        let reads = CycleReads {
            devices: None,
            status: None,
            ..all_ok()
        };

        let (next, report) = build_state(&previous, reads, 1_000);

        assert_eq!(report.failed_reads, 2);
        assert!(next.devices.is_empty());
        assert_eq!(next.status, ServiceStatus::fallback());
        assert_eq!(next.totals, TrafficTotals::default());
        assert_eq!(next.poll.consecutive_failures, 0);
        assert!(next.poll.last_success.is_some());
    }

    #[test]
    fn total_failure_counts_consecutively() {
        let mut state = DashboardState::empty(10);
        for expected in 1..=3 {
            let (next, report) = build_state(&state, CycleReads::default(), 1_000 * expected);
            assert_eq!(report.failed_reads, READS_PER_CYCLE);
            assert_eq!(next.poll.consecutive_failures, u32::try_from(expected).unwrap());
            assert!(next.poll.last_success.is_none());
            assert!(next.history.is_empty());
            state = next;
        }
        let (recovered, _) = build_state(&state, all_ok(), 10_000);
        assert_eq!(recovered.poll.consecutive_failures, 0);
        assert_eq!(recovered.poll.cycles, 4);
    }

    #[test]
    fn synthesizes_snapshot_from_aggregated_rates() {
        let previous = DashboardState::empty(10);
        let (next, report) = build_state(&previous, all_ok(), 5_000);

        assert_eq!(report.history_added, 1);
        assert_eq!(next.totals.download_rate, 1500);
        assert_eq!(next.totals.upload_rate, 1100);
        assert_eq!(
            next.history.latest(),
            Some(&BandwidthSnapshot::new(5_000, 1500, 1100))
        );
    }

    #[test]
    fn first_cycle_backfills_from_endpoint() {
        let previous = DashboardState::empty(3);
        let reads = CycleReads {
            history: Some((1..=5).map(|t| BandwidthSnapshot::new(t, 1, 1)).collect()),
            ..all_ok()
        };

        let (next, report) = build_state(&previous, reads, 9_000);

        assert_eq!(report.history_added, 3);
        let ts: Vec<i64> = next.history.snapshots().map(|s| s.timestamp_ms).collect();
        assert_eq!(ts, vec![3, 4, 5]);
    }

    #[test]
    fn later_cycles_append_only_newer_points() {
        let mut previous = DashboardState::empty(10);
        previous.history.backfill([BandwidthSnapshot::new(100, 1, 1)]);
        let reads = CycleReads {
            history: Some(vec![
                BandwidthSnapshot::new(100, 9, 9),
                BandwidthSnapshot::new(200, 2, 2),
            ]),
            ..all_ok()
        };

        let (next, report) = build_state(&previous, reads, 300);

        assert_eq!(report.history_added, 1);
        assert_eq!(next.history.len(), 2);
        assert_eq!(next.history.latest().map(|s| s.download_rate), Some(2));
    }

    #[test]
    fn clock_behind_tail_does_not_break_ordering() {
        let mut previous = DashboardState::empty(10);
        previous.history.backfill([BandwidthSnapshot::new(10_000, 1, 1)]);

        let (next, report) = build_state(&previous, all_ok(), 5_000);

        assert_eq!(report.history_added, 0);
        assert_eq!(next.history.len(), 1);
    }

    fn history_reads(points: &[(i64, u64)]) -> CycleReads {
        CycleReads {
            history: Some(
                points
                    .iter()
                    .map(|&(ts, rate)| BandwidthSnapshot::new(ts, rate, rate))
                    .collect(),
            ),
            ..all_ok()
        }
    }

    #[test]
    fn server_points_survive_local_clock_running_ahead() {
        // Local clock 500 ms ahead of the service
        let state = DashboardState::empty(10);
        let (state, _) = build_state(&state, history_reads(&[(1000, 1)]), 1_500);
        let (state, report) = build_state(&state, history_reads(&[(1000, 1)]), 2_500);
        assert_eq!(report.history_added, 1);
        assert_eq!(state.history.provisional_len(), 1);

        let (state, report) =
            build_state(&state, history_reads(&[(1000, 1), (2000, 900)]), 3_500);

        assert_eq!(report.history_added, 1);
        assert_eq!(state.history.provisional_len(), 0);
        let points: Vec<(i64, u64)> = state
            .history
            .snapshots()
            .map(|s| (s.timestamp_ms, s.download_rate))
            .collect();
        assert_eq!(points, vec![(1000, 1), (2000, 900)]);
    }

    #[test]
    fn failed_history_read_keeps_estimating() {
        let mut previous = DashboardState::empty(10);
        previous.history.backfill([BandwidthSnapshot::new(1000, 1, 1)]);
        let reads = CycleReads {
            history: None,
            ..all_ok()
        };

        let (next, report) = build_state(&previous, reads, 2_000);
        let (next, _) = build_state(&next, history_reads(&[(1500, 7)]), 3_000);

        assert_eq!(report.history_added, 1);
        let ts: Vec<i64> = next.history.snapshots().map(|s| s.timestamp_ms).collect();
        assert_eq!(ts, vec![1000, 1500]);
    }

    #[tokio::test]
    async fn guard_resets_state_on_drop() {
        let client = ApiClient::new(
            url::Url::parse("http://127.0.0.1:9").unwrap(),
            &netpulse_api::TransportConfig::default(),
        )
        .unwrap();
        let poller = Poller::new(client, Arc::new(DataStore::new(10)));

        {
            let guard = poller.try_begin();
            assert!(guard.is_some());
            assert_eq!(poller.state(), PollState::Refreshing);
            assert!(poller.try_begin().is_none());
        }
        assert_eq!(poller.state(), PollState::Idle);
    }
}
