// ── Dashboard snapshot ──
//
// One immutable view of everything the frontends render. The poller builds
// a new value per cycle and swaps it in whole; nothing patches it in place.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::HistoryBuffer;
use crate::model::{DeviceRecord, ServiceStatus};
use crate::stats::TrafficTotals;

/// Bookkeeping about the scheduler itself, for staleness display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollStats {
    /// Completed cycles since start.
    pub cycles: u64,
    /// Cycles in a row where every read fell back.
    pub consecutive_failures: u32,
    /// End of the last cycle with at least one successful read.
    pub last_success: Option<DateTime<Utc>>,
    /// End of the last cycle, successful or not.
    pub last_cycle: Option<DateTime<Utc>>,
    /// Reads that fell back during the last cycle.
    pub last_cycle_failures: u8,
}

impl PollStats {
    /// Seconds since the last successful read, if there ever was one.
    pub fn staleness_secs(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_success.map(|t| (now - t).num_seconds().max(0))
    }
}

/// Everything the State Store owns, replaced atomically per cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardState {
    pub devices: Arc<Vec<DeviceRecord>>,
    pub history: HistoryBuffer,
    /// Derived from `devices` on every commit.
    pub totals: TrafficTotals,
    /// Cumulative totals as reported by the service, when that read
    /// succeeded. Display uses `totals`.
    pub reported_totals: Option<TrafficTotals>,
    pub status: ServiceStatus,
    pub poll: PollStats,
}

impl DashboardState {
    pub fn empty(history_capacity: usize) -> Self {
        Self {
            devices: Arc::new(Vec::new()),
            history: HistoryBuffer::new(history_capacity),
            totals: TrafficTotals::default(),
            reported_totals: None,
            status: ServiceStatus::fallback(),
            poll: PollStats::default(),
        }
    }

    /// Whether a poll cycle has ever completed.
    pub fn is_populated(&self) -> bool {
        self.poll.cycles > 0
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;

    #[test]
    fn empty_state_shows_fallback_status() {
        let state = DashboardState::empty(30);
        assert!(!state.is_populated());
        assert!(!state.status.running);
        assert_eq!(state.history.capacity(), 30);
    }

    #[test]
    fn staleness_counts_from_last_success() {
        let now = Utc::now();
        let stats = PollStats {
            last_success: Some(now - TimeDelta::seconds(7)),
            ..PollStats::default()
        };
        assert_eq!(stats.staleness_secs(now), Some(7));
        assert_eq!(PollStats::default().staleness_secs(now), None);
    }
}
