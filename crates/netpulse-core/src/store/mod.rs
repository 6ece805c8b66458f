// ── State Store ──
//
// Single owner of the dashboard snapshot. Readers load an `Arc` without
// locking; the poller is the only writer and publishes by swapping the
// whole snapshot, then bumping a version on a `watch` channel so
// subscribers wake up.

mod state;

pub use state::{DashboardState, PollStats};

use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

pub struct DataStore {
    state: ArcSwap<DashboardState>,
    version: watch::Sender<u64>,
}

impl DataStore {
    pub fn new(history_capacity: usize) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            state: ArcSwap::from_pointee(DashboardState::empty(history_capacity)),
            version,
        }
    }

    /// Current snapshot. Cheap; never blocks the writer.
    pub fn snapshot(&self) -> Arc<DashboardState> {
        self.state.load_full()
    }

    /// Publish a new snapshot.
    pub(crate) fn commit(&self, next: DashboardState) {
        self.state.store(Arc::new(next));
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }

    /// Monotonic commit counter.
    pub fn version(&self) -> u64 {
        *self.version.borrow()
    }

    /// Receiver that wakes on every commit.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }
}
