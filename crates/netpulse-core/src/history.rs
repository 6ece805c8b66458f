// ── Bandwidth history window ──
//
// Fixed-capacity FIFO of aggregate throughput samples. Timestamps are
// strictly increasing from head to tail. Samples leave the window by
// eviction of the oldest when it is full, or, for provisional samples at
// the tail, when a reported sample supersedes them.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::BandwidthSnapshot;

/// Default window length (one minute at the default 1 s poll interval).
pub const DEFAULT_CAPACITY: usize = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("snapshot at {timestamp_ms} ms is not newer than the buffer tail at {tail_ms} ms")]
    OutOfOrder { timestamp_ms: i64, tail_ms: i64 },

    #[error("history capacity must be at least 1")]
    ZeroCapacity,

    #[error("{len} samples exceed the history capacity of {capacity}")]
    Overfull { len: usize, capacity: usize },

    #[error("{provisional} provisional samples claimed but only {len} present")]
    ProvisionalOverflow { provisional: usize, len: usize },
}

/// Sliding window of [`BandwidthSnapshot`]s.
///
/// Samples appended with [`append_provisional`](Self::append_provisional)
/// are locally estimated stand-ins. They stay at the tail until the next
/// reported sample newer than the last reported one replaces all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredHistory")]
pub struct HistoryBuffer {
    capacity: usize,
    samples: VecDeque<BandwidthSnapshot>,
    /// Trailing samples that are estimates.
    provisional: usize,
}

/// Unchecked serialized form, validated into a [`HistoryBuffer`].
#[derive(Deserialize)]
struct StoredHistory {
    capacity: usize,
    samples: Vec<BandwidthSnapshot>,
    #[serde(default)]
    provisional: usize,
}

impl TryFrom<StoredHistory> for HistoryBuffer {
    type Error = HistoryError;

    fn try_from(stored: StoredHistory) -> Result<Self, Self::Error> {
        let StoredHistory {
            capacity,
            samples,
            provisional,
        } = stored;
        if capacity == 0 {
            return Err(HistoryError::ZeroCapacity);
        }
        if samples.len() > capacity {
            return Err(HistoryError::Overfull {
                len: samples.len(),
                capacity,
            });
        }
        if provisional > samples.len() {
            return Err(HistoryError::ProvisionalOverflow {
                provisional,
                len: samples.len(),
            });
        }
        let mut buffer = Self::new(capacity);
        for snapshot in samples {
            buffer.push_after_tail(snapshot)?;
        }
        buffer.provisional = provisional;
        Ok(buffer)
    }
}

impl HistoryBuffer {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            samples: VecDeque::with_capacity(capacity),
            provisional: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Number of provisional samples at the tail.
    pub fn provisional_len(&self) -> usize {
        self.provisional
    }

    /// Newest sample that is not provisional.
    fn reported_tail(&self) -> Option<&BandwidthSnapshot> {
        let reported = self.samples.len() - self.provisional;
        reported.checked_sub(1).and_then(|i| self.samples.get(i))
    }

    fn check_newer(
        snapshot: &BandwidthSnapshot,
        tail: Option<&BandwidthSnapshot>,
    ) -> Result<(), HistoryError> {
        match tail {
            Some(tail) if snapshot.timestamp_ms <= tail.timestamp_ms => {
                Err(HistoryError::OutOfOrder {
                    timestamp_ms: snapshot.timestamp_ms,
                    tail_ms: tail.timestamp_ms,
                })
            }
            _ => Ok(()),
        }
    }

    /// Push past the current tail, evicting from the head while over capacity.
    fn push_after_tail(&mut self, snapshot: BandwidthSnapshot) -> Result<(), HistoryError> {
        Self::check_newer(&snapshot, self.samples.back())?;
        self.samples.push_back(snapshot);
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
        self.provisional = self.provisional.min(self.samples.len());
        Ok(())
    }

    /// Insert a reported sample at the tail, evicting from the head while
    /// over capacity. It must be newer than the last reported sample; any
    /// provisional samples are discarded first.
    pub fn append(&mut self, snapshot: BandwidthSnapshot) -> Result<(), HistoryError> {
        Self::check_newer(&snapshot, self.reported_tail())?;
        let reported = self.samples.len() - self.provisional;
        self.samples.truncate(reported);
        self.provisional = 0;
        self.push_after_tail(snapshot)
    }

    /// Insert an estimated sample. It must be newer than every sample in
    /// the window, provisional or not.
    pub fn append_provisional(&mut self, snapshot: BandwidthSnapshot) -> Result<(), HistoryError> {
        self.push_after_tail(snapshot)?;
        self.provisional = (self.provisional + 1).min(self.samples.len());
        Ok(())
    }

    /// Oldest-first view of the window. Restartable: call again for a
    /// fresh pass.
    pub fn snapshots(
        &self,
    ) -> impl DoubleEndedIterator<Item = &BandwidthSnapshot> + ExactSizeIterator {
        self.samples.iter()
    }

    /// Replace the contents with an externally provided series, keeping
    /// the most recent `capacity` points in order. Points that would
    /// break timestamp ordering are dropped. Returns how many were kept.
    pub fn backfill<I>(&mut self, series: I) -> usize
    where
        I: IntoIterator<Item = BandwidthSnapshot>,
    {
        self.samples.clear();
        self.provisional = 0;
        for snapshot in series {
            // Ordering violations are skipped rather than aborting the backfill.
            let _ = self.append(snapshot);
        }
        self.samples.len()
    }

    /// Append only the points strictly newer than the last reported
    /// sample. The first one accepted displaces any provisional samples.
    /// Returns the number appended.
    pub fn extend_newer<I>(&mut self, series: I) -> usize
    where
        I: IntoIterator<Item = BandwidthSnapshot>,
    {
        series
            .into_iter()
            .filter(|s| self.append(*s).is_ok())
            .count()
    }

    pub fn latest(&self) -> Option<&BandwidthSnapshot> {
        self.samples.back()
    }

    /// Highest rate in either direction across the window.
    pub fn peak(&self) -> u64 {
        self.samples
            .iter()
            .map(BandwidthSnapshot::peak_rate)
            .max()
            .unwrap_or(0)
    }

    /// Copy the window into a contiguous vector (for renderers).
    pub fn to_vec(&self) -> Vec<BandwidthSnapshot> {
        self.samples.iter().copied().collect()
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
