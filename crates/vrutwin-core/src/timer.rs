//! Timer registry
//!
//! Every timeout a simulation view schedules goes through a [`TimerQueue`].
//! Owning them in one place means stop, facility change and teardown can
//! cancel all of them unconditionally, and a fired timer whose id no longer
//! matches its owner's bookkeeping is simply ignored by that owner.
//!
//! Time is expressed as a [`Duration`] since the view was mounted.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Handle for a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(u64);

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Idle truck waiting for its next visit
    CycleDelay,
    /// Truck parked at the dispenser
    FillDuration,
    /// Secondary flow auto-clear
    PulseClear,
    /// Routine status log message
    LogRotation,
}

/// A timer that reached its deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FiredTimer {
    /// Id returned when it was scheduled
    pub id: TimerId,
    /// Purpose
    pub kind: TimerKind,
    /// Deadline it was scheduled for
    pub deadline: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Timer {
    kind: TimerKind,
    deadline: Duration,
}

/// Pending timeouts of one simulation view
#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: BTreeMap<TimerId, Timer>,
}

impl TimerQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer firing at `deadline`
    pub fn schedule(&mut self, kind: TimerKind, deadline: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.insert(id, Timer { kind, deadline });
        tracing::trace!(?id, ?kind, ?deadline, "Timer scheduled");
        id
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.pending.remove(&id).is_some()
    }

    /// Cancel every pending timer of one kind, returning how many were removed
    pub fn cancel_kind(&mut self, kind: TimerKind) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, t| t.kind != kind);
        before - self.pending.len()
    }

    /// Cancel everything, returning how many were removed
    pub fn cancel_all(&mut self) -> usize {
        let n = self.pending.len();
        self.pending.clear();
        n
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Whether nothing is pending
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Whether a timer of this kind is pending
    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.values().any(|t| t.kind == kind)
    }

    /// Deadline of a pending timer
    pub fn deadline(&self, id: TimerId) -> Option<Duration> {
        self.pending.get(&id).map(|t| t.deadline)
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.values().map(|t| t.deadline).min()
    }

    /// Remove and return every timer due at `now`, ordered by deadline then
    /// scheduling order
    pub fn drain_expired(&mut self, now: Duration) -> Vec<FiredTimer> {
        let due: Vec<TimerId> = self
            .pending
            .iter()
            .filter(|(_, t)| t.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        let mut fired: Vec<FiredTimer> = due
            .into_iter()
            .filter_map(|id| {
                self.pending.remove(&id).map(|t| FiredTimer {
                    id,
                    kind: t.kind,
                    deadline: t.deadline,
                })
            })
            .collect();
        fired.sort_by_key(|f| (f.deadline, f.id));
        fired
    }
}
