/*!
 * Lock-Free Monitor Statistics
 * Atomic counters updated by producers and the monitor thread
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, AtomicU8, AtomicUsize, Ordering};

/// Monitor loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MonitorState {
    /// Queue empty, blocked on the wake signal
    Idle = 0,
    /// Servicing queued requests
    Draining = 1,
    /// Queue closed and drained; the thread has exited
    Stopped = 2,
}

impl MonitorState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => MonitorState::Idle,
            1 => MonitorState::Draining,
            _ => MonitorState::Stopped,
        }
    }
}

/// Point-in-time copy of the monitor counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorStats {
    pub state: MonitorState,
    pub submitted: u64,
    pub dispatched: u64,
    pub exec_succeeded: u64,
    pub exec_failed: u64,
    pub exits_completed: u64,
    pub exits_dropped: u64,
    pub queue_high_watermark: usize,
}

/// Atomic monitor statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing between producers and the monitor
/// - Relaxed ordering; a snapshot is not a consistent cut, except that
///   `dispatched` never exceeds `submitted` (release increments, and the
///   snapshot reads `dispatched` first)
#[repr(C, align(64))]
pub struct AtomicMonitorStats {
    state: AtomicU8,
    submitted: AtomicU64,
    dispatched: AtomicU64,
    exec_succeeded: AtomicU64,
    exec_failed: AtomicU64,
    exits_completed: AtomicU64,
    exits_dropped: AtomicU64,
    queue_high_watermark: AtomicUsize,
}

impl AtomicMonitorStats {
    #[inline]
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(MonitorState::Idle as u8),
            submitted: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            exec_succeeded: AtomicU64::new(0),
            exec_failed: AtomicU64::new(0),
            exits_completed: AtomicU64::new(0),
            exits_dropped: AtomicU64::new(0),
            queue_high_watermark: AtomicUsize::new(0),
        }
    }

    #[inline]
    pub fn set_state(&self, state: MonitorState) {
        self.state.store(state as u8, Ordering::Release);
    }

    #[inline]
    pub fn state(&self) -> MonitorState {
        MonitorState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Record a submission at the given queue depth
    ///
    /// # Performance
    /// Hot path - called by every producer, inside the queue lock
    #[inline(always)]
    pub fn record_submit(&self, depth: usize) {
        self.submitted.fetch_add(1, Ordering::Release);
        self.queue_high_watermark.fetch_max(depth, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_dispatched(&self) {
        self.dispatched.fetch_add(1, Ordering::Release);
    }

    #[inline]
    pub fn record_exec(&self, succeeded: bool) {
        if succeeded {
            self.exec_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.exec_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[inline]
    pub fn inc_exits_completed(&self) {
        self.exits_completed.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_exits_dropped(&self) {
        self.exits_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MonitorStats {
        // Every dispatch observed here was submitted before it
        let dispatched = self.dispatched.load(Ordering::Acquire);
        let submitted = self.submitted.load(Ordering::Acquire);
        MonitorStats {
            state: self.state(),
            submitted,
            dispatched,
            exec_succeeded: self.exec_succeeded.load(Ordering::Relaxed),
            exec_failed: self.exec_failed.load(Ordering::Relaxed),
            exits_completed: self.exits_completed.load(Ordering::Relaxed),
            exits_dropped: self.exits_dropped.load(Ordering::Relaxed),
            queue_high_watermark: self.queue_high_watermark.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicMonitorStats {
    fn default() -> Self {
        Self::new()
    }
}
