/*!
 * Performance Monitors
 * Reference-counted per-process event counters
 */

use crate::monitor::traits::PerfmonRelease;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Performance monitor shared by the processes attached to it
#[derive(Debug)]
pub struct Perfmon {
    id: u64,
    events: AtomicU64,
    live: Arc<AtomicUsize>,
}

impl Perfmon {
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    #[inline]
    pub fn record_event(&self) {
        self.events.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn events(&self) -> u64 {
        self.events.load(Ordering::Relaxed)
    }
}

impl Drop for Perfmon {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Allocates performance monitors and tracks how many are alive
#[derive(Clone, Default)]
pub struct PerfmonRegistry {
    next_id: Arc<AtomicU64>,
    live: Arc<AtomicUsize>,
}

impl PerfmonRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> Arc<Perfmon> {
        self.live.fetch_add(1, Ordering::Relaxed);
        Arc::new(Perfmon {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            events: AtomicU64::new(0),
            live: Arc::clone(&self.live),
        })
    }

    /// Monitors not yet freed by their last release
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Relaxed)
    }
}

impl PerfmonRelease for PerfmonRegistry {
    fn perfmon_unref(&self, perfmon: Arc<Perfmon>) -> bool {
        let id = perfmon.id;
        let freed = Arc::into_inner(perfmon).is_some();
        if freed {
            debug!(perfmon = id, "Performance monitor freed on last release");
        }
        freed
    }
}
