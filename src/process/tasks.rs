/*!
 * Task Table
 * Per-process thread slots and the thread termination primitive
 */

use crate::core::limits::MAX_THREADS;
use crate::core::types::{Pid, ThreadSlot};
use crate::monitor::traits::ThreadControl;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::trace;

/// Thread occupying a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadInfo {
    pub pid: Pid,
    pub slot: ThreadSlot,
    pub name: String,
}

/// Shared table of live threads keyed by (pid, slot)
#[derive(Clone)]
pub struct TaskTable {
    threads: Arc<DashMap<(Pid, ThreadSlot), ThreadInfo, RandomState>>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self {
            threads: Arc::new(DashMap::with_hasher(RandomState::new())),
        }
    }

    /// Start a thread in the lowest free slot of `pid`
    pub fn spawn_thread(&self, pid: Pid, name: impl Into<String>) -> Option<ThreadSlot> {
        let name = name.into();
        for slot in 0..MAX_THREADS {
            let entry = self.threads.entry((pid, slot));
            if let dashmap::mapref::entry::Entry::Vacant(vacant) = entry {
                vacant.insert(ThreadInfo { pid, slot, name });
                return Some(slot);
            }
        }
        None
    }

    pub fn is_alive(&self, pid: Pid, slot: ThreadSlot) -> bool {
        self.threads.contains_key(&(pid, slot))
    }

    pub fn thread_count(&self, pid: Pid) -> usize {
        self.threads.iter().filter(|t| t.key().0 == pid).count()
    }
}

impl Default for TaskTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadControl for TaskTable {
    fn kill_thread(&self, pid: Pid, slot: ThreadSlot) -> bool {
        match self.threads.remove(&(pid, slot)) {
            Some((_, thread)) => {
                trace!(pid, slot, name = %thread.name, "Thread killed");
                true
            }
            None => false,
        }
    }
}
