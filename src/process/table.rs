/*!
 * Process Table
 * Concurrent pid -> process mapping and child-event queues
 */

use super::types::{ChildEvent, Process, ProcessState};
use crate::core::types::Pid;
use crate::memory::AddressSpace;
use crate::monitor::traits::ChildNotifier;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

/// Shared process table
///
/// Clones share the same underlying map. Accessors take closures so a shard
/// guard never outlives the call that needed it.
#[derive(Clone)]
pub struct ProcessTable {
    processes: Arc<DashMap<Pid, Process, RandomState>>,
    next_pid: Arc<AtomicU32>,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self {
            processes: Arc::new(DashMap::with_hasher(RandomState::new())),
            next_pid: Arc::new(AtomicU32::new(1)),
        }
    }

    /// Create a process under `ppid`, returning its pid
    ///
    /// A `ppid` of 0 creates a root supervisor.
    pub fn create(&self, ppid: Pid, address_space: AddressSpace) -> Pid {
        let pid = self.next_pid.fetch_add(1, Ordering::SeqCst);
        self.processes
            .insert(pid, Process::new(pid, ppid, address_space));
        debug!(pid, ppid, "Process created");
        pid
    }

    /// Insert a fully built process record, replacing any existing entry
    pub fn insert(&self, process: Process) {
        let pid = process.pid;
        // Keep fresh allocations clear of explicitly chosen pids
        self.next_pid.fetch_max(pid + 1, Ordering::SeqCst);
        self.processes.insert(pid, process);
    }

    #[inline]
    pub fn exists(&self, pid: Pid) -> bool {
        self.processes.contains_key(&pid)
    }

    pub fn parent_of(&self, pid: Pid) -> Option<Pid> {
        self.processes.get(&pid).map(|p| p.ppid)
    }

    pub fn state(&self, pid: Pid) -> Option<ProcessState> {
        self.processes.get(&pid).map(|p| p.state)
    }

    /// Run `f` against a shared view of the process
    pub fn with_process<R>(&self, pid: Pid, f: impl FnOnce(&Process) -> R) -> Option<R> {
        self.processes.get(&pid).map(|p| f(p.value()))
    }

    /// Run `f` against an exclusive view of the process
    pub fn with_process_mut<R>(&self, pid: Pid, f: impl FnOnce(&mut Process) -> R) -> Option<R> {
        self.processes.get_mut(&pid).map(|mut p| f(p.value_mut()))
    }

    /// Pop the oldest pending child event of `ppid`
    pub fn take_child_event(&self, ppid: Pid) -> Option<ChildEvent> {
        self.with_process_mut(ppid, |parent| {
            parent.child_events.as_mut().and_then(|q| q.pop_front())
        })
        .flatten()
    }

    pub fn pending_child_events(&self, ppid: Pid) -> usize {
        self.with_process(ppid, |parent| {
            parent.child_events.as_ref().map_or(0, |q| q.len())
        })
        .unwrap_or(0)
    }

    /// Remove a zombie from the table
    ///
    /// Live processes are left in place and `None` is returned.
    pub fn reap(&self, pid: Pid) -> Option<Process> {
        self.processes
            .remove_if(&pid, |_, p| p.is_zombie())
            .map(|(_, p)| p)
    }

    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildNotifier for ProcessTable {
    /// Queue `event` on the parent; missing or exited parents drop it
    fn send_child_event(&self, ppid: Pid, event: ChildEvent) {
        let delivered = self.with_process_mut(ppid, |parent| {
            if parent.is_zombie() {
                return false;
            }
            parent
                .child_events
                .get_or_insert_with(Default::default)
                .push_back(event);
            true
        });

        match delivered {
            Some(true) => {}
            Some(false) => {
                warn!(ppid, child = event.pid, "Parent already exited, child event dropped")
            }
            None => warn!(ppid, child = event.pid, "Parent missing, child event dropped"),
        }
    }
}
