/*!
 * Teardown Handler
 *
 * Releases everything a process owns and tells its parent it is gone.
 * Release order: threads, file handles, pending child events, address space,
 * performance monitor, then the parent notification.
 */

use super::context::MonitorContext;
use super::request::ExitRequest;
use crate::core::limits::MAX_THREADS;
use crate::core::types::Pid;
use crate::memory::{AddressSpace, Perfmon};
use crate::process::{ChildEvent, FileHandleTable, ProcessState};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What a teardown released
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeardownReport {
    pub pid: Pid,
    pub ppid: Pid,
    pub threads_killed: usize,
    pub handles_closed: usize,
    pub child_events_discarded: usize,
    pub frames_freed: usize,
    /// `Some(true)` if this release freed the monitor
    pub perfmon_freed: Option<bool>,
    pub event: ChildEvent,
}

/// Resources detached from the process record
struct Detached {
    ppid: Pid,
    file_handles: Option<FileHandleTable>,
    child_events: Option<VecDeque<ChildEvent>>,
    address_space: Option<AddressSpace>,
    perfmon: Option<Arc<Perfmon>>,
}

enum Claim {
    Root,
    AlreadyExited,
    Detached(Detached),
}

impl MonitorContext {
    /// Tear down the target process
    ///
    /// Exiting the root supervisor halts the kernel. An exit for a process
    /// that is missing or already torn down is logged and dropped; `None` is
    /// returned in that case.
    pub fn handle_exit(&self, request: ExitRequest) -> Option<TeardownReport> {
        let ExitRequest {
            pid,
            exit_code,
            signalled,
        } = request;

        // Claim the resources under one guard, release them without it
        let claim = self.processes.with_process_mut(pid, |process| {
            if process.is_root() {
                return Claim::Root;
            }
            if process.is_zombie() {
                return Claim::AlreadyExited;
            }
            process.state = ProcessState::Zombie;
            Claim::Detached(Detached {
                ppid: process.ppid,
                file_handles: process.file_handles.take(),
                child_events: process.child_events.take(),
                address_space: process.address_space.take(),
                perfmon: process.perfmon.take(),
            })
        });

        let detached = match claim {
            Some(Claim::Detached(detached)) => detached,
            Some(Claim::Root) => self.halt.halt("Going nowhere without my init!"),
            Some(Claim::AlreadyExited) => {
                warn!(pid, "urm: exit request for exited process dropped");
                return None;
            }
            None => {
                error!(pid, "urm: exit request for unknown process dropped");
                return None;
            }
        };

        let threads_killed = (0..MAX_THREADS)
            .filter(|&slot| self.threads.kill_thread(pid, slot))
            .count();

        let handles_closed = detached.file_handles.map_or(0, |table| {
            table
                .open_handles()
                .filter(|&fd| self.files.close(fd))
                .count()
        });

        let child_events_discarded = detached.child_events.map_or(0, |events| events.len());
        if child_events_discarded > 0 {
            debug!(pid, count = child_events_discarded, "urm: discarding unreaped child events");
        }

        let frames_freed = detached
            .address_space
            .map_or(0, |space| self.address_spaces.free_address_space(space));

        let perfmon_freed = detached
            .perfmon
            .map(|perfmon| self.perfmon.perfmon_unref(perfmon));

        let event = ChildEvent::exited(pid, exit_code, signalled);
        self.notifier.send_child_event(detached.ppid, event);

        info!(
            pid,
            ppid = detached.ppid,
            status = event.status,
            threads_killed,
            handles_closed,
            frames_freed,
            "urm: process torn down"
        );

        Some(TeardownReport {
            pid,
            ppid: detached.ppid,
            threads_killed,
            handles_closed,
            child_events_discarded,
            frames_freed,
            perfmon_freed,
            event,
        })
    }
}
